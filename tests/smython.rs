use smython::{Smython, Value};

/// Run a program in a fresh runtime; the result is the repr of the last
/// statement's value, or the error message.
fn run(source: &str) -> String {
	match Smython::new().execute(source) {
		Ok(value) => value.repr(),
		Err(error) => error.to_string(),
	}
}

#[test]
fn factorial() {
	let source = "def fac(n):\n    if n == 0: return 1\n    return n * fac(n - 1)\nfac(10)";
	assert_eq!(run(source), "3628800");
}

#[test]
fn tuple_unpacking() {
	assert_eq!(run("a, b = 1, 2\n(b, a)"), "(2, 1)");
}

#[test]
fn class_with_superclass_and_bound_method() {
	let source = "class A:\n    def greet(self): return 'hi'\nclass B(A): pass\nB().greet()";
	assert_eq!(run(source), "'hi'");
}

#[test]
fn while_else() {
	let source = "i = 0\nwhile i < 3:\n    i = i + 1\nelse:\n    i = -i\ni";
	assert_eq!(run(source), "-3");
}

#[test]
fn except_clause_matches_by_value_and_binds() {
	let source = "x = 0\ntry:\n    raise 'e'\nexcept 'e' as v:\n    x = 1\nx";
	assert_eq!(run(source), "1");
}

#[test]
fn slice_semantics() {
	assert_eq!(run("'abcdef'[1:-1]"), "'bcde'");
	assert_eq!(run("a = [3, 1, 4, 1, 5]\na[:] == a"), "True");
	assert_eq!(run("[0, 1, 2, 3][1:3]"), "[1, 2]");
	assert_eq!(run("[0, 1, 2, 3][-2:]"), "[2, 3]");
	assert_eq!(run("[0, 1, 2, 3][3:1]"), "[]");
}

#[test]
fn local_binding_shadows_enclosing_scope() {
	let source = "x = 9\ndef f():\n    x = 1\n    return x\nf()";
	assert_eq!(run(source), "1");
}

#[test]
fn closures_observe_enclosing_locals_at_call_time() {
	let source = "def outer():\n    n = 1\n    def get(): return n\n    n = 2\n    return get()\nouter()";
	assert_eq!(run(source), "2");
}

#[test]
fn try_finally_runs_on_every_exit_path() {
	let source = "log = []\ndef f():\n    try:\n        return 'early'\n    finally:\n        \
	              log = log + ['fin']\nf(), log";
	assert_eq!(run(source), "('early', ['fin'])");
	let source = "a = 0\ntry:\n    try:\n        raise 'x'\n    finally:\n        a = 1\nexcept 'x':\n    \
	              a = a + 1\na";
	assert_eq!(run(source), "2");
}

#[test]
fn for_visits_elements_in_order() {
	let source = "seen = []\nfor e in 'abc':\n    seen = seen + [e]\nseen";
	assert_eq!(run(source), "['a', 'b', 'c']");
	let source = "hit = 0\nfor e in 1, 2, 3:\n    if e == 2: break\nelse:\n    hit = 1\nhit";
	assert_eq!(run(source), "0");
}

#[test]
fn evaluation_is_deterministic() {
	let source = "def fib(n):\n    if n <= 2: return 1\n    return fib(n - 1) + fib(n - 2)\n\
	              [fib(10), fib(11), {'a': fib(5)}]";
	assert_eq!(run(source), run(source));
}

#[test]
fn interpreters_are_isolated() {
	let first = Smython::new();
	let second = Smython::new();
	first.execute("shared = 1").unwrap();
	assert!(second.execute("shared").is_err());
}

#[test]
fn imports_resolve_from_a_module_directory() {
	let dir = std::env::temp_dir().join(format!("smython-modules-{}", std::process::id()));
	std::fs::create_dir_all(&dir).unwrap();
	std::fs::write(dir.join("helper.py"), "def double(n):\n    return n * 2\nMAGIC = 7\n").unwrap();

	let smython = Smython::new();
	smython.set_module_dir(dir.clone());
	let value = smython.execute("import helper\nhelper.double(helper.MAGIC)").unwrap();
	assert_eq!(value.repr(), "14");
	let value = smython.execute("from helper import double as twice\ntwice(5)").unwrap();
	assert_eq!(value.repr(), "10");
	assert!(matches!(smython.import("helper").unwrap(), Some(Value::Module(_))));

	std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn run_test_file() {
	let smython = Smython::new();
	let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("test.py");
	let result = smython.run_file(&path);
	assert!(result.is_ok(), "{}", result.unwrap_err());
}
