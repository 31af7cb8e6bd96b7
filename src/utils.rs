use std::{cell::{Ref, RefCell, RefMut}, collections::HashSet, rc::Rc};

#[derive(Debug, Default)]
pub struct RcCell<T> {
	inner: Rc<RefCell<T>>,
}

impl<T> Clone for RcCell<T> {
	fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T> RcCell<T> {
	pub fn new(value: T) -> Self { Self { inner: Rc::new(RefCell::new(value)) } }

	pub fn borrow(&self) -> Ref<'_, T> { self.inner.borrow() }

	pub fn borrow_mut(&self) -> RefMut<'_, T> { self.inner.borrow_mut() }

	pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }
}

impl<T> From<T> for RcCell<T> {
	fn from(value: T) -> Self { Self::new(value) }
}

/// Canonicalizes strings used as identifier and attribute keys, so equal
/// names share one allocation. Scoped to a runtime instance, never global.
#[derive(Clone, Default)]
pub struct Interner {
	table: RcCell<HashSet<Rc<str>>>,
}

impl Interner {
	pub fn new() -> Self { Self::default() }

	pub fn intern(&self, text: &str) -> Rc<str> {
		if let Some(existing) = self.table.borrow().get(text) {
			return existing.clone();
		}
		let symbol: Rc<str> = Rc::from(text);
		self.table.borrow_mut().insert(symbol.clone());
		symbol
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interned_names_share_storage() {
		let interner = Interner::new();
		let a = interner.intern("spam");
		let b = interner.intern("spam");
		assert!(Rc::ptr_eq(&a, &b));
		let c = interner.intern("eggs");
		assert!(!Rc::ptr_eq(&a, &c));
	}

	#[test]
	fn rc_cell_shares_mutations() {
		let cell = RcCell::new(1);
		let alias = cell.clone();
		*alias.borrow_mut() = 2;
		assert_eq!(*cell.borrow(), 2);
		assert!(cell.ptr_eq(&alias));
	}
}
