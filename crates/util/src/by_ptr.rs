use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::string::Str;

/// A trait for types that can be compared directly by pointer for equality
pub trait AsCmpPtr {
    /// Get the pointer that directly represents `self`
    fn as_cmp_ptr(&self) -> *const ();

    /// Compare pointer equality.
    fn ptr_eq(this: &Self, other: &impl AsCmpPtr) -> bool {
        this.as_cmp_ptr() == other.as_cmp_ptr()
    }

    /// Feed the pointer into `state`, so that hashing agrees with [`AsCmpPtr::ptr_eq`].
    fn ptr_hash<H: Hasher>(&self, state: &mut H) {
        self.as_cmp_ptr().hash(state)
    }

    /// The address of the pointee, used as a printable identity.
    fn addr(&self) -> usize {
        self.as_cmp_ptr() as usize
    }
}

// ====== Implementations =======

impl<T: ?Sized> AsCmpPtr for Rc<T> {
    fn as_cmp_ptr(&self) -> *const () {
        Rc::as_ptr(self).cast()
    }
}

impl AsCmpPtr for Str {
    fn as_cmp_ptr(&self) -> *const () {
        self.as_ptr().cast()
    }
}

#[cfg(test)]
mod test {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;
    use std::rc::Rc;

    use super::AsCmpPtr;

    fn hash_of(p: &impl AsCmpPtr) -> u64 {
        let mut hasher = DefaultHasher::new();
        p.ptr_hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_rc_identity() {
        let a = Rc::new(vec![1, 2, 3]);
        let b = Rc::new(vec![1, 2, 3]);
        let a2 = a.clone();

        assert!(AsCmpPtr::ptr_eq(&a, &a2));
        assert!(!AsCmpPtr::ptr_eq(&a, &b), "equal contents are not the same pointer");
        assert_eq!(hash_of(&a), hash_of(&a2));
        assert_eq!(a.addr(), a2.addr());
    }

    #[test]
    fn test_unsized_rc() {
        let a: Rc<[i32]> = Rc::from(vec![1, 2]);
        let b = a.clone();
        assert!(AsCmpPtr::ptr_eq(&a, &b));
    }
}
