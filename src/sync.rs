//! Interior mutability for state shared with interrupt handlers.
//!
//! The PIC32MZ is single-core and this runtime keeps interrupts masked
//! while a handler runs, so a critical section is enough to serialize
//! access to runtime state. [`SingleCoreCell`] packages that rule: the
//! only way at the inner value is [`SingleCoreCell::with`], which holds a
//! `critical_section` token for the duration of the closure.

use core::cell::RefCell;

/// A `Sync` cell for single-core systems.
///
/// NOT safe on multi-core parts: the `Sync` impl relies on there being
/// exactly one core, with cross-context exclusion provided by the
/// `critical-section` implementation (see the
/// `critical-section-single-core` cargo feature).
pub struct SingleCoreCell<T> {
    inner: RefCell<T>,
}

// Safety: all access goes through `with`, which runs inside a critical
// section; on a single core that rules out concurrent borrows.
unsafe impl<T> Sync for SingleCoreCell<T> {}

impl<T> SingleCoreCell<T> {
    /// Create a cell. Usable in statics.
    pub const fn new(value: T) -> Self {
        SingleCoreCell {
            inner: RefCell::new(value),
        }
    }

    /// Run `f` with exclusive access to the value.
    ///
    /// Panics if re-entered from within `f` (a stream implementation must
    /// not call back into the global descriptor table).
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|_| f(&mut self.inner.borrow_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_gives_exclusive_access() {
        let cell = SingleCoreCell::new(0u32);
        cell.with(|v| *v += 3);
        cell.with(|v| *v *= 2);
        assert_eq!(cell.with(|v| *v), 6);
    }
}
