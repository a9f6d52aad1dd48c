//! Gradient-tracking mode

use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether newly created op results record a backward graph
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// Disable graph recording until the returned guard is dropped
///
/// ```
/// use pronostico::autograd::{is_grad_enabled, no_grad};
///
/// {
///     let _guard = no_grad();
///     assert!(!is_grad_enabled());
/// }
/// assert!(is_grad_enabled());
/// ```
pub fn no_grad() -> NoGradGuard {
    let prev = GRAD_ENABLED.with(|flag| flag.replace(false));
    NoGradGuard { prev }
}

/// Restores the previous grad mode on drop
#[must_use = "grad tracking is re-enabled as soon as the guard is dropped"]
pub struct NoGradGuard {
    prev: bool,
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|flag| flag.set(self.prev));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_guards_restore() {
        assert!(is_grad_enabled());
        {
            let _outer = no_grad();
            {
                let _inner = no_grad();
                assert!(!is_grad_enabled());
            }
            assert!(!is_grad_enabled());
        }
        assert!(is_grad_enabled());
    }
}
