//! Cooperative cancellation shared between the orchestrator and its readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable flag; every clone observes the same state.
///
/// Readers poll it between blocks, so cancellation takes effect within one
/// block read. A [`child`](Self::child) token also observes every ancestor,
/// while cancelling the child leaves the ancestors untouched.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    /// A token that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh token that also fires whenever `self` (or any ancestor) does.
    #[must_use]
    pub fn child(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(Arc::clone(&self.flag));
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            ancestors,
        }
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether this token or any ancestor has fired.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self.ancestors.iter().any(|a| a.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
        a.cancel();
        assert!(a.is_cancelled());
    }

    #[test]
    fn child_sees_parent_but_not_vice_versa() {
        let root = CancelToken::new();
        let child = root.child();
        let grandchild = child.child();

        child.cancel();
        assert!(grandchild.is_cancelled());
        assert!(!root.is_cancelled());

        let other = root.child();
        assert!(!other.is_cancelled());
        root.cancel();
        assert!(other.is_cancelled());
    }
}
