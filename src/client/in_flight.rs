use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether a submission is pending. Clones observe the same flag, so a view
/// can hold one while the form itself is borrowed by `submit`.
#[derive(Clone, Debug, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raises the flag until the guard is dropped, including when the
    /// submitting future is cancelled.
    pub fn enter(&self) -> InFlightGuard {
        self.0.store(true, Ordering::Release);
        InFlightGuard(self.0.clone())
    }
}

#[must_use = "the flag drops back as soon as the guard does"]
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
