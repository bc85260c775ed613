//! Suspend the harvest between remote calls.
//!
//! Two kinds of waiting exist: the steady-state delay between logical API
//! calls and the exponential backoff inside the fetch retry loop. Both go
//! through [`Pacer`] so tests can observe requested delays without sleeping.

use std::time::Duration;

/// Blocks the current flow of control for a requested duration.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::time::Duration;
/// use fairway_core::Pacer;
///
/// #[derive(Default)]
/// struct TotalPacer {
///     total: Cell<Duration>,
/// }
///
/// impl Pacer for TotalPacer {
///     fn pause(&self, duration: Duration) {
///         self.total.set(self.total.get() + duration);
///     }
/// }
///
/// let pacer = TotalPacer::default();
/// pacer.pause(Duration::from_millis(1500));
/// pacer.pause(Duration::from_millis(500));
/// assert_eq!(pacer.total.get(), Duration::from_secs(2));
/// ```
pub trait Pacer {
    /// Wait for `duration` before returning.
    fn pause(&self, duration: Duration);
}

/// [`Pacer`] backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<P: Pacer + ?Sized> Pacer for &P {
    fn pause(&self, duration: Duration) {
        (**self).pause(duration);
    }
}
