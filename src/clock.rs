//! Injectable time sources used for token validity checks.

// self
use crate::_prelude::*;

/// Source of the current instant.
///
/// Any `Fn() -> OffsetDateTime` closure that is `Send + Sync` is also a clock.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current instant according to this clock.
	fn now(&self) -> OffsetDateTime;
}
impl<F> Clock for F
where
	F: Fn() -> OffsetDateTime + Send + Sync,
{
	fn now(&self) -> OffsetDateTime {
		self()
	}
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and pass another to the client.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
impl ManualClock {
	/// Creates a clock frozen at `at`.
	pub fn new(at: OffsetDateTime) -> Self {
		Self(Arc::new(Mutex::new(at)))
	}

	/// Moves the clock to `at`.
	pub fn set(&self, at: OffsetDateTime) {
		*self.0.lock() = at;
	}

	/// Moves the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		let mut now = self.0.lock();

		*now += by;
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new(OffsetDateTime::now_utc())
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}
