//! In-flight request coordination.
//!
//! [`FlightGroup`] collapses overlapping calls that share a key into one execution. Callers that
//! arrive while an execution is outstanding wait for it and receive a clone of its outcome.
//! Nothing is remembered once the execution completes; the next caller starts a new one.

// self
use crate::_prelude::*;

/// Map of in-flight executions keyed by `K`, each resolving to a shared `T`.
pub struct FlightGroup<K, T> {
	flights: Mutex<HashMap<K, Arc<OnceCell<T>>>>,
}
impl<K, T> FlightGroup<K, T>
where
	K: Clone + Eq + Hash,
	T: Clone,
{
	/// Creates an empty group.
	pub fn new() -> Self {
		Self { flights: Mutex::new(HashMap::new()) }
	}

	/// Runs `fetch` unless an execution for `key` is already in flight, in which case the
	/// caller waits for that execution instead.
	///
	/// If the caller driving the execution is dropped before it completes, one of the waiting
	/// callers runs its own `fetch` in its place.
	pub async fn run<F, Fut>(&self, key: &K, fetch: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		let cell = self.flights.lock().entry(key.clone()).or_default().clone();
		let flight = cell.clone();
		let value = cell
			.get_or_init(|| async move {
				let value = fetch().await;

				self.forget(key, &flight);

				value
			})
			.await;

		value.clone()
	}

	/// Number of keys with an execution currently in flight.
	pub fn in_flight(&self) -> usize {
		self.flights.lock().len()
	}

	fn forget(&self, key: &K, flight: &Arc<OnceCell<T>>) {
		let mut flights = self.flights.lock();

		// A newer execution may already own the key.
		if flights.get(key).is_some_and(|current| Arc::ptr_eq(current, flight)) {
			flights.remove(key);
		}
	}
}
impl<K, T> Default for FlightGroup<K, T>
where
	K: Clone + Eq + Hash,
	T: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, T> Debug for FlightGroup<K, T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FlightGroup").field("in_flight", &self.flights.lock().len()).finish()
	}
}
