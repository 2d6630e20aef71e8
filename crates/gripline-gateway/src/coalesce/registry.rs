use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};

/// One in-flight fetch and the number of requests awaiting it.
struct Flight<T> {
    fut: Shared<BoxFuture<'static, T>>,
    waiters: Arc<AtomicUsize>,
}

/// Decrements the waiter count even if the waiting request is dropped.
struct WaiterGuard(Arc<AtomicUsize>);

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Single-flight registry: `sharing_key -> in-flight fetch`.
///
/// The first request for a key (the leader) creates the fetch; requests that
/// arrive while it is running join it and receive a clone of its output.
/// Each flight is driven by its own spawned task, so it runs to completion
/// and removes itself even when every waiter has gone away. Later arrivals
/// then start a new fetch. Map shards are never held across an `.await`.
///
/// `run` must be called from within a Tokio runtime.
pub struct SharingRegistry<T> {
    flights: Arc<DashMap<Bytes, Flight<T>>>,
}

impl<T> Default for SharingRegistry<T> {
    fn default() -> Self {
        Self {
            flights: Arc::new(DashMap::new()),
        }
    }
}

impl<T> SharingRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make()` for `key`, or join the fetch already running for it.
    ///
    /// Returns the output and whether this call joined an existing flight.
    /// `make` is only invoked by the leader.
    pub async fn run<F, Fut>(&self, key: Bytes, make: F) -> (T, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (fut, guard, joined) = match self.flights.entry(key.clone()) {
            Entry::Occupied(e) => {
                let flight = e.get();
                flight.waiters.fetch_add(1, Ordering::Relaxed);
                (
                    flight.fut.clone(),
                    WaiterGuard(Arc::clone(&flight.waiters)),
                    true,
                )
            }
            Entry::Vacant(e) => {
                let flights = Arc::clone(&self.flights);
                let inner = make();
                let fut = async move {
                    let out = inner.await;
                    flights.remove(&key);
                    out
                }
                .boxed()
                .shared();

                let waiters = Arc::new(AtomicUsize::new(1));
                e.insert(Flight {
                    fut: fut.clone(),
                    waiters: Arc::clone(&waiters),
                });
                (fut, WaiterGuard(waiters), false)
            }
        };

        // Spawned only after the shard lock is released: the flight removes
        // its own entry on completion.
        if !joined {
            tokio::spawn(fut.clone());
        }

        let out = fut.await;
        drop(guard);
        (out, joined)
    }

    /// Number of keys with a fetch in flight.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    /// Requests currently awaiting the fetch for `key` (leader included).
    pub fn waiters(&self, key: &[u8]) -> usize {
        self.flights
            .get(key)
            .map(|f| f.waiters.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::sync::Notify;

    use super::SharingRegistry;

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let reg: SharingRegistry<u32> = SharingRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let call = |calls: Arc<AtomicUsize>, gate: Arc<Notify>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                7
            }
        };

        let release = async {
            while reg.waiters(b"k") < 2 {
                tokio::task::yield_now().await;
            }
            gate.notify_one();
        };

        let (a, b, ()) = tokio::join!(
            reg.run(Bytes::from_static(b"k"), call(calls.clone(), gate.clone())),
            reg.run(Bytes::from_static(b"k"), call(calls.clone(), gate.clone())),
            release,
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((a.0, b.0), (7, 7));
        assert!(a.1 != b.1, "exactly one caller joins");
        assert_eq!(reg.in_flight(), 0);
    }

    #[tokio::test]
    async fn finished_flight_is_not_reused() {
        let reg: SharingRegistry<u32> = SharingRegistry::new();
        let (first, joined1) = reg.run(Bytes::from_static(b"k"), || async { 1 }).await;
        let (second, joined2) = reg.run(Bytes::from_static(b"k"), || async { 2 }).await;
        assert_eq!((first, second), (1, 2));
        assert!(!joined1 && !joined2);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_share() {
        let reg: SharingRegistry<&'static str> = SharingRegistry::new();
        let (a, b) = tokio::join!(
            reg.run(Bytes::from_static(b"a"), || async { "a" }),
            reg.run(Bytes::from_static(b"b"), || async { "b" }),
        );
        assert_eq!((a, b), (("a", false), ("b", false)));
    }

    #[tokio::test]
    async fn abandoned_flight_completes_and_clears() {
        let reg: SharingRegistry<u32> = SharingRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&calls);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            reg.run(Bytes::from_static(b"k"), move || async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                counted.fetch_add(1, Ordering::SeqCst);
                1
            }),
        )
        .await;
        assert!(abandoned.is_err(), "sole waiter gave up mid-fetch");
        assert_eq!(reg.waiters(b"k"), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "fetch ran to completion");
        assert_eq!(reg.in_flight(), 0);

        let (out, joined) = reg.run(Bytes::from_static(b"k"), || async { 2 }).await;
        assert_eq!((out, joined), (2, false), "later arrival starts fresh");
    }
}
