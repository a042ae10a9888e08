//! Background landmark search
//!
//! Landmark lookups are moderately expensive, so render passes hand them to a
//! small fixed pool of worker threads. Workers only ever see the lookup key,
//! the placement oracle and the shared [`LandmarkCache`]; results come back
//! through a completion queue that the owning thread drains, and only there
//! are the callbacks run. Callbacks are not `Send`, so the compiler keeps
//! them on the owning thread.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{EngineError, LandmarkError};
use crate::landmark_cache::{LandmarkCache, LandmarkKey};
use crate::landmarks::{LandmarkPlacement, LandmarkResult};

/// Default size of the worker pool.
pub const DEFAULT_SEARCH_WORKERS: usize = 2;

/// Runs on the owning thread once a lookup is resolved.
pub type LandmarkCallback = Box<dyn FnOnce(LandmarkResult)>;

/// What happened to a request.
#[derive(Debug)]
pub enum SearchHandle {
    /// Answered from the cache; the callback already ran.
    Cached(LandmarkResult),
    /// Attached to a lookup already in flight for the same key.
    Joined,
    /// A new lookup was submitted to the pool.
    Spawned(JoinHandle<LandmarkResult>),
}

/// Anything render passes can send landmark lookups to.
pub trait LandmarkRequester {
    fn request_async(
        &mut self,
        key: LandmarkKey,
        placement: &Arc<dyn LandmarkPlacement>,
        on_resolved: LandmarkCallback,
    ) -> SearchHandle;
}

/// Counters for monitoring the search pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub cache_hits: usize,
    pub spawned: usize,
    pub joined: usize,
    pub faults: usize,
    pub delivered: usize,
}

struct Completion {
    key: LandmarkKey,
    result: LandmarkResult,
    faulted: bool,
}

/// Fixed-size worker pool resolving landmark lookups off the owning thread.
pub struct LandmarkSearchScheduler {
    runtime: Runtime,
    cache: Arc<LandmarkCache>,
    in_flight: HashMap<LandmarkKey, Vec<LandmarkCallback>>,
    completed_tx: UnboundedSender<Completion>,
    completed_rx: UnboundedReceiver<Completion>,
    stats: SearchStats,
}

impl LandmarkSearchScheduler {
    pub fn new(workers: usize) -> Result<Self, EngineError> {
        Self::with_cache(workers, Arc::new(LandmarkCache::new()))
    }

    /// Pool sharing an existing cache.
    pub fn with_cache(workers: usize, cache: Arc<LandmarkCache>) -> Result<Self, EngineError> {
        // Lookups run on the blocking pool, capped at `workers` threads.
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers.max(1))
            .thread_name("landmark-search")
            .build()?;
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();

        Ok(Self {
            runtime,
            cache,
            in_flight: HashMap::new(),
            completed_tx,
            completed_rx,
            stats: SearchStats::default(),
        })
    }

    pub fn cache(&self) -> &Arc<LandmarkCache> {
        &self.cache
    }

    /// Number of keys still being resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Deliver every result that has arrived so far. Never blocks. Returns
    /// the number of callbacks run.
    pub fn run_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.completed_rx.try_recv() {
            delivered += self.deliver(completion);
        }
        delivered
    }

    /// Block until every in-flight lookup has been delivered.
    ///
    /// Meant for shutdown and tests; the render loop uses [`run_pending`].
    ///
    /// [`run_pending`]: Self::run_pending
    pub fn settle(&mut self) -> usize {
        let mut delivered = 0;
        while !self.in_flight.is_empty() {
            match self.completed_rx.blocking_recv() {
                Some(completion) => delivered += self.deliver(completion),
                None => break,
            }
        }
        delivered
    }

    /// Wait for the lookup behind `handle` to finish and return its result.
    /// Callbacks still run through [`run_pending`](Self::run_pending).
    pub fn wait(&self, handle: SearchHandle) -> Option<LandmarkResult> {
        match handle {
            SearchHandle::Cached(result) => Some(result),
            SearchHandle::Joined => None,
            SearchHandle::Spawned(task) => self.runtime.block_on(task).ok(),
        }
    }

    fn deliver(&mut self, completion: Completion) -> usize {
        if completion.faulted {
            self.stats.faults += 1;
        }
        let callbacks = self.in_flight.remove(&completion.key).unwrap_or_default();
        let delivered = callbacks.len();
        for callback in callbacks {
            callback(completion.result);
        }
        self.stats.delivered += delivered;
        trace!(key = %completion.key, delivered, "landmark result delivered");
        delivered
    }

    fn spawn_lookup(&self, key: LandmarkKey, placement: Arc<dyn LandmarkPlacement>) -> JoinHandle<LandmarkResult> {
        let cache = Arc::clone(&self.cache);
        let completed_tx = self.completed_tx.clone();

        self.runtime.spawn_blocking(move || {
            let (result, faulted) = match lookup(placement.as_ref(), &key) {
                Ok(found) => (cache.insert(key.clone(), found), false),
                Err(err) => {
                    warn!(key = %key, error = %err, "landmark search failed, treating chunk as empty");
                    (None, true)
                }
            };
            // The owner may be gone; the cache entry is still worth keeping.
            let _ = completed_tx.send(Completion {
                key,
                result,
                faulted,
            });
            result
        })
    }
}

impl LandmarkRequester for LandmarkSearchScheduler {
    fn request_async(
        &mut self,
        key: LandmarkKey,
        placement: &Arc<dyn LandmarkPlacement>,
        on_resolved: LandmarkCallback,
    ) -> SearchHandle {
        if let Some(result) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            on_resolved(result);
            return SearchHandle::Cached(result);
        }

        if let Some(waiting) = self.in_flight.get_mut(&key) {
            self.stats.joined += 1;
            waiting.push(on_resolved);
            return SearchHandle::Joined;
        }

        debug!(key = %key, "submitting landmark search");
        self.stats.spawned += 1;
        self.in_flight.insert(key.clone(), vec![on_resolved]);
        SearchHandle::Spawned(self.spawn_lookup(key, Arc::clone(placement)))
    }
}

/// Ask the oracle, turning a panic into an ordinary lookup error.
fn lookup(placement: &dyn LandmarkPlacement, key: &LandmarkKey) -> Result<LandmarkResult, LandmarkError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        placement.landmark_for_chunk(key.chunk_x, key.chunk_z)
    }))
    .unwrap_or(Err(LandmarkError::Panicked {
        chunk_x: key.chunk_x,
        chunk_z: key.chunk_z,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark_cache::DimensionId;
    use crate::landmarks::Landmark;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Puts a fixed landmark in every chunk and counts lookups. A held
    /// placement keeps its workers busy until released.
    struct CountingPlacement {
        landmark: LandmarkResult,
        calls: AtomicUsize,
        released: AtomicBool,
    }

    impl CountingPlacement {
        fn new(landmark: LandmarkResult) -> Arc<Self> {
            Arc::new(Self {
                landmark,
                calls: AtomicUsize::new(0),
                released: AtomicBool::new(true),
            })
        }

        fn held(landmark: LandmarkResult) -> Arc<Self> {
            Arc::new(Self {
                landmark,
                calls: AtomicUsize::new(0),
                released: AtomicBool::new(false),
            })
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl LandmarkPlacement for CountingPlacement {
        fn is_landmark_center(&self, _: i32, _: i32) -> bool {
            true
        }

        fn landmark_for_chunk(&self, _: i32, _: i32) -> Result<LandmarkResult, LandmarkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            while !self.released.load(Ordering::SeqCst) {
                thread::yield_now();
            }
            Ok(self.landmark)
        }
    }

    struct FailingPlacement {
        panic: bool,
    }

    impl LandmarkPlacement for FailingPlacement {
        fn is_landmark_center(&self, _: i32, _: i32) -> bool {
            true
        }

        fn landmark_for_chunk(&self, chunk_x: i32, chunk_z: i32) -> Result<LandmarkResult, LandmarkError> {
            if self.panic {
                panic!("placement blew up");
            }
            Err(LandmarkError::Generation {
                chunk_x,
                chunk_z,
                reason: "no generator".to_string(),
            })
        }
    }

    fn key(x: i32, z: i32) -> LandmarkKey {
        LandmarkKey::new(DimensionId::twilight(), x, z)
    }

    fn recorder() -> (Rc<RefCell<Vec<LandmarkResult>>>, impl Fn() -> LandmarkCallback) {
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&results);
        let make = move || -> LandmarkCallback {
            let sink = Rc::clone(&sink);
            Box::new(move |result: LandmarkResult| sink.borrow_mut().push(result))
        };
        (results, make)
    }

    #[test]
    fn test_cache_hit_is_synchronous() {
        let mut scheduler = LandmarkSearchScheduler::new(2).unwrap();
        scheduler.cache().insert(key(0, 0), Some(Landmark::QuestGrove));
        let placement: Arc<dyn LandmarkPlacement> = CountingPlacement::new(None);
        let (results, callback) = recorder();

        let handle = scheduler.request_async(key(0, 0), &placement, callback());

        assert!(matches!(handle, SearchHandle::Cached(Some(Landmark::QuestGrove))));
        assert_eq!(*results.borrow(), vec![Some(Landmark::QuestGrove)]);
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[test]
    fn test_miss_is_delivered_on_owning_thread() {
        let mut scheduler = LandmarkSearchScheduler::new(2).unwrap();
        let counting = CountingPlacement::new(Some(Landmark::LichTower));
        let placement: Arc<dyn LandmarkPlacement> = counting.clone();
        let owner = thread::current().id();
        let ran_on = Rc::new(RefCell::new(None));
        let ran_on_sink = Rc::clone(&ran_on);

        let handle = scheduler.request_async(
            key(16, 0),
            &placement,
            Box::new(move |result: LandmarkResult| {
                *ran_on_sink.borrow_mut() = Some((thread::current().id(), result));
            }),
        );
        assert!(ran_on.borrow().is_none());

        assert_eq!(scheduler.wait(handle), Some(Some(Landmark::LichTower)));
        assert_eq!(scheduler.run_pending(), 1);
        assert_eq!(*ran_on.borrow(), Some((owner, Some(Landmark::LichTower))));
        assert_eq!(scheduler.cache().get(&key(16, 0)), Some(Some(Landmark::LichTower)));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_in_flight_requests_are_coalesced() {
        let mut scheduler = LandmarkSearchScheduler::new(2).unwrap();
        let counting = CountingPlacement::held(Some(Landmark::HedgeMaze));
        let placement: Arc<dyn LandmarkPlacement> = counting.clone();
        let (results, callback) = recorder();

        let first = scheduler.request_async(key(1, 1), &placement, callback());
        let second = scheduler.request_async(key(1, 1), &placement, callback());

        assert!(matches!(first, SearchHandle::Spawned(_)));
        assert!(matches!(second, SearchHandle::Joined));
        assert!(results.borrow().is_empty());

        counting.release();
        assert_eq!(scheduler.settle(), 2);
        assert_eq!(
            *results.borrow(),
            vec![Some(Landmark::HedgeMaze), Some(Landmark::HedgeMaze)]
        );
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.stats().joined, 1);
    }

    #[test]
    fn test_pool_runs_at_most_workers_lookups() {
        let mut scheduler = LandmarkSearchScheduler::new(2).unwrap();
        let counting = CountingPlacement::held(Some(Landmark::YetiCave));
        let placement: Arc<dyn LandmarkPlacement> = counting.clone();
        let (results, callback) = recorder();

        for x in 0..5 {
            scheduler.request_async(key(x, 9), &placement, callback());
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while counting.calls.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(50));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);

        counting.release();
        assert_eq!(scheduler.settle(), 5);
        assert_eq!(results.borrow().len(), 5);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_settled_results_match_cache() {
        let mut scheduler = LandmarkSearchScheduler::new(2).unwrap();
        let placement: Arc<dyn LandmarkPlacement> = CountingPlacement::new(Some(Landmark::DarkTower));
        let (results, callback) = recorder();

        for x in 0..8 {
            scheduler.request_async(key(x, 0), &placement, callback());
            scheduler.request_async(key(x, 0), &placement, callback());
        }
        scheduler.settle();

        assert_eq!(results.borrow().len(), 16);
        for x in 0..8 {
            assert_eq!(scheduler.cache().get(&key(x, 0)), Some(Some(Landmark::DarkTower)));
        }
        // Everything resolved now comes straight from the cache.
        scheduler.request_async(key(3, 0), &placement, callback());
        assert_eq!(results.borrow().len(), 17);
    }

    #[test]
    fn test_fault_is_delivered_as_none() {
        let mut scheduler = LandmarkSearchScheduler::new(1).unwrap();
        let placement: Arc<dyn LandmarkPlacement> = Arc::new(FailingPlacement { panic: false });
        let (results, callback) = recorder();

        scheduler.request_async(key(2, 2), &placement, callback());
        scheduler.settle();

        assert_eq!(*results.borrow(), vec![None]);
        assert!(!scheduler.cache().contains(&key(2, 2)));
        assert_eq!(scheduler.stats().faults, 1);
    }

    #[test]
    fn test_panic_is_contained() {
        let mut scheduler = LandmarkSearchScheduler::new(1).unwrap();
        let placement: Arc<dyn LandmarkPlacement> = Arc::new(FailingPlacement { panic: true });
        let healthy: Arc<dyn LandmarkPlacement> = CountingPlacement::new(Some(Landmark::TrollCave));
        let (results, callback) = recorder();

        scheduler.request_async(key(5, 5), &placement, callback());
        scheduler.request_async(key(6, 6), &healthy, callback());
        scheduler.settle();

        let results = results.borrow();
        assert_eq!(results.len(), 2);
        assert!(results.contains(&None));
        assert!(results.contains(&Some(Landmark::TrollCave)));
    }
}
