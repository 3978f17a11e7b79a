//! Work-stealing thread pool for scheduler and rotation housekeeping
//!
//! Separate from `rayon`, which the teacher already uses for parallel log
//! callbacks and per-sink fan-out: this pool exists because the scheduler
//! needs a bespoke submit/priority/steal API (and a `shutdown()` with a
//! drain flag) that rayon's global pool does not expose. One `Worker` deque
//! per thread, a shared `Injector` for overflow, and round-robin stealing
//! between workers before falling back to the injector.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use parking_lot::{Condvar, Mutex};

/// Submission priority. `Critical` jobs are drained from the injector ahead
/// of `Normal`/`Low` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

type Job = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub struct ThreadPoolStats {
    pub tasks_submitted: AtomicUsize,
    pub tasks_completed: AtomicUsize,
    pub tasks_dropped: AtomicUsize,
    pub tasks_stolen: AtomicUsize,
    pub total_wait_time_ns: std::sync::atomic::AtomicU64,
    pub total_exec_time_ns: std::sync::atomic::AtomicU64,
    pub active_threads: AtomicUsize,
}

struct Shared {
    critical: Injector<Job>,
    normal: Injector<Job>,
    stealers: Mutex<Vec<Stealer<Job>>>,
    shutdown: AtomicBool,
    pending: AtomicUsize,
    wake: Condvar,
    wake_lock: Mutex<()>,
    all_done: Condvar,
    stats: Arc<ThreadPoolStats>,
}

/// A bounded-submission work-stealing pool.
pub struct ThreadPool {
    shared: Arc<Shared>,
    handles: Vec<std::thread::JoinHandle<()>>,
    max_queue: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize, max_queue: usize) -> Self {
        let shared = Arc::new(Shared {
            critical: Injector::new(),
            normal: Injector::new(),
            stealers: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
            wake: Condvar::new(),
            wake_lock: Mutex::new(()),
            all_done: Condvar::new(),
            stats: Arc::new(ThreadPoolStats::default()),
        });

        let mut workers = Vec::with_capacity(num_threads.max(1));
        for _ in 0..num_threads.max(1) {
            let worker = Worker::new_lifo();
            shared.stealers.lock().push(worker.stealer());
            workers.push(worker);
        }

        let mut handles = Vec::with_capacity(workers.len());
        for worker in workers {
            let shared = shared.clone();
            handles.push(std::thread::spawn(move || {
                shared.stats.active_threads.fetch_add(1, Ordering::Relaxed);
                run_worker(worker, shared.clone());
                shared.stats.active_threads.fetch_sub(1, Ordering::Relaxed);
            }));
        }

        Self {
            shared,
            handles,
            max_queue: max_queue.max(1),
        }
    }

    pub fn stats(&self) -> &ThreadPoolStats {
        &self.shared.stats
    }

    /// Submits a job, blocking conceptually never (callers needing back
    /// pressure should use [`try_submit`]).
    pub fn submit<F: FnOnce() + Send + 'static>(&self, priority: Priority, job: F) {
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        self.shared.stats.tasks_submitted.fetch_add(1, Ordering::Relaxed);
        let boxed: Job = Box::new(job);
        if priority >= Priority::High {
            self.shared.critical.push(boxed);
        } else {
            self.shared.normal.push(boxed);
        }
        let _guard = self.shared.wake_lock.lock();
        self.shared.wake.notify_one();
    }

    pub fn submit_batch<F: FnOnce() + Send + 'static>(&self, priority: Priority, jobs: Vec<F>) {
        for job in jobs {
            self.submit(priority, job);
        }
    }

    /// Non-blocking submit: returns `false` and increments `tasks_dropped`
    /// if the injector already holds `max_queue` or more pending jobs.
    pub fn try_submit<F: FnOnce() + Send + 'static>(&self, priority: Priority, job: F) -> bool {
        if self.shared.pending.load(Ordering::SeqCst) >= self.max_queue {
            self.shared.stats.tasks_dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.submit(priority, job);
        true
    }

    /// Blocks until every submitted job so far has completed.
    pub fn wait_all(&self) {
        let guard = self.shared.wake_lock.lock();
        let mut guard = guard;
        while self.shared.pending.load(Ordering::SeqCst) > 0 {
            self.shared.all_done.wait_for(&mut guard, Duration::from_millis(50));
        }
    }

    pub fn shutdown(mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        {
            let _guard = self.shared.wake_lock.lock();
            self.shared.wake.notify_all();
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn find_job(local: &Worker<Job>, shared: &Shared) -> Option<Job> {
    if let Some(job) = local.pop() {
        return Some(job);
    }

    loop {
        match shared.critical.steal() {
            Steal::Success(job) => return Some(job),
            Steal::Retry => continue,
            Steal::Empty => break,
        }
    }

    loop {
        match shared.normal.steal_batch_and_pop(local) {
            Steal::Success(job) => return Some(job),
            Steal::Retry => continue,
            Steal::Empty => break,
        }
    }

    let stealers = shared.stealers.lock();
    for stealer in stealers.iter() {
        loop {
            match stealer.steal() {
                Steal::Success(job) => {
                    shared.stats.tasks_stolen.fetch_add(1, Ordering::Relaxed);
                    return Some(job);
                }
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }
    }

    None
}

fn run_worker(local: Worker<Job>, shared: Arc<Shared>) {
    loop {
        match find_job(&local, &shared) {
            Some(job) => {
                let start = Instant::now();
                job();
                shared
                    .stats
                    .total_exec_time_ns
                    .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
                shared.stats.tasks_completed.fetch_add(1, Ordering::Relaxed);

                if shared.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                    let _guard = shared.wake_lock.lock();
                    shared.all_done.notify_all();
                }
            }
            None => {
                if shared.shutdown.load(Ordering::Acquire) {
                    break;
                }
                let wait_start = Instant::now();
                let guard = shared.wake_lock.lock();
                let mut guard = guard;
                shared.wake.wait_for(&mut guard, Duration::from_millis(50));
                shared
                    .stats
                    .total_wait_time_ns
                    .fetch_add(wait_start.elapsed().as_nanos() as u64, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    #[test]
    fn test_submit_and_wait_all() {
        let pool = ThreadPool::new(4, 1024);
        let counter = Arc::new(StdAtomicUsize::new(0));

        for _ in 0..50 {
            let counter = counter.clone();
            pool.submit(Priority::Normal, move || {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }

        pool.wait_all();
        assert_eq!(counter.load(Ordering::Relaxed), 50);
        assert_eq!(pool.stats().tasks_completed.load(Ordering::Relaxed), 50);
        pool.shutdown();
    }

    #[test]
    fn test_try_submit_drops_past_max_queue() {
        let pool = ThreadPool::new(1, 2);
        let ok1 = pool.try_submit(Priority::Normal, || std::thread::sleep(Duration::from_millis(50)));
        let ok2 = pool.try_submit(Priority::Normal, || std::thread::sleep(Duration::from_millis(50)));
        let ok3 = pool.try_submit(Priority::Normal, || {});

        assert!(ok1);
        assert!(ok2);
        assert!(!ok3);
        assert_eq!(pool.stats().tasks_dropped.load(Ordering::Relaxed), 1);
        pool.wait_all();
        pool.shutdown();
    }
}
