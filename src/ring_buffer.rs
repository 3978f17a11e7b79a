//! Lock-free bounded MPMC ring buffer and its background drain worker
//!
//! A classic Vyukov-style bounded queue: a flat array of slots, each guarded
//! by its own sequence number rather than a per-slot lock. Producers and
//! consumers each advance a single shared atomic cursor and spin only on the
//! slot they landed on, so contention is between at most two threads at a
//! time rather than the whole queue. The slot array itself lives behind an
//! [`ArcSwap`], so reading it on the push/pop hot path is a single atomic
//! load, never a mutex acquisition; a `Mutex` only serializes the rare
//! `expand()` call that grows capacity under [`OverflowPolicy::Expand`].
//!
//! This sits alongside the simpler `crossbeam_channel::bounded` path already
//! used by `sink.rs` for everyday async sinks; it is the explicit opt-in mode
//! for sinks that need the overflow policies below (`Block`/`Expand` in
//! particular aren't expressible with a plain bounded channel).

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex};

struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

unsafe impl<T: Send> Sync for Slot<T> {}

/// What happens when a producer meets a full buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    DropOldest,
    DropNewest,
    Block,
    Expand,
}

/// A bounded, power-of-two-capacity MPMC queue.
pub struct RingBuffer<T> {
    buffer: ArcSwap<Vec<Slot<T>>>,
    head: AtomicUsize,
    tail: AtomicUsize,
    capacity_hard_cap: usize,
    overflow_policy: OverflowPolicy,
    not_full: Condvar,
    not_full_lock: Mutex<()>,
    dropped: AtomicU64,
    /// Set only while `expand()` is migrating slots; push/pop spin on this
    /// atomic rather than blocking on a lock.
    resizing: AtomicBool,
    /// Serializes concurrent `expand()` callers; never touched by push/pop.
    expand_lock: Mutex<()>,
}

fn new_slots<T>(capacity: usize) -> Vec<Slot<T>> {
    (0..capacity)
        .map(|i| Slot {
            sequence: AtomicUsize::new(i),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        })
        .collect()
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize, overflow_policy: OverflowPolicy, hard_cap: usize) -> Self {
        let capacity = capacity.next_power_of_two().max(2);
        Self {
            buffer: ArcSwap::new(Arc::new(new_slots(capacity))),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            capacity_hard_cap: hard_cap.next_power_of_two().max(capacity),
            overflow_policy,
            not_full: Condvar::new(),
            not_full_lock: Mutex::new(()),
            dropped: AtomicU64::new(0),
            resizing: AtomicBool::new(false),
            expand_lock: Mutex::new(()),
        }
    }

    fn try_push_once(&self, value: T) -> Result<(), T> {
        while self.resizing.load(Ordering::Acquire) {
            std::hint::spin_loop();
        }
        let buffer = self.buffer.load();
        let mask = buffer.len() - 1;

        loop {
            let pos = self.head.load(Ordering::Relaxed);
            let slot = &buffer[pos & mask];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq as isize - pos as isize;

            if diff == 0 {
                if self
                    .head
                    .compare_exchange_weak(pos, pos + 1, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
                {
                    unsafe {
                        (*slot.value.get()).write(value);
                    }
                    slot.sequence.store(pos + 1, Ordering::Release);
                    return Ok(());
                }
            } else if diff < 0 {
                return Err(value);
            } else {
                std::hint::spin_loop();
            }
        }
    }

    fn try_pop_once(&self) -> Option<T> {
        while self.resizing.load(Ordering::Acquire) {
            std::hint::spin_loop();
        }
        let buffer = self.buffer.load();
        let mask = buffer.len() - 1;

        loop {
            let pos = self.tail.load(Ordering::Relaxed);
            let slot = &buffer[pos & mask];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq as isize - (pos as isize + 1);

            if diff == 0 {
                if self
                    .tail
                    .compare_exchange_weak(pos, pos + 1, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
                {
                    let value = unsafe { (*slot.value.get()).assume_init_read() };
                    slot.sequence.store(pos + mask + 1, Ordering::Release);
                    return Some(value);
                }
            } else if diff < 0 {
                return None;
            } else {
                std::hint::spin_loop();
            }
        }
    }

    /// Grows the slot array, migrating already-committed entries across.
    /// Guarded by `expand_lock` so only one expansion runs at a time; the
    /// `resizing` flag pauses push/pop (a spin on an atomic, not a lock
    /// acquisition) for the short migration window so `head`/`tail` stay put
    /// while slots move.
    fn expand(&self) {
        let _serialize = self.expand_lock.lock();
        let old = self.buffer.load_full();
        let old_capacity = old.len();
        let new_capacity = (old_capacity * 2).min(self.capacity_hard_cap);
        if new_capacity <= old_capacity {
            return;
        }

        self.resizing.store(true, Ordering::Release);

        let mut new_slots = new_slots::<T>(new_capacity);
        let old_mask = old_capacity - 1;
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);

        for pos in tail..head {
            let old_slot = &old[pos & old_mask];
            let seq = old_slot.sequence.load(Ordering::Acquire);
            if seq == pos + 1 {
                let value = unsafe { (*old_slot.value.get()).assume_init_read() };
                let new_slot = &mut new_slots[pos & (new_capacity - 1)];
                new_slot.value = UnsafeCell::new(MaybeUninit::new(value));
                new_slot.sequence = AtomicUsize::new(pos + 1);
            }
        }

        self.buffer.store(Arc::new(new_slots));
        self.resizing.store(false, Ordering::Release);
    }

    /// Pushes a value, applying the configured [`OverflowPolicy`] on a full
    /// buffer. Returns `true` if the value was retained.
    pub fn push(&self, value: T) -> bool {
        match self.try_push_once(value) {
            Ok(()) => true,
            Err(value) => match self.overflow_policy {
                OverflowPolicy::DropNewest => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    false
                }
                OverflowPolicy::DropOldest => {
                    self.try_pop_once();
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    self.try_push_once(value).is_ok()
                }
                OverflowPolicy::Expand => {
                    if self.buffer.load().len() < self.capacity_hard_cap {
                        self.expand();
                        self.try_push_once(value).is_ok()
                    } else {
                        self.try_pop_once();
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        self.try_push_once(value).is_ok()
                    }
                }
                OverflowPolicy::Block => {
                    let mut value = value;
                    loop {
                        let guard = self.not_full_lock.lock();
                        match self.try_push_once(value) {
                            Ok(()) => return true,
                            Err(v) => {
                                value = v;
                                let mut guard = guard;
                                self.not_full.wait_for(&mut guard, Duration::from_millis(10));
                            }
                        }
                    }
                }
            },
        }
    }

    pub fn pop(&self) -> Option<T> {
        let value = self.try_pop_once();
        if value.is_some() {
            let _guard = self.not_full_lock.lock();
            self.not_full.notify_one();
        }
        value
    }

    pub fn pop_batch(&self, max: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(max);
        while out.len() < max {
            match self.pop() {
                Some(v) => out.push(v),
                None => break,
            }
        }
        out
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        head.saturating_sub(tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Background worker stats.
#[derive(Default)]
pub struct WorkerStats {
    pub records_queued: AtomicU64,
    pub records_written: AtomicU64,
    pub records_dropped: AtomicU64,
    pub flush_count: AtomicU64,
    pub total_latency_ns: AtomicU64,
    pub max_latency_ns: AtomicU64,
    pub buffer_high_watermark: AtomicU64,
}

/// Drains a [`RingBuffer`] on a dedicated background thread, calling a sink
/// function for each item in batches.
pub struct AsyncWorker {
    stop_flag: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
    pub stats: Arc<WorkerStats>,
}

impl AsyncWorker {
    pub fn start<T, F>(
        buffer: Arc<RingBuffer<T>>,
        batch_size: usize,
        flush_interval_ms: u64,
        mut sink_fn: F,
    ) -> Self
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::default());

        let thread_stop = stop_flag.clone();
        let thread_stats = stats.clone();

        let handle = std::thread::spawn(move || {
            let flush_interval = Duration::from_millis(flush_interval_ms.max(1));
            loop {
                let start = Instant::now();
                let batch = buffer.pop_batch(batch_size);

                let watermark = buffer.len() as u64;
                let current = thread_stats.buffer_high_watermark.load(Ordering::Relaxed);
                if watermark > current {
                    thread_stats
                        .buffer_high_watermark
                        .store(watermark, Ordering::Relaxed);
                }

                if batch.is_empty() {
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }
                    std::thread::sleep(flush_interval.min(Duration::from_millis(10)));
                    continue;
                }

                for item in batch {
                    sink_fn(item);
                    thread_stats.records_written.fetch_add(1, Ordering::Relaxed);
                }

                let elapsed = start.elapsed().as_nanos() as u64;
                thread_stats
                    .total_latency_ns
                    .fetch_add(elapsed, Ordering::Relaxed);
                let max = thread_stats.max_latency_ns.load(Ordering::Relaxed);
                if elapsed > max {
                    thread_stats.max_latency_ns.store(elapsed, Ordering::Relaxed);
                }
                thread_stats.flush_count.fetch_add(1, Ordering::Relaxed);

                if thread_stop.load(Ordering::Acquire) && buffer.is_empty() {
                    break;
                }
            }
        });

        Self {
            stop_flag,
            handle: Some(handle),
            stats,
        }
    }

    /// Signals the worker to drain remaining items and stop, joining within
    /// `deadline`.
    pub fn stop(mut self, deadline: Duration) {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let (tx, rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let _ = handle.join();
                let _ = tx.send(());
            });
            let _ = rx.recv_timeout(deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    #[test]
    fn test_push_pop_fifo_order() {
        let buffer: RingBuffer<u32> = RingBuffer::new(8, OverflowPolicy::DropNewest, 8);
        for i in 0..5 {
            assert!(buffer.push(i));
        }
        let popped: Vec<u32> = (0..5).filter_map(|_| buffer.pop()).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_drop_newest_on_full() {
        let buffer: RingBuffer<u32> = RingBuffer::new(2, OverflowPolicy::DropNewest, 2);
        assert!(buffer.push(1));
        assert!(buffer.push(2));
        assert!(!buffer.push(3));
        assert_eq!(buffer.dropped(), 1);
    }

    #[test]
    fn test_drop_oldest_on_full() {
        let buffer: RingBuffer<u32> = RingBuffer::new(2, OverflowPolicy::DropOldest, 2);
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        assert_eq!(buffer.pop(), Some(2));
        assert_eq!(buffer.pop(), Some(3));
    }

    #[test]
    fn test_expand_grows_capacity() {
        let buffer: RingBuffer<u32> = RingBuffer::new(2, OverflowPolicy::Expand, 8);
        for i in 0..6 {
            buffer.push(i);
        }
        let popped: Vec<u32> = (0..6).filter_map(|_| buffer.pop()).collect();
        assert_eq!(popped.len(), 6);
    }

    #[test]
    fn test_concurrent_producers_consumers() {
        let buffer: Arc<RingBuffer<u32>> = Arc::new(RingBuffer::new(64, OverflowPolicy::Block, 64));
        let consumed = Arc::new(StdAtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let buffer = buffer.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100u32 {
                    buffer.push(i);
                }
            }));
        }

        let buffer_c = buffer.clone();
        let consumed_c = consumed.clone();
        let consumer = std::thread::spawn(move || {
            let mut count = 0;
            while count < 400 {
                if buffer_c.pop().is_some() {
                    count += 1;
                    consumed_c.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        for h in handles {
            h.join().unwrap();
        }
        consumer.join().unwrap();

        assert_eq!(consumed.load(Ordering::Relaxed), 400);
    }
}
