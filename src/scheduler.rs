//! Background task scheduling (rotation checks, compression, cleanup)
//!
//! A small cron-capable scheduler for the logger's own housekeeping: the
//! field count needed (minute/hour/day-of-month/month/day-of-week) is small
//! enough that a hand-rolled matcher beats pulling in a cron crate nobody
//! else in this dependency set uses. Task bodies themselves run on the
//! `ThreadPool` from `thread_pool.rs`; this module only owns timing,
//! retries and the `depends_on` gate.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// What kind of work a scheduled task performs; purely descriptive, the
/// actual closure lives in [`Scheduler::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskType {
    Rotation,
    Compression,
    Cleanup,
    Custom(String),
}

/// A 5-field cron specification (minute, hour, day-of-month, month,
/// day-of-week), each `None` meaning "any".
#[derive(Debug, Clone, Default)]
pub struct CronFields {
    pub minute: Option<u8>,
    pub hour: Option<u8>,
    pub day_of_month: Option<u8>,
    pub month: Option<u8>,
    pub day_of_week: Option<u8>,
}

impl CronFields {
    fn matches(&self, dt: &chrono::DateTime<chrono::Utc>) -> bool {
        use chrono::{Datelike, Timelike};
        self.minute.is_none_or(|m| dt.minute() as u8 == m)
            && self.hour.is_none_or(|h| dt.hour() as u8 == h)
            && self.day_of_month.is_none_or(|d| dt.day() as u8 == d)
            && self.month.is_none_or(|mo| dt.month() as u8 == mo)
            && self
                .day_of_week
                .is_none_or(|dow| dt.weekday().num_days_from_sunday() as u8 == dow)
    }
}

/// When a task becomes due again.
#[derive(Debug, Clone)]
pub enum Schedule {
    Once(u64),
    Interval(u64),
    Daily { hh: u8, mm: u8 },
    Weekly { dow: u8, hh: u8, mm: u8 },
    Cron(CronFields),
}

/// Retry behaviour for a task whose run returns an error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub interval_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

/// A task tracked by the scheduler.
pub struct ScheduledTask {
    pub name: String,
    pub task_type: TaskType,
    pub schedule: Schedule,
    pub priority: i32,
    pub retry_policy: RetryPolicy,
    pub depends_on: Option<String>,
    pub enabled: bool,
    pub last_run_ns: Option<i64>,
    pub next_run_ns: i64,
    pub run_count: u64,
    pub error_count: u64,
    current_retry: u32,
    action: Arc<dyn Fn() -> Result<(), String> + Send + Sync>,
}

impl ScheduledTask {
    pub fn new(
        name: impl Into<String>,
        task_type: TaskType,
        schedule: Schedule,
        action: Arc<dyn Fn() -> Result<(), String> + Send + Sync>,
    ) -> Self {
        let name = name.into();
        let next_run_ns = Self::compute_next_run(&schedule, chrono::Utc::now());
        Self {
            name,
            task_type,
            schedule,
            priority: 0,
            retry_policy: RetryPolicy::default(),
            depends_on: None,
            enabled: true,
            last_run_ns: None,
            next_run_ns,
            run_count: 0,
            error_count: 0,
            current_retry: 0,
            action,
        }
    }

    fn compute_next_run(schedule: &Schedule, now: chrono::DateTime<chrono::Utc>) -> i64 {
        let now_ns = now.timestamp_nanos_opt().unwrap_or_default();
        match schedule {
            Schedule::Once(delay_ms) => now_ns + *delay_ms as i64 * 1_000_000,
            Schedule::Interval(ms) => now_ns + *ms as i64 * 1_000_000,
            Schedule::Daily { hh, mm } => {
                let mut next = now
                    .date_naive()
                    .and_hms_opt(*hh as u32, *mm as u32, 0)
                    .unwrap()
                    .and_utc();
                if next <= now {
                    next += chrono::Duration::days(1);
                }
                next.timestamp_nanos_opt().unwrap_or(now_ns)
            }
            Schedule::Weekly { dow, hh, mm } => {
                use chrono::Datelike;
                let mut next = now
                    .date_naive()
                    .and_hms_opt(*hh as u32, *mm as u32, 0)
                    .unwrap()
                    .and_utc();
                let current_dow = now.weekday().num_days_from_sunday() as u8;
                let mut days_ahead = (*dow as i64 - current_dow as i64).rem_euclid(7);
                if days_ahead == 0 && next <= now {
                    days_ahead = 7;
                }
                next += chrono::Duration::days(days_ahead);
                next.timestamp_nanos_opt().unwrap_or(now_ns)
            }
            Schedule::Cron(_) => now_ns + 60_000_000_000, // re-checked minute by minute
        }
    }

    fn is_due(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        if let Schedule::Cron(fields) = &self.schedule {
            return fields.matches(&now);
        }
        now.timestamp_nanos_opt().unwrap_or(0) >= self.next_run_ns
    }

    fn reschedule(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.next_run_ns = Self::compute_next_run(&self.schedule, now);
    }
}

/// Background task runner with retry/backoff and `depends_on` ordering.
pub struct Scheduler {
    tasks: Mutex<Vec<ScheduledTask>>,
    in_flight: Mutex<HashSet<String>>,
    running: std::sync::atomic::AtomicBool,
    wake: Condvar,
    wake_lock: Mutex<()>,
    tasks_run: AtomicU64,
    tasks_failed: AtomicU64,
    handle: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
            running: std::sync::atomic::AtomicBool::new(false),
            wake: Condvar::new(),
            wake_lock: Mutex::new(()),
            tasks_run: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            handle: Mutex::new(None),
        })
    }

    pub fn register(&self, task: ScheduledTask) {
        self.tasks.lock().push(task);
        let _guard = self.wake_lock.lock();
        self.wake.notify_all();
    }

    pub fn remove(&self, name: &str) -> bool {
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|t| t.name != name);
        tasks.len() != before
    }

    /// Starts the background polling thread. Tick resolution is one second.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }

        let scheduler = self.clone();
        let handle = std::thread::spawn(move || {
            while scheduler.running.load(Ordering::Acquire) {
                scheduler.tick();
                let guard = scheduler.wake_lock.lock();
                let mut guard = guard;
                scheduler.wake.wait_for(&mut guard, Duration::from_secs(1));
            }
        });

        *self.handle.lock() = Some(handle);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        let _guard = self.wake_lock.lock();
        self.wake.notify_all();
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }

    fn tick(&self) {
        let now = chrono::Utc::now();
        let mut tasks = self.tasks.lock();
        let snapshot: Vec<(String, Option<String>, i64)> = tasks
            .iter()
            .map(|t| (t.name.clone(), t.depends_on.clone(), t.last_run_ns.unwrap_or(0)))
            .collect();

        for task in tasks.iter_mut() {
            if !task.enabled || !task.is_due(now) {
                continue;
            }

            if let Some(dep) = &task.depends_on {
                let dep_last_run = snapshot
                    .iter()
                    .find(|(name, _, _)| name == dep)
                    .map(|(_, _, last_run)| *last_run)
                    .unwrap_or(0);
                let this_last_run = task.last_run_ns.unwrap_or(0);
                if dep_last_run <= this_last_run {
                    continue;
                }
            }

            {
                let mut in_flight = self.in_flight.lock();
                if in_flight.contains(&task.name) {
                    continue;
                }
                in_flight.insert(task.name.clone());
            }

            let result = (task.action)();
            self.in_flight.lock().remove(&task.name);

            task.last_run_ns = Some(now.timestamp_nanos_opt().unwrap_or(0));
            task.run_count += 1;
            self.tasks_run.fetch_add(1, Ordering::Relaxed);

            match result {
                Ok(()) => {
                    task.current_retry = 0;
                    if matches!(task.schedule, Schedule::Once(_)) {
                        task.enabled = false;
                    } else {
                        task.reschedule(now);
                    }
                }
                Err(_) => {
                    task.error_count += 1;
                    self.tasks_failed.fetch_add(1, Ordering::Relaxed);
                    if task.current_retry < task.retry_policy.max_retries {
                        task.current_retry += 1;
                        let backoff = (task.retry_policy.interval_ms as f64
                            * task
                                .retry_policy
                                .backoff_multiplier
                                .powi(task.current_retry as i32 - 1))
                            as i64;
                        task.next_run_ns = now.timestamp_nanos_opt().unwrap_or(0) + backoff * 1_000_000;
                    } else {
                        task.current_retry = 0;
                        task.reschedule(now);
                    }
                }
            }
        }
    }

    pub fn tasks_run(&self) -> u64 {
        self.tasks_run.load(Ordering::Relaxed)
    }

    pub fn tasks_failed(&self) -> u64 {
        self.tasks_failed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cron_fields_match_minute_wildcard() {
        let fields = CronFields {
            minute: None,
            hour: Some(12),
            ..Default::default()
        };
        let noon = chrono::Utc::now()
            .date_naive()
            .and_hms_opt(12, 30, 0)
            .unwrap()
            .and_utc();
        assert!(fields.matches(&noon));
    }

    #[test]
    fn test_once_task_runs_and_does_not_repeat_immediately() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let task = ScheduledTask::new(
            "warmup",
            TaskType::Custom("test".to_string()),
            Schedule::Once(0),
            Arc::new(move || {
                counter_clone.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
        );
        scheduler.register(task);
        scheduler.tick();
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_dependent_task_waits_for_dependency() {
        let scheduler = Scheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let order_a = order.clone();
        let task_a = ScheduledTask::new(
            "a",
            TaskType::Custom("a".to_string()),
            Schedule::Once(0),
            Arc::new(move || {
                order_a.lock().push("a");
                Ok(())
            }),
        );

        let order_b = order.clone();
        let mut task_b = ScheduledTask::new(
            "b",
            TaskType::Custom("b".to_string()),
            Schedule::Once(0),
            Arc::new(move || {
                order_b.lock().push("b");
                Ok(())
            }),
        );
        task_b.depends_on = Some("a".to_string());

        scheduler.register(task_b);
        scheduler.register(task_a);

        scheduler.tick();
        assert_eq!(*order.lock(), vec!["a"]);
        scheduler.tick();
        assert!(order.lock().contains(&"b"));
    }
}
