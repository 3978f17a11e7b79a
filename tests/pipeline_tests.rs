// Integration tests for the sampling/redaction/rules/scheduler pipeline

use logly::compression::{compress, decompress, CompressionLevel};
use logly::prelude::*;
use logly::ring_buffer::{OverflowPolicy, RingBuffer};
use logly::rules::{AttachmentCategory, LevelMatch, Rule, RuleAttachment};
use logly::scheduler::{Schedule, ScheduledTask, TaskType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_sampler_probability_gate_via_logger_config() {
    let logger = Logger::new();
    let mut config = LoggerConfig::default();
    config.sampler = logly::config::SamplerConfig::Probability(0.0);
    logger.configure(config);
    logger.add_sink(SinkConfig::default()).unwrap();

    // A probability of 0 means every record is dropped by the sampler gate,
    // but the call itself must still report success.
    assert!(logger.info("dropped by sampler".to_string()).is_ok());
}

#[test]
fn test_rate_limiter_rejects_past_burst() {
    let logger = Logger::new();
    let mut config = LoggerConfig::default();
    config.rate_limiter_enabled = true;
    config.rate_limiter.max_per_second = 1.0;
    config.rate_limiter.burst_size = 1.0;
    logger.configure(config);
    logger.add_sink(SinkConfig::default()).unwrap();

    for _ in 0..20 {
        logger.info("bursty".to_string()).unwrap();
    }

    let snapshot = logger.metrics_snapshot();
    assert!(snapshot.dropped_records > 0);
}

#[test]
fn test_redactor_masks_message_pattern() {
    let logger = Logger::new();
    let mut config = LoggerConfig::default();
    config.redactor.enabled = true;
    logger.configure(config);
    logger.add_sink(SinkConfig::default()).unwrap();

    assert!(logger
        .info("user email is test@example.com".to_string())
        .is_ok());
}

#[test]
fn test_rules_engine_attaches_once() {
    let logger = Logger::new();
    let mut config = LoggerConfig::default();
    config.rules_enabled = true;
    logger.configure(config);
    logger.add_sink(SinkConfig::default()).unwrap();

    let rule = Rule::new(0, LevelMatch::PriorityMin(Level::Error.priority()))
        .with_once(true)
        .with_attachment(RuleAttachment {
            category: AttachmentCategory::Security,
            message: "escalate to on-call".to_string(),
            title: None,
            url: None,
            color: None,
            prefix: None,
            background: None,
        });
    logger.rules().add(rule).unwrap();

    logger.error("first failure".to_string()).unwrap();
    logger.error("second failure".to_string()).unwrap();

    assert_eq!(
        logger.rules().stats.messages_emitted.load(Ordering::Relaxed),
        1
    );
}

#[test]
fn test_compression_round_trip() {
    let data = b"the quick brown fox jumps over the lazy dog ".repeat(64);
    let container = compress(&data, CompressionLevel::Default);
    let restored = decompress(&container).unwrap();
    assert_eq!(restored, data);
}

#[test]
fn test_ring_buffer_overflow_policy_drops_newest() {
    let buf: RingBuffer<u32> = RingBuffer::new(4, OverflowPolicy::DropNewest, 4);
    for i in 0..4 {
        assert!(buf.push(i));
    }
    assert!(!buf.push(99));
    assert_eq!(buf.len(), 4);
}

#[test]
fn test_scheduler_runs_once_task() {
    let scheduler = logly::scheduler::Scheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let task = ScheduledTask::new(
        "warmup",
        TaskType::Custom("warmup".to_string()),
        Schedule::Once(0),
        Arc::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );
    scheduler.register(task);
    scheduler.start();

    std::thread::sleep(std::time::Duration::from_millis(1200));
    scheduler.stop();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rotation_compression_on_rollover() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("compressed.log");

    let logger = Logger::new();
    let config = SinkConfig {
        path: Some(log_path.clone()),
        size_limit: Some(512),
        compression: logly::sink::CompressionConfig {
            enabled: true,
            level: CompressionLevel::Fast,
            async_compress: false,
        },
        ..Default::default()
    };
    logger.add_sink(config).unwrap();

    for i in 0..200 {
        logger
            .info(format!("rolling over compressed sink message {}", i))
            .unwrap();
    }

    std::thread::sleep(std::time::Duration::from_millis(200));
    assert!(log_path.exists());
}
