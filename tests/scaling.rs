//! Scaling tests with synthetic 50k record logs.
//!
//! Measures the operations that grow with log size:
//! - Appending through the buffered store
//! - Reopening (replaying the store to rebuild the offset index)
//! - Random access by offset

use commitlog::{DurableLog, LogConfig, Offset, Record};
use std::time::Instant;
use tempfile::TempDir;

const RECORD_COUNT: usize = 50_000;

fn test_config(dir: &TempDir) -> LogConfig {
    LogConfig::new(dir.path().join("commitlog.store"))
}

/// Timing helper
struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn report(&self) {
        println!("  {} took {:.2}ms", self.name, self.elapsed_ms());
    }

    fn report_with_count(&self, count: usize) {
        let ms = self.elapsed_ms();
        println!(
            "  {} took {:.2}ms ({} items, {:.0} items/sec)",
            self.name,
            ms,
            count,
            if ms > 0.0 { count as f64 / (ms / 1000.0) } else { 0.0 }
        );
    }
}

#[test]
fn test_scaling_50k_records() {
    println!("\n=== 50k Records ===");

    let dir = TempDir::new().unwrap();
    let log = DurableLog::open(test_config(&dir)).unwrap();

    let timer = Timer::new("Append 50k records");
    for i in 0..RECORD_COUNT {
        let value = serde_json::to_vec(&serde_json::json!({
            "index": i,
            "data": format!("Record data for item {}", i),
        }))
        .unwrap();
        let offset = log.append(Record::new(value)).unwrap();
        assert_eq!(offset, Offset(i as u64));
    }
    timer.report_with_count(RECORD_COUNT);

    let timer = Timer::new("Sync to disk");
    log.sync().unwrap();
    timer.report();

    let size = log.store().size();
    println!("  Store size: {} bytes", size);
    log.close().unwrap();
    drop(log);

    let timer = Timer::new("Reopen log (replay store)");
    let log = DurableLog::open(test_config(&dir)).unwrap();
    timer.report();
    assert_eq!(log.len(), RECORD_COUNT);
    assert_eq!(log.store().size(), size);

    let timer = Timer::new("Random access 1000 records");
    for i in (0..RECORD_COUNT).step_by(50) {
        let record = log.read(Offset(i as u64)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&record.value).unwrap();
        assert_eq!(value["index"], i);
    }
    timer.report_with_count(RECORD_COUNT / 50);
}
