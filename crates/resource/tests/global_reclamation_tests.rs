//! Tests that drain the process-wide registry; kept in their own binary and
//! serialised so no other test's wrappers are reclaimed underneath it.

use reclaim_resource::{FileWriter, LiveCounter, Population, StreamLogger};
use reclaim_utils::cleanup::{init_reclamation_handler, reclaim_all_resources, ReclamationRegistry};
use serial_test::serial;
use std::fs;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

#[test]
#[serial]
fn test_forgotten_writer_is_reclaimed() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("forgotten.txt");

    let writer = FileWriter::create(&path).unwrap();
    writer.write("left open").unwrap();
    assert!(writer.disposable().fallback_armed());

    assert!(reclaim_all_resources() >= 1);
    assert!(writer.is_released());
    assert!(writer.write("again").unwrap_err().is_use_after_release());

    // Owner arriving late is a no-op
    assert!(!writer.release());
    assert_eq!(fs::read_to_string(&path).unwrap(), "left open");
}

#[test]
#[serial]
fn test_reclaimed_logger_drops_buffer() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reclaimed.log");

    let logger = StreamLogger::open(&path).unwrap();
    logger.log("never flushed").unwrap();

    reclaim_all_resources();
    assert!(logger.is_released());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
#[serial]
fn test_released_wrappers_leave_registry() {
    let registry = ReclamationRegistry::global();
    reclaim_all_resources();
    assert_eq!(registry.pending(), 0);

    let temp_dir = TempDir::new().unwrap();
    let writer = FileWriter::create(temp_dir.path().join("a.txt")).unwrap();
    let logger = StreamLogger::open(temp_dir.path().join("b.log")).unwrap();
    assert_eq!(registry.pending(), 2);

    writer.release();
    assert_eq!(registry.pending(), 1);
    drop(logger);
    assert_eq!(registry.pending(), 0);
}

#[test]
#[serial]
fn test_global_counter_population() {
    reclaim_all_resources();
    let counter = LiveCounter::global();
    let before = counter.live();

    let temp_dir = TempDir::new().unwrap();
    let mut population = Population::with_counter(Arc::clone(&counter), 10);
    for i in 0..3 {
        let logger = reclaim_resource::LogStream::open(&temp_dir.path().join(format!("{i}.log")))
            .unwrap();
        population.admit(logger);
    }
    assert_eq!(counter.live(), before + 3);

    assert_eq!(reclaim_all_resources(), 3);
    assert_eq!(counter.live(), before);
    assert_eq!(population.release_all(), 0);
}

#[test]
#[serial]
fn test_panic_inside_use_does_not_hang() {
    init_reclamation_handler();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("panicking.txt");
    let writer = Arc::new(FileWriter::create(&path).unwrap());
    writer.write("before").unwrap();

    let (tx, rx) = mpsc::channel();
    {
        let writer = Arc::clone(&writer);
        thread::spawn(move || {
            let joined = thread::spawn(move || {
                writer
                    .disposable()
                    .use_resource::<(), _>(|_| panic!("boom in use"))
            })
            .join();
            let _ = tx.send(joined.is_err());
        });
    }

    assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());

    // The slot was unlocked by unwinding and the writer is still its owner's
    assert!(!writer.is_released());
    writer.write(" after").unwrap();
    assert!(writer.release());
    assert_eq!(fs::read_to_string(&path).unwrap(), "before after");
}

#[test]
#[serial]
fn test_unrelated_panic_keeps_writer_live() {
    init_reclamation_handler();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("live.txt");
    let writer = FileWriter::create(&path).unwrap();
    writer.write("a").unwrap();

    assert!(thread::spawn(|| panic!("unrelated")).join().is_err());

    assert!(writer.disposable().fallback_armed());
    writer.write("b").unwrap();
    writer.release();
    assert_eq!(fs::read_to_string(&path).unwrap(), "ab");
}
