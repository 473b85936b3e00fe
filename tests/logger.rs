// End-to-end tests for the write pipeline: gating, ordering, durability,
// the byte-sink adapter, and structured mode.

use acacia::{log_fields, log_info, Logger, Severity};
use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

fn read_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn count_matching(content: &str, needle: &str) -> usize {
    content.lines().filter(|line| line.contains(needle)).count()
}

#[test]
fn level_filtering() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("level.log", dir.path(), "INFO")?;

    logger.debug("debug NO");
    logger.info("info ok");
    logger.warn("warn ok");
    logger.error("error ok");
    logger.critical("critical ok");
    logger.close();

    let content = read_log(&dir.path().join("level.log"));
    assert!(!content.contains("debug NO"), "DEBUG passed an INFO gate");

    let tags: Vec<&str> = content
        .lines()
        .filter_map(|line| {
            let start = line.find(" [")? + 2;
            let end = line[start..].find(']')? + start;
            Some(&line[start..end])
        })
        .collect();
    assert_eq!(tags, ["INFO", "WARN", "ERROR", "CRITICAL"]);
    Ok(())
}

#[test]
fn concurrent_producers_without_loss() -> Result<()> {
    const PRODUCERS: usize = 50;
    const RECORDS: usize = 500;

    let dir = tempfile::tempdir()?;
    let logger = Logger::start("conc.log", dir.path(), "INFO")?;

    std::thread::scope(|scope| {
        for _ in 0..PRODUCERS {
            scope.spawn(|| {
                for _ in 0..RECORDS {
                    log_info!(logger, "test");
                }
            });
        }
    });
    logger.close();

    let content = read_log(&dir.path().join("conc.log"));
    assert_eq!(count_matching(&content, "[INFO]"), PRODUCERS * RECORDS);
    Ok(())
}

#[test]
fn single_producer_order_is_preserved() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("order.log", dir.path(), "DEBUG")?;

    for i in 0..200 {
        logger.info(format!("msg-{i:04}").as_str());
    }
    logger.close();

    let content = read_log(&dir.path().join("order.log"));
    let seen: Vec<&str> = content
        .lines()
        .filter_map(|line| line.split("[INFO] ").nth(1))
        .collect();
    assert_eq!(seen.len(), 200);
    for (i, body) in seen.iter().enumerate() {
        assert_eq!(*body, format!("msg-{i:04}"));
    }
    Ok(())
}

#[test]
fn writer_adapter_payloads_and_newlines() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("writer.log", dir.path(), "INFO")?;

    let mut sink = &logger;
    sink.write_all(b"hola io\n")?;
    write!(sink, "hola fmt {}\n", 42)?;
    sink.write_all(b"hola raw")?;
    logger.sync();

    let content = read_log(&dir.path().join("writer.log"));
    let io_at = content.find("hola io").expect("io payload missing");
    let fmt_at = content.find("hola fmt 42").expect("fmt payload missing");
    let raw_at = content.find("hola raw").expect("raw payload missing");
    assert!(io_at < fmt_at && fmt_at < raw_at, "adapter order broken");

    assert!(
        !content.contains("\n\n"),
        "every record must end with exactly one newline"
    );
    assert!(content.ends_with("hola raw\n"));
    assert_eq!(count_matching(&content, "[INFO]"), 3);
    logger.close();
    Ok(())
}

#[test]
fn structured_mode_emits_one_json_object_per_line() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("json.log", dir.path(), "INFO")?;
    logger.set_structured(true);

    logger.info("plain body");
    log_fields!(logger, Severity::Warn, "user" => "bob", "port" => 5000);
    logger.sync();

    let content = read_log(&dir.path().join("json.log"));
    let records: Vec<&str> = content
        .lines()
        .filter(|line| line.starts_with('{'))
        .collect();
    assert_eq!(records.len(), 2);

    for line in &records {
        assert!(line.starts_with("{\"ts\":"), "ts must come first: {line}");
        let value: serde_json::Value = serde_json::from_str(line)?;
        assert!(value["ts"].is_string());
        assert!(value["level"].is_string());
    }

    let first: serde_json::Value = serde_json::from_str(records[0])?;
    assert_eq!(first["level"], "INFO");
    assert_eq!(first["msg"], "plain body");

    let second: serde_json::Value = serde_json::from_str(records[1])?;
    assert_eq!(second["level"], "WARN");
    assert_eq!(second["user"], "bob");
    assert_eq!(second["port"], 5000);
    logger.close();
    Ok(())
}

#[test]
fn structured_toggle_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("toggle.log", dir.path(), "INFO")?;

    logger.info("before");
    logger.set_structured(true);
    logger.info("during");
    logger.set_structured(false);
    logger.info("after");
    logger.close();

    let content = read_log(&dir.path().join("toggle.log"));
    let before = content
        .lines()
        .find(|l| l.contains("before"))
        .expect("missing first record");
    let after = content
        .lines()
        .find(|l| l.contains("after"))
        .expect("missing last record");
    assert!(before.contains("[INFO] before"));
    assert!(after.contains("[INFO] after"), "plain framing not restored");
    Ok(())
}

#[test]
fn close_flushes_everything_and_is_idempotent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("flush.log", dir.path(), "INFO")?;

    for i in 0..1000 {
        log_info!(logger, "linea {}", i);
    }
    logger.close();
    logger.close();

    let content = read_log(&dir.path().join("flush.log"));
    assert_eq!(count_matching(&content, "[INFO]"), 1000);
    Ok(())
}

#[test]
fn sync_makes_prior_records_readable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("sync.log", dir.path(), "INFO")?;

    for i in 0..1000 {
        log_info!(logger, "record {}", i);
    }
    logger.sync();

    // Without closing: everything framed before the sync is on disk.
    let content = read_log(&dir.path().join("sync.log"));
    assert_eq!(count_matching(&content, "[INFO]"), 1000);

    logger.sync();
    logger.close();
    Ok(())
}

#[test]
fn log_bytes_fast_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("bytes.log", dir.path(), "INFO")?;

    logger.log_bytes(Severity::Info, b"pre-encoded body");
    logger.log_static(Severity::Error, "static body");
    logger.close();

    let content = read_log(&dir.path().join("bytes.log"));
    assert!(content.contains("[INFO] pre-encoded body"));
    assert!(content.contains("[ERROR] static body"));
    Ok(())
}

#[test]
fn timestamp_format_is_configurable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("ts.log", dir.path(), "INFO")?;
    logger.set_timestamp_format(acacia::timestamp::RFC3339);

    // let the clock pick up the new pattern deterministically via a fresh
    // record framed after the set call (set_format re-renders immediately)
    logger.info("ts probe");
    logger.close();

    let content = read_log(&dir.path().join("ts.log"));
    let line = content
        .lines()
        .find(|l| l.contains("[INFO] ts probe"))
        .expect("probe record missing");
    let ts = line.split(" [INFO]").next().unwrap();
    assert!(ts.contains('T'), "not RFC3339-shaped: {ts}");
    assert_eq!(&ts[4..5], "-");
    Ok(())
}

#[test]
fn statistics_snapshot_is_consistent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let logger = Logger::start("stats.log", dir.path(), "INFO")?;

    for _ in 0..50 {
        logger.info("counted");
    }
    logger.sync();

    let stats = logger.statistics();
    assert_eq!(stats.enqueued, 50);
    assert_eq!(stats.dequeued, 50);
    assert_eq!(stats.pending, 0);
    assert!(stats.write_calls > 0);
    assert_eq!(logger.dropped(), 0);
    logger.close();
    Ok(())
}
