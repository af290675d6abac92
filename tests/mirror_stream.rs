use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;
use tracing_test::traced_test;

use translog::{MirrorConfig, MirrorWriter, TRUNCATION_MARKER};

fn enabled_config(capacity: usize, max_log_len: i64) -> MirrorConfig {
    MirrorConfig {
        log_enabled: true,
        capacity,
        max_log_len,
        ..MirrorConfig::default()
    }
}

#[test]
#[traced_test]
fn buffered_chunks_reach_sink_and_mirror_in_order() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("stream.bin");
    let file = File::create(&path).unwrap();
    let mut writer = MirrorWriter::new(file, enabled_config(8, 10));

    // Five bytes fit the buffer; nothing reaches the sink or the log.
    writer.write_all(b"alpha").unwrap();
    assert!(!logs_contain("alpha"));
    assert_eq!(fs::read(&path).unwrap().len(), 0);

    // Five more do not fit, so the first five are flushed and mirrored.
    writer.write_all(b"bravo").unwrap();
    assert!(logs_contain("alpha"));
    assert_eq!(writer.remaining_log_len(), 5);

    writer.flush().unwrap();
    assert!(logs_contain("bravo"));
    assert!(!logs_contain(TRUNCATION_MARKER));
    assert_eq!(writer.remaining_log_len(), 0);

    // Budget exhausted: bytes still reach the sink, unmirrored.
    writer.write_all(b"omega").unwrap();
    writer.flush().unwrap();
    assert!(!logs_contain("omega"));
    assert_eq!(writer.remaining_log_len(), 0);

    drop(writer);
    assert_eq!(fs::read(&path).unwrap(), b"alphabravoomega");
}

#[test]
#[traced_test]
fn oversize_chunk_is_truncated_then_mirror_goes_quiet() {
    let mut writer = MirrorWriter::new(Vec::new(), enabled_config(4, 3));

    writer.write_all(b"abcdef").unwrap();
    assert!(logs_contain("abc...(truncated)"));
    assert_eq!(writer.remaining_log_len(), -3);

    writer.write_all(b"ghijkl").unwrap();
    assert!(!logs_contain("ghi"));
    assert_eq!(writer.remaining_log_len(), -3);
    assert_eq!(writer.into_inner(), b"abcdefghijkl");
}

#[test]
#[traced_test]
fn mirroring_is_off_by_default() {
    let config = MirrorConfig {
        capacity: 4,
        ..MirrorConfig::default()
    };
    let mut writer = MirrorWriter::new(Vec::new(), config);

    writer.write_all(b"quiet-payload").unwrap();
    writer.flush().unwrap();

    assert!(!logs_contain("quiet-payload"));
    assert_eq!(writer.into_inner(), b"quiet-payload");
}

#[test]
#[traced_test]
fn enabling_mid_stream_only_mirrors_later_chunks() {
    let mut config = enabled_config(16, i64::MAX);
    config.log_enabled = false;
    let mut writer = MirrorWriter::new(Vec::new(), config);

    writer.write_all(b"negotiation").unwrap();
    writer.set_log_enabled(true).unwrap();
    assert!(!logs_contain("negotiation"));

    writer.write_all(b"payload-bytes").unwrap();
    writer.flush().unwrap();
    assert!(logs_contain("payload-bytes"));
    assert_eq!(writer.into_inner(), b"negotiationpayload-bytes");
}

#[test]
#[traced_test]
fn settings_file_drives_the_mirror() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("translog.toml");
    fs::write(
        &path,
        r#"
[mirror]
log_enabled = true
charset = "UTF-8"
capacity = 4
max_log_len = 64
header = "PDU> "
"#,
    )
    .unwrap();

    let settings = translog::Settings::load(&path).unwrap();
    let config = settings.mirror.unwrap().into_config().unwrap();
    let mut writer = MirrorWriter::new(Vec::new(), config);

    writer.write_all("café latte".as_bytes()).unwrap();
    assert!(logs_contain("PDU> café latte"));
    assert_eq!(writer.into_inner(), "café latte".as_bytes());
}

#[test]
#[traced_test]
fn activity_tracing_reports_buffer_events() {
    let mut config = enabled_config(8, i64::MAX);
    config.trace_enabled = true;
    let mut writer = MirrorWriter::new(Vec::new(), config);

    writer.write_all(b"12345").unwrap();
    writer.flush().unwrap();
    assert!(logs_contain("flushed 5 buffered bytes"));

    writer.write_all(b"0123456789").unwrap();
    assert!(logs_contain("wrote 10 bytes past the buffer"));
}

#[test]
fn dropping_the_writer_does_not_flush() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("stream.bin");

    let file = File::create(&path).unwrap();
    let mut writer = MirrorWriter::new(file, enabled_config(64, i64::MAX));
    writer.write_all(b"unflushed tail").unwrap();
    drop(writer);

    assert_eq!(fs::read(&path).unwrap().len(), 0);
}
