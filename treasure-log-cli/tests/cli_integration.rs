use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const LOG: &str = "1000\t0\tExperiment Info\tENV_CENTER\t0\t0\t0\r
1500\t0\tPlayer\tPOSITION\t0\t0\t-10\r
2000\t0\tTrial Info\t\t1\r
2100\t0\tTreasureChest1\tPOSITION\t5\t0\t5\r
2200\t0\tTrial Event\tTRIAL_NAVIGATION_STARTED\r
2300\t0\tTreasureChest1\tTREASURE_OPEN\t\tTrue\r
2310\t0\tTreasureChest1\tTREASURE_LABEL\tgold\r
2400\t0\tgold\tSPAWNED\r
3000\t0\tTrial Event\tRECALL_PHASE_STARTED\r
3050\t0\tPlayer\tPOSITION\t0\t0\t0\r
8000\t0\tTrial Event\tRECALL_SPECIAL\tgold\r
8100\t0\tgold\tSPAWNED\r
9000\t0\tEnvironmentPositionSelector\tCHOSEN_TEST_POSITION\t6\t0\t4\r
9000\t0\tEnvironmentPositionSelector\tCORRECT_TEST_POSITION\t5\t0\t5\r
";

fn run<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_treasure-log"))
        .args(args)
        .output()
        .unwrap_or_else(|err| panic!("failed to execute treasure-log binary: {err}"))
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "treasure-log failed (status={}):\nstderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_session(dir: &Path, subject: &str) -> std::path::PathBuf {
    let session = dir.join(subject);
    fs::create_dir_all(&session).unwrap();
    let log = session.join("log.txt");
    fs::write(&log, LOG).unwrap();
    log
}

#[test]
fn test_missing_argument_is_a_usage_error() {
    let output = run(Vec::<&str>::new());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_writes_table_next_to_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_session(dir.path(), "R1001P");

    let output = run([log.as_os_str(), "-q".as_ref()]);
    assert_success(&output);

    let table = fs::read_to_string(log.with_file_name("treasure.par")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("mstime\ttype\titem\ttrial\tblock\tchestNum"));
    assert!(lines[1].starts_with("2400\tCHEST\tgold\t1\t0\t1\t5\t5\t6\t4\t0\t-10\t0\t0\t0\t1\t0\t1000"));
    assert!(lines[2].starts_with("8100\tREC\tgold\t1"));
}

#[test]
fn test_directory_input_and_subject_column() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_session(dir.path(), "R1002J");
    let session = log.parent().unwrap();

    let output = run([session.as_os_str(), "--subject".as_ref(), "--no-start-side".as_ref()]);
    assert_success(&output);

    let table = fs::read_to_string(session.join("treasure.par")).unwrap();
    let header = table.lines().next().unwrap();
    assert!(!header.contains("isRecFromStartSide"));
    assert!(header.ends_with("\tsubject"));
    for row in table.lines().skip(1) {
        assert!(row.ends_with("\tR1002J"));
        assert_eq!(row.split('\t').count(), 19);
    }
}

#[test]
fn test_timing_trace_and_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_session(dir.path(), "R1003M");
    let config = dir.path().join("parser.toml");
    fs::write(
        &config,
        "[output]\nfile_name = \"session.par\"\nmissing_token = \"None\"\n\n[timing]\nenabled = true\n",
    )
    .unwrap();

    let output = run([log.as_os_str(), "--config".as_ref(), config.as_os_str()]);
    assert_success(&output);

    let table = fs::read_to_string(log.with_file_name("session.par")).unwrap();
    assert!(table.contains("\tNone"));

    let timing = fs::read_to_string(log.with_file_name("treasure_timing.par")).unwrap();
    let labels: Vec<&str> = timing
        .lines()
        .skip(1)
        .map(|line| line.rsplit('\t').next().unwrap())
        .collect();
    assert_eq!(
        labels,
        vec!["START", "NAV_START", "CHEST_OPEN", "REC_START", "REC_ITEM", "END"]
    );
}

#[test]
fn test_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_session(dir.path(), "R1004T");
    let out = dir.path().join("records.jsonl");

    let output = run([
        log.as_os_str(),
        "--format".as_ref(),
        "json".as_ref(),
        "--output".as_ref(),
        out.as_os_str(),
    ]);
    assert_success(&output);

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|line| line.starts_with('{') && line.ends_with('}')));
    assert!(text.contains("\"type\":\"REC\""));
}

#[test]
fn test_banner_line_with_timing_trace() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("R1006B");
    fs::create_dir_all(&session).unwrap();
    let log = session.join("log.txt");
    fs::write(&log, format!("mstime\tx\tBanner\tSESSION\r\n{LOG}")).unwrap();

    let output = run([log.as_os_str(), "--timing".as_ref(), "-q".as_ref()]);
    assert_success(&output);

    let table = fs::read_to_string(session.join("treasure.par")).unwrap();
    assert_eq!(table.lines().count(), 3);

    let timing = fs::read_to_string(session.join("treasure_timing.par")).unwrap();
    let first = timing.lines().nth(1).unwrap();
    assert!(first.starts_with("1000\t"));
    assert!(first.ends_with("\tSTART"));
}

#[test]
fn test_unmatched_recall_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("R1005P");
    fs::create_dir_all(&session).unwrap();
    let log = session.join("log.txt");
    fs::write(
        &log,
        "2000\t0\tTrial Info\t\t1\n\
         3000\t0\tTrial Event\tRECALL_PHASE_STARTED\n\
         3100\t0\tTrial Event\tRECALL_SPECIAL\tsilver\n",
    )
    .unwrap();

    let output = run([log.as_os_str()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("silver"));
    assert!(!session.join("treasure.par").exists());
}
