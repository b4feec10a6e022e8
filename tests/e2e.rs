use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run(data_dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_coda-bank"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env("RUST_LOG", "warn")
        .env_remove("CODA_BANK_DATA_DIR")
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("missing data file");
    serde_json::from_str(&text).expect("data file is not json")
}

#[test]
fn valid_batch() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, success) = run(dir.path(), &["--batch", "tests/fixtures/valid.csv"]);

    assert!(success);
    assert!(stderr.is_empty(), "{stderr}");
    assert!(stdout.contains("applied: 4, rejected: 0"));
    // 1000 + 200 - 1250 - 30 + 10
    assert!(stdout.contains("Current balance: -70"));
    assert!(stdout.contains("Savings: 20"));

    let account = read_json(&dir.path().join("user.json"));
    assert_eq!(account["balance"], -70);
    assert_eq!(account["savingsBalance"], 20);
    assert_eq!(account["overdraftLimit"], 100);

    let ledger = read_json(&dir.path().join("transactions.json"));
    let ledger = ledger.as_array().unwrap();
    assert_eq!(ledger.len(), 4);
    assert_eq!(ledger[1]["type"], "withdrawal");
    assert_eq!(ledger[1]["balanceAfter"], -50);
    assert!(ledger[1].get("savingsBalanceAfter").is_none());
    assert_eq!(ledger[2]["savingsBalanceAfter"], 30);
}

#[test]
fn errors_warn_but_do_not_block() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, success) =
        run(dir.path(), &["--batch", "tests/fixtures/with_errors.csv"]);

    assert!(success);
    assert!(stderr.contains("unrecognized operation type"));
    assert!(stderr.contains("missing amount"));
    assert!(stdout.contains("applied: 1, rejected: 3"));
    assert!(stdout.contains("Current balance: 1100"));

    let ledger = read_json(&dir.path().join("transactions.json"));
    let ledger = ledger.as_array().unwrap();
    assert_eq!(ledger.len(), 4);
    assert_eq!(ledger[1]["amount"], 3.5);
    assert_eq!(ledger[1]["success"], false);
    assert_eq!(ledger[2]["amount"], -20);
    assert_eq!(ledger[3]["balanceAfter"], 1100);
}

#[test]
fn state_persists_across_runs_and_exports() {
    let dir = TempDir::new().unwrap();
    run(dir.path(), &["--batch", "tests/fixtures/valid.csv"]);
    let (stdout, _, success) = run(dir.path(), &["--batch", "tests/fixtures/valid.csv"]);

    assert!(success);
    // second withdrawal of 1250 from 130 is past the overdraft
    assert!(stdout.contains("applied: 3, rejected: 1"));

    let (stdout, _, success) = run(dir.path(), &["--export-history"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "date,type,amount,balance_after,savings_balance_after,success"
    );
    assert_eq!(lines.len(), 9);
    assert!(lines[6].contains(",withdrawal,1250,130,,false"));
}

#[test]
fn corrupt_files_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("user.json"), "{ broken").unwrap();
    std::fs::write(dir.path().join("transactions.json"), "[1, 2").unwrap();

    let (stdout, stderr, success) = run(dir.path(), &["--batch", "tests/fixtures/valid.csv"]);

    assert!(success);
    assert!(stderr.contains("unreadable"));
    assert!(stdout.contains("Current balance: -70"));
    let ledger = read_json(&dir.path().join("transactions.json"));
    assert_eq!(ledger.as_array().unwrap().len(), 4);
}

#[test]
fn interactive_session_over_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_coda-bank"))
        .arg("--data-dir")
        .arg(dir.path())
        .env_remove("CODA_BANK_DATA_DIR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run binary");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"withdraw 1099\nwithdraw 2\nhistory\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Withdrawal of 1099 completed.\nNew balance: -99"));
    assert!(stdout.contains("Withdrawal refused"));
    assert!(stdout.contains("Last 2 operation(s):"));
}
