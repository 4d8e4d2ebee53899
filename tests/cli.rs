use std::process::Command;
use tempfile::TempDir;

/// Set up an isolated data directory with getit initialized.
fn setup_data_dir() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    let (_, stderr, ok) = getit(&dir, &["init"]);
    assert!(ok, "init failed: {stderr}");
    dir
}

/// Run `getit` with args against the given dir, returning (stdout, stderr, success).
fn getit(dir: &TempDir, args: &[&str]) -> (String, String, bool) {
    let bin = env!("CARGO_BIN_EXE_getit");
    let out = Command::new(bin)
        .args(args)
        .env("GETIT_DATA_DIR", dir.path().join("data"))
        .env("GETIT_MODE", "prod")
        .env("GETIT_LOG", "off")
        .output()
        .expect("failed to run getit");
    (
        String::from_utf8_lossy(&out.stdout).to_string(),
        String::from_utf8_lossy(&out.stderr).to_string(),
        out.status.success(),
    )
}

fn last_word(stdout: &str) -> String {
    stdout.split_whitespace().last().unwrap().to_string()
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, ok) = getit(&dir, &["basket"]);
    assert!(!ok);
    assert!(stderr.contains("getit init"), "{stderr}");
}

#[test]
fn init_twice_fails() {
    let dir = setup_data_dir();
    let (_, stderr, ok) = getit(&dir, &["init"]);
    assert!(!ok);
    assert!(stderr.contains("already initialized"), "{stderr}");
}

#[test]
fn basket_archive_and_history() {
    let dir = setup_data_dir();

    let (stdout, _, ok) = getit(&dir, &["add", "d2"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "added d2");
    let (_, _, ok) = getit(&dir, &["add", "Birthday candles", "-q", "3"]);
    assert!(ok);

    let (stdout, _, _) = getit(&dir, &["basket"]);
    assert!(stdout.contains("Milk - 1 L"), "{stdout}");
    assert!(stdout.contains("Birthday candles - 3 pc"), "{stdout}");

    let (_, _, ok) = getit(&dir, &["name", "Weekly"]);
    assert!(ok);
    let (stdout, _, ok) = getit(&dir, &["archive"]);
    assert!(ok, "archive failed");
    let list_id = stdout.split_whitespace().nth(1).unwrap().to_string();

    let (stdout, _, _) = getit(&dir, &["basket"]);
    assert!(stdout.contains("basket is empty"), "{stdout}");

    let (stdout, _, _) = getit(&dir, &["lists"]);
    assert!(stdout.starts_with("Today"), "{stdout}");
    assert!(stdout.contains(&list_id), "{stdout}");
    assert!(stdout.contains("Weekly"), "{stdout}");

    let (_, stderr, ok) = getit(&dir, &["archive"]);
    assert!(!ok);
    assert!(stderr.contains("nothing to archive"), "{stderr}");
}

#[test]
fn undo_restores_basket_once() {
    let dir = setup_data_dir();
    getit(&dir, &["add", "f1", "--urgent"]);
    let (_, _, ok) = getit(&dir, &["archive"]);
    assert!(ok);

    let (_, stderr, ok) = getit(&dir, &["undo"]);
    assert!(ok, "undo failed: {stderr}");
    let (stdout, _, _) = getit(&dir, &["basket"]);
    assert!(stdout.contains("Apples - 1 kg"), "{stdout}");
    let (stdout, _, _) = getit(&dir, &["lists"]);
    assert!(stdout.contains("no past lists"), "{stdout}");

    let (_, stderr, ok) = getit(&dir, &["undo"]);
    assert!(!ok);
    assert!(stderr.contains("nothing to undo"), "{stderr}");
}

#[test]
fn quantity_steps_clamp_at_one() {
    let dir = setup_data_dir();
    getit(&dir, &["add", "b5", "-q", "2"]);
    let (stdout, _, ok) = getit(&dir, &["qty", "b5", "-1"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "b5 quantity 1");
    let (stdout, _, _) = getit(&dir, &["qty", "b5", "-1"]);
    assert_eq!(stdout.trim(), "b5 quantity 1");
    let (stdout, _, _) = getit(&dir, &["qty", "b5", "+4"]);
    assert_eq!(stdout.trim(), "b5 quantity 5");

    let (stdout, _, _) = getit(&dir, &["unit", "b5"]);
    assert_eq!(stdout.trim(), "b5 unit dozen");
}

#[test]
fn fractional_quantities_round_trip() {
    let dir = setup_data_dir();
    let (_, _, ok) = getit(&dir, &["add", "f1", "-q", "1.5"]);
    assert!(ok);
    let (stdout, _, _) = getit(&dir, &["basket"]);
    assert!(stdout.contains("Apples - 1.5 kg"), "{stdout}");
    let (stdout, _, _) = getit(&dir, &["qty", "f1", "+1"]);
    assert_eq!(stdout.trim(), "f1 quantity 2.5");
    let (stdout, _, _) = getit(&dir, &["qty", "f1", "0.25"]);
    assert_eq!(stdout.trim(), "f1 quantity 0.25");
}

#[test]
fn new_list_share_and_delete() {
    let dir = setup_data_dir();
    let (_, stderr, ok) = getit(&dir, &["new", " ", "Cups=2"]);
    assert!(!ok);
    assert!(stderr.contains("cannot be empty"), "{stderr}");

    let (stdout, _, ok) = getit(&dir, &["new", "Party", "Cups=2", "Ice"]);
    assert!(ok);
    let id = last_word(&stdout);

    let (stdout, _, ok) = getit(&dir, &["share", &id]);
    assert!(ok);
    assert!(stdout.starts_with("Shopping List: Party"), "{stdout}");
    assert!(stdout.contains("Cups - 2 pc"), "{stdout}");
    assert!(stdout.contains("0 of 2 items completed"), "{stdout}");

    let (_, _, ok) = getit(&dir, &["delete", &id]);
    assert!(ok);
    let (_, stderr, ok) = getit(&dir, &["delete", &id]);
    assert!(!ok);
    assert!(stderr.contains("no list"), "{stderr}");
}

#[test]
fn reminders_must_be_in_the_future() {
    let dir = setup_data_dir();
    let (stdout, _, _) = getit(&dir, &["new", "Party", "Cups"]);
    let id = last_word(&stdout);

    let (_, stderr, ok) = getit(&dir, &["remind", &id, "--at", "2000-01-01T00:00:00Z"]);
    assert!(!ok);
    assert!(stderr.contains("future"), "{stderr}");

    let (_, _, ok) = getit(&dir, &["remind", &id, "--in-minutes", "60"]);
    assert!(ok);
    let (stdout, _, _) = getit(&dir, &["show", &id]);
    assert!(stdout.contains("Reminder:"), "{stdout}");

    let (_, _, ok) = getit(&dir, &["remind", &id, "--clear"]);
    assert!(ok);
    let (stdout, _, _) = getit(&dir, &["show", &id]);
    assert!(!stdout.contains("Reminder:"), "{stdout}");
}

#[test]
fn browse_hides_dismissed_items() {
    let dir = setup_data_dir();
    let (stdout, _, _) = getit(&dir, &["browse", "fruits"]);
    assert!(stdout.contains("Apples"), "{stdout}");
    getit(&dir, &["hide", "f1"]);
    getit(&dir, &["add", "f2"]);
    let (stdout, _, _) = getit(&dir, &["browse", "fruits"]);
    assert!(!stdout.contains("Apples"), "{stdout}");
    assert!(!stdout.contains("Bananas"), "{stdout}");
    assert!(stdout.contains("Oranges"), "{stdout}");
}

#[test]
fn onboarding_persists_in_prod_only() {
    let dir = setup_data_dir();
    let (stdout, _, _) = getit(&dir, &["onboarding", "complete"]);
    assert_eq!(stdout.trim(), "onboarding completed");
    let (stdout, _, _) = getit(&dir, &["onboarding", "status"]);
    assert_eq!(stdout.trim(), "onboarding completed");

    let (stdout, _, _) = getit(&dir, &["--mode", "dev", "onboarding", "status"]);
    assert_eq!(stdout.trim(), "onboarding not completed");
}

#[test]
fn unknown_command_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let (_, _, ok) = getit(&dir, &["nonexistent"]);
    assert!(!ok);
}
