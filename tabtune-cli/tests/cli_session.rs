use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn tabtune(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tabtune"));
    cmd.arg("--data-dir").arg(dir);
    cmd
}

fn queue_two_short_videos(dir: &Path) {
    for id in ["dQw4w9WgXcQ", "9bZkp7q19f0"] {
        tabtune(dir)
            .args(["queue", "add", id, "--duration", "3"])
            .assert()
            .success();
    }
}

#[test]
fn headless_session_plays_queue_to_the_end() {
    let dir = tempfile::tempdir().unwrap();
    queue_two_short_videos(dir.path());

    tabtune(dir.path())
        .args(["session", "--headless", "--seconds", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now playing dQw4w9WgXcQ"))
        .stdout(predicate::str::contains("ended dQw4w9WgXcQ (estimator)"))
        .stdout(predicate::str::contains("now playing 9bZkp7q19f0"))
        .stdout(predicate::str::contains("stopped: nothing left to play"))
        .stdout(predicate::str::contains("(embed)").not());
}

#[test]
fn hidden_session_ends_through_background_tracker() {
    let dir = tempfile::tempdir().unwrap();
    queue_two_short_videos(dir.path());

    tabtune(dir.path())
        .args(["session", "--headless", "--seconds", "12", "--hide-at", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("document hidden"))
        .stdout(predicate::str::contains("ended dQw4w9WgXcQ (background)"))
        .stdout(predicate::str::contains("now playing 9bZkp7q19f0"));
}

#[test]
fn session_with_empty_queue_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    tabtune(dir.path())
        .args(["session", "--headless"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Queue is empty"));
}

#[test]
fn unbounded_session_length_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    queue_two_short_videos(dir.path());

    tabtune(dir.path())
        .args(["session", "--headless", "--seconds", "inf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for seconds"));
}
