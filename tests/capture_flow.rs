//! Drives `tforge capture` end to end against a fake tmux.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const FAKE_TMUX: &str = r#"#!/bin/sh
case "$1" in
  list-sessions) printf 'hive\nops\n' ;;
  list-windows) printf '0|editor|abcd|1\n1|logs|efgh|0\n' ;;
  list-panes)
    case "$3" in
      hive:0) printf '0|%%1|/workspace|1\n1|%%2|/workspace/src|0\n' ;;
      *) printf '0|%%3|/tmp|1\n' ;;
    esac ;;
  source-file) echo "$2" >> "$(dirname "$0")/sourced" ;;
  *) exit 1 ;;
esac
"#;

fn tforge(home: &Path, tmux: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tforge"))
        .arg("--home")
        .arg(home)
        .arg("--tmux-bin")
        .arg(tmux)
        .args(args)
        .env_remove("TMUX")
        .stdin(Stdio::null())
        .output()
        .expect("run tforge")
}

#[test]
fn capture_writes_script_journal_and_binding() {
    let home = tempfile::tempdir().expect("home");
    let bin = tempfile::tempdir().expect("bin");
    let tmux = bin.path().join("tmux");
    fs::write(&tmux, FAKE_TMUX).expect("write fake tmux");
    fs::set_permissions(&tmux, fs::Permissions::from_mode(0o755)).expect("chmod");

    let capture = ["capture", "--session", "hive", "--name", "hive", "--key", "g"];
    let out = tforge(home.path(), &tmux, &capture);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "stdout: {stdout}\nstderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(stdout.contains("[tforge] Done."));

    let script_path = home.path().join(".tforge/sessions/hive.sh");
    let script = fs::read_to_string(&script_path).expect("script");
    assert!(script.contains("tmux has-session -t \"=$SESSION\""));
    assert!(script.contains("-s hive -n editor -c /workspace"));
    assert!(script.contains("tmux split-window -t \"$WINDOW\" -c /workspace/src"));
    assert!(script.contains("-n logs -c /tmp"));
    let mode = fs::metadata(&script_path).expect("meta").permissions().mode();
    assert_eq!(mode & 0o111, 0o111);

    let journal = fs::read_to_string(home.path().join(".tforge/journal.json")).expect("journal");
    let journal: serde_json::Value = serde_json::from_str(&journal).expect("json");
    let entry = &journal["entries"][0];
    assert_eq!(entry["session"], "hive");
    assert_eq!(entry["windows"], 2);
    assert_eq!(entry["panes"], 3);

    let conf = fs::read_to_string(home.path().join(".tmux.conf")).expect("tmux.conf");
    assert_eq!(conf.matches("# tforge begin: hive").count(), 1);
    assert!(conf.contains("bind-key g run-shell"));
    assert!(bin.path().join("sourced").exists());

    // Second run leaves the config alone.
    let again = tforge(home.path(), &tmux, &capture);
    assert!(again.status.success());
    assert!(String::from_utf8_lossy(&again.stdout).contains("Tmux config already up-to-date"));
    let conf_again = fs::read_to_string(home.path().join(".tmux.conf")).expect("tmux.conf");
    assert_eq!(conf, conf_again);

    // Unknown sessions are rejected before anything is written.
    let missing = tforge(
        home.path(),
        &tmux,
        &["capture", "--session", "ghost", "--name", "ghost", "--no-bind"],
    );
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("does not exist"));
    assert!(!home.path().join(".tforge/sessions/ghost.sh").exists());
}
