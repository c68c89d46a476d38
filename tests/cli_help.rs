use std::process::{Command, Output};

fn tforge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tforge"))
        .args(args)
        .env_remove("TMUX")
        .env_remove("TFORGE_HOME")
        .env_remove("TFORGE_TMUX")
        .output()
        .expect("run tforge")
}

#[test]
fn help_flags_exit_zero() {
    for args in [&["--help"][..], &["-h"][..], &["help"][..]] {
        let out = tforge(args);
        assert!(out.status.success(), "{args:?} failed");
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("capture"), "{args:?}: {stdout}");
        assert!(stdout.contains("restore"), "{args:?}: {stdout}");
    }
}

#[test]
fn missing_command_fails() {
    let out = tforge(&[]);
    assert!(!out.status.success());
}

#[test]
fn restore_without_journal_fails_with_message() {
    let home = tempfile::tempdir().expect("tempdir");
    let out = tforge(&["--home", home.path().to_str().expect("utf8 path"), "restore"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[tforge:error]"), "{stderr}");
    assert!(stderr.contains("no saved sessions found"), "{stderr}");
}
