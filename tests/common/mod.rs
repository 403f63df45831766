use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;

/// Stage a config.json plus incoming directory inside a temp dir.
/// The temp dir itself is the library root.
pub fn setup_workspace(temp_dir: &TempDir) {
    temp_dir.child("incoming").create_dir_all().unwrap();
    temp_dir
        .child("config.json")
        .write_str(r#"{"IncomingDir": "incoming"}"#)
        .unwrap();
}

/// A photokeep command running inside the staged workspace.
pub fn photokeep(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("photokeep").unwrap();
    cmd.current_dir(temp_dir.path());
    cmd
}
