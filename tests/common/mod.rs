#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

pub fn wit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("wit").expect("failed to find wit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Read the object id printed by a successful command run.
pub fn stdout_oid(cmd: &mut Command) -> String {
    let output = cmd.output().expect("failed to run wit binary");
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout)
        .expect("stdout is not utf-8")
        .trim()
        .to_string()
}
