//! CLI-level checks driving the real binary against the bundled
//! configuration.

use assert_cmd::Command;
use predicates::prelude::*;

fn cheridemo() -> Command {
    let mut cmd = Command::cargo_bin("cheridemo").expect("binary not built");
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env("CHERIDEMO_ROOT", env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn no_arguments_prints_usage() {
    cheridemo()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn list_configs_marks_the_default() {
    cheridemo()
        .arg("list-configs")
        .assert()
        .success()
        .stdout(predicate::str::contains("cheri"))
        .stdout(predicate::str::contains("(default)"))
        .stdout(predicate::str::contains("genesys2"));
}

#[test]
fn list_sw_shows_all_bundled_targets() {
    cheridemo()
        .arg("list-sw")
        .assert()
        .success()
        .stdout(predicate::str::contains("cheribsd"))
        .stdout(predicate::str::contains("bao-baremetal"))
        .stdout(predicate::str::contains("baremetal"));
}

#[test]
fn unknown_software_target_is_surfaced() {
    cheridemo()
        .args(["build-sw", "--target", "no-such-target"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown software target"));
}

#[test]
fn unknown_fpga_config_is_surfaced() {
    cheridemo()
        .args(["flash-fpga", "--config", "no-such-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown CVA6 FPGA config"));
}

#[test]
fn flash_sd_rejects_non_device_paths() {
    cheridemo()
        .args(["flash-sd", "--device", "rootfs.img"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not look like a block device"));
}
