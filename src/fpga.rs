//! FPGA bitstream build and flashing for CVA6-CHERI on the Genesys2.
//!
//! Both operations are pass-throughs: the bitstream build drives the
//! cheri-cva6 makefile with a provisioned RISC-V cross toolchain, and
//! flashing drives Vivado in batch mode with the TCL script shipped by
//! the cva6 tree. The only local logic is making sure Vivado's
//! `hw_server` is up before the script runs.

use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use colored::Colorize;
use sysinfo::System;

use crate::command::{self, Invocation};
use crate::config::Config;
use crate::error::{BuildError, FlashError};
use crate::models::FpgaConfig;
use crate::toolchain;
use crate::workspace::Workspace;

/// Repo name of the CVA6 checkout in repos.yaml.
pub const CVA6_REPO: &str = "cheri-cva6";

/// Cross-compiler prefix exported to the cva6 makefile.
pub const CROSS_COMPILE_PREFIX: &str = "riscv32-corev-elf-";

/// Default endpoint for a locally spawned hw_server.
pub const HW_SERVER_URL: &str = "localhost:3121";

/// The bitstream build invocation:
/// `make BOARD=<board> target=<target> <make_target> -jN` with `RISCV`
/// and `CROSSCOMPILE` exported.
pub fn plan_bitstream_build(
    repo: &Path,
    config: &FpgaConfig,
    riscv_root: &Path,
    jobs: u32,
) -> Invocation {
    Invocation::new(
        "make",
        [
            format!("BOARD={}", config.board),
            format!("target={}", config.target),
            config.make_target.clone(),
            format!("-j{}", jobs),
        ],
    )
    .cwd(repo)
    .env("RISCV", riscv_root.display().to_string())
    .env("CROSSCOMPILE", CROSS_COMPILE_PREFIX)
}

/// Build the FPGA bitstream for a named config (`build-fpga`).
pub fn build_bitstream(
    workspace: &Workspace,
    config: &Config,
    name: Option<&str>,
    jobs: u32,
) -> Result<(), BuildError> {
    let (name, fpga) = config.fpga_config(name)?;
    let repo = workspace.require_repo(CVA6_REPO)?;

    println!("{} {}", "Building FPGA bitstream for config".bold(), name.cyan());
    println!("  CVA6 target: {}", fpga.target.cyan());
    println!("  make target: {}", fpga.make_target.cyan());

    let riscv_root = toolchain::ensure_riscv_toolchain(workspace)?;
    println!("  using RISCV = {}", riscv_root.display().to_string().magenta());
    println!("  using CROSSCOMPILE = {}", CROSS_COMPILE_PREFIX.magenta());

    command::run(&plan_bitstream_build(&repo, fpga, &riscv_root, jobs))?;

    let bitfile = repo.join(&fpga.bitfile);
    if !bitfile.exists() {
        return Err(BuildError::ArtifactMissing(bitfile));
    }
    println!("{} {}", "✔ bitstream ready:".green(), bitfile.display());
    Ok(())
}

/// The Vivado batch invocation running a flash script from its own
/// directory.
pub fn plan_flash(script: &Path) -> Invocation {
    let mut invocation = Invocation::new(
        "vivado",
        [
            "-mode".to_string(),
            "batch".to_string(),
            "-source".to_string(),
            script.display().to_string(),
        ],
    );
    if let Some(parent) = script.parent() {
        invocation = invocation.cwd(parent);
    }
    if env::var_os("HW_SERVER_URL").is_none() {
        invocation = invocation.env("HW_SERVER_URL", HW_SERVER_URL);
    }
    invocation
}

/// Flash the Genesys2 board using the config's Vivado TCL script
/// (`flash-fpga`).
pub fn flash_bitstream(
    workspace: &Workspace,
    config: &Config,
    name: Option<&str>,
) -> Result<(), FlashError> {
    let (name, fpga) = config.fpga_config(name).map_err(BuildError::from)?;
    let repo = workspace.require_repo(CVA6_REPO)?;

    let script = repo.join(&fpga.flash_script);
    if !script.exists() {
        return Err(FlashError::ScriptMissing(script));
    }

    println!("{}", "Flashing FPGA via Vivado TCL script".bold());
    println!("  config: {}", name.cyan());
    println!("  board: {}", fpga.board.cyan());
    println!("  script: {}", script.display().to_string().magenta());

    ensure_hw_server(workspace)?;
    command::run(&plan_flash(&script))?;
    Ok(())
}

/// Make sure Vivado's hw_server is running, spawning one in the
/// background (logged to `external/logs/hw_server.log`) if it is not.
pub fn ensure_hw_server(workspace: &Workspace) -> Result<(), FlashError> {
    println!("{}", "→ checking for hw_server".blue().bold());

    if hw_server_running() {
        println!("{}", "✔ hw_server already running".green());
        return Ok(());
    }

    println!("{}", "hw_server not running, starting one...".yellow());
    let binary = find_in_path("hw_server").ok_or(FlashError::HwServerNotFound)?;

    let log_path = workspace.logs_dir().join("hw_server.log");
    let invocation = Invocation::new(
        binary.display().to_string().as_str(),
        ["-s", "tcp::3121"],
    );
    command::spawn_logged(&invocation, &log_path)?;

    println!("{} logs: {}", "started hw_server →".green(), log_path.display());
    // Give the server a moment to open its port before Vivado connects.
    thread::sleep(Duration::from_secs(3));
    Ok(())
}

fn hw_server_running() -> bool {
    let system = System::new_all();
    system
        .processes()
        .values()
        .any(|process| process.name().to_string_lossy().contains("hw_server"))
}

/// Minimal `which`: first `PATH` entry holding an executable file with
/// this name.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
