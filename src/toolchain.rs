//! RISC-V cross toolchain provisioning.
//!
//! The CVA6 FPGA build needs a `riscv*-corev-elf-` GCC. Resolution
//! order: a valid `$RISCV` root, a previously installed copy under
//! `external/toolchains/`, and finally a fresh download of the Embecosm
//! CORE-V GCC tarball.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::command::{self, Invocation};
use crate::error::ToolchainError;
use crate::workspace::Workspace;

/// CORE-V GCC toolchain from Embecosm (Ubuntu 22.04 build).
pub const EMBECOSM_COREV_GCC_URL: &str = "https://buildbot.embecosm.com/job/corev-gcc-ubuntu2204/47/artifact/corev-openhw-gcc-ubuntu2204-20240530.tar.gz";

/// Install directory name under `external/toolchains/`.
const INSTALL_DIR_NAME: &str = "corev-gcc-ubuntu2204";

/// Cached tarball name under `external/cache/`.
const TARBALL_NAME: &str = "corev-gcc-ubuntu2204.tar.gz";

const GCC_CANDIDATES: [&str; 4] = [
    "riscv64-corev-elf-gcc",
    "riscv32-corev-elf-gcc",
    "riscv64-unknown-elf-gcc",
    "riscv32-unknown-elf-gcc",
];

/// Ensure a RISC-V toolchain exists and return its root directory (the
/// directory exported as `$RISCV`).
pub fn ensure_riscv_toolchain(workspace: &Workspace) -> Result<PathBuf, ToolchainError> {
    if let Ok(env_riscv) = env::var("RISCV") {
        let root = PathBuf::from(env_riscv);
        if looks_like_riscv_root(&root) {
            println!("{} {}", "using RISCV toolchain from $RISCV:".green(), root.display());
            return Ok(root);
        }
        println!(
            "{} {}",
            "$RISCV is set but does not look like a toolchain root:".yellow(),
            root.display()
        );
    }

    let install_root = workspace.toolchains_dir().join(INSTALL_DIR_NAME);
    if install_root.exists() {
        if let Some(root) = find_toolchain_root(&install_root) {
            println!("{} {}", "using cached CORE-V toolchain:".green(), root.display());
            return Ok(root);
        }
    }

    download_and_extract(workspace, &install_root)
}

/// Heuristic: does this directory look like a RISC-V cross toolchain
/// root (a `bin/` with one of the known gcc names)?
pub fn looks_like_riscv_root(root: &Path) -> bool {
    let bin_dir = root.join("bin");
    if !bin_dir.is_dir() {
        return false;
    }
    GCC_CANDIDATES.iter().any(|name| bin_dir.join(name).exists())
}

/// Search the immediate children of an install root for a toolchain;
/// tarballs usually carry one top-level directory.
fn find_toolchain_root(install_root: &Path) -> Option<PathBuf> {
    if looks_like_riscv_root(install_root) {
        return Some(install_root.to_path_buf());
    }
    let entries = std::fs::read_dir(install_root).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && looks_like_riscv_root(&path) {
            return Some(path);
        }
    }
    None
}

fn download_and_extract(
    workspace: &Workspace,
    install_root: &Path,
) -> Result<PathBuf, ToolchainError> {
    let cache_dir = workspace.cache_dir();
    std::fs::create_dir_all(&cache_dir)?;
    std::fs::create_dir_all(install_root)?;

    let tar_path = cache_dir.join(TARBALL_NAME);

    println!(
        "{}",
        "no local RISC-V toolchain found, fetching CORE-V GCC from Embecosm".yellow().bold()
    );
    println!("  url: {}", EMBECOSM_COREV_GCC_URL.cyan());
    println!("  → {}", tar_path.display());

    let mut response = reqwest::blocking::get(EMBECOSM_COREV_GCC_URL)?.error_for_status()?;
    let mut tar_file = File::create(&tar_path)?;
    response.copy_to(&mut tar_file)?;

    println!("{} {}", "extracting toolchain →".bold(), install_root.display());
    command::run(&plan_extract(&tar_path, install_root))?;

    find_toolchain_root(install_root)
        .ok_or_else(|| ToolchainError::NotFound(install_root.to_path_buf()))
}

/// The tar invocation unpacking a downloaded toolchain tarball.
pub fn plan_extract(tarball: &Path, dest: &Path) -> Invocation {
    Invocation::new(
        "tar",
        [
            "-xzf".to_string(),
            tarball.display().to_string(),
            "-C".to_string(),
            dest.display().to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_looks_like_riscv_root() {
        let temp = tempdir().expect("failed to create temp dir");
        let root = temp.path();
        assert!(!looks_like_riscv_root(root));

        fs::create_dir_all(root.join("bin")).unwrap();
        assert!(!looks_like_riscv_root(root));

        fs::write(root.join("bin/riscv64-corev-elf-gcc"), "").unwrap();
        assert!(looks_like_riscv_root(root));
    }

    #[test]
    fn test_find_toolchain_root_in_nested_dir() {
        let temp = tempdir().expect("failed to create temp dir");
        let nested = temp.path().join("corev-openhw-gcc");
        fs::create_dir_all(nested.join("bin")).unwrap();
        fs::write(nested.join("bin/riscv32-corev-elf-gcc"), "").unwrap();

        assert_eq!(find_toolchain_root(temp.path()), Some(nested));
    }

    #[test]
    fn test_plan_extract_arguments() {
        let inv = plan_extract(Path::new("/cache/tc.tar.gz"), Path::new("/toolchains/corev"));
        assert_eq!(inv.program(), "tar");
        assert_eq!(
            inv.args(),
            &["-xzf", "/cache/tc.tar.gz", "-C", "/toolchains/corev"]
        );
    }
}
