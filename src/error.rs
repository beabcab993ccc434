//! Unified error type hierarchy for the demo harness.
//!
//! One enum per failure domain: configuration loading, external command
//! invocation, repository acquisition, toolchain provisioning, build
//! pipelines, FPGA flashing and SD card preparation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration file loading and lookup errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("invalid YAML in {file}: {source}")]
    InvalidYaml {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown CVA6 FPGA config: {0} (see 'cheridemo list-configs')")]
    UnknownFpgaConfig(String),

    #[error("unknown software target: {0} (see 'cheridemo list-sw')")]
    UnknownTarget(String),

    #[error("default entry '{name}' in {file} does not name a configured entry")]
    MissingDefault { file: String, name: String },

    #[error("could not locate the harness root (no configs/repos.yaml at or above {0}); set CHERIDEMO_ROOT")]
    RootNotFound(String),

    #[error("IO error during config operations: {0}")]
    Io(#[from] io::Error),
}

/// External command invocation errors.
///
/// The rendered command line is carried so the user sees exactly which
/// invocation failed and with what status.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command exited with status {code}: {command}")]
    Failed { command: String, code: i32 },

    #[error("command terminated by signal: {command}")]
    Terminated { command: String },
}

/// Repository acquisition errors.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("clone failed: {0}")]
    Clone(String),

    #[error("checkout failed: {0}")]
    Checkout(String),

    #[error("reference not found: {0}")]
    RefNotFound(String),

    #[error("submodule update failed: {0}")]
    Submodule(String),

    #[error("git error: {0}")]
    Git2(#[from] git2::Error),

    #[error("IO error during repository sync: {0}")]
    Io(#[from] io::Error),
}

/// RISC-V cross toolchain provisioning errors.
#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("toolchain download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("extracted toolchain does not contain a usable RISC-V root under {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("IO error during toolchain setup: {0}")]
    Io(#[from] io::Error),
}

/// Build pipeline errors shared by the SDK, software and FPGA stages.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("repository '{0}' not found under external/ (run 'cheridemo clone' first)")]
    RepoMissing(String),

    #[error("expected build artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("IO error during build: {0}")]
    Io(#[from] io::Error),
}

/// FPGA flashing errors.
#[derive(Error, Debug)]
pub enum FlashError {
    #[error("flash script not found: {} (check 'flash_script' in configs/cva6_configs.yaml)", .0.display())]
    ScriptMissing(PathBuf),

    #[error("Vivado hw_server not found in PATH (source Vivado's settings64.sh first)")]
    HwServerNotFound,

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("IO error during flashing: {0}")]
    Io(#[from] io::Error),
}

/// SD card preparation errors.
#[derive(Error, Debug)]
pub enum SdError {
    #[error("'{0}' does not look like a block device path (expected /dev/...)")]
    NotBlockDevice(String),

    #[error("target '{name}' (kind={kind}) does not boot from an SD card in this demo")]
    WrongTargetKind { name: String, kind: String },

    #[error("rootfs image not found: {} (build the '{target}' target first)", .image.display())]
    ImageMissing { image: PathBuf, target: String },

    #[error("cannot determine the home directory holding the cheribuild output tree")]
    HomeDirUnavailable,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Command(#[from] CommandError),
}
