//! Reproducibility harness for CheriBSD / Bao / baremetal demos on
//! CVA6-CHERI (Genesys2 FPGA).
//!
//! The harness clones a fixed set of upstream repositories, drives
//! their native build systems with parameters from the YAML files under
//! `configs/`, collects the resulting binaries into boot images, and
//! optionally writes those images to an SD card or programs the FPGA.
//!
//! Modules:
//! - **cli**: command-line surface
//! - **config** / **models**: declarative configuration records
//! - **workspace**: harness directory layout
//! - **command**: external command planning and execution
//! - **git**: repository acquisition
//! - **toolchain**: RISC-V cross toolchain provisioning
//! - **sdk**: cheribuild invocations
//! - **boot**: boot-chain assembly (OpenSBI, U-Boot, Bao, baremetal)
//! - **software**: software target dispatch
//! - **fpga**: bitstream build and flashing
//! - **sdcard**: SD card formatting and image writing

pub mod boot;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod fpga;
pub mod git;
pub mod models;
pub mod sdcard;
pub mod sdk;
pub mod software;
pub mod toolchain;
pub mod workspace;

pub use command::Invocation;
pub use config::Config;
pub use error::{
    BuildError, CommandError, ConfigError, FlashError, GitError, SdError, ToolchainError,
};
pub use models::{FpgaConfig, RepoSpec, TargetSpec};
pub use workspace::Workspace;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
