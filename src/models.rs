//! Configuration records for the demo harness.
//!
//! These are plain data carriers loaded once from the YAML files under
//! `configs/` and read-only thereafter.

use serde::Deserialize;
use std::path::PathBuf;

/// One upstream repository to clone into `external/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoSpec {
    /// Clone URL (anything libgit2 understands).
    pub url: String,
    /// Branch (or tag) to check out after cloning.
    #[serde(default)]
    pub branch: Option<String>,
    /// Commit to pin the checkout to; applied after `branch`.
    #[serde(default)]
    pub commit: Option<String>,
}

/// One CVA6 bitstream configuration for the Genesys2 board.
#[derive(Debug, Clone, Deserialize)]
pub struct FpgaConfig {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_board")]
    pub board: String,
    /// CVA6 target string passed as `target=` to the cva6 makefile.
    #[serde(default = "default_cva6_target")]
    pub target: String,
    #[serde(default = "default_make_target")]
    pub make_target: String,
    /// Bitfile location relative to the cheri-cva6 checkout.
    #[serde(default = "default_bitfile")]
    pub bitfile: PathBuf,
    /// Vivado TCL flash script relative to the cheri-cva6 checkout.
    #[serde(default = "default_flash_script")]
    pub flash_script: PathBuf,
}

fn default_board() -> String {
    "genesys2".to_string()
}

fn default_cva6_target() -> String {
    "cv64a6_imafdchzcheri_sv39".to_string()
}

fn default_make_target() -> String {
    "fpga".to_string()
}

fn default_bitfile() -> PathBuf {
    PathBuf::from("build/fpga/cv64a6_imafdchzcheri_sv39/genesys2.bit")
}

fn default_flash_script() -> PathBuf {
    PathBuf::from("fpga/scripts/program_genesys2.tcl")
}

/// A named software stack: which boot-chain stages to build and where
/// their artifacts end up.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSpec {
    /// Full CheriBSD via cheribuild, booted from SD through U-Boot.
    Cheribsd(CheribsdTarget),
    /// Bao hypervisor with a baremetal guest, bundled into an OpenSBI
    /// fw_payload.
    BaoBundle(BaoBundleTarget),
    /// A baremetal application bundled directly into an OpenSBI
    /// fw_payload (no hypervisor, no U-Boot).
    Baremetal(BaremetalTarget),
}

impl TargetSpec {
    /// The configuration-file spelling of this target's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TargetSpec::Cheribsd(_) => "cheribsd",
            TargetSpec::BaoBundle(_) => "bao_bundle",
            TargetSpec::Baremetal(_) => "baremetal",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheribsdTarget {
    /// cheribuild target that provisions the SDK.
    #[serde(default = "default_sdk_target")]
    pub sdk_target: String,
    /// cheribuild target that builds the OS image itself.
    pub cheribuild_target: String,
    pub opensbi_platform: String,
    pub uboot_defconfig: String,
    /// Rootfs image name under cheribuild's output directory.
    #[serde(default = "default_rootfs_img")]
    pub rootfs_img: String,
}

fn default_sdk_target() -> String {
    "sdk-riscv64-purecap".to_string()
}

fn default_rootfs_img() -> String {
    "rootfs-riscv64-purecap.img".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaoBundleTarget {
    /// Repo name (from repos.yaml) of the Bao hypervisor checkout.
    pub bao_repo: String,
    /// Repo name of the guest application checkout.
    pub guest_repo: String,
    /// Bao platform/config name passed as `CONFIG=` to its makefile.
    pub bao_config: String,
    /// Bao ELF path relative to the bao checkout.
    pub bao_elf: PathBuf,
    /// Guest ELF path relative to the guest checkout.
    pub guest_elf: PathBuf,
    #[serde(default = "default_make_all")]
    pub guest_make_target: String,
    pub opensbi_platform: String,
    /// Bundle output path relative to external/.
    pub bundle_output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaremetalTarget {
    /// Repo name (from repos.yaml) of the application checkout.
    pub app_repo: String,
    /// App ELF path relative to the app checkout.
    pub app_elf: PathBuf,
    #[serde(default = "default_make_all")]
    pub app_make_target: String,
    pub opensbi_platform: String,
    /// Bundle output path relative to external/.
    pub bundle_output: PathBuf,
}

fn default_make_all() -> String {
    "all".to_string()
}
