//! Boot-chain assembly.
//!
//! Builds firmware/bootloader/hypervisor/application projects in a fixed
//! dependency order, chaining each stage's artifact into the next
//! stage's build as `FW_PAYLOAD_PATH`, until a single bootable
//! `fw_payload.bin` bundle exists under `external/boot-artifacts/`.
//!
//! Each stage has a pure planning function producing [`Invocation`]s and
//! an executor that runs them and checks the expected artifacts; the
//! chain planners concatenate the per-stage plans so the fixed order is
//! visible to tests without running any external tool.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::command::{self, Invocation};
use crate::error::BuildError;
use crate::models::{BaoBundleTarget, BaremetalTarget};
use crate::workspace::Workspace;

pub const OPENSBI_REPO: &str = "opensbi";
pub const UBOOT_REPO: &str = "uboot";

/// Bundle name produced by the CheriBSD boot chain.
pub const UBOOT_BUNDLE_NAME: &str = "opensbi_uboot_fw_payload.bin";

// --- OpenSBI ---

/// OpenSBI build: `make distclean` then `make PLATFORM=<p>` with an
/// optional `FW_PAYLOAD_PATH`.
pub fn plan_opensbi(repo: &Path, platform: &str, payload: Option<&Path>) -> Vec<Invocation> {
    let mut args = vec![format!("PLATFORM={}", platform)];
    if let Some(payload) = payload {
        args.push(format!("FW_PAYLOAD_PATH={}", payload.display()));
    }
    vec![
        Invocation::new("make", ["distclean"]).cwd(repo),
        Invocation::new("make", args).cwd(repo),
    ]
}

/// Where OpenSBI leaves the combined firmware+payload image.
pub fn opensbi_payload_path(repo: &Path, platform: &str) -> PathBuf {
    repo.join("build")
        .join(platform)
        .join("firmware")
        .join("fw_payload.bin")
}

/// Build OpenSBI for a platform, optionally embedding a payload, and
/// optionally copying the resulting `fw_payload.bin` to `output`.
pub fn build_opensbi(
    workspace: &Workspace,
    platform: &str,
    payload: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), BuildError> {
    let repo = workspace.require_repo(OPENSBI_REPO)?;
    println!("• building OpenSBI for platform {}", platform.cyan());

    command::run_all(&plan_opensbi(&repo, platform, payload))?;

    if let Some(output) = output {
        let built = opensbi_payload_path(&repo, platform);
        if !built.exists() {
            return Err(BuildError::ArtifactMissing(built));
        }
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&built, output)?;
    }
    Ok(())
}

// --- U-Boot ---

/// U-Boot build: `make distclean`, `make <defconfig>`, `make -jN`.
pub fn plan_uboot(repo: &Path, defconfig: &str, jobs: u32) -> Vec<Invocation> {
    vec![
        Invocation::new("make", ["distclean"]).cwd(repo),
        Invocation::new("make", [defconfig]).cwd(repo),
        Invocation::new("make", [format!("-j{}", jobs)]).cwd(repo),
    ]
}

/// Build U-Boot and return the path of the produced `u-boot.bin`.
pub fn build_uboot(workspace: &Workspace, defconfig: &str, jobs: u32) -> Result<PathBuf, BuildError> {
    let repo = workspace.require_repo(UBOOT_REPO)?;
    println!("• building U-Boot with defconfig {}", defconfig.cyan());

    command::run_all(&plan_uboot(&repo, defconfig, jobs))?;

    let uboot_bin = repo.join("u-boot.bin");
    if !uboot_bin.exists() {
        return Err(BuildError::ArtifactMissing(uboot_bin));
    }
    Ok(uboot_bin)
}

// --- CheriBSD boot chain (OpenSBI + U-Boot) ---

/// The full CheriBSD boot-chain plan, in order: U-Boot stages first,
/// then OpenSBI embedding `u-boot.bin` as its payload.
pub fn plan_cheribsd_boot_chain(
    uboot_repo: &Path,
    opensbi_repo: &Path,
    defconfig: &str,
    platform: &str,
    jobs: u32,
) -> Vec<Invocation> {
    let uboot_bin = uboot_repo.join("u-boot.bin");
    let mut plan = plan_uboot(uboot_repo, defconfig, jobs);
    plan.extend(plan_opensbi(opensbi_repo, platform, Some(&uboot_bin)));
    plan
}

/// Build the OpenSBI + U-Boot chain used by the CheriBSD-on-SD flow and
/// return the bundle path.
pub fn build_cheribsd_boot_chain(
    workspace: &Workspace,
    platform: &str,
    defconfig: &str,
    jobs: u32,
) -> Result<PathBuf, BuildError> {
    println!("{}", "Building CheriBSD boot chain (OpenSBI + U-Boot)".bold());

    let uboot_bin = build_uboot(workspace, defconfig, jobs)?;

    let output = workspace.artifacts_dir().join(UBOOT_BUNDLE_NAME);
    build_opensbi(workspace, platform, Some(&uboot_bin), Some(&output))?;
    println!("  OpenSBI+U-Boot fw_payload: {}", output.display().to_string().magenta());
    Ok(output)
}

// --- Bao hypervisor bundle ---

/// Guest application build inside its checkout.
pub fn plan_guest(guest_repo: &Path, make_target: &str, jobs: u32) -> Invocation {
    Invocation::new("make", [make_target.to_string(), format!("-j{}", jobs)]).cwd(guest_repo)
}

/// Bao hypervisor build with its platform config.
pub fn plan_bao(bao_repo: &Path, config: &str, jobs: u32) -> Invocation {
    Invocation::new(
        "make",
        [format!("CONFIG={}", config), format!("-j{}", jobs)],
    )
    .cwd(bao_repo)
}

/// The full Bao bundle plan, in order: guest app, Bao hypervisor,
/// OpenSBI embedding the Bao ELF.
pub fn plan_bao_bundle(
    bao_repo: &Path,
    guest_repo: &Path,
    opensbi_repo: &Path,
    target: &BaoBundleTarget,
    jobs: u32,
) -> Vec<Invocation> {
    let bao_elf = bao_repo.join(&target.bao_elf);
    let mut plan = vec![
        plan_guest(guest_repo, &target.guest_make_target, jobs),
        plan_bao(bao_repo, &target.bao_config, jobs),
    ];
    plan.extend(plan_opensbi(
        opensbi_repo,
        &target.opensbi_platform,
        Some(&bao_elf),
    ));
    plan
}

/// Build the Bao + guest + OpenSBI monolithic bundle and return its
/// path.
pub fn build_bao_bundle(
    workspace: &Workspace,
    target: &BaoBundleTarget,
    jobs: u32,
) -> Result<PathBuf, BuildError> {
    let bao_repo = workspace.require_repo(&target.bao_repo)?;
    let guest_repo = workspace.require_repo(&target.guest_repo)?;
    let bundle_output = workspace.external_dir().join(&target.bundle_output);

    println!("{}", "Building Bao + baremetal guest bundle".bold());

    println!("• building Bao guest in {}", target.guest_repo.cyan());
    command::run(&plan_guest(&guest_repo, &target.guest_make_target, jobs))?;
    let guest_elf = guest_repo.join(&target.guest_elf);
    if !guest_elf.exists() {
        return Err(BuildError::ArtifactMissing(guest_elf));
    }

    println!("• building Bao hypervisor in {}", target.bao_repo.cyan());
    command::run(&plan_bao(&bao_repo, &target.bao_config, jobs))?;
    let bao_elf = bao_repo.join(&target.bao_elf);
    if !bao_elf.exists() {
        return Err(BuildError::ArtifactMissing(bao_elf));
    }

    println!(
        "• building OpenSBI fw_payload bundle → {}",
        bundle_output.display().to_string().magenta()
    );
    build_opensbi(
        workspace,
        &target.opensbi_platform,
        Some(&bao_elf),
        Some(&bundle_output),
    )?;
    Ok(bundle_output)
}

// --- Baremetal bundle ---

/// The full baremetal bundle plan: app build, then OpenSBI embedding
/// the app ELF.
pub fn plan_baremetal_bundle(
    app_repo: &Path,
    opensbi_repo: &Path,
    target: &BaremetalTarget,
    jobs: u32,
) -> Vec<Invocation> {
    let app_elf = app_repo.join(&target.app_elf);
    let mut plan = vec![plan_guest(app_repo, &target.app_make_target, jobs)];
    plan.extend(plan_opensbi(
        opensbi_repo,
        &target.opensbi_platform,
        Some(&app_elf),
    ));
    plan
}

/// Build the OpenSBI + baremetal bundle (no Bao, no U-Boot) and return
/// its path.
pub fn build_baremetal_bundle(
    workspace: &Workspace,
    target: &BaremetalTarget,
    jobs: u32,
) -> Result<PathBuf, BuildError> {
    let app_repo = workspace.require_repo(&target.app_repo)?;
    let bundle_output = workspace.external_dir().join(&target.bundle_output);

    println!("{}", "Building OpenSBI + baremetal bundle".bold());

    println!("• building baremetal app in {}", target.app_repo.cyan());
    command::run(&plan_guest(&app_repo, &target.app_make_target, jobs))?;
    let app_elf = app_repo.join(&target.app_elf);
    if !app_elf.exists() {
        return Err(BuildError::ArtifactMissing(app_elf));
    }

    println!(
        "• building OpenSBI+baremetal bundle → {}",
        bundle_output.display().to_string().magenta()
    );
    build_opensbi(
        workspace,
        &target.opensbi_platform,
        Some(&app_elf),
        Some(&bundle_output),
    )?;
    Ok(bundle_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_opensbi_without_payload() {
        let plan = plan_opensbi(Path::new("/x/opensbi"), "fpga/ariane", None);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].args(), &["distclean"]);
        assert_eq!(plan[1].args(), &["PLATFORM=fpga/ariane"]);
        assert_eq!(plan[1].workdir(), Some(Path::new("/x/opensbi")));
    }

    #[test]
    fn test_plan_opensbi_with_payload() {
        let plan = plan_opensbi(
            Path::new("/x/opensbi"),
            "generic",
            Some(Path::new("/x/bao/bao.elf")),
        );
        assert_eq!(
            plan[1].args(),
            &["PLATFORM=generic", "FW_PAYLOAD_PATH=/x/bao/bao.elf"]
        );
    }

    #[test]
    fn test_plan_uboot_order() {
        let plan = plan_uboot(Path::new("/x/uboot"), "cheri_cva6_genesys2_defconfig", 8);
        let args: Vec<_> = plan.iter().map(|inv| inv.args().join(" ")).collect();
        assert_eq!(args, ["distclean", "cheri_cva6_genesys2_defconfig", "-j8"]);
    }

    #[test]
    fn test_opensbi_payload_path_layout() {
        let path = opensbi_payload_path(Path::new("/x/opensbi"), "fpga/ariane");
        assert_eq!(
            path,
            PathBuf::from("/x/opensbi/build/fpga/ariane/firmware/fw_payload.bin")
        );
    }
}
