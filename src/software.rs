//! Software target dispatch (`build-sw` subcommand).

use colored::Colorize;

use crate::boot;
use crate::command;
use crate::config::Config;
use crate::error::BuildError;
use crate::models::{CheribsdTarget, TargetSpec};
use crate::sdk::{self, CHERIBUILD_REPO};
use crate::workspace::Workspace;

/// Build one named software stack; `None` selects the configured
/// default target.
pub fn build_software(
    workspace: &Workspace,
    config: &Config,
    name: Option<&str>,
    jobs: u32,
) -> Result<(), BuildError> {
    let (name, spec) = config.target(name)?;
    println!(
        "{} {} (kind={})",
        "Building software target".bold(),
        name.cyan(),
        spec.kind()
    );

    match spec {
        TargetSpec::Cheribsd(target) => build_cheribsd(workspace, target, jobs),
        TargetSpec::BaoBundle(target) => {
            boot::build_bao_bundle(workspace, target, jobs).map(|_| ())
        }
        TargetSpec::Baremetal(target) => {
            boot::build_baremetal_bundle(workspace, target, jobs).map(|_| ())
        }
    }
}

/// CheriBSD flow: SDK target, OS target, then the OpenSBI + U-Boot
/// boot chain.
fn build_cheribsd(
    workspace: &Workspace,
    target: &CheribsdTarget,
    jobs: u32,
) -> Result<(), BuildError> {
    let cheribuild = workspace.require_repo(CHERIBUILD_REPO)?;

    println!("• building SDK via cheribuild target {}", target.sdk_target.cyan());
    command::run(&sdk::plan_cheribuild(&cheribuild, &target.sdk_target, jobs))?;

    println!(
        "• building CheriBSD via cheribuild target {}",
        target.cheribuild_target.cyan()
    );
    command::run(&sdk::plan_cheribuild(&cheribuild, &target.cheribuild_target, jobs))?;

    boot::build_cheribsd_boot_chain(
        workspace,
        &target.opensbi_platform,
        &target.uboot_defconfig,
        jobs,
    )?;
    Ok(())
}
