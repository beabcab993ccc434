//! CHERI SDK and CheriBSD builds via cheribuild.

use std::path::Path;

use colored::Colorize;

use crate::command::{self, Invocation};
use crate::error::BuildError;
use crate::workspace::Workspace;

/// Repo name of the cheribuild checkout in repos.yaml.
pub const CHERIBUILD_REPO: &str = "cheribuild";

/// cheribuild target provisioning the purecap RISC-V SDK.
pub const DEFAULT_SDK_TARGET: &str = "sdk-riscv64-purecap";

/// One cheribuild invocation: `./cheribuild.py <target> -d -jN`.
///
/// `-d` pulls in dependency targets, matching how the demo drives
/// cheribuild everywhere.
pub fn plan_cheribuild(checkout: &Path, target: &str, jobs: u32) -> Invocation {
    Invocation::new(
        "./cheribuild.py",
        [target.to_string(), "-d".to_string(), format!("-j{}", jobs)],
    )
    .cwd(checkout)
}

/// Build the CHERI SDK (`build-sdk` subcommand).
pub fn build_sdk(workspace: &Workspace, jobs: u32) -> Result<(), BuildError> {
    let checkout = workspace.require_repo(CHERIBUILD_REPO)?;
    println!("{}", "Building CHERI SDK via cheribuild".bold());
    command::run(&plan_cheribuild(&checkout, DEFAULT_SDK_TARGET, jobs))?;
    Ok(())
}
