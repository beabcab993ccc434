//! Repository acquisition using the `git2` crate.
//!
//! Wraps libgit2 for cloning and pinning the upstream checkouts instead
//! of shelling out to a `git` binary. A repository that is already
//! present is left in place; branch/commit pinning and submodule
//! initialization run on every sync so a stale checkout converges to
//! the configured state.

use std::path::Path;

use colored::Colorize;
use git2::build::RepoBuilder;
use git2::Repository;

use crate::config::Config;
use crate::error::GitError;
use crate::models::RepoSpec;
use crate::workspace::Workspace;

/// Clone or update every configured repository into `external/`.
pub fn sync_all(config: &Config, workspace: &Workspace) -> Result<(), GitError> {
    workspace.ensure_external()?;
    for (name, spec) in config.repos() {
        println!("{}", format!("Syncing {}", name).bold());
        sync_repo(spec, &workspace.repo_dir(name))?;
    }
    Ok(())
}

/// Clone one repository if absent, then pin it to the configured
/// branch/commit and initialize submodules recursively.
pub fn sync_repo(spec: &RepoSpec, dest: &Path) -> Result<(), GitError> {
    let repo = if dest.exists() {
        println!("{} {}", "✔ repo already present:".green(), dest.display());
        Repository::open(dest).map_err(|e| {
            GitError::Clone(format!("failed to open {}: {}", dest.display(), e))
        })?
    } else {
        clone(&spec.url, dest)?
    };

    if let Some(branch) = &spec.branch {
        checkout(&repo, branch)?;
    }
    if let Some(commit) = &spec.commit {
        checkout(&repo, commit)?;
    }

    update_submodules(&repo)
}

/// Clone a repository, reporting transfer progress on the way.
fn clone(url: &str, dest: &Path) -> Result<Repository, GitError> {
    println!("  cloning {} → {}", url.cyan(), dest.display());

    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.transfer_progress(|progress| {
        let received = progress.received_objects();
        let total = progress.total_objects();
        if total > 0 && received % 512 == 0 {
            log::debug!("clone progress: {}/{} objects", received, total);
        }
        true
    });

    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    builder
        .clone(url, dest)
        .map_err(|e| GitError::Clone(format!("failed to clone {} to {}: {}", url, dest.display(), e)))
}

/// Check out a branch, tag or commit and leave HEAD detached on it.
///
/// Bare names that only exist as remote-tracking branches are retried
/// as `origin/<name>`.
fn checkout(repo: &Repository, reference: &str) -> Result<(), GitError> {
    let obj = repo
        .revparse_single(reference)
        .or_else(|_| repo.revparse_single(&format!("origin/{}", reference)))
        .map_err(|e| {
            GitError::RefNotFound(format!("failed to resolve '{}': {}", reference, e))
        })?;

    repo.checkout_tree(&obj, None)
        .map_err(|e| GitError::Checkout(format!("failed to check out {}: {}", reference, e)))?;

    let target = match obj.as_tag() {
        Some(tag) => tag
            .target()
            .map_err(|e| GitError::Checkout(format!("failed to peel tag {}: {}", reference, e)))?
            .id(),
        None => obj.id(),
    };
    repo.set_head_detached(target)
        .map_err(|e| GitError::Checkout(format!("failed to set HEAD to {}: {}", reference, e)))?;

    log::info!("checked out {} at {}", reference, target);
    Ok(())
}

/// Initialize and update submodules, recursing into nested ones.
fn update_submodules(repo: &Repository) -> Result<(), GitError> {
    for mut submodule in repo
        .submodules()
        .map_err(|e| GitError::Submodule(e.to_string()))?
    {
        submodule
            .update(true, None)
            .map_err(|e| {
                GitError::Submodule(format!(
                    "failed to update '{}': {}",
                    submodule.name().unwrap_or("<non-utf8>"),
                    e
                ))
            })?;
        if let Ok(subrepo) = submodule.open() {
            update_submodules(&subrepo)?;
        }
    }
    Ok(())
}

/// Current HEAD commit of a checkout, for diagnostics.
pub fn head_commit(repo_dir: &Path) -> Result<String, GitError> {
    let repo = Repository::open(repo_dir)?;
    let head = repo.head()?;
    let commit = head
        .target()
        .ok_or_else(|| GitError::Checkout("HEAD is not a direct reference".to_string()))?;
    Ok(commit.to_string())
}
