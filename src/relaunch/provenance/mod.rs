use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use git2::Repository;
use relaunch_lib::bailc;
use relaunch_lib::ctx;

/// What version control knows about a script cleared for launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// The script's path relative to the repository root. This is the path
    /// the continuation artifact invokes inside the snapshot.
    pub rel_path: PathBuf,

    /// The short hash of HEAD, used for release run names.
    pub short_rev: String,
}

impl Provenance {
    /// The script's base name, shared by the experiment name and the Slurm
    /// job name.
    pub fn job_name(&self) -> String {
        self.rel_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "job".to_string())
    }

    /// Confirm that a script is tracked by version control.
    ///
    /// A continuation artifact referencing code outside version control
    /// cannot be reproduced later, so an untracked script is a hard error
    /// for the whole launch, never a skip.
    pub fn verify(script: &Path) -> Result<Provenance> {
        let canonical = script.canonicalize().with_context(ctx!(
          "Could not resolve the script path {script:?}", ;
          "Ensure that the script exists",
        ))?;

        let start = canonical
            .parent()
            .ok_or_else(|| anyhow!("The script {script:?} has no parent directory"))?;

        let repo = Repository::discover(start).with_context(ctx!(
          "The script {script:?} is not inside a git repository", ;
          "Only scripts under version control can be launched reproducibly",
        ))?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| anyhow!("The repository containing {script:?} is bare"))?
            .canonicalize()?;

        let rel_path = canonical
            .strip_prefix(&workdir)
            .with_context(ctx!(
              "The script {script:?} lies outside the repository work tree", ;
              "Move the script into the repository and commit it",
            ))?
            .to_path_buf();

        let index = repo.index().with_context(ctx!(
          "Could not read the git index of {workdir:?}", ;
          "",
        ))?;

        if index.get_path(&rel_path, 0).is_none() {
            bailc!(
                "Untracked script", ;
                "{script:?} exists on disk but is not tracked by git", ;
                "Run `git add {}` so the launch can be reproduced later", rel_path.display(),
            );
        }

        let head = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .with_context(ctx!(
              "Could not resolve HEAD of the repository at {workdir:?}", ;
              "The repository needs at least one commit before launching",
            ))?;

        let short_rev = head
            .as_object()
            .short_id()
            .with_context(ctx!("Could not abbreviate the HEAD commit id", ; "",))?
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(Provenance {
            rel_path,
            short_rev,
        })
    }
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
