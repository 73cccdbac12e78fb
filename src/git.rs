//! The git driver.
//!
//! Satisfies a request by cloning-or-updating a working copy and checking the
//! requested ref out as a detached HEAD:
//!
//! 1. Open the working copy, or initialize one and add the `origin` remote
//! 2. Connect, download objects, update remote-tracking refs
//! 3. Resolve the ref, check out its tree, detach HEAD at the commit
//!
//! An existing working copy must track the requested URL as `origin`.

use crate::config::CheckoutMode;
use crate::credentials::CredentialPrompt;
use crate::engine::{Driver, Implementation};
use crate::progress::ProgressReporter;
use anyhow::Result;
use colored::*;
use git2::build::CheckoutBuilder;
use git2::{
    AutotagOption, Direction, FetchOptions, Object, Oid, Remote, RemoteCallbacks,
    RemoteUpdateFlags, Repository,
};
use std::cell::RefCell;
use std::path::Path;
use thiserror::Error;

pub const ORIGIN: &str = "origin";

#[derive(Debug, Error)]
pub enum GitDriverError {
    #[error("different origin: working copy tracks '{found}', requested '{expected}'")]
    DifferentOrigin { expected: String, found: String },
    #[error("missing '{0}' value")]
    MissingValue(&'static str),
    #[error("remote did not advertise a default branch")]
    NoDefaultBranch,
    /// libgit2's message, unchanged. Not exposed as `source()` so error
    /// chains print the message once.
    #[error("{}", .0.message())]
    Git(git2::Error),
}

impl From<git2::Error> for GitDriverError {
    fn from(err: git2::Error) -> Self {
        Self::Git(err)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GitOptions {
    pub checkout: CheckoutMode,
    /// Allow prompting for credentials on the console.
    pub interactive: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl Default for GitOptions {
    fn default() -> Self {
        Self {
            checkout: CheckoutMode::Safe,
            interactive: true,
            quiet: false,
            verbose: false,
        }
    }
}

pub struct GitDriver {
    options: GitOptions,
}

impl GitDriver {
    pub fn new(options: GitOptions) -> Self {
        Self { options }
    }

    /// Bring the working copy at `path` to `tag` (or the remote's default
    /// branch) and return the checked out commit.
    pub fn sync(&self, path: &Path, href: &str, tag: Option<&str>) -> Result<Oid, GitDriverError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let (repo, existing) = open_or_init(path)?;
        let mut origin = ensure_origin(&repo, href, existing)?;

        let prompt = CredentialPrompt::new(self.options.interactive);
        let reporter = RefCell::new(ProgressReporter::new(&name, self.options.quiet));
        if existing {
            self.note(&reporter, format!("Updating {}", path.display()));
        } else {
            self.note(&reporter, format!("Initialized {}", path.display()));
        }

        let result = self.fetch_and_checkout(&repo, &mut origin, tag, &prompt, &reporter);

        let reporter = reporter.into_inner();
        match &result {
            Ok(oid) => reporter.finish(format!(
                "{} {} at {}",
                "✓".green(),
                tag.unwrap_or("default branch"),
                short_id(*oid)
            )),
            Err(_) => reporter.finish(format!("{} Failed", "x".red())),
        }
        result
    }

    fn fetch_and_checkout<'cb>(
        &self,
        repo: &Repository,
        origin: &mut Remote<'_>,
        tag: Option<&str>,
        prompt: &'cb CredentialPrompt,
        reporter: &'cb RefCell<ProgressReporter>,
    ) -> Result<Oid, GitDriverError> {
        self.note(reporter, format!("Connecting to {}", origin.url().unwrap_or("?")));
        let mut connection = origin.connect_auth(
            Direction::Fetch,
            Some(remote_callbacks(prompt, reporter)),
            None,
        )?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(prompt, reporter));
        fetch_options.download_tags(AutotagOption::All);
        fetch_options.update_fetchhead(false);

        self.note(reporter, "Downloading objects".to_string());
        connection
            .remote()
            .download(&[] as &[&str], Some(&mut fetch_options))?;
        connection.remote().update_tips(
            None,
            RemoteUpdateFlags::empty(),
            AutotagOption::All,
            None,
        )?;

        let target = match tag {
            Some(tag) => tag.to_string(),
            None => {
                let head = connection.remote().default_branch()?;
                head.as_str()
                    .and_then(tracking_ref)
                    .ok_or(GitDriverError::NoDefaultBranch)?
            }
        };
        drop(connection);

        self.note(reporter, format!("Checking out {}", target));
        let object = resolve_target(repo, &target)?;
        let commit = object.peel_to_commit()?;

        let mut checkout = CheckoutBuilder::new();
        match self.options.checkout {
            CheckoutMode::Safe => {
                checkout.safe();
            }
            CheckoutMode::Force => {
                checkout.force();
            }
        }
        checkout.progress(|path, completed, total| {
            reporter.borrow_mut().checkout(path, completed, total);
        });
        repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        repo.set_head_detached(commit.id())?;

        Ok(commit.id())
    }

    fn note(&self, reporter: &RefCell<ProgressReporter>, message: String) {
        if self.options.verbose {
            reporter
                .borrow()
                .suspend(|| println!("   {} {}", "·".dimmed(), message));
        }
    }
}

impl Driver for GitDriver {
    fn name(&self) -> &str {
        "git"
    }

    fn download(&self, implementation: &Implementation) -> Result<()> {
        let href = implementation
            .value("href")
            .ok_or(GitDriverError::MissingValue("href"))?;
        self.sync(implementation.name(), href, implementation.value("tag"))?;
        Ok(())
    }
}

fn remote_callbacks<'cb>(
    prompt: &'cb CredentialPrompt,
    reporter: &'cb RefCell<ProgressReporter>,
) -> RemoteCallbacks<'cb> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed| {
        reporter
            .borrow()
            .suspend(|| prompt.acquire(url, username_from_url, allowed))
    });
    callbacks.transfer_progress(move |stats| {
        reporter.borrow_mut().transfer(&stats);
        true
    });
    callbacks
}

fn open_or_init(path: &Path) -> Result<(Repository, bool), GitDriverError> {
    match Repository::open(path) {
        Ok(repo) => Ok((repo, true)),
        Err(_) => Ok((Repository::init(path)?, false)),
    }
}

fn ensure_origin<'r>(
    repo: &'r Repository,
    href: &str,
    existing: bool,
) -> Result<Remote<'r>, GitDriverError> {
    if !existing {
        return Ok(repo.remote(ORIGIN, href)?);
    }

    let remote = repo.find_remote(ORIGIN)?;
    if remote.url() != Some(href) {
        return Err(GitDriverError::DifferentOrigin {
            expected: href.to_string(),
            found: remote.url().unwrap_or_default().to_string(),
        });
    }
    Ok(remote)
}

/// Rev-parse `revspec`, falling back to the remote-tracking branch of the same
/// name since fetched branches only exist under `refs/remotes/origin`.
fn resolve_target<'r>(repo: &'r Repository, revspec: &str) -> Result<Object<'r>, GitDriverError> {
    match repo.revparse_single(revspec) {
        Ok(object) => Ok(object),
        Err(err) => repo
            .revparse_single(&format!("{}/{}", ORIGIN, revspec))
            .map_err(|_| GitDriverError::Git(err)),
    }
}

/// Map an advertised `refs/heads/<branch>` to the local tracking ref.
fn tracking_ref(refname: &str) -> Option<String> {
    let branch = refname.strip_prefix("refs/heads/")?;
    if branch.is_empty() {
        return None;
    }
    Some(format!("refs/remotes/{}/{}", ORIGIN, branch))
}

fn short_id(oid: Oid) -> String {
    let mut id = oid.to_string();
    id.truncate(7);
    id
}
