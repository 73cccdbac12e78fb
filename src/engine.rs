//! Request resolution and driver dispatch.
//!
//! The engine turns request strings into [`Implementation`]s and hands each
//! one to the [`Driver`] registered for its type. Resolution happens for all
//! requests before anything is downloaded, so an unsatisfiable request never
//! leaves a partial set of working copies behind.

use crate::config::Manifest;
use crate::request::Request;
use anyhow::{Context, Result, anyhow};
use colored::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A resolved request: where to put it, which driver handles it, and the
/// driver-specific values (`href`, `tag`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    name: PathBuf,
    driver: String,
    values: BTreeMap<String, String>,
}

impl Implementation {
    pub fn new(name: impl Into<PathBuf>, driver: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Filesystem path of the working copy.
    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Knows how to satisfy one class of requirement.
pub trait Driver {
    fn name(&self) -> &str;

    fn download(&self, implementation: &Implementation) -> Result<()>;
}

#[derive(Debug)]
pub enum RunOutcome {
    Satisfied,
    /// Requests that could not be resolved, with the reason for each.
    Unsatisfiable(Vec<(String, String)>),
    Failed(anyhow::Error),
}

impl RunOutcome {
    pub fn code(&self) -> i32 {
        match self {
            Self::Satisfied => 0,
            Self::Unsatisfiable(missing) => missing.len().try_into().unwrap_or(i32::MAX),
            Self::Failed(_) => -1,
        }
    }
}

pub struct Engine {
    manifest: Manifest,
    dest: PathBuf,
    drivers: Vec<Box<dyn Driver>>,
    requests: Vec<Request>,
    error_message: Option<String>,
    verbose: bool,
}

impl Engine {
    pub fn new(manifest: Manifest, dest: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            dest: dest.into(),
            drivers: Vec::new(),
            requests: Vec::new(),
            error_message: None,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn add_driver(&mut self, driver: Box<dyn Driver>) {
        self.drivers.push(driver);
    }

    pub fn add_request(&mut self, input: &str) -> Result<()> {
        let request =
            Request::parse(input).with_context(|| format!("Bad request '{}'", input))?;
        self.requests.push(request);
        Ok(())
    }

    /// Message of the last failed run.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn resolve(&self, request: &Request) -> Result<Implementation> {
        match request {
            Request::Inline { name, href, tag } => {
                let mut implementation =
                    Implementation::new(self.dest.join(name), "git").with_value("href", href);
                if let Some(tag) = tag {
                    implementation = implementation.with_value("tag", tag);
                }
                Ok(implementation)
            }
            Request::Named { name, tag } => {
                let project = self
                    .manifest
                    .project(name)
                    .ok_or_else(|| anyhow!("no project named '{}'", name))?;
                let href = project
                    .href
                    .as_deref()
                    .ok_or_else(|| anyhow!("project '{}' has no href", name))?;
                let path = match &project.path {
                    Some(path) if path.is_absolute() => path.clone(),
                    Some(path) => self.dest.join(path),
                    None => self.dest.join(name),
                };

                let mut implementation =
                    Implementation::new(path, project.driver.clone()).with_value("href", href);
                if let Some(tag) = tag.as_ref().or(project.tag.as_ref()) {
                    implementation = implementation.with_value("tag", tag.clone());
                }
                Ok(implementation)
            }
        }
    }

    fn find_driver(&self, name: &str) -> Option<&dyn Driver> {
        self.drivers
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.as_ref())
    }

    pub fn run(&mut self) -> RunOutcome {
        self.error_message = None;

        let mut resolved = Vec::new();
        let mut missing = Vec::new();
        for request in &self.requests {
            match self.resolve(request) {
                Ok(implementation) if self.find_driver(implementation.driver()).is_some() => {
                    resolved.push(implementation);
                }
                Ok(implementation) => missing.push((
                    request.to_string(),
                    format!("no driver for type '{}'", implementation.driver()),
                )),
                Err(err) => missing.push((request.to_string(), err.to_string())),
            }
        }

        if !missing.is_empty() {
            return RunOutcome::Unsatisfiable(missing);
        }

        for implementation in &resolved {
            let Some(driver) = self.find_driver(implementation.driver()) else {
                continue;
            };
            if self.verbose {
                println!(
                    "{} {} -> {}",
                    "→".cyan(),
                    implementation.value("href").unwrap_or_default(),
                    implementation.name().display()
                );
            }
            if let Err(err) = driver.download(implementation) {
                let message = format!("{:#}", err);
                self.error_message = Some(message);
                return RunOutcome::Failed(err);
            }
        }

        RunOutcome::Satisfied
    }
}
