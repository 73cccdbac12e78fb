//! Manifest (`fusel.toml`) parsing.
//!
//! The manifest declares projects by name and the settings shared by every
//! request. Command-line flags override the settings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "fusel.toml";

#[derive(Deserialize, Debug, Default)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    /// Base directory for working copies.
    pub dest: Option<PathBuf>,
    #[serde(default)]
    pub checkout: CheckoutMode,
    #[serde(default = "default_prompt")]
    pub prompt: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dest: None,
            checkout: CheckoutMode::default(),
            prompt: default_prompt(),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    /// Never overwrite local modifications.
    #[default]
    Safe,
    /// Make the working copy match the target exactly.
    Force,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Project {
    #[serde(default = "default_driver")]
    pub driver: String,
    pub href: Option<String>,
    pub tag: Option<String>,
    pub path: Option<PathBuf>,
}

fn default_driver() -> String {
    "git".to_string()
}

fn default_prompt() -> bool {
    true
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `./fusel.toml`, falling back to the user config directory.
    /// Returns an empty manifest when neither exists.
    pub fn find_default() -> Result<Self> {
        match default_locations().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(MANIFEST_FILE)];
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join("fusel").join(MANIFEST_FILE));
    }
    locations
}
