//! Request string parsing.
//!
//! A request is either the name of a project declared in the manifest,
//! optionally pinned with `@ref`, or an inline git URL:
//!
//! - `fmt`, `fmt@10.2.1`
//! - `https://github.com/fmtlib/fmt.git#10.2.1`
//! - `libfmt=git@github.com:fmtlib/fmt.git`

use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// A project declared in the manifest.
    Named { name: String, tag: Option<String> },
    /// A git URL given directly on the command line.
    Inline {
        name: String,
        href: String,
        tag: Option<String>,
    },
}

impl Request {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Empty request");
        }

        if let Some((name, url)) = input.split_once('=')
            && is_url(url)
        {
            let (href, tag) = split_ref(url, '#');
            if name.is_empty() || href.is_empty() {
                bail!("Invalid request '{}'", input);
            }
            check_name(name)?;
            return Ok(Self::Inline {
                name: name.to_string(),
                href: href.to_string(),
                tag,
            });
        }

        if is_url(input) {
            let (href, tag) = split_ref(input, '#');
            let Some(name) = name_from_url(href) else {
                bail!("Cannot derive a name from '{}'; use name=<url>", href);
            };
            check_name(&name)?;
            return Ok(Self::Inline {
                name,
                href: href.to_string(),
                tag,
            });
        }

        let (name, tag) = split_ref(input, '@');
        if name.is_empty() {
            bail!("Invalid request '{}'", input);
        }
        Ok(Self::Named {
            name: name.to_string(),
            tag,
        })
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named { name, tag: None } => write!(f, "{}", name),
            Self::Named {
                name,
                tag: Some(tag),
            } => write!(f, "{}@{}", name, tag),
            Self::Inline { href, tag: None, .. } => write!(f, "{}", href),
            Self::Inline {
                href,
                tag: Some(tag),
                ..
            } => write!(f, "{}#{}", href, tag),
        }
    }
}

fn is_url(s: &str) -> bool {
    s.contains("://") || s.starts_with("git@") || s.ends_with(".git") || s.contains(".git#")
}

/// Working copy names are joined onto the destination directory and must
/// stay inside it.
fn check_name(name: &str) -> Result<()> {
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("Invalid working copy name '{}'", name);
    }
    Ok(())
}

fn split_ref(s: &str, sep: char) -> (&str, Option<String>) {
    match s.rsplit_once(sep) {
        Some((head, tag)) if !tag.is_empty() => (head, Some(tag.to_string())),
        Some((head, _)) => (head, None),
        None => (s, None),
    }
}

fn name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.trim_end_matches(".git");
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
