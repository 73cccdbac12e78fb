//! Credential callbacks for authenticated remotes.
//!
//! libgit2 asks for credentials whenever a remote rejects an anonymous
//! request. SSH remotes go through the SSH agent; HTTPS remotes prompt for a
//! username and password on the console. Prompting blocks without a timeout.

use git2::{Cred, CredentialType};
use inquire::{Password, Text};
use std::cell::Cell;

/// libgit2 calls back again after each rejected credential.
const MAX_ATTEMPTS: u32 = 3;

pub struct CredentialPrompt {
    interactive: bool,
    attempts: Cell<u32>,
}

impl CredentialPrompt {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            attempts: Cell::new(0),
        }
    }

    pub fn acquire(
        &self,
        url: &str,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt > MAX_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication failed for {} after {} attempts",
                url, MAX_ATTEMPTS
            )));
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if !self.interactive {
                return Err(git2::Error::from_str(&format!(
                    "credentials required for {} but prompting is disabled",
                    url
                )));
            }
            let (username, password) = prompt_user_pass(url, username_from_url)?;
            return Cred::userpass_plaintext(&username, &password);
        }

        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(username_from_url.unwrap_or("git"));
        }

        Cred::default()
    }
}

fn prompt_user_pass(
    url: &str,
    username_from_url: Option<&str>,
) -> Result<(String, String), git2::Error> {
    println!("cred required for {}", url);

    let mut username_prompt = Text::new("Username:");
    if let Some(name) = username_from_url {
        username_prompt = username_prompt.with_initial_value(name);
    }
    let username = username_prompt.prompt().map_err(prompt_error)?;
    let password = Password::new("Password:")
        .without_confirmation()
        .prompt()
        .map_err(prompt_error)?;

    Ok((username, password))
}

fn prompt_error(err: inquire::InquireError) -> git2::Error {
    git2::Error::from_str(&format!("credential prompt failed: {}", err))
}
