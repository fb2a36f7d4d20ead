// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsString, path::Path};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::task;

use crate::{error::Result, metadata};

#[derive(Debug, Default, Clone)]
pub(crate) struct Request {
    username: String,
    error: Option<String>,
}

impl Request {
    #[cfg(test)]
    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

pub(crate) struct RequestBuilder {
    username: String,
    error: Option<String>,
}

impl RequestBuilder {
    pub(crate) fn new(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            error: None,
        }
    }

    pub(crate) fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_owned());
        self
    }

    pub(crate) fn into_request(self) -> Request {
        Request {
            username: self.username,
            error: self.error,
        }
    }
}

#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>>;
}

#[async_trait]
impl<T: Prompt + ?Sized> Prompt for Box<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        (**self).prompt(req).await
    }
}

#[async_trait]
impl<T: Prompt> Prompt for Vec<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.prompt(req.clone()).await {
                return r;
            }
        }

        Ok(None)
    }
}

pub(crate) struct PinentryPrompt {
    executable: Option<OsString>,
}

impl PinentryPrompt {
    pub(crate) const fn new() -> Self {
        Self { executable: None }
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: Some(executable.as_ref().as_os_str().into()),
        }
    }
}

#[async_trait]
impl Prompt for PinentryPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        fn interact<'input>(
            mut input: pinentry::PassphraseInput<'input>,
            title: &'input str,
            description: &'input str,
            error: Option<&'input String>,
        ) -> Result<SecretString> {
            _ = input.required("A password is required to log in.");
            _ = input.with_title(title);
            _ = input.with_description(description);
            _ = input.with_prompt("Password");
            if let Some(e) = error {
                _ = input.with_error(e);
            }

            Ok(input.interact()?)
        }

        let title = format!("Log in - {}", *metadata::CLIENT_DISPLAY_NAME);
        let description = format!("Enter the password for {}.", req.username);

        let input = self
            .executable
            .as_ref()
            .and_then(pinentry::PassphraseInput::with_binary)
            .or_else(pinentry::PassphraseInput::with_default_binary)
            .map(|input| {
                task::spawn_blocking(move || {
                    interact(input, &title, &description, req.error.as_ref())
                })
            });

        Ok(match input {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        if let Some(error) = req.error {
            eprintln!("Error: {error}");
        }

        let prompt = format!("Password for {}: ", req.username);
        Ok(Some(
            task::spawn_blocking(move || {
                rpassword::prompt_password(prompt).map(SecretString::new)
            })
            .await??,
        ))
    }
}

/// A prompt that always hands back the same password. Used when the password
/// comes from the environment rather than from a person.
pub(crate) struct FixedPrompt(SecretString);

impl FixedPrompt {
    pub(crate) const fn new(password: SecretString) -> Self {
        Self(password)
    }
}

#[async_trait]
impl Prompt for FixedPrompt {
    async fn prompt(&self, _req: Request) -> Result<Option<SecretString>> {
        Ok(Some(self.0.clone()))
    }
}
