// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    ffi::OsString,
    io::{self, BufRead, Write},
    path::Path,
};

use async_trait::async_trait;
use tokio::task;

use crate::{error::Result, metadata};

/// Asks a yes/no question before something destructive happens. `None`
/// means this implementation could not ask.
#[async_trait]
pub(crate) trait Confirm: Send + Sync {
    async fn confirm(&self, question: &str) -> Result<Option<bool>>;
}

#[async_trait]
impl<T: Confirm + ?Sized> Confirm for Box<T> {
    async fn confirm(&self, question: &str) -> Result<Option<bool>> {
        (**self).confirm(question).await
    }
}

#[async_trait]
impl<T: Confirm> Confirm for Vec<T> {
    async fn confirm(&self, question: &str) -> Result<Option<bool>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.confirm(question).await {
                return r;
            }
        }

        Ok(None)
    }
}

pub(crate) struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, _question: &str) -> Result<Option<bool>> {
        Ok(Some(true))
    }
}

pub(crate) struct PinentryConfirm {
    executable: Option<OsString>,
}

impl PinentryConfirm {
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
impl Confirm for PinentryConfirm {
    async fn confirm(&self, question: &str) -> Result<Option<bool>> {
        fn interact<'input>(
            mut dialog: pinentry::ConfirmationDialog<'input>,
            title: &'input str,
            question: &'input str,
        ) -> Result<bool> {
            _ = dialog.with_title(title);
            _ = dialog.with_ok("Yes");
            _ = dialog.with_cancel("No");

            Ok(dialog.confirm(question)?)
        }

        let title = format!("Confirm - {}", *metadata::CLIENT_DISPLAY_NAME);
        let question = question.to_owned();

        let dialog = self
            .executable
            .as_ref()
            .and_then(pinentry::ConfirmationDialog::with_binary)
            .or_else(pinentry::ConfirmationDialog::with_default_binary)
            .map(|dialog| task::spawn_blocking(move || interact(dialog, &title, &question)));

        Ok(match dialog {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, question: &str) -> Result<Option<bool>> {
        let question = question.to_owned();
        Ok(task::spawn_blocking(move || {
            ask(io::stdin().lock(), io::stderr().lock(), &question)
        })
        .await??)
    }
}

/// Asks once. Input that ends before an answer arrives means nobody is there
/// to answer.
fn ask(mut input: impl BufRead, mut output: impl Write, question: &str) -> io::Result<Option<bool>> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(is_affirmative(&line)))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}
