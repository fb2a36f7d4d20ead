// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::env;

use async_trait::async_trait;
use clap::Parser;
use log::warn;
use secrecy::SecretString;

use crate::{
    client::Client,
    error::{Password, Result},
    password::{FixedPrompt, Prompt, RequestBuilder},
    session::{Guard, Session},
};

/// Read instead of prompting when set. Never accepted on the command line.
pub(crate) const PASSWORD_ENV: &str = "NEXUS_ACCESS_PASSWORD";

const MAX_ATTEMPTS: u32 = 3;

/// Log in and keep the session for the commands that follow.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The user name to log in as.
    #[arg(env = "NEXUS_ACCESS_USERNAME")]
    username: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let fixed = env::var(PASSWORD_ENV)
            .ok()
            .map(|password| FixedPrompt::new(SecretString::new(password)));

        let session = match fixed {
            Some(ref prompt) => {
                log_in(&*ctx.client, &mut ctx.guard, prompt, &self.username, 1).await?
            }
            None => {
                log_in(
                    &*ctx.client,
                    &mut ctx.guard,
                    &*ctx.prompt,
                    &self.username,
                    MAX_ATTEMPTS,
                )
                .await?
            }
        };

        println!("Sesión iniciada. {}", super::whoami::describe(&session));
        Ok(())
    }
}

/// Asks for a password and trades it for a session, asking again with the
/// server's complaint when the credentials are refused.
pub(crate) async fn log_in(
    client: &(dyn Client + '_),
    guard: &mut Guard,
    prompt: &(dyn Prompt + '_),
    username: &str,
    attempts: u32,
) -> Result<Session> {
    let mut builder = RequestBuilder::new(username);
    let mut attempt = 1;
    loop {
        let password = prompt
            .prompt(builder.into_request())
            .await?
            .ok_or(Password::NoPrompt)?;

        match client.login(username, &password).await {
            Ok(session) => {
                guard.establish(&session).await?;
                return Ok(session);
            }
            Err(e) if e.is_unauthorized() && attempt < attempts => {
                warn!("Login attempt {} of {} was rejected", attempt, attempts);
                attempt += 1;
                builder = RequestBuilder::new(username).with_error(&e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
}
