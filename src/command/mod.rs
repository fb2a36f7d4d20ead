// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::debug;

use crate::{
    client::Client,
    confirm::Confirm,
    error::{Error, Result},
    password::Prompt,
    session::Guard,
    view::status::{Kind, StatusLine},
};

pub(crate) mod delete;
pub(crate) mod edit;
pub(crate) mod exit;
pub(crate) mod list;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod register;
pub(crate) mod view;
pub(crate) mod whoami;

/// Everything a command may need while it runs.
pub(crate) struct Context {
    pub(crate) client: Box<dyn Client>,
    pub(crate) guard: Guard,
    pub(crate) prompt: Box<dyn Prompt>,
    pub(crate) confirm: Box<dyn Confirm>,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: &mut Context) -> Result<()>;
}

/// Prints whatever the status line currently shows. Errors go to stderr.
pub(crate) fn print_status(status: &StatusLine) {
    if let Some(status) = status.visible() {
        match status.kind() {
            Kind::Info | Kind::Success => println!("{status}"),
            Kind::Error => eprintln!("{status}"),
        }
    }
}

/// Reports the status left behind by a request and settles its result. A
/// rejected session is forgotten. Failures have already been shown to the
/// user, so they collapse into [`Error::Command`].
pub(crate) async fn settle<T: Send>(
    guard: &mut Guard,
    status: &StatusLine,
    result: Result<T>,
) -> Result<T> {
    print_status(status);
    guard.check(result).await.map_err(|e| {
        debug!("Request failed: {}", e);
        Error::Command
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{
        client::fake::{record, Fake},
        confirm::AssumeYes,
        password::FixedPrompt,
        session::Session,
        storage::Memory,
    };

    use super::*;

    fn context(client: &Fake, storage: &Memory<Session>) -> Context {
        Context {
            client: Box::new(client.clone()),
            guard: Guard::new(Box::new(storage.clone())),
            prompt: Box::new(FixedPrompt::new(secrecy::SecretString::new(
                "hunter2".to_owned(),
            ))),
            confirm: Box::new(AssumeYes),
        }
    }

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(subcommand)]
        command: Protected,
    }

    #[derive(Debug, clap::Subcommand)]
    enum Protected {
        Whoami(whoami::Command),
        Register(register::Command),
        List(list::Command),
        Exit(exit::Command),
        Delete(delete::Command),
        View(view::Command),
        Edit(edit::Command),
    }

    async fn run(ctx: &mut Context, args: &[&str]) -> Result<()> {
        match Cli::parse_from(args.iter().copied()).command {
            Protected::Whoami(cmd) => cmd.execute(ctx).await,
            Protected::Register(cmd) => cmd.execute(ctx).await,
            Protected::List(cmd) => cmd.execute(ctx).await,
            Protected::Exit(cmd) => cmd.execute(ctx).await,
            Protected::Delete(cmd) => cmd.execute(ctx).await,
            Protected::View(cmd) => cmd.execute(ctx).await,
            Protected::Edit(cmd) => cmd.execute(ctx).await,
        }
    }

    #[tokio::test]
    async fn protected_commands_need_a_session() {
        let client = Fake::with_records(vec![record(1, None)]);
        let storage = Memory::new();
        let mut ctx = context(&client, &storage);

        for args in [
            &["nexus-access", "whoami"][..],
            &["nexus-access", "register", "--name", "A", "--last-name", "B", "--id-card", "1"],
            &["nexus-access", "list"],
            &["nexus-access", "exit", "1"],
            &["nexus-access", "delete", "1", "--yes"],
            &["nexus-access", "view", "1"],
            &["nexus-access", "edit", "1", "--status", "Inactivo"],
        ] {
            let result = run(&mut ctx, args).await;
            assert!(matches!(result, Err(Error::NotLoggedIn)), "{args:?}");
        }
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_session_is_forgotten() -> Result<()> {
        let client = Fake::with_records(vec![record(1, None)]);
        let storage = Memory::new();
        let mut ctx = context(&client, &storage);
        ctx.guard
            .establish(&Session::new("stale".to_owned(), Some(7), Some(3)))
            .await?;

        client.fail_next(reqwest::StatusCode::UNAUTHORIZED, "Could not validate credentials");
        let result = run(&mut ctx, &["nexus-access", "list", "--all"]).await;

        assert!(matches!(result, Err(Error::Command)));
        assert!(matches!(ctx.guard.require().await, Err(Error::NotLoggedIn)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_fails_when_the_reload_fails() -> Result<()> {
        let client = Fake::with_records(vec![record(1, None)]);
        client.fail_listings(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "db down");
        let storage = Memory::new();
        let mut ctx = context(&client, &storage);
        ctx.guard
            .establish(&Session::new("abc".to_owned(), Some(7), Some(3)))
            .await?;

        let result = run(&mut ctx, &["nexus-access", "delete", "1", "--yes"]).await;

        assert!(matches!(result, Err(Error::Command)));
        assert!(client.records().is_empty());
        assert_eq!(client.calls().len(), 2);
        assert!(ctx.guard.require().await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn login_then_logout() -> Result<()> {
        let client = Fake::default();
        let storage = Memory::new();
        let mut ctx = context(&client, &storage);

        login::log_in(&*ctx.client, &mut ctx.guard, &*ctx.prompt, "recepcion", 1).await?;
        assert_eq!(ctx.guard.require().await?.user_id(), Some(7));

        logout::Command.execute(&mut ctx).await?;
        assert!(matches!(ctx.guard.require().await, Err(Error::NotLoggedIn)));

        logout::Command.execute(&mut ctx).await?;
        Ok(())
    }
}
