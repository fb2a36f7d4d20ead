// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod client;
mod command;
mod confirm;
mod error;
mod metadata;
mod password;
mod session;
mod storage;
mod view;

use std::{path::PathBuf, process, time::Duration};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use log::{error, info};
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Logout(command::logout::Command),
    Whoami(command::whoami::Command),
    Register(command::register::Command),
    List(command::list::Command),
    Exit(command::exit::Command),
    Delete(command::delete::Command),
    View(command::view::Command),
    Edit(command::edit::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, ctx: &mut command::Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Whoami(cmd) => cmd.execute(ctx).await,
            Self::Register(cmd) => cmd.execute(ctx).await,
            Self::List(cmd) => cmd.execute(ctx).await,
            Self::Exit(cmd) => cmd.execute(ctx).await,
            Self::Delete(cmd) => cmd.execute(ctx).await,
            Self::View(cmd) => cmd.execute(ctx).await,
            Self::Edit(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the API, including its version prefix.
    #[arg(long, env = "NEXUS_ACCESS_URL", default_value = "http://127.0.0.1:8000/app/v1", value_parser = Url::parse)]
    url: Url,

    /// The route new visits are posted to.
    #[arg(long, env = "NEXUS_ACCESS_REGISTER_ENDPOINT", value_enum, default_value_t)]
    register_endpoint: api::endpoint::Register,

    /// How the exit of a visitor is recorded.
    #[arg(long, env = "NEXUS_ACCESS_EXIT_MODE", value_enum, default_value_t)]
    exit_mode: api::endpoint::Exit,

    /// Give up on requests that take longer than this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep the session only for the duration of this command instead of
    /// storing it on disk.
    #[arg(long)]
    no_cache_session: bool,

    /// The path to the Pinentry program to use when asking for a password or
    /// a confirmation.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

fn get_session_storage(args: &Args) -> Box<dyn storage::Storage<session::Session>> {
    if !args.no_cache_session {
        if let Some(file_storage) = storage::File::new("session.json") {
            return Box::new(file_storage);
        }
        info!("There is no data directory to keep the session in, so it will not outlive this command");
    }

    Box::new(storage::Memory::<session::Session>::new())
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let confirm: Vec<Box<dyn confirm::Confirm>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            confirm::PinentryConfirm::new,
            confirm::PinentryConfirm::new_with_executable,
        )),
        Box::new(confirm::TerminalConfirm),
    ];

    let client = api::Client::new(
        args.url.clone(),
        api::endpoint::Endpoints {
            register: args.register_endpoint,
            exit: args.exit_mode,
        },
        args.timeout.map(Duration::from_secs),
    )?;

    let mut ctx = command::Context {
        client: Box::new(client),
        guard: session::Guard::new(get_session_storage(&args)),
        prompt: Box::new(prompt),
        confirm: Box::new(confirm),
    };

    command::Command::execute(args.command, &mut ctx).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("NEXUS_ACCESS_LOG", "warn")
        .write_style("NEXUS_ACCESS_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
