// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, view::records::Browser};

use super::list::{print_records, today, FilterArgs};

/// Mark the exit of a visitor who is still on site, then show the table
/// again.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The ID of the access record.
    #[clap()]
    id: i64,

    #[command(flatten)]
    filter: FilterArgs,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;

        let mut browser = Browser::new(&*ctx.client, &session, self.filter.into_filter(today()));
        let result = browser.mark_exit(self.id).await;
        let outcome = super::settle(&mut ctx.guard, browser.status(), result).await;
        print_records(&browser);
        outcome
    }
}
