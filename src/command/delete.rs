// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{confirm::AssumeYes, error::Result, view::records::Browser};

use super::list::{print_records, today, FilterArgs};

/// Delete an access record after asking for confirmation, then show the table
/// again.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The ID of the access record.
    #[clap()]
    id: i64,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    yes: bool,

    #[command(flatten)]
    filter: FilterArgs,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;

        let mut browser = Browser::new(&*ctx.client, &session, self.filter.into_filter(today()));
        let result = if self.yes {
            browser.delete(self.id, &AssumeYes).await
        } else {
            browser.delete(self.id, &*ctx.confirm).await
        };

        // A declined or failed deletion leaves nothing loaded to print.
        let outcome = super::settle(&mut ctx.guard, browser.status(), result).await;
        print_records(&browser);
        outcome.map(|_| ())
    }
}
