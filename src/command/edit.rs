// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::Parser;

use crate::{client::AccessUpdate, error::Result, view::records::Browser};

use super::list::{print_records, today, FilterArgs};

/// Change the status or exit time of an access record, then show the table
/// again. Without any changes the record is only announced.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The ID of the access record.
    #[clap()]
    id: i64,

    /// The new status of the record.
    #[arg(long)]
    status: Option<String>,

    /// The new exit time, either RFC 3339 or a local YYYY-MM-DD HH:MM.
    #[arg(long, value_parser = parse_exit)]
    exit_at: Option<DateTime<Utc>>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;
        let update = AccessUpdate {
            exit_date: self.exit_at,
            status: self.status,
        };

        let mut browser = Browser::new(&*ctx.client, &session, self.filter.into_filter(today()));
        let result = browser.edit(self.id, &update).await;
        let outcome = super::settle(&mut ctx.guard, browser.status(), result).await;
        print_records(&browser);
        outcome
    }
}

fn parse_exit(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|e| e.to_string())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("{value} does not exist in the local time zone"))
}
