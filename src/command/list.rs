// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser};
use tabled::{settings::Style, Table};

use crate::{
    client::Filter,
    error::Result,
    view::records::{Browser, State},
};

const NO_RECORDS: &str = "No hay registros para mostrar con los filtros actuales.";

/// Which records to show. Commands that change a record reload the table
/// with the same filter afterwards.
#[derive(Debug, Args)]
pub(crate) struct FilterArgs {
    /// Only show records entered on this date, as YYYY-MM-DD. Defaults to
    /// today.
    #[arg(long, conflicts_with_all = ["all", "any_date"])]
    date: Option<NaiveDate>,

    /// Do not restrict the records to a date. Combine with `--id-card` to
    /// search for a document across every date.
    #[arg(long, conflicts_with = "all")]
    any_date: bool,

    /// Only show records for this identity document number.
    #[arg(long, conflicts_with = "all")]
    id_card: Option<String>,

    /// Show records for every date and document.
    #[arg(long)]
    all: bool,

    /// The number of records to skip.
    #[arg(long)]
    skip: Option<u32>,

    /// The maximum number of records to return.
    #[arg(long)]
    limit: Option<u32>,
}

impl FilterArgs {
    pub(crate) fn into_filter(self, today: NaiveDate) -> Filter {
        if self.all {
            Filter {
                date: None,
                id_card: None,
                skip: self.skip,
                limit: self.limit,
            }
        } else {
            Filter {
                date: if self.any_date {
                    None
                } else {
                    Some(self.date.unwrap_or(today))
                },
                id_card: self.id_card,
                skip: self.skip,
                limit: self.limit,
            }
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Prints the table as last loaded.
pub(crate) fn print_records(browser: &Browser<'_>) {
    match *browser.state() {
        State::Loading => {}
        State::Rendered(_) => {
            let rows = browser.rows();
            if rows.is_empty() {
                println!("{NO_RECORDS}");
            } else {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
        State::Failed(ref message) => eprintln!("{message}"),
    }
}

/// List access records.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[command(flatten)]
    filter: FilterArgs,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;

        let mut browser = Browser::new(&*ctx.client, &session, self.filter.into_filter(today()));
        let result = browser.load().await;
        print_records(&browser);
        super::settle(&mut ctx.guard, browser.status(), result).await
    }
}
