// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{settings::Style, Table, Tabled};

use crate::{
    client::{AccessRecord, Filter, Moment},
    error::Result,
    view::records::{Browser, Row},
};

/// Show a single access record in full.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The ID of the access record.
    #[clap()]
    id: i64,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;

        let mut browser = Browser::new(&*ctx.client, &session, Filter::default());
        let result = browser.view(self.id).await;
        let record = super::settle(&mut ctx.guard, browser.status(), result).await?;
        println!("{}", details(&record));
        Ok(())
    }
}

#[derive(Tabled)]
struct Field {
    #[tabled(rename = "Campo")]
    name: &'static str,
    #[tabled(rename = "Valor")]
    value: String,
}

fn raw(moment: Option<&Moment>) -> String {
    moment.map_or_else(String::new, |m| m.raw().to_owned())
}

/// One line per field, with the values the way the table shows them plus
/// the timestamps as the server sent them.
fn details(record: &AccessRecord) -> String {
    let row = Row::from(record);
    let fields = [
        ("ID", row.id.to_string()),
        ("Fecha", row.date),
        ("Ingreso", row.entry_time),
        ("Salida", row.exit_time),
        ("Ingreso (servidor)", raw(record.entry.as_ref())),
        ("Salida (servidor)", raw(record.exit.as_ref())),
        ("Visitante", row.visitor),
        ("Documento", row.id_card),
        ("Tipo", row.id_card_type),
        ("Sede", row.venue),
        ("Responsable", row.supervisor),
        ("Motivo", row.reason),
        ("Estado", record.status.clone().unwrap_or_else(|| "N/A".to_owned())),
    ]
    .into_iter()
    .map(|(name, value)| Field { name, value });

    Table::new(fields).with(Style::rounded()).to_string()
}
