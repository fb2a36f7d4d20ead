// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime};
use clap::Parser;
use log::warn;

use crate::{
    error::Result,
    view::form::{Fields, RegistrationForm},
};

/// Register a visitor and open an access record for them. The venue and the
/// responsible user are taken from the session.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The visitor's first name.
    #[arg(long)]
    name: String,

    /// The visitor's last name.
    #[arg(long)]
    last_name: String,

    /// The visitor's identity document number.
    #[arg(long)]
    id_card: String,

    /// The numeric identifier of the document type. A value that does not
    /// start with a number is sent as null.
    #[arg(long)]
    id_card_type: Option<String>,

    #[arg(long, default_value_t)]
    phone: String,

    #[arg(long, default_value_t)]
    email: String,

    /// The date of the visit, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The entry time, as HH:MM. Defaults to the current time.
    #[arg(long, value_parser = parse_time)]
    time: Option<NaiveTime>,

    /// The reason for the visit.
    #[arg(long, default_value_t)]
    reason: String,
}

impl Command {
    fn fill(self, fields: &mut Fields) {
        fields.name = self.name;
        fields.last_name = self.last_name;
        fields.id_card = self.id_card;
        fields.id_card_type = self.id_card_type;
        fields.phone = self.phone;
        fields.email = self.email;
        fields.reason = self.reason;
        if self.date.is_some() {
            fields.date = self.date;
        }
        if self.time.is_some() {
            fields.time = self.time;
        }
    }
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;

        let mut form = RegistrationForm::new(&session, Local::now().naive_local());
        if form.venue_id().is_none() || form.supervisor_id().is_none() {
            warn!("The session does not name a venue or user, so the server may refuse the registration");
        }
        self.fill(form.fields_mut());

        let result = form.submit(&*ctx.client, &session).await;
        super::settle(&mut ctx.guard, form.status(), result)
            .await
            .map(|_| ())
    }
}

fn parse_time(value: &str) -> chrono::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
}
