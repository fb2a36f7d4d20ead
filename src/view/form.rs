// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::debug;

use crate::{
    client::{Client, Registered, VisitRegistration},
    error::Result,
    session::Session,
};

use super::status::{Kind, StatusLine};

/// Values the form takes from the session. The user cannot change them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Defaults {
    pub(crate) venue_id: Option<i64>,
    pub(crate) supervisor_id: Option<i64>,
}

impl From<&Session> for Defaults {
    fn from(session: &Session) -> Self {
        Self {
            venue_id: session.venue_id(),
            supervisor_id: session.user_id(),
        }
    }
}

/// The editable inputs, as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Fields {
    pub(crate) name: String,
    pub(crate) last_name: String,
    pub(crate) id_card: String,
    pub(crate) id_card_type: Option<String>,
    pub(crate) phone: String,
    pub(crate) email: String,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) time: Option<NaiveTime>,
    pub(crate) reason: String,
}

pub(crate) struct RegistrationForm {
    fields: Fields,
    defaults: Defaults,
    status: StatusLine,
}

impl RegistrationForm {
    /// A blank form bound to the session, with the visit date and entry time
    /// set to `now`.
    pub(crate) fn new(session: &Session, now: NaiveDateTime) -> Self {
        Self {
            fields: Fields {
                date: Some(now.date()),
                time: now.time().with_second(0).and_then(|t| t.with_nanosecond(0)),
                ..Fields::default()
            },
            defaults: Defaults::from(session),
            status: StatusLine::default(),
        }
    }

    pub(crate) const fn fields(&self) -> &Fields {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub(crate) const fn venue_id(&self) -> Option<i64> {
        self.defaults.venue_id
    }

    pub(crate) const fn supervisor_id(&self) -> Option<i64> {
        self.defaults.supervisor_id
    }

    pub(crate) const fn status(&self) -> &StatusLine {
        &self.status
    }

    pub(crate) fn payload(&self) -> VisitRegistration {
        VisitRegistration {
            name: self.fields.name.clone(),
            last_name: self.fields.last_name.clone(),
            id_card: self.fields.id_card.clone(),
            phone: self.fields.phone.clone(),
            email: self.fields.email.clone(),
            id_card_type_id: self.fields.id_card_type.as_deref().and_then(parse_int),
            date: self.fields.date,
            time: self.fields.time,
            reason_visit: self.fields.reason.clone(),
            venue_id: self.defaults.venue_id,
            supervisor_id: self.defaults.supervisor_id,
        }
    }

    /// Sends the form once. On success the form is cleared and the session
    /// values are put back; on failure the typed values are kept.
    pub(crate) async fn submit(
        &mut self,
        client: &(dyn Client + '_),
        session: &Session,
    ) -> Result<Registered> {
        self.status.show(Kind::Info, "Enviando datos...");
        let payload = self.payload();
        debug!("Submitting visit registration for id card {:?}", payload.id_card);

        match client.register_visit(session, &payload).await {
            Ok(registered) => {
                self.status.show(
                    Kind::Success,
                    format!(
                        "Registro de visita y visitante creado con éxito. ID de Acceso: {}",
                        registered.id
                    ),
                );
                self.reset();
                Ok(registered)
            }
            Err(e) => {
                self.status
                    .show(Kind::Error, format!("Error al registrar la visita: {e}"));
                Err(e)
            }
        }
    }

    /// Clears everything the user typed. Venue and supervisor stay bound to
    /// the session.
    pub(crate) fn reset(&mut self) {
        self.fields = Fields::default();
    }
}

/// Reads a leading integer the way lenient form inputs do: surrounding
/// whitespace and trailing garbage are ignored, and no digits means no value.
pub(crate) fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}
