// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::warn;
use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Serialize;

use crate::{error::Result, session::Session};

/// A timestamp as the server sent it, with its local-time reading when it
/// could be understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Moment {
    raw: String,
    local: Option<NaiveDateTime>,
}

impl Moment {
    pub(crate) fn parse(raw: &str) -> Self {
        let local = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Local).naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|e| warn!("Could not read timestamp {:?}: {}", raw, e))
            .ok();

        Self {
            raw: raw.to_owned(),
            local,
        }
    }

    pub(crate) fn date_label(&self) -> String {
        self.local
            .map_or_else(|| "N/A".to_owned(), |dt| dt.format("%d/%m/%Y").to_string())
    }

    pub(crate) fn time_label(&self) -> String {
        self.local
            .map_or_else(|| "N/A".to_owned(), |dt| dt.format("%H:%M").to_string())
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AccessRecord {
    pub(crate) id: i64,
    pub(crate) entry: Option<Moment>,
    /// Absent while the visitor is still on site.
    pub(crate) exit: Option<Moment>,
    pub(crate) visitor_name: Option<String>,
    pub(crate) visitor_id_card: Option<String>,
    pub(crate) id_card_type_name: Option<String>,
    pub(crate) venue_name: Option<String>,
    pub(crate) supervisor_name: Option<String>,
    pub(crate) access_reason: Option<String>,
    pub(crate) status: Option<String>,
}

impl AccessRecord {
    pub(crate) const fn is_pending(&self) -> bool {
        self.exit.is_none()
    }
}

/// Everything needed to register a visitor and open an access record for
/// them in one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct VisitRegistration {
    pub(crate) name: String,
    pub(crate) last_name: String,
    pub(crate) id_card: String,
    pub(crate) phone: String,
    pub(crate) email: String,
    pub(crate) id_card_type_id: Option<i64>,
    #[serde(rename = "fecha")]
    pub(crate) date: Option<NaiveDate>,
    #[serde(rename = "hora_ing", serialize_with = "serialize_time")]
    pub(crate) time: Option<NaiveTime>,
    pub(crate) reason_visit: String,
    #[serde(rename = "sede")]
    pub(crate) venue_id: Option<i64>,
    pub(crate) supervisor_id: Option<i64>,
}

fn serialize_time<S: serde::Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match *time {
        Some(ref t) => serializer.collect_str(&t.format("%H:%M")),
        None => serializer.serialize_none(),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Registered {
    pub(crate) id: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Filter {
    pub(crate) date: Option<NaiveDate>,
    pub(crate) id_card: Option<String>,
    pub(crate) skip: Option<u32>,
    pub(crate) limit: Option<u32>,
}

impl Filter {
    /// Query parameters for the listing request. Absent and blank filters are
    /// left out entirely.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.date {
            pairs.push(("date_filter", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(id_card) = self.id_card.as_deref().map(str::trim) {
            if !id_card.is_empty() {
                pairs.push(("id_card_filter", id_card.to_owned()));
            }
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct AccessUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) exit_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<String>,
}

impl AccessUpdate {
    pub(crate) const fn is_empty(&self) -> bool {
        self.exit_date.is_none() && self.status.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Deletion {
    /// The server answered 204, the expected acknowledgement.
    Confirmed,
    /// The server reported success with some other status.
    Unconfirmed(StatusCode),
}

#[async_trait]
pub(crate) trait Client: Send + Sync {
    async fn login(&self, username: &str, password: &SecretString) -> Result<Session>;

    async fn register_visit(
        &self,
        session: &Session,
        visit: &VisitRegistration,
    ) -> Result<Registered>;

    async fn list_access(&self, session: &Session, filter: &Filter) -> Result<Vec<AccessRecord>>;

    async fn get_access(&self, session: &Session, id: i64) -> Result<AccessRecord>;

    async fn mark_exit(&self, session: &Session, id: i64) -> Result<()>;

    async fn update_access(&self, session: &Session, id: i64, update: &AccessUpdate)
        -> Result<()>;

    async fn delete_access(&self, session: &Session, id: i64) -> Result<Deletion>;
}

#[async_trait]
impl<T: Client + ?Sized> Client for Box<T> {
    async fn login(&self, username: &str, password: &SecretString) -> Result<Session> {
        (**self).login(username, password).await
    }

    async fn register_visit(
        &self,
        session: &Session,
        visit: &VisitRegistration,
    ) -> Result<Registered> {
        (**self).register_visit(session, visit).await
    }

    async fn list_access(&self, session: &Session, filter: &Filter) -> Result<Vec<AccessRecord>> {
        (**self).list_access(session, filter).await
    }

    async fn get_access(&self, session: &Session, id: i64) -> Result<AccessRecord> {
        (**self).get_access(session, id).await
    }

    async fn mark_exit(&self, session: &Session, id: i64) -> Result<()> {
        (**self).mark_exit(session, id).await
    }

    async fn update_access(
        &self,
        session: &Session,
        id: i64,
        update: &AccessUpdate,
    ) -> Result<()> {
        (**self).update_access(session, id, update).await
    }

    async fn delete_access(&self, session: &Session, id: i64) -> Result<Deletion> {
        (**self).delete_access(session, id).await
    }
}
