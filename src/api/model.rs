// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use crate::client::{self, Moment};

#[derive(Deserialize)]
pub(super) struct Token {
    pub(super) access_token: Option<String>,
    pub(super) user_id: Option<i64>,
    pub(super) venue_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Registered {
    #[serde(alias = "access_id")]
    pub(super) id: i64,
}

impl From<Registered> for client::Registered {
    fn from(value: Registered) -> Self {
        Self { id: value.id }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Access {
    pub(super) id: i64,
    #[serde(default)]
    pub(super) entry_date: Option<String>,
    #[serde(default)]
    pub(super) exit_date: Option<String>,
    #[serde(default)]
    pub(super) visitor_name: Option<String>,
    #[serde(default)]
    pub(super) visitor_id_card: Option<String>,
    #[serde(default)]
    pub(super) id_card_type_name: Option<String>,
    #[serde(default)]
    pub(super) venue_name: Option<String>,
    #[serde(default)]
    pub(super) supervisor_name: Option<String>,
    #[serde(default)]
    pub(super) access_reason: Option<String>,
    #[serde(default)]
    pub(super) status: Option<String>,
}

impl From<Access> for client::AccessRecord {
    fn from(value: Access) -> Self {
        Self {
            id: value.id,
            entry: value.entry_date.as_deref().map(Moment::parse),
            exit: value.exit_date.as_deref().map(Moment::parse),
            visitor_name: value.visitor_name,
            visitor_id_card: value.visitor_id_card,
            id_card_type_name: value.id_card_type_name,
            venue_name: value.venue_name,
            supervisor_name: value.supervisor_name,
            access_reason: value.access_reason,
            status: value.status,
        }
    }
}
