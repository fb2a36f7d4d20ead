// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use log::{info, warn};
use tabled::Tabled;

use crate::{
    client::{AccessRecord, AccessUpdate, Client, Deletion, Filter, Moment},
    confirm::Confirm,
    error::{Error, Result},
    session::Session,
};

use super::status::{Kind, StatusLine};

/// Shown in place of an exit time while the visitor is still on site.
pub(crate) const PENDING: &str = "PENDIENTE";

const MISSING: &str = "N/A";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    MarkExit,
    View,
    Edit,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::MarkExit => "exit",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Tabled)]
pub(crate) struct Row {
    #[tabled(rename = "ID")]
    pub(crate) id: i64,
    #[tabled(rename = "Fecha")]
    pub(crate) date: String,
    #[tabled(rename = "Ingreso")]
    pub(crate) entry_time: String,
    #[tabled(rename = "Salida")]
    pub(crate) exit_time: String,
    #[tabled(rename = "Visitante")]
    pub(crate) visitor: String,
    #[tabled(rename = "Documento")]
    pub(crate) id_card: String,
    #[tabled(rename = "Tipo")]
    pub(crate) id_card_type: String,
    #[tabled(rename = "Sede")]
    pub(crate) venue: String,
    #[tabled(rename = "Responsable")]
    pub(crate) supervisor: String,
    #[tabled(rename = "Motivo")]
    pub(crate) reason: String,
    #[tabled(rename = "Acciones", display_with = "Self::format_actions")]
    pub(crate) actions: Vec<Action>,
}

impl Row {
    // LINT: tabled hands the field over by reference.
    #[allow(clippy::ptr_arg)]
    fn format_actions(actions: &Vec<Action>) -> String {
        actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn or_missing(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
        .to_owned()
}

impl From<&AccessRecord> for Row {
    fn from(record: &AccessRecord) -> Self {
        let mut actions = Vec::with_capacity(4);
        if record.is_pending() {
            actions.push(Action::MarkExit);
        }
        actions.extend([Action::View, Action::Edit, Action::Delete]);

        Self {
            id: record.id,
            date: record
                .entry
                .as_ref()
                .map_or_else(|| MISSING.to_owned(), Moment::date_label),
            entry_time: record
                .entry
                .as_ref()
                .map_or_else(|| MISSING.to_owned(), Moment::time_label),
            exit_time: record
                .exit
                .as_ref()
                .map_or_else(|| PENDING.to_owned(), Moment::time_label),
            visitor: or_missing(&record.visitor_name),
            id_card: or_missing(&record.visitor_id_card),
            id_card_type: or_missing(&record.id_card_type_name),
            venue: or_missing(&record.venue_name),
            supervisor: or_missing(&record.supervisor_name),
            reason: or_missing(&record.access_reason),
            actions,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Loading,
    Rendered(Vec<AccessRecord>),
    Failed(String),
}

/// The access record table: a filter, the records it matched last time, and
/// the commands that can be run against a row.
pub(crate) struct Browser<'a> {
    client: &'a (dyn Client + 'a),
    session: &'a Session,
    filter: Filter,
    state: State,
    status: StatusLine,
}

impl<'a> Browser<'a> {
    pub(crate) fn new(client: &'a (dyn Client + 'a), session: &'a Session, filter: Filter) -> Self {
        Self {
            client,
            session,
            filter,
            state: State::Loading,
            status: StatusLine::default(),
        }
    }

    pub(crate) const fn state(&self) -> &State {
        &self.state
    }

    pub(crate) const fn status(&self) -> &StatusLine {
        &self.status
    }

    pub(crate) fn rows(&self) -> Vec<Row> {
        match self.state {
            State::Rendered(ref records) => records.iter().map(Row::from).collect(),
            State::Loading | State::Failed(_) => Vec::new(),
        }
    }

    /// Fetches the records matching the current filter and replaces whatever
    /// was shown before.
    pub(crate) async fn load(&mut self) -> Result<()> {
        self.state = State::Loading;
        match self.client.list_access(self.session, &self.filter).await {
            Ok(records) => {
                info!("Loaded {} access records", records.len());
                self.state = State::Rendered(records);
                Ok(())
            }
            Err(e) => {
                let message = format!("Error al cargar registros: {e}");
                self.status.show(Kind::Error, message.clone());
                self.state = State::Failed(message);
                Err(e)
            }
        }
    }

    pub(crate) async fn mark_exit(&mut self, id: i64) -> Result<()> {
        self.status.show(Kind::Info, "Marcando salida...");
        if let Err(e) = self.client.mark_exit(self.session, id).await {
            self.status
                .show(Kind::Error, format!("Error al marcar salida: {e}"));
            return Err(e);
        }

        self.status.show(Kind::Success, "Salida marcada exitosamente.");
        self.load().await
    }

    /// Deletes a record once the user agrees to it. Returns whether anything
    /// was deleted.
    pub(crate) async fn delete(&mut self, id: i64, confirm: &(dyn Confirm + '_)) -> Result<bool> {
        let question = format!("¿Estás seguro de eliminar el registro {id}?");
        match confirm.confirm(&question).await? {
            Some(true) => {}
            Some(false) => {
                self.status.show(Kind::Info, "Eliminación cancelada.");
                return Ok(false);
            }
            None => {
                warn!("There is no way to ask for confirmation; pass --yes to delete without asking");
                return Err(Error::Cancelled);
            }
        }

        self.status.show(Kind::Info, "Eliminando registro...");
        match self.client.delete_access(self.session, id).await {
            Ok(Deletion::Confirmed) => {
                self.status
                    .show(Kind::Success, "Registro eliminado exitosamente.");
            }
            Ok(Deletion::Unconfirmed(status)) => {
                warn!("Deleting record {} returned {} instead of 204", id, status);
                self.status.show(
                    Kind::Info,
                    "Registro eliminado, pero la respuesta no fue 204.",
                );
            }
            Err(e) => {
                self.status
                    .show(Kind::Error, format!("Error al eliminar registro: {e}"));
                return Err(e);
            }
        }

        self.load().await?;
        Ok(true)
    }

    pub(crate) async fn view(&mut self, id: i64) -> Result<AccessRecord> {
        self.status.show(Kind::Info, format!("Ver registro {id}"));
        self.client
            .get_access(self.session, id)
            .await
            .map_err(|e| {
                self.status
                    .show(Kind::Error, format!("Error al consultar registro: {e}"));
                e
            })
    }

    /// Applies `update` to a record and reloads. An empty update only
    /// announces the record.
    pub(crate) async fn edit(&mut self, id: i64, update: &AccessUpdate) -> Result<()> {
        self.status.show(Kind::Info, format!("Editar registro {id}"));
        if update.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.client.update_access(self.session, id, update).await {
            self.status
                .show(Kind::Error, format!("Error al editar registro: {e}"));
            return Err(e);
        }

        self.status
            .show(Kind::Success, "Registro actualizado exitosamente.");
        self.load().await
    }
}
