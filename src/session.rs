// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use log::{info, warn};
use secrecy::{ExposeSecret, Secret, Zeroize};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    storage::Storage,
};

#[derive(Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub(crate) struct Token(String);

impl secrecy::CloneableSecret for Token {}

impl secrecy::SerializableSecret for Token {}

impl Zeroize for Token {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// The credentials handed out by the server at login, along with the
/// identifiers the registration form is locked to.
#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct Session {
    access_token: Secret<Token>,
    user_id: Option<i64>,
    #[serde(rename = "user_venue_id")]
    venue_id: Option<i64>,
}

impl Session {
    pub(crate) fn new(token: String, user_id: Option<i64>, venue_id: Option<i64>) -> Self {
        Self {
            access_token: Secret::new(Token(token)),
            user_id,
            venue_id,
        }
    }

    pub(crate) fn token(&self) -> &str {
        &self.access_token.expose_secret().0
    }

    pub(crate) const fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub(crate) const fn venue_id(&self) -> Option<i64> {
        self.venue_id
    }
}

/// Gatekeeper for everything that needs an authenticated session.
pub(crate) struct Guard {
    storage: Box<dyn Storage<Session>>,
}

impl Guard {
    pub(crate) fn new(storage: Box<dyn Storage<Session>>) -> Self {
        Self { storage }
    }

    pub(crate) async fn require(&mut self) -> Result<Session> {
        match self.storage.get().await? {
            Some(session) if !session.token().is_empty() => Ok(session),
            Some(_) | None => Err(Error::NotLoggedIn),
        }
    }

    pub(crate) async fn current(&mut self) -> Result<Option<Session>> {
        self.storage.get().await
    }

    pub(crate) async fn establish(&mut self, session: &Session) -> Result<()> {
        if !self.storage.is_persistent() {
            warn!("The session will only last until this command exits because session caching is turned off");
        }
        self.storage.update(session).await?;
        info!("Stored session for user {:?}", session.user_id());
        Ok(())
    }

    pub(crate) async fn logout(&mut self) -> Result<()> {
        self.storage.clear().await?;
        info!("Cleared stored session");
        Ok(())
    }

    /// Forgets the stored session if the server refused it.
    pub(crate) async fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.as_ref().is_err_and(Error::is_unauthorized) {
            warn!("The server rejected the stored session, so it has been cleared");
            self.storage.clear().await?;
        }
        result
    }
}
