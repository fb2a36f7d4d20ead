// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Borrow, fmt, io, result};

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not reach the server: {0}")]
    Connection(reqwest::Error),
    #[error(transparent)]
    Api(#[from] Api),
    #[error("password retrieval error: {0}")]
    Password(#[from] Password),
    #[error("there is no stored session; log in first")]
    NotLoggedIn,
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) const fn is_unauthorized(&self) -> bool {
        matches!(*self, Self::Api(Api::Unauthorized(_)))
    }
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Password(Password::Pinentry(value)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Api(Api::UnexpectedResponse(value.to_string()))
        } else {
            Self::Connection(value)
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

#[derive(Error, Debug)]
pub(crate) enum Api {
    #[error("{}", format_status(StatusCode::UNAUTHORIZED, .0))]
    Unauthorized(Detail),
    #[error("{}", format_status(.status, .detail))]
    Status { status: StatusCode, detail: Detail },
    #[error("unexpected response from the server: {0}")]
    UnexpectedResponse(String),
}

impl Api {
    pub(crate) fn from_status(status: StatusCode, detail: Detail) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized(detail)
        } else {
            Self::Status { status, detail }
        }
    }
}

fn format_status(status: impl Borrow<StatusCode>, detail: &Detail) -> String {
    let status = *status.borrow();
    match *detail {
        Detail::Validation(_) => format!("error {} (validation):\n{}", status.as_u16(), detail),
        Detail::Empty => format!(
            "error {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        ),
        Detail::Message(_) | Detail::Raw(_) => format!("error {}: {}", status.as_u16(), detail),
    }
}

/// The explanation a server attaches to an unsuccessful response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Detail {
    /// A plain `detail` (or `message`) string.
    Message(String),
    /// A list of field validation failures.
    Validation(Vec<FieldError>),
    /// Anything else the server sent back, as text.
    Raw(String),
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldError {
    pub(crate) location: Vec<String>,
    pub(crate) message: String,
}

impl Detail {
    pub(crate) fn from_body(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<Value>(body) else {
            let text = String::from_utf8_lossy(body).trim().to_owned();
            return if text.is_empty() {
                Self::Empty
            } else {
                Self::Raw(text)
            };
        };

        match value.get("detail").or_else(|| value.get("message")) {
            Some(Value::String(message)) => Self::Message(message.clone()),
            Some(Value::Array(items)) => items
                .iter()
                .map(FieldError::from_value)
                .collect::<Option<Vec<_>>>()
                .map_or_else(|| Self::Raw(value.to_string()), Self::Validation),
            Some(_) | None => Self::Raw(value.to_string()),
        }
    }
}

impl FieldError {
    fn from_value(value: &Value) -> Option<Self> {
        let location = value
            .get("loc")?
            .as_array()?
            .iter()
            .map(|part| match *part {
                Value::String(ref s) => s.clone(),
                ref other => other.to_string(),
            })
            .collect();
        let message = value.get("msg")?.as_str()?.to_owned();
        Some(Self { location, message })
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.location.join("."), self.message)
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Message(ref message) | Self::Raw(ref message) => f.write_str(message),
            Self::Validation(ref errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            Self::Empty => f.write_str("no details given"),
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("no password prompt available")]
    NoPrompt,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}
