// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use clap::ValueEnum;

/// Where new visits are posted. Servers in the field expose different
/// revisions of this route.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Register {
    /// `receptionist/register_full_visit`
    #[default]
    FullVisit,
    /// `visitors/register_visit`
    Visit,
    /// `visitors/`
    Visitors,
}

impl Register {
    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::FullVisit => "receptionist/register_full_visit",
            Self::Visit => "visitors/register_visit",
            Self::Visitors => "visitors/",
        }
    }
}

/// How an exit is recorded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Exit {
    /// `PATCH access/{id}` carrying the current time as `exit_date`.
    #[default]
    Timestamp,
    /// `PATCH access/{id}/exit` with no body; the server picks the time.
    Endpoint,
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.to_possible_value().ok_or(std::fmt::Error)?;
        write!(f, "{}", value.get_name())
    }
}

impl std::fmt::Display for Exit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.to_possible_value().ok_or(std::fmt::Error)?;
        write!(f, "{}", value.get_name())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Endpoints {
    pub(crate) register: Register,
    pub(crate) exit: Exit,
}
