// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! View-models for the things a receptionist works with: the registration
//! form and the access record table. They hold state and issue requests;
//! printing is left to the commands.

pub(crate) mod form;
pub(crate) mod records;
pub(crate) mod status;
