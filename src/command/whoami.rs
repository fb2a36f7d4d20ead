// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, session::Session};

/// Show who the stored session belongs to.
#[derive(Debug, Parser)]
pub(crate) struct Command;

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let session = ctx.guard.require().await?;
        println!("{}", describe(&session));
        Ok(())
    }
}

fn or_unavailable(id: Option<i64>) -> String {
    id.map_or_else(|| "No disponible".to_owned(), |id| id.to_string())
}

pub(crate) fn describe(session: &Session) -> String {
    format!(
        "Usuario ID: {}, Sede ID: {}",
        or_unavailable(session.user_id()),
        or_unavailable(session.venue_id())
    )
}
