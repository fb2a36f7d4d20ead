// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::error::Result;

/// Forget the stored session.
#[derive(Debug, Parser)]
pub(crate) struct Command;

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context) -> Result<()> {
        let had_session = ctx.guard.current().await.ok().flatten().is_some();
        ctx.guard.logout().await?;
        if had_session {
            println!("Sesión cerrada.");
        } else {
            println!("No había una sesión activa.");
        }
        Ok(())
    }
}
