// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `trail send` - Send a single audit event in its own session

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use trail_core::EventKind;

use super::Target;
use crate::client::Producer;

#[derive(Args)]
pub struct SendArgs {
    /// User the event is recorded for
    #[arg(long)]
    pub user: String,

    #[command(subcommand)]
    pub event: SendEvent,
}

#[derive(Subcommand)]
pub enum SendEvent {
    /// Record a login
    Login,
    /// Record a logout
    Logout,
    /// Record a chat message
    Chat {
        /// Message text
        text: String,
    },
}

impl SendEvent {
    fn into_parts(self) -> (EventKind, Option<String>) {
        match self {
            SendEvent::Login => (EventKind::Login, None),
            SendEvent::Logout => (EventKind::Logout, None),
            SendEvent::Chat { text } => (EventKind::ChatMessage, Some(text)),
        }
    }
}

pub async fn send(target: &Target, args: SendArgs) -> Result<()> {
    let mut producer = Producer::connect(target.transport, &target.addr)
        .await
        .with_context(|| format!("failed to reach audit service at {}", target.addr))?;

    let (kind, payload) = args.event.into_parts();
    producer.audit(kind, &args.user, payload).await?;
    producer.finish().await?;

    println!("Sent {} for {}", kind, args.user);
    Ok(())
}
