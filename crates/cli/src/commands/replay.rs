// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `trail replay` - Replay a scripted chat session

use anyhow::{Context, Result};
use clap::Args;
use trail_core::EventKind;

use super::Target;
use crate::client::Producer;

#[derive(Args)]
pub struct ReplayArgs {
    /// User the session is recorded for
    #[arg(long)]
    pub user: String,

    /// Number of chat messages between login and logout
    #[arg(long, default_value_t = 10)]
    pub messages: usize,

    /// Length of each chat message
    #[arg(long, default_value_t = 10)]
    pub length: usize,
}

pub async fn replay(target: &Target, args: ReplayArgs) -> Result<()> {
    let mut producer = Producer::connect(target.transport, &target.addr)
        .await
        .with_context(|| format!("failed to reach audit service at {}", target.addr))?;
    println!("Connected to {}", producer.peer());

    producer.audit(EventKind::Login, &args.user, None).await?;

    let text = "A".repeat(args.length);
    for i in 1..=args.messages {
        producer
            .audit(EventKind::ChatMessage, &args.user, Some(text.clone()))
            .await
            .with_context(|| format!("message {} failed", i))?;
        println!("{}. message sent, length = {}", i, args.length);
    }

    producer.audit(EventKind::Logout, &args.user, None).await?;
    let sent = producer.finish().await?;

    println!("Session finished: {} events", sent);
    Ok(())
}
