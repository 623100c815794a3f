// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire encoding for audit events
//!
//! Events travel as JSON. On streams each event is wrapped in a frame:
//!
//! ```text
//! ┌───────────────┬──────────────────────┐
//! │ len: u32 (BE) │ JSON body (len bytes) │
//! └───────────────┴──────────────────────┘
//! ```

use super::TransportError;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use trail_core::AuditEvent;

/// Encode an event as raw JSON, no length prefix
pub fn encode(event: &AuditEvent) -> Result<Vec<u8>, TransportError> {
    Ok(serde_json::to_vec(event)?)
}

/// Decode an event from raw JSON
pub fn decode(bytes: &[u8]) -> Result<AuditEvent, TransportError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed event
///
/// EOF before the prefix or inside the body means the peer went away.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<AuditEvent, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).await.map_err(eof_as_closed)?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_len {
        return Err(TransportError::TooLarge {
            size: len,
            limit: max_len,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(eof_as_closed)?;
    decode(&body)
}

/// Write one length-prefixed event and flush it
pub async fn write_frame<W>(
    writer: &mut W,
    event: &AuditEvent,
    max_len: usize,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let body = encode(event)?;
    if body.len() > max_len {
        return Err(TransportError::TooLarge {
            size: body.len(),
            limit: max_len,
        });
    }
    let len = u32::try_from(body.len()).map_err(|_| TransportError::TooLarge {
        size: body.len(),
        limit: u32::MAX as usize,
    })?;

    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

fn eof_as_closed(e: std::io::Error) -> TransportError {
    if e.kind() == ErrorKind::UnexpectedEof {
        TransportError::ConnectionClosed
    } else {
        TransportError::Io(e)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
