// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message sink that writes each reply as one JSON line.

use async_trait::async_trait;
use emblem_core::{AdapterType, DeliveryTarget, EmblemError, MessageSink, Platform, PluginAdapter};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Wire shape of one outbound line.
#[derive(Debug, Serialize)]
struct OutboundLine<'a> {
    platform: Platform,
    channel: &'a str,
    text: &'a str,
}

pub struct JsonLineSink<W> {
    writer: Mutex<W>,
}

impl JsonLineSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Send + 'static> PluginAdapter for JsonLineSink<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> MessageSink for JsonLineSink<W> {
    async fn send(&self, target: &DeliveryTarget, text: &str) -> Result<(), EmblemError> {
        let line = OutboundLine {
            platform: target.platform,
            channel: &target.channel,
            text,
        };
        let mut bytes = serde_json::to_vec(&line).map_err(|e| EmblemError::Channel {
            message: "failed to encode reply".to_string(),
            source: Some(Box::new(e)),
        })?;
        bytes.push(b'\n');

        // One lock per line keeps concurrent replies from interleaving.
        let mut writer = self.writer.lock().await;
        let written = async {
            writer.write_all(&bytes).await?;
            writer.flush().await
        };
        written.await.map_err(|e| EmblemError::Channel {
            message: "failed to write reply".to_string(),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_json_object_per_line() {
        let sink = JsonLineSink::new(Vec::new());
        let target = DeliveryTarget {
            platform: Platform::Twitch,
            channel: "shroud".into(),
        };

        sink.send(&target, "@fox here is your avatar #1: https://i.imgur.com/a.png")
            .await
            .unwrap();
        sink.send(&target, "second").await.unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["platform"], "twitch");
        assert_eq!(lines[0]["channel"], "shroud");
        assert_eq!(lines[1]["text"], "second");
    }
}
