// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use negotiate_app::{Message, local_now};
use negotiate_tui::AppRuntime;
use time::OffsetDateTime;

/// Wall-clock runtime; records every message the composer appends.
#[derive(Debug, Default)]
pub struct LocalRuntime {
    sent: usize,
}

impl LocalRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl AppRuntime for LocalRuntime {
    fn now(&mut self) -> OffsetDateTime {
        local_now()
    }

    fn message_appended(&mut self, message: &Message) -> Result<()> {
        self.sent += 1;
        tracing::debug!(
            message_id = message.id.get(),
            sender = message.sender.as_str(),
            kind = message.kind.as_str(),
            chars = message.content.chars().count(),
            sent_this_session = self.sent,
            "composer message recorded"
        );
        Ok(())
    }
}
