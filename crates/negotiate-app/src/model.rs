// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
pub const AI_AVATAR_GLYPH: &str = "AI";
pub const AI_SENDER_LABEL: &str = "AI Assistant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfluencerStatus {
    Negotiating,
    Agreed,
    #[serde(rename = "Content Received")]
    ContentReceived,
    Published,
}

impl InfluencerStatus {
    pub const ALL: [Self; 4] = [
        Self::Negotiating,
        Self::Agreed,
        Self::ContentReceived,
        Self::Published,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Negotiating => "Negotiating",
            Self::Agreed => "Agreed",
            Self::ContentReceived => "Content Received",
            Self::Published => "Published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Negotiating" => Some(Self::Negotiating),
            "Agreed" => Some(Self::Agreed),
            "Content Received" => Some(Self::ContentReceived),
            "Published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// One of the five mutually exclusive directory filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(InfluencerStatus),
}

impl StatusFilter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Only(InfluencerStatus::Negotiating),
        Self::Only(InfluencerStatus::Agreed),
        Self::Only(InfluencerStatus::ContentReceived),
        Self::Only(InfluencerStatus::Published),
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value == "All" {
            return Some(Self::All);
        }
        InfluencerStatus::parse(value).map(Self::Only)
    }

    pub fn matches(self, status: InfluencerStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    pub fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|filter| *filter == self)
            .unwrap_or(0)
    }

    pub fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let next = (self.position() as isize + delta).rem_euclid(len) as usize;
        Self::ALL[next]
    }
}

/// Visual treatment for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Amber,
    Success,
    Purple,
    Blue,
    Plain,
}

pub const fn status_tone(status: InfluencerStatus) -> StatusTone {
    match status {
        InfluencerStatus::Negotiating => StatusTone::Amber,
        InfluencerStatus::Agreed => StatusTone::Success,
        InfluencerStatus::ContentReceived => StatusTone::Purple,
        InfluencerStatus::Published => StatusTone::Blue,
    }
}

pub fn tone_for_label(label: &str) -> StatusTone {
    InfluencerStatus::parse(label)
        .map(status_tone)
        .unwrap_or(StatusTone::Plain)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Influencer {
    pub id: InfluencerId,
    pub handle: String,
    pub followers: String,
    pub status: InfluencerStatus,
    #[serde(default)]
    pub avatar: String,
}

impl Influencer {
    pub fn avatar_or_placeholder(&self) -> &str {
        non_empty_or_placeholder(&self.avatar)
    }

    /// First character after the handle's leading sigil, used when the
    /// avatar image can't be shown.
    pub fn avatar_glyph(&self) -> String {
        self.handle
            .chars()
            .nth(1)
            .or_else(|| self.handle.chars().next())
            .map(String::from)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Ai,
    Influencer,
}

impl SenderRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Influencer => "influencer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Video,
}

impl MessageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: SenderRole,
    pub content: String,
    pub timestamp: String,
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_preview: Option<String>,
}

impl Message {
    pub fn preview_or_placeholder(&self) -> &str {
        non_empty_or_placeholder(self.video_preview.as_deref().unwrap_or(""))
    }
}

/// Counters and budget shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignOverview {
    pub active_negotiations: u32,
    pub agreements: u32,
    pub budget_spent_euros: u64,
    pub budget_total_euros: u64,
}

impl CampaignOverview {
    pub fn budget_ratio(&self) -> f64 {
        if self.budget_total_euros == 0 {
            return 0.0;
        }
        (self.budget_spent_euros as f64 / self.budget_total_euros as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationSummary {
    pub tagline: String,
    pub response_window: String,
    pub target_budget_euros: u64,
    pub current_offer_euros: u64,
    pub deliverables: String,
    pub timeline: String,
}

pub fn format_euros(euros: u64) -> String {
    let digits = euros.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("€{grouped}")
}

fn non_empty_or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        PLACEHOLDER_IMAGE
    } else {
        value
    }
}
