// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use negotiate_app::{
    CampaignOverview, Influencer, InfluencerId, InfluencerStatus, Message, MessageId, MessageKind,
    NegotiationSummary, SeedData, SenderRole,
};
use std::path::PathBuf;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

const HANDLE_TOPICS: [&str; 12] = [
    "fashion", "style", "eco", "urban", "vintage", "thrift", "denim", "linen", "street",
    "runway", "capsule", "knit",
];

const HANDLE_SUFFIXES: [&str; 8] = [
    "guru", "diaries", "edit", "club", "lab", "notes", "studio", "wardrobe",
];

const MESSAGE_OPENERS: [&str; 10] = [
    "Sounds good",
    "Could we move the deadline",
    "Here is the draft",
    "Happy with the rate",
    "Can you share the brief",
    "Posting tomorrow",
    "Need one more revision",
    "Stories are live",
    "Invoice attached",
    "Thanks for the feedback",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Reproducible influencer and message generator for state tests.
#[derive(Debug, Clone)]
pub struct CampaignFaker {
    rng: DeterministicRng,
}

impl CampaignFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn status(&mut self) -> InfluencerStatus {
        InfluencerStatus::ALL[self.rng.int_n(InfluencerStatus::ALL.len())]
    }

    pub fn influencer(&mut self, id: i64) -> Influencer {
        let topic = HANDLE_TOPICS[self.rng.int_n(HANDLE_TOPICS.len())];
        let suffix = HANDLE_SUFFIXES[self.rng.int_n(HANDLE_SUFFIXES.len())];
        let followers = 50 + self.rng.int_n(450);
        let status = self.status();
        Influencer {
            id: InfluencerId::new(id),
            handle: format!("@{topic}_{suffix}_{id}"),
            followers: format!("{followers}K"),
            status,
            avatar: format!("/{topic}-{id}.jpg"),
        }
    }

    pub fn directory(&mut self, len: usize) -> Vec<Influencer> {
        (1..=len as i64).map(|id| self.influencer(id)).collect()
    }

    /// Composer input, sometimes padded or blank.
    pub fn composer_text(&mut self) -> String {
        match self.rng.int_n(6) {
            0 => String::new(),
            1 => " ".repeat(1 + self.rng.int_n(3)),
            2 => format!(
                "  {}  ",
                MESSAGE_OPENERS[self.rng.int_n(MESSAGE_OPENERS.len())]
            ),
            _ => MESSAGE_OPENERS[self.rng.int_n(MESSAGE_OPENERS.len())].to_owned(),
        }
    }
}

pub fn influencer(id: i64, status: InfluencerStatus) -> Influencer {
    Influencer {
        id: InfluencerId::new(id),
        handle: format!("@creator_{id}"),
        followers: format!("{}K", id * 10),
        status,
        avatar: format!("/creator-{id}.jpg"),
    }
}

pub fn thread(roles: &[SenderRole]) -> Vec<Message> {
    roles
        .iter()
        .enumerate()
        .map(|(index, sender)| Message {
            id: MessageId::new(index as i64 + 1),
            sender: *sender,
            content: format!("seed message {}", index + 1),
            timestamp: format!("2:{:02} PM", 30 + index),
            kind: MessageKind::Text,
            video_preview: None,
        })
        .collect()
}

pub fn seed_with_statuses(statuses: &[InfluencerStatus]) -> SeedData {
    seed_with(
        statuses
            .iter()
            .enumerate()
            .map(|(index, status)| influencer(index as i64 + 1, *status))
            .collect(),
        thread(&[
            SenderRole::Ai,
            SenderRole::Influencer,
            SenderRole::Ai,
            SenderRole::Influencer,
        ]),
    )
}

pub fn seed_with(influencers: Vec<Influencer>, messages: Vec<Message>) -> SeedData {
    SeedData {
        influencers,
        messages,
        overview: CampaignOverview {
            active_negotiations: 3,
            agreements: 1,
            budget_spent_euros: 2_500,
            budget_total_euros: 10_000,
        },
        summary: NegotiationSummary {
            tagline: "Testing terms".to_owned(),
            response_window: "1h".to_owned(),
            target_budget_euros: 1_000,
            current_offer_euros: 1_200,
            deliverables: "1 Post".to_owned(),
            timeline: "3 days".to_owned(),
        },
    }
}

/// Mixed-status directory: Negotiating, Agreed, Content Received,
/// Negotiating, Published.
pub fn mixed_directory_seed() -> SeedData {
    seed_with_statuses(&[
        InfluencerStatus::Negotiating,
        InfluencerStatus::Agreed,
        InfluencerStatus::ContentReceived,
        InfluencerStatus::Negotiating,
        InfluencerStatus::Published,
    ])
}

pub fn fixture_time(hour: u8, minute: u8) -> Result<OffsetDateTime> {
    let date = Date::from_calendar_date(2026, Month::February, 19).context("fixture date")?;
    let time = Time::from_hms(hour, minute, 0).context("fixture time")?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}

pub fn temp_seed_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let seed_path = dir.path().join("seed.json");
    Ok((dir, seed_path))
}
