// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    CampaignOverview, Influencer, InfluencerId, InfluencerStatus, Message, MessageId, MessageKind,
    NegotiationSummary, SenderRole,
};

/// Everything the dashboard knows at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    pub influencers: Vec<Influencer>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub overview: CampaignOverview,
    pub summary: NegotiationSummary,
}

impl SeedData {
    pub fn validate(&self) -> Result<()> {
        if self.influencers.is_empty() {
            bail!("seed has no influencers; the directory needs at least one entry to select");
        }

        let mut influencer_ids = BTreeSet::new();
        for influencer in &self.influencers {
            if !influencer_ids.insert(influencer.id) {
                bail!(
                    "influencer id {} appears more than once; ids must be unique",
                    influencer.id
                );
            }
            if influencer.handle.trim().is_empty() {
                bail!("influencer {} has an empty handle", influencer.id);
            }
        }

        // New messages take id = thread length + 1, so seeded ids must be 1..=n.
        for (position, message) in self.messages.iter().enumerate() {
            let expected = position as i64 + 1;
            if message.id.get() != expected {
                bail!(
                    "message at position {expected} has id {}; message ids must run 1, 2, 3, ... in thread order, renumber the seed messages",
                    message.id
                );
            }
            match (message.kind, &message.video_preview) {
                (MessageKind::Video, None) => bail!(
                    "video message {} is missing video_preview; add a preview image reference",
                    message.id
                ),
                (MessageKind::Text, Some(_)) => bail!(
                    "text message {} carries a video_preview; drop it or set kind = \"video\"",
                    message.id
                ),
                _ => {}
            }
        }

        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let seed: Self = serde_json::from_str(raw).context("decode seed JSON")?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("encode seed JSON")
    }
}

pub trait SeedProvider {
    fn describe(&self) -> String;
    fn load(&self) -> Result<SeedData>;
}

/// The fashion campaign shipped with the dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSeed;

impl SeedProvider for DemoSeed {
    fn describe(&self) -> String {
        "built-in demo campaign".to_owned()
    }

    fn load(&self) -> Result<SeedData> {
        Ok(demo_seed())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileSeed {
    path: PathBuf,
}

impl JsonFileSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedProvider for JsonFileSeed {
    fn describe(&self) -> String {
        format!("seed file {}", self.path.display())
    }

    fn load(&self) -> Result<SeedData> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read seed file {}", self.path.display()))?;
        SeedData::from_json_str(&raw).with_context(|| {
            format!(
                "load seed file {}; run `negotiate --print-demo-seed` for a working template",
                self.path.display()
            )
        })
    }
}

pub fn demo_seed() -> SeedData {
    SeedData {
        influencers: vec![
            influencer(
                1,
                "@fashionista_elena",
                "250K",
                InfluencerStatus::Negotiating,
                "/stylish-woman-city.png",
            ),
            influencer(
                2,
                "@sustainable_style",
                "180K",
                InfluencerStatus::Agreed,
                "/woman-sustainable.jpg",
            ),
            influencer(
                3,
                "@urban_chic",
                "320K",
                InfluencerStatus::ContentReceived,
                "/urban-woman.jpg",
            ),
            influencer(
                4,
                "@eco_fashion_guru",
                "150K",
                InfluencerStatus::Negotiating,
                "/woman-eco.jpg",
            ),
            influencer(
                5,
                "@minimalist_wardrobe",
                "200K",
                InfluencerStatus::Published,
                "/minimalist-woman.jpg",
            ),
        ],
        messages: vec![
            text_message(
                1,
                SenderRole::Ai,
                "Hello Elena! We're excited to collaborate on our sustainable fashion campaign. We'd love to work with you for 3 Instagram posts and stories showcasing our new eco-friendly collection. Our budget for this collaboration is €5,000. Would you be interested?",
                "2:34 PM",
            ),
            text_message(
                2,
                SenderRole::Influencer,
                "Hi! Thank you for reaching out. I love sustainable fashion and would be interested in collaborating. However, my rate for 3 posts and stories is typically €6,500. This includes professional photography, content creation, and story highlights for extended visibility.",
                "2:45 PM",
            ),
            text_message(
                3,
                SenderRole::Ai,
                "I understand your value proposition and appreciate the comprehensive package. We can work with your rate of €6,500. Would you be able to deliver the content within 2 weeks?",
                "2:47 PM",
            ),
            Message {
                id: MessageId::new(4),
                sender: SenderRole::Influencer,
                content: "Perfect! Yes, 2 weeks works well for me. Here's a sample of my recent sustainable fashion content to give you an idea of the style:".to_owned(),
                timestamp: "2:50 PM".to_owned(),
                kind: MessageKind::Video,
                video_preview: Some("/fashion-video-preview.jpg".to_owned()),
            },
        ],
        overview: CampaignOverview {
            active_negotiations: 42,
            agreements: 18,
            budget_spent_euros: 78_000,
            budget_total_euros: 100_000,
        },
        summary: NegotiationSummary {
            tagline: "Negotiating terms for fashion campaign".to_owned(),
            response_window: "30m-2h".to_owned(),
            target_budget_euros: 5_000,
            current_offer_euros: 6_500,
            deliverables: "3 Posts + Stories".to_owned(),
            timeline: "2 weeks".to_owned(),
        },
    }
}

fn influencer(
    id: i64,
    handle: &str,
    followers: &str,
    status: InfluencerStatus,
    avatar: &str,
) -> Influencer {
    Influencer {
        id: InfluencerId::new(id),
        handle: handle.to_owned(),
        followers: followers.to_owned(),
        status,
        avatar: avatar.to_owned(),
    }
}

fn text_message(id: i64, sender: SenderRole, content: &str, timestamp: &str) -> Message {
    Message {
        id: MessageId::new(id),
        sender,
        content: content.to_owned(),
        timestamp: timestamp.to_owned(),
        kind: MessageKind::Text,
        video_preview: None,
    }
}
