// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::OffsetDateTime;

use crate::{
    CampaignOverview, Influencer, InfluencerId, Message, MessageId, MessageKind,
    NegotiationSummary, SeedData, SenderRole, StatusFilter, format_clock_time,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Directory,
    Compose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    influencers: Vec<Influencer>,
    messages: Vec<Message>,
    selected: usize,
    filter: StatusFilter,
    composer: String,
    pub overview: CampaignOverview,
    pub summary: NegotiationSummary,
    pub mode: AppMode,
    pub show_summary: bool,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SelectInfluencer(InfluencerId),
    SetFilter(StatusFilter),
    NextFilter,
    PrevFilter,
    FocusComposer,
    FocusDirectory,
    InsertChar(char),
    Backspace,
    SetComposer(String),
    ClearComposer,
    Submit(OffsetDateTime),
    ToggleSummary,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SelectionChanged(InfluencerId),
    FilterChanged(StatusFilter),
    ModeChanged(AppMode),
    ComposerChanged,
    MessageAppended(MessageId),
    SummaryVisibilityChanged(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl DashboardState {
    /// Builds the initial state; the first influencer starts selected.
    pub fn from_seed(seed: SeedData, filter: StatusFilter) -> Result<Self> {
        seed.validate()?;
        Ok(Self {
            influencers: seed.influencers,
            messages: seed.messages,
            selected: 0,
            filter,
            composer: String::new(),
            overview: seed.overview,
            summary: seed.summary,
            mode: AppMode::Directory,
            show_summary: true,
            status_line: None,
        })
    }

    pub fn influencers(&self) -> &[Influencer] {
        &self.influencers
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn selected(&self) -> &Influencer {
        &self.influencers[self.selected]
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn composer(&self) -> &str {
        &self.composer
    }

    /// Influencers passing the active filter, in directory order.
    pub fn visible_influencers(&self) -> Vec<&Influencer> {
        self.influencers
            .iter()
            .filter(|influencer| self.filter.matches(influencer.status))
            .collect()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SelectInfluencer(id) => self.select(id),
            AppCommand::SetFilter(filter) => self.set_filter(filter),
            AppCommand::NextFilter => self.set_filter(self.filter.rotate(1)),
            AppCommand::PrevFilter => self.set_filter(self.filter.rotate(-1)),
            AppCommand::FocusComposer => self.set_mode(AppMode::Compose),
            AppCommand::FocusDirectory => self.set_mode(AppMode::Directory),
            AppCommand::InsertChar(ch) => {
                self.composer.push(ch);
                vec![AppEvent::ComposerChanged]
            }
            AppCommand::Backspace => {
                if self.composer.pop().is_some() {
                    vec![AppEvent::ComposerChanged]
                } else {
                    Vec::new()
                }
            }
            AppCommand::SetComposer(text) => {
                self.composer = text;
                vec![AppEvent::ComposerChanged]
            }
            AppCommand::ClearComposer => {
                if self.composer.is_empty() {
                    return Vec::new();
                }
                self.composer.clear();
                vec![AppEvent::ComposerChanged]
            }
            AppCommand::Submit(now) => match self.submit(now) {
                Some(id) => vec![AppEvent::MessageAppended(id), AppEvent::ComposerChanged],
                None => Vec::new(),
            },
            AppCommand::ToggleSummary => {
                self.show_summary = !self.show_summary;
                vec![AppEvent::SummaryVisibilityChanged(self.show_summary)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Appends the composer text as an influencer message. Whitespace-only
    /// input is ignored and leaves the buffer untouched.
    pub fn submit(&mut self, now: OffsetDateTime) -> Option<MessageId> {
        if self.composer.trim().is_empty() {
            return None;
        }

        // Ids follow the thread length; nothing ever removes a message.
        let id = MessageId::new(self.messages.len() as i64 + 1);
        let content = std::mem::take(&mut self.composer);
        self.messages.push(Message {
            id,
            sender: SenderRole::Influencer,
            content,
            timestamp: format_clock_time(now),
            kind: MessageKind::Text,
            video_preview: None,
        });
        Some(id)
    }

    fn select(&mut self, id: InfluencerId) -> Vec<AppEvent> {
        let Some(index) = self
            .influencers
            .iter()
            .position(|influencer| influencer.id == id)
        else {
            return Vec::new();
        };
        if index == self.selected {
            return Vec::new();
        }
        self.selected = index;
        vec![AppEvent::SelectionChanged(id)]
    }

    fn set_filter(&mut self, filter: StatusFilter) -> Vec<AppEvent> {
        if filter == self.filter {
            return Vec::new();
        }
        self.filter = filter;
        vec![AppEvent::FilterChanged(filter)]
    }

    fn set_mode(&mut self, mode: AppMode) -> Vec<AppEvent> {
        if mode == self.mode {
            return Vec::new();
        }
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn set_status(&mut self, message: String) -> AppEvent {
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}
