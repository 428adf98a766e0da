// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use negotiate_app::{
    AI_AVATAR_GLYPH, AI_SENDER_LABEL, AppCommand, AppEvent, AppMode, DashboardState, Influencer,
    Message, MessageKind, SenderRole, StatusFilter, StatusTone, format_euros, status_tone,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const PAGE_LINES: u16 = 10;
const SIDEBAR_WIDTH: u16 = 46;
const BUBBLE_WIDTH_PERCENT: usize = 70;
const VIDEO_PREVIEW_MAX_COLS: usize = 24;
const PLAY_GLYPH: &str = "▶";
const COMPOSER_PLACEHOLDER: &str = "Type your message...";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Host services the dashboard needs while running.
pub trait AppRuntime {
    fn now(&mut self) -> OffsetDateTime;
    fn message_appended(&mut self, _message: &Message) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    directory_cursor: usize,
    thread_scroll_back: u16,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    poll_interval: Duration,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    sync_cursor_to_selection(state, &mut view_data);
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(poll_interval).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut DashboardState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::PageUp => {
            view_data.thread_scroll_back = view_data.thread_scroll_back.saturating_add(PAGE_LINES);
            return false;
        }
        KeyCode::PageDown => {
            view_data.thread_scroll_back = view_data.thread_scroll_back.saturating_sub(PAGE_LINES);
            return false;
        }
        _ => {}
    }

    match state.mode {
        AppMode::Directory => handle_directory_key(state, view_data, internal_tx, key),
        AppMode::Compose => {
            handle_composer_key(state, runtime, view_data, internal_tx, key);
            false
        }
    }
}

fn handle_directory_key(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => move_cursor(state, view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(state, view_data, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.directory_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.directory_cursor = state.visible_influencers().len().saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char(' ') => select_under_cursor(state, view_data, internal_tx),
        KeyCode::Char('f') => {
            apply_filter_command(state, view_data, internal_tx, AppCommand::NextFilter);
        }
        KeyCode::Char('F') => {
            apply_filter_command(state, view_data, internal_tx, AppCommand::PrevFilter);
        }
        KeyCode::Char(digit @ '1'..='5') => {
            let index = digit as usize - '1' as usize;
            let filter = StatusFilter::ALL[index];
            apply_filter_command(state, view_data, internal_tx, AppCommand::SetFilter(filter));
        }
        KeyCode::Char('s') => {
            state.dispatch(AppCommand::ToggleSummary);
            let label = if state.show_summary {
                "summary shown"
            } else {
                "summary hidden"
            };
            emit_status(state, view_data, internal_tx, label);
        }
        KeyCode::Char('i') | KeyCode::Tab => {
            state.dispatch(AppCommand::FocusComposer);
        }
        _ => {}
    }
    false
}

fn handle_composer_key<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Tab, _) => {
            state.dispatch(AppCommand::FocusDirectory);
        }
        (KeyCode::Enter, _) => submit_composer(state, runtime, view_data, internal_tx),
        (KeyCode::Backspace, _) => {
            state.dispatch(AppCommand::Backspace);
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::ClearComposer);
        }
        (KeyCode::Char(ch), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            state.dispatch(AppCommand::InsertChar(ch));
        }
        _ => {}
    }
}

fn submit_composer<R: AppRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let now = runtime.now();
    let events = state.dispatch(AppCommand::Submit(now));
    let Some(id) = events.iter().find_map(|event| match event {
        AppEvent::MessageAppended(id) => Some(*id),
        _ => None,
    }) else {
        return;
    };

    view_data.thread_scroll_back = 0;
    tracing::info!(message_id = id.get(), "message appended");
    let Some(message) = state.messages().last().cloned() else {
        return;
    };
    if let Err(error) = runtime.message_appended(&message) {
        tracing::warn!(message_id = id.get(), error = %error, "message hook failed");
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("message {id} sent; notify failed: {error}"),
        );
    }
}

fn apply_filter_command(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    let Some(filter) = events.iter().find_map(|event| match event {
        AppEvent::FilterChanged(filter) => Some(*filter),
        _ => None,
    }) else {
        return;
    };

    tracing::debug!(filter = filter.label(), "filter changed");
    sync_cursor_to_selection(state, view_data);
    let shown = state.visible_influencers().len();
    emit_status(
        state,
        view_data,
        internal_tx,
        format!("filter: {} ({shown} shown)", filter.label()),
    );
}

fn select_under_cursor(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let target = state
        .visible_influencers()
        .get(view_data.directory_cursor)
        .map(|influencer| (influencer.id, influencer.handle.clone()));
    let Some((id, handle)) = target else {
        emit_status(state, view_data, internal_tx, "no influencer under cursor");
        return;
    };

    if state.dispatch(AppCommand::SelectInfluencer(id)).is_empty() {
        return;
    }
    tracing::debug!(influencer_id = id.get(), "influencer selected");
    emit_status(state, view_data, internal_tx, format!("selected {handle}"));
}

fn move_cursor(state: &DashboardState, view_data: &mut ViewData, delta: isize) {
    let len = state.visible_influencers().len();
    if len == 0 {
        view_data.directory_cursor = 0;
        return;
    }
    let current = view_data.directory_cursor.min(len - 1) as isize;
    view_data.directory_cursor = (current + delta).clamp(0, len as isize - 1) as usize;
}

/// Puts the cursor on the selected influencer when it is visible, otherwise
/// clamps it into the visible range.
fn sync_cursor_to_selection(state: &DashboardState, view_data: &mut ViewData) {
    let visible = state.visible_influencers();
    let selected = state.selected().id;
    view_data.directory_cursor = visible
        .iter()
        .position(|influencer| influencer.id == selected)
        .unwrap_or_else(|| view_data.directory_cursor.min(visible.len().saturating_sub(1)));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &DashboardState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, layout[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(layout[1]);
    render_sidebar(frame, body[0], state, view_data);
    render_conversation(frame, body[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);
}

fn render_header(frame: &mut ratatui::Frame<'_>, area: Rect, state: &DashboardState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(36)])
        .split(area);

    let overview = &state.overview;
    let title = Line::from(vec![
        Span::styled(
            "Campaign Negotiations",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} Active Negotiations ", overview.active_negotiations),
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" {} Agreements ", overview.agreements),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
    ]);
    let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, columns[0]);

    let gauge = Gauge::default()
        .block(Block::default().title("Total Budget").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(overview.budget_ratio())
        .label(budget_label(state));
    frame.render_widget(gauge, columns[1]);
}

fn budget_label(state: &DashboardState) -> String {
    format!(
        "{} / {}",
        format_euros(state.overview.budget_spent_euros),
        format_euros(state.overview.budget_total_euros)
    )
}

fn render_sidebar(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &DashboardState,
    view_data: &ViewData,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let tabs = Tabs::new(filter_bar_titles())
        .block(Block::default().title("filter").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(state.filter().position());
    frame.render_widget(tabs, sections[0]);

    let focused = state.mode == AppMode::Directory;
    let directory = Paragraph::new(directory_lines(state, view_data.directory_cursor, focused))
        .block(
            Block::default()
                .title("Influencer List")
                .borders(Borders::ALL)
                .border_style(focus_border(focused)),
        );
    frame.render_widget(directory, sections[1]);
}

fn filter_bar_titles() -> Vec<String> {
    StatusFilter::ALL
        .iter()
        .enumerate()
        .map(|(index, filter)| format!("{} {}", index + 1, filter.label()))
        .collect()
}

fn directory_lines(state: &DashboardState, cursor: usize, focused: bool) -> Vec<Line<'static>> {
    let visible = state.visible_influencers();
    if visible.is_empty() {
        return vec![Line::from(Span::styled(
            format!("no influencers match {}", state.filter().label()),
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let selected = state.selected().id;
    let mut lines = Vec::with_capacity(visible.len() * 2);
    for (index, influencer) in visible.iter().enumerate() {
        let marker = if influencer.id == selected { "●" } else { " " };
        let mut row = Line::from(vec![
            Span::raw(format!("{marker} [{}] ", influencer.avatar_glyph())),
            Span::styled(
                influencer.handle.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            status_badge(influencer),
        ]);
        if focused && index == cursor {
            row = row.style(Style::default().add_modifier(Modifier::REVERSED));
        }
        lines.push(row);
        lines.push(Line::from(Span::styled(
            format!("      {} followers", influencer.followers),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn status_badge(influencer: &Influencer) -> Span<'static> {
    Span::styled(
        format!(" {} ", influencer.status.label()),
        tone_style(status_tone(influencer.status)),
    )
}

fn tone_style(tone: StatusTone) -> Style {
    match tone {
        StatusTone::Amber => Style::default().fg(Color::Black).bg(Color::Yellow),
        StatusTone::Success => Style::default().fg(Color::Black).bg(Color::Green),
        StatusTone::Purple => Style::default().fg(Color::White).bg(Color::Magenta),
        StatusTone::Blue => Style::default().fg(Color::White).bg(Color::Blue),
        StatusTone::Plain => Style::default(),
    }
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn render_conversation(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &DashboardState,
    view_data: &ViewData,
) {
    let summary_height = if state.show_summary { 4 } else { 0 };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(summary_height),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let chat_header = Paragraph::new(chat_header_lines(state))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(chat_header, sections[0]);

    if state.show_summary {
        let summary = Paragraph::new(summary_lines(state)).block(
            Block::default()
                .title("Negotiation Summary")
                .borders(Borders::ALL),
        );
        frame.render_widget(summary, sections[1]);
    }

    let thread_area = sections[2];
    let inner_width = thread_area.width.saturating_sub(2) as usize;
    let inner_height = thread_area.height.saturating_sub(2);
    let lines = thread_lines(state, inner_width);
    let scroll = thread_scroll_offset(lines.len(), inner_height, view_data.thread_scroll_back);
    let thread = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(thread, thread_area);

    let composing = state.mode == AppMode::Compose;
    let composer_area = sections[3];
    // Borders, the "> " prompt and the cursor cell leave width - 5 columns of text.
    let composer_cols = composer_area.width.saturating_sub(5) as usize;
    let composer = Paragraph::new(composer_line(state.composer(), composer_cols)).block(
        Block::default()
            .title("message")
            .borders(Borders::ALL)
            .border_style(focus_border(composing)),
    );
    frame.render_widget(composer, composer_area);
    if composing {
        let typed = composer_tail(state.composer(), composer_cols).width() as u16;
        let x = composer_area.x.saturating_add(3).saturating_add(typed);
        frame.set_cursor_position((x, composer_area.y + 1));
    }

    let hint = Paragraph::new(Span::styled(
        "AI is currently handling this negotiation. Press tab to write in the thread.",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(hint, sections[4]);
}

fn chat_header_lines(state: &DashboardState) -> Vec<Line<'static>> {
    let selected = state.selected();
    vec![
        Line::from(vec![
            Span::raw(format!("[{}] ", selected.avatar_glyph())),
            Span::styled(
                selected.handle.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("AI responds in: {}", state.summary.response_window),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(Span::styled(
            state.summary.tagline.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn summary_lines(state: &DashboardState) -> Vec<Line<'static>> {
    let summary = &state.summary;
    let cells = [
        ("Target Budget", format_euros(summary.target_budget_euros)),
        ("Current Offer", format_euros(summary.current_offer_euros)),
        ("Deliverables", summary.deliverables.clone()),
        ("Timeline", summary.timeline.clone()),
    ];

    let labels = cells
        .iter()
        .map(|(label, _)| {
            Span::styled(
                format!("{label:<20}"),
                Style::default().fg(Color::DarkGray),
            )
        })
        .collect::<Vec<_>>();
    let values = cells
        .iter()
        .enumerate()
        .map(|(index, (_, value))| {
            let style = if index == 1 {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Span::styled(format!("{value:<20}"), style)
        })
        .collect::<Vec<_>>();
    vec![Line::from(labels), Line::from(values)]
}

/// Builds the thread as display lines. Influencer bubbles are labelled with
/// the currently selected influencer because the thread is shared.
fn thread_lines(state: &DashboardState, width: usize) -> Vec<Line<'static>> {
    let bubble_width = (width * BUBBLE_WIDTH_PERCENT / 100).max(12);
    let selected = state.selected();
    let mut lines = Vec::new();

    for message in state.messages() {
        let (alignment, header, body_style) = match message.sender {
            SenderRole::Ai => (
                Alignment::Left,
                format!("[{AI_AVATAR_GLYPH}] {AI_SENDER_LABEL}  {}", message.timestamp),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
            SenderRole::Influencer => (
                Alignment::Right,
                format!(
                    "{}  {} [{}]",
                    selected.handle,
                    message.timestamp,
                    selected.avatar_glyph()
                ),
                Style::default().fg(Color::White),
            ),
        };

        lines.push(
            Line::from(Span::styled(header, Style::default().fg(Color::DarkGray)))
                .alignment(alignment),
        );
        for segment in wrap_text(&message.content, bubble_width) {
            lines.push(Line::from(Span::styled(segment, body_style)).alignment(alignment));
        }
        if message.kind == MessageKind::Video {
            for segment in video_preview_lines(message.preview_or_placeholder(), bubble_width) {
                lines.push(Line::from(Span::raw(segment)).alignment(alignment));
            }
        }
        lines.push(Line::default());
    }

    lines
}

fn thread_scroll_offset(total_lines: usize, viewport: u16, scroll_back: u16) -> u16 {
    let overflow = u16::try_from(total_lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(viewport);
    overflow.saturating_sub(scroll_back)
}

/// Terminal cells are about twice as tall as wide, so a 4:5 preview needs
/// five rows for every eight columns.
fn video_preview_size(max_cols: usize) -> (usize, usize) {
    let cols = max_cols.clamp(8, VIDEO_PREVIEW_MAX_COLS);
    let rows = (cols * 5).div_ceil(8);
    (cols, rows)
}

fn video_preview_lines(reference: &str, max_cols: usize) -> Vec<String> {
    let (cols, rows) = video_preview_size(max_cols);
    let inner = cols - 2;
    let middle = (rows - 2) / 2;

    let mut lines = Vec::with_capacity(rows + 1);
    lines.push(format!("┌{}┐", "─".repeat(inner)));
    for row in 0..rows - 2 {
        if row == middle {
            let left = (inner - 1) / 2;
            let right = inner - 1 - left;
            lines.push(format!(
                "│{}{PLAY_GLYPH}{}│",
                " ".repeat(left),
                " ".repeat(right)
            ));
        } else {
            lines.push(format!("│{}│", " ".repeat(inner)));
        }
    }
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines.push(truncate_label(reference, max_cols.max(cols)));
    lines
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if current_width > 0 && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width > width {
            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width > 0 && current_width + ch_width > width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
            continue;
        }
        if current_width > 0 {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if current_width > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate_label(value: &str, max_cols: usize) -> String {
    if value.width() <= max_cols {
        return value.to_owned();
    }
    if max_cols <= 1 {
        return "…".to_owned();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in value.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > max_cols - 1 {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

/// Longest suffix of `input` that fits in `max_cols` terminal columns.
fn composer_tail(input: &str, max_cols: usize) -> &str {
    let mut used = 0;
    let mut start = input.len();
    for (index, ch) in input.char_indices().rev() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > max_cols {
            break;
        }
        used += ch_width;
        start = index;
    }
    &input[start..]
}

fn composer_line(input: &str, max_cols: usize) -> Line<'static> {
    if input.is_empty() {
        return Line::from(vec![
            Span::raw("> "),
            Span::styled(COMPOSER_PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        ]);
    }
    Line::from(format!("> {}", composer_tail(input, max_cols)))
}

fn status_text(state: &DashboardState) -> String {
    let (mode, keys) = match state.mode {
        AppMode::Directory => (
            "DIR",
            "j/k move | enter select | 1-5 f/F filter | s summary | tab compose | pgup/pgdn scroll | q quit",
        ),
        AppMode::Compose => (
            "MSG",
            "enter send | ctrl+u clear | esc/tab directory | pgup/pgdn scroll | ctrl+q quit",
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {keys}"),
        None => format!("{mode} | {keys}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, budget_label, composer_line, composer_tail,
        directory_lines,
        filter_bar_titles, handle_key_event, process_internal_events, render, status_text,
        thread_lines, thread_scroll_offset, tone_style, truncate_label, video_preview_lines,
        video_preview_size, wrap_text,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use negotiate_app::{
        AppMode, DashboardState, InfluencerId, InfluencerStatus, Message, MessageKind, SenderRole,
        StatusFilter, StatusTone, demo_seed,
    };
    use negotiate_testkit::{fixture_time, mixed_directory_seed};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Alignment;
    use ratatui::style::Color;
    use ratatui::text::Line;
    use std::sync::mpsc;
    use time::OffsetDateTime;
    use unicode_width::UnicodeWidthStr;

    #[derive(Debug, Default)]
    struct TestRuntime {
        hour: u8,
        appended: Vec<Message>,
        fail_hook: bool,
    }

    impl AppRuntime for TestRuntime {
        fn now(&mut self) -> OffsetDateTime {
            fixture_time(self.hour, 15).unwrap_or(OffsetDateTime::UNIX_EPOCH)
        }

        fn message_appended(&mut self, message: &Message) -> Result<()> {
            if self.fail_hook {
                anyhow::bail!("hook offline");
            }
            self.appended.push(message.clone());
            Ok(())
        }
    }

    fn demo_state() -> DashboardState {
        DashboardState::from_seed(demo_seed(), StatusFilter::All).expect("demo seed is valid")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }

    fn run_keys(
        state: &mut DashboardState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        keys: &[KeyEvent],
    ) -> bool {
        let (tx, _rx) = mpsc::channel();
        let mut quit = false;
        for key in keys {
            quit = handle_key_event(state, runtime, view_data, &tx, *key);
        }
        quit
    }

    fn type_text(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    #[test]
    fn digit_keys_activate_filters_and_clamp_cursor() {
        let mut state = DashboardState::from_seed(mixed_directory_seed(), StatusFilter::All)
            .expect("fixture seed is valid");
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData {
            directory_cursor: 4,
            ..ViewData::default()
        };

        run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('2'))]);
        assert_eq!(
            state.filter(),
            StatusFilter::Only(InfluencerStatus::Negotiating)
        );
        // Influencer 1 is selected and visible, so the cursor lands on it.
        assert_eq!(view_data.directory_cursor, 0);
        assert_eq!(
            state.status_line.as_deref(),
            Some("filter: Negotiating (2 shown)")
        );

        run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('5'))]);
        assert_eq!(view_data.directory_cursor, 0);
        assert_eq!(state.visible_influencers().len(), 1);
    }

    #[test]
    fn f_keys_cycle_filters() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('F'))]);
        assert_eq!(state.filter(), StatusFilter::Only(InfluencerStatus::Published));

        run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('f')), key(KeyCode::Char('f'))],
        );
        assert_eq!(state.filter(), StatusFilter::Only(InfluencerStatus::Negotiating));
    }

    #[test]
    fn enter_selects_influencer_under_cursor() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[
                key(KeyCode::Char('j')),
                key(KeyCode::Down),
                key(KeyCode::Enter),
            ],
        );
        assert_eq!(state.selected().id, InfluencerId::new(3));
        assert_eq!(state.status_line.as_deref(), Some("selected @urban_chic"));

        run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('G')), key(KeyCode::Char('j')), key(KeyCode::Enter)],
        );
        assert_eq!(state.selected().id, InfluencerId::new(5));

        run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::Char('g')), key(KeyCode::Up), key(KeyCode::Char(' '))],
        );
        assert_eq!(state.selected().id, InfluencerId::new(1));
    }

    #[test]
    fn enter_on_empty_directory_reports_status() {
        let mut state = DashboardState::from_seed(
            negotiate_testkit::seed_with_statuses(&[InfluencerStatus::Agreed]),
            StatusFilter::Only(InfluencerStatus::Published),
        )
        .expect("fixture seed is valid");
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(
            state.status_line.as_deref(),
            Some("no influencer under cursor")
        );
        assert_eq!(state.selected().id, InfluencerId::new(1));
    }

    #[test]
    fn composer_enter_appends_message_and_notifies_runtime() {
        let mut state = demo_state();
        let mut runtime = TestRuntime {
            hour: 16,
            ..TestRuntime::default()
        };
        let mut view_data = ViewData {
            thread_scroll_back: 20,
            ..ViewData::default()
        };

        let mut keys = vec![key(KeyCode::Tab)];
        keys.extend(type_text("Sounds good"));
        keys.push(key(KeyCode::Enter));
        run_keys(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(state.mode, AppMode::Compose);
        assert_eq!(state.messages().len(), 5);
        assert!(state.composer().is_empty());
        assert_eq!(view_data.thread_scroll_back, 0);

        let last = state.messages().last().expect("message appended");
        assert_eq!(last.content, "Sounds good");
        assert_eq!(last.sender, SenderRole::Influencer);
        assert_eq!(last.timestamp, "4:15 PM");
        assert_eq!(runtime.appended, vec![last.clone()]);
    }

    #[test]
    fn composer_enter_with_blank_input_is_ignored() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        let mut keys = vec![key(KeyCode::Char('i'))];
        keys.extend(type_text("   "));
        keys.push(key(KeyCode::Enter));
        run_keys(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(state.messages().len(), 4);
        assert_eq!(state.composer(), "   ");
        assert!(runtime.appended.is_empty());
    }

    #[test]
    fn composer_hook_failure_surfaces_in_status_line() {
        let mut state = demo_state();
        let mut runtime = TestRuntime {
            fail_hook: true,
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();

        let mut keys = vec![key(KeyCode::Tab)];
        keys.extend(type_text("ok"));
        keys.push(key(KeyCode::Enter));
        run_keys(&mut state, &mut runtime, &mut view_data, &keys);

        assert_eq!(state.messages().len(), 5);
        let status = state.status_line.clone().unwrap_or_default();
        assert!(status.contains("hook offline"), "status was {status}");
    }

    #[test]
    fn composer_editing_keys() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        let mut keys = vec![key(KeyCode::Tab)];
        keys.extend(type_text("hiq"));
        keys.push(key(KeyCode::Backspace));
        run_keys(&mut state, &mut runtime, &mut view_data, &keys);
        assert_eq!(state.composer(), "hi");

        let quit = run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)],
        );
        assert!(!quit);
        assert!(state.composer().is_empty());

        run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Esc)]);
        assert_eq!(state.mode, AppMode::Directory);
    }

    #[test]
    fn quit_keys_depend_on_focus() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        assert!(run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('q'))]));

        state.mode = AppMode::Compose;
        assert!(!run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('q'))]));
        assert_eq!(state.composer(), "q");
        assert!(run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)],
        ));
    }

    #[test]
    fn summary_toggle_key_updates_state() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        run_keys(&mut state, &mut runtime, &mut view_data, &[key(KeyCode::Char('s'))]);
        assert!(!state.show_summary);
        assert_eq!(state.status_line.as_deref(), Some("summary hidden"));
    }

    #[test]
    fn page_keys_scroll_thread_back_and_forth() {
        let mut state = demo_state();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        run_keys(
            &mut state,
            &mut runtime,
            &mut view_data,
            &[key(KeyCode::PageUp), key(KeyCode::PageUp), key(KeyCode::PageDown)],
        );
        assert_eq!(view_data.thread_scroll_back, 10);
        assert_eq!(thread_scroll_offset(50, 20, view_data.thread_scroll_back), 20);
        assert_eq!(thread_scroll_offset(5, 20, 0), 0);
    }

    #[test]
    fn stale_status_clear_tokens_are_ignored() {
        let mut state = demo_state();
        state.status_line = Some("filter: All".to_owned());
        let view_data = ViewData {
            status_token: 2,
            ..ViewData::default()
        };
        let (tx, rx) = mpsc::channel();

        tx.send(InternalEvent::ClearStatus { token: 1 })
            .expect("channel open");
        process_internal_events(&mut state, &view_data, &rx);
        assert!(state.status_line.is_some());

        tx.send(InternalEvent::ClearStatus { token: 2 })
            .expect("channel open");
        process_internal_events(&mut state, &view_data, &rx);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn directory_lines_mark_selection_and_status() {
        let state = demo_state();
        let lines = directory_lines(&state, 1, true);
        assert_eq!(lines.len(), 10);
        assert_eq!(
            line_text(&lines[0]),
            "● [f] @fashionista_elena  Negotiating "
        );
        assert_eq!(line_text(&lines[1]), "      250K followers");
        assert!(line_text(&lines[4]).contains(" Content Received "));
    }

    #[test]
    fn directory_lines_show_empty_filter_message() {
        let state = DashboardState::from_seed(
            negotiate_testkit::seed_with_statuses(&[InfluencerStatus::Agreed]),
            StatusFilter::Only(InfluencerStatus::Published),
        )
        .expect("fixture seed is valid");
        let lines = directory_lines(&state, 0, true);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "no influencers match Published");
    }

    #[test]
    fn filter_bar_lists_all_five_in_order() {
        assert_eq!(
            filter_bar_titles(),
            vec![
                "1 All",
                "2 Negotiating",
                "3 Agreed",
                "4 Content Received",
                "5 Published"
            ]
        );
    }

    #[test]
    fn tone_styles_map_to_distinct_colors() {
        assert_eq!(tone_style(StatusTone::Amber).bg, Some(Color::Yellow));
        assert_eq!(tone_style(StatusTone::Success).bg, Some(Color::Green));
        assert_eq!(tone_style(StatusTone::Purple).bg, Some(Color::Magenta));
        assert_eq!(tone_style(StatusTone::Blue).bg, Some(Color::Blue));
        assert_eq!(tone_style(StatusTone::Plain).bg, None);
    }

    #[test]
    fn thread_aligns_by_sender_and_uses_selected_identity() {
        let mut state = demo_state();
        state.dispatch(negotiate_app::AppCommand::SelectInfluencer(
            InfluencerId::new(3),
        ));
        let lines = thread_lines(&state, 80);

        assert_eq!(line_text(&lines[0]), "[AI] AI Assistant  2:34 PM");
        assert_eq!(lines[0].alignment, Some(Alignment::Left));

        let influencer_header = lines
            .iter()
            .find(|line| line_text(line).contains("2:45 PM"))
            .expect("influencer header rendered");
        assert_eq!(line_text(influencer_header), "@urban_chic  2:45 PM [u]");
        assert_eq!(influencer_header.alignment, Some(Alignment::Right));
    }

    #[test]
    fn thread_renders_video_preview_with_play_glyph() {
        let state = demo_state();
        let text = thread_lines(&state, 80)
            .iter()
            .map(line_text)
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("▶"));
        assert!(text.contains("/fashion-video-preview.jpg"));
        assert_eq!(text.matches('▶').count(), 1);
    }

    #[test]
    fn video_preview_keeps_four_by_five_shape() {
        assert_eq!(video_preview_size(80), (24, 15));
        assert_eq!(video_preview_size(16), (16, 10));
        assert_eq!(video_preview_size(2), (8, 5));

        let lines = video_preview_lines("/clip.jpg", 16);
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with('┌'));
        assert!(lines[9].starts_with('└'));
        assert_eq!(lines[10], "/clip.jpg");
        let play_row = lines
            .iter()
            .position(|line| line.contains('▶'))
            .expect("play glyph row");
        assert_eq!(play_row, 5);
    }

    #[test]
    fn wrap_text_breaks_on_words_and_splits_long_tokens() {
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn composer_shows_placeholder_when_empty() {
        assert_eq!(line_text(&composer_line("", 20)), "> Type your message...");
        assert_eq!(line_text(&composer_line("hey", 20)), "> hey");
    }

    #[test]
    fn composer_shows_only_the_tail_that_fits() {
        assert_eq!(composer_tail("hello world", 5), "world");
        assert_eq!(composer_tail("short", 40), "short");
        assert_eq!(composer_tail("abc", 0), "");
        assert_eq!(composer_tail("日本語", 4), "本語");
        assert_eq!(line_text(&composer_line("abcdefghij", 4)), "> ghij");
    }

    #[test]
    fn wrap_text_measures_wide_glyphs_in_columns() {
        let lines = wrap_text("日本語のテキスト", 6);
        assert_eq!(lines, vec!["日本語", "のテキ", "スト"]);
        assert_eq!(wrap_text("hi 😀😀 there", 5), vec!["hi", "😀😀", "there"]);
        for line in wrap_text("交渉は順調です 😀 great news from the team", 7) {
            assert!(line.width() <= 7, "{line:?} overflows");
        }
    }

    #[test]
    fn truncate_label_counts_columns() {
        assert_eq!(truncate_label("日本語テキスト", 7), "日本語…");
        assert_eq!(truncate_label("日本語", 6), "日本語");
        assert_eq!(truncate_label("abcdef", 4), "abc…");
    }

    #[test]
    fn long_composer_input_scrolls_and_keeps_cursor_after_tail() -> Result<()> {
        let mut state = demo_state();
        state.dispatch(negotiate_app::AppCommand::FocusComposer);
        let input = format!("{}TAILEND", "x".repeat(300));
        state.dispatch(negotiate_app::AppCommand::SetComposer(input));
        let view_data = ViewData::default();
        let mut terminal = Terminal::new(TestBackend::new(140, 48))?;
        terminal.draw(|frame| render(frame, &state, &view_data))?;

        let buffer = terminal.backend().buffer().clone();
        let width = buffer.area.width as usize;
        let rows = buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>();
        let (row, byte) = rows
            .iter()
            .enumerate()
            .find_map(|(row, text)| text.find("TAILEND").map(|byte| (row, byte)))
            .expect("tail of the composer is visible");
        assert!(rows[row][..byte].ends_with('x'));
        let column = rows[row][..byte].chars().count();
        assert_eq!(rows[row].chars().nth(column + 7), Some(' '));

        let cursor = terminal.get_cursor_position()?;
        assert_eq!(cursor.y as usize, row);
        assert_eq!(cursor.x as usize, column + "TAILEND".len());
        Ok(())
    }

    #[test]
    fn status_text_reflects_focus_and_status() {
        let mut state = demo_state();
        assert!(status_text(&state).starts_with("DIR | j/k move"));

        state.mode = AppMode::Compose;
        state.status_line = Some("selected @urban_chic".to_owned());
        assert!(status_text(&state).starts_with("MSG | selected @urban_chic | enter send"));
    }

    #[test]
    fn budget_label_formats_euros() {
        assert_eq!(budget_label(&demo_state()), "€78,000 / €100,000");
    }

    #[test]
    fn full_frame_renders_every_panel() -> Result<()> {
        let mut state = demo_state();
        state.dispatch(negotiate_app::AppCommand::SetComposer("draft".to_owned()));
        let view_data = ViewData::default();
        let mut terminal = Terminal::new(TestBackend::new(140, 48))?;
        terminal.draw(|frame| render(frame, &state, &view_data))?;

        let screen = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        for needle in [
            "Campaign Negotiations",
            "42 Active Negotiations",
            "€78,000 / €100,000",
            "Influencer List",
            "@minimalist_wardrobe",
            "Negotiation Summary",
            "€6,500",
            "AI responds in: 30m-2h",
            "> draft",
        ] {
            assert!(screen.contains(needle), "missing {needle:?}");
        }
        Ok(())
    }

    #[test]
    fn video_messages_without_preview_render_placeholder() {
        let mut state = demo_state();
        let mut seed = demo_seed();
        seed.messages = vec![Message {
            id: negotiate_app::MessageId::new(1),
            sender: SenderRole::Ai,
            content: "clip".to_owned(),
            timestamp: "1:00 PM".to_owned(),
            kind: MessageKind::Video,
            video_preview: Some(String::new()),
        }];
        state = DashboardState::from_seed(seed, state.filter()).expect("seed is valid");
        let text = thread_lines(&state, 60)
            .iter()
            .map(line_text)
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("/placeholder.svg"));
    }
}
