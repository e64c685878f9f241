// SPDX-License-Identifier: MIT

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::config::Theme;
use crate::transcript::{ChatEntry, EntryStatus, Role};

use super::app::{App, SUGGESTIONS};
use super::markdown::{display_width, render_markdown};
use super::view::View;

pub(super) const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

struct Palette {
    base: Style,
    dim: Style,
    accent: Style,
    error: Style,
    code: Style,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            base: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            accent: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
            code: Style::default().fg(Color::Cyan),
        },
        Theme::Light => Palette {
            base: Style::default().fg(Color::Black).bg(Color::White),
            dim: Style::default().fg(Color::Gray).bg(Color::White),
            accent: Style::default().fg(Color::Blue).bg(Color::White),
            error: Style::default().fg(Color::Red).bg(Color::White),
            code: Style::default().fg(Color::Magenta).bg(Color::White),
        },
    }
}

pub(super) fn draw(frame: &mut Frame, app: &mut App) {
    let colors = palette(app.theme);
    let area = frame.area();

    if app.theme == Theme::Light {
        frame.render_widget(Block::default().style(Style::default().bg(Color::White)), area);
    }

    let [main_area, input_area, status_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    match app.guard.view() {
        View::Home => draw_home(frame, app, main_area, &colors),
        View::Chat => draw_chat(frame, app, main_area, &colors),
    }

    draw_input(frame, app, input_area, &colors);
    draw_status(frame, app, status_area, &colors);

    if app.guard.exit_prompt_open() {
        draw_exit_prompt(frame, area, &colors);
    }
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let [_, heading_area, list_area] = Layout::vertical([
        Constraint::Length(area.height / 4),
        Constraint::Length(4),
        Constraint::Min(1),
    ])
    .areas(area);

    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            app.greeting(),
            colors.accent.add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Ask anything about the Bhagavad Gita, or pick a suggestion.",
            colors.dim,
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(heading, heading_area);

    let items: Vec<ListItem> = SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let style = if i == app.suggestion_index {
                colors.accent.add_modifier(Modifier::BOLD)
            } else {
                colors.base
            };
            let marker = if i == app.suggestion_index { "❯ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, colors.accent),
                Span::styled(*text, style),
            ]))
        })
        .collect();

    let width = SUGGESTIONS.iter().map(|s| s.len()).max().unwrap_or(0) as u16 + 4;
    let x = list_area.x + list_area.width.saturating_sub(width) / 2;
    let centered = Rect {
        x,
        y: list_area.y,
        width: width.min(list_area.width),
        height: (SUGGESTIONS.len() as u16).min(list_area.height),
    };
    frame.render_widget(List::new(items), centered);
}

fn draw_chat(frame: &mut Frame, app: &mut App, area: Rect, colors: &Palette) {
    let inner_width = area.width.saturating_sub(2).max(1);

    let mut lines: Vec<Line> = Vec::new();
    for entry in app.transcript.entries() {
        push_entry_lines(&mut lines, entry, app.spinner_frame, colors);
        lines.push(Line::default());
    }

    let total = wrapped_height(&lines, inner_width);
    let max_scroll = total
        .saturating_sub(area.height as usize)
        .min(u16::MAX as usize) as u16;
    if app.stick_to_bottom {
        app.scroll = max_scroll;
    } else {
        app.scroll = app.scroll.min(max_scroll);
        if app.scroll == max_scroll {
            app.stick_to_bottom = true;
        }
    }

    let chat = Paragraph::new(lines)
        .style(colors.base)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(chat, area);
}

/// Estimate the wrapped height of the transcript so auto-follow can pin
/// the latest reply. Counted in `usize`; callers saturate when converting
/// to the u16 scroll offset.
fn wrapped_height(lines: &[Line], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| {
            let cols: usize = line.spans.iter().map(|s| display_width(&s.content)).sum();
            cols.div_ceil(width).max(1)
        })
        .sum()
}

fn push_entry_lines(lines: &mut Vec<Line>, entry: &ChatEntry, spinner_frame: usize, colors: &Palette) {
    match entry.role {
        Role::User => {
            lines.push(Line::from(Span::styled(
                "You",
                colors.accent.add_modifier(Modifier::BOLD),
            )));
            for text_line in entry.text.lines() {
                lines.push(Line::from(Span::styled(text_line.to_string(), colors.base)));
            }
            if let Some(attachment) = &entry.attachment {
                let icon = if attachment.is_image { "🖼 " } else { "📎 " };
                lines.push(Line::from(Span::styled(
                    format!("{icon}{}", attachment.file_name),
                    colors.dim,
                )));
            }
        }
        Role::Bot => {
            lines.push(Line::from(Span::styled(
                "Gita Bot",
                colors.code.add_modifier(Modifier::BOLD),
            )));
            match entry.status {
                EntryStatus::Pending => {
                    let spinner = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
                    lines.push(Line::from(Span::styled(
                        format!("{spinner} {}", entry.text),
                        colors.dim.add_modifier(Modifier::ITALIC),
                    )));
                }
                EntryStatus::Complete => {
                    lines.extend(render_markdown(&entry.text, colors.base, colors.code));
                }
                EntryStatus::Errored => {
                    for text_line in entry.text.lines() {
                        lines.push(Line::from(Span::styled(text_line.to_string(), colors.error)));
                    }
                }
            }
        }
    }
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let title = if app.lifecycle.is_pending() {
        " Waiting for Gita Bot (Ctrl+C to stop) "
    } else if app.attachments.is_active() {
        " Message Gita Bot (attachment ready) "
    } else {
        " Message Gita Bot "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(colors.dim)
        .title(Span::styled(title, colors.dim));
    let inner = block.inner(area);

    let input = Paragraph::new(app.input.as_str()).style(colors.base).block(block);
    frame.render_widget(input, area);

    // Cursor tracks the byte offset's display column, single-line input.
    let column = app.input[..app.cursor].chars().count() as u16;
    let x = inner.x + column.min(inner.width.saturating_sub(1));
    frame.set_cursor_position(Position::new(x, inner.y));
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let left = match &app.status_note {
        Some(note) => note.clone(),
        None => match app.guard.view() {
            View::Home => "Enter: ask · ↑/↓: suggestions · /quit: exit".to_string(),
            View::Chat => "Esc: back · /attach <file> · /theme · /clear".to_string(),
        },
    };

    let mut spans = vec![Span::styled(left, colors.dim)];
    if app.lifecycle.is_pending() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(format!("  {spinner}"), colors.accent));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_exit_prompt(frame: &mut Frame, area: Rect, colors: &Palette) {
    let width = 36.min(area.width);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(colors.accent)
        .title(Span::styled(" Leave Gita Bot? ", colors.accent));
    let body = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled("[Y]es, leave    [N]o, stay", colors.base)),
    ])
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(body, popup);
}
