//! Transcript cells.
//!
//! Each cell turns into `Vec<Line<'static>>` for a given width so the transcript view can measure
//! and scroll the whole conversation as one list of lines.

use chrono::DateTime;
use chrono::Local;
use chrono::TimeZone;
use parley_protocol::Message;
use parley_protocol::Role;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::render::ContentRenderer;
use crate::ui_colors::Theme;

/// Columns reserved on the left of message bodies.
const BODY_INDENT: &str = "  ";
const STREAMING_CURSOR: &str = "▌";

pub trait HistoryCell {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>>;

    fn desired_height(&self, width: u16) -> u16 {
        u16::try_from(self.display_lines(width).len()).unwrap_or(u16::MAX)
    }
}

pub struct MessageCell<'a> {
    message: &'a Message,
    copied: bool,
    theme: Theme,
    renderer: &'a dyn ContentRenderer,
}

impl<'a> MessageCell<'a> {
    pub fn new(
        message: &'a Message,
        copied: bool,
        theme: Theme,
        renderer: &'a dyn ContentRenderer,
    ) -> Self {
        Self {
            message,
            copied,
            theme,
            renderer,
        }
    }

    fn header(&self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = match self.message.role {
            Role::User => vec!["› ".fg(self.theme.accent), "You".bold()],
            Role::Assistant => vec!["◆ ".fg(self.theme.accent), "Assistant".bold()],
        };
        let timestamp = format_timestamp(&self.message.created_at.with_timezone(&Local));
        spans.push(format!("  {timestamp}").dim());
        if self.copied {
            spans.push("  ✓ Copied".green());
        }
        Line::from(spans)
    }
}

impl HistoryCell for MessageCell<'_> {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>> {
        let body_width = width.saturating_sub(BODY_INDENT.len() as u16).max(1);
        let mut lines = vec![self.header()];

        let mut body = if self.message.content.is_empty() {
            vec![Line::default()]
        } else {
            self.renderer.render(&self.message.content, body_width)
        };
        if self.message.streaming
            && let Some(last) = body.last_mut()
        {
            last.push_span(STREAMING_CURSOR.fg(self.theme.accent));
        }

        for line in body {
            let mut spans = vec![Span::raw(BODY_INDENT)];
            spans.extend(line.spans);
            let mut indented = Line::from(spans);
            indented.style = line.style;
            if self.message.role == Role::User {
                indented = indented.bg(self.theme.tint);
            }
            lines.push(indented);
        }
        lines.push(Line::default());
        lines
    }
}

/// Shown while the transcript is empty.
pub struct EmptyStateCell;

impl HistoryCell for EmptyStateCell {
    fn display_lines(&self, _width: u16) -> Vec<Line<'static>> {
        vec![
            Line::from("Start a conversation".bold()).centered(),
            Line::from("Ask me anything and I'll do my best to help!".dim()).centered(),
        ]
    }
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-I:%M:%S %p").to_string()
}
