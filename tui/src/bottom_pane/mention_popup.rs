//! Mention picker popup.
//!
//! The popup is driven by `@`-queries in the composer (`ChatComposer`): the composer owns the
//! query detection and calls [`MentionPopup::set_query`] after every edit; this type only keeps
//! the live-filtered rows and the selection.

use parley_protocol::Mention;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;

use crate::mention_index::MentionIndex;
use crate::render::renderable::Renderable;

pub const MAX_POPUP_ROWS: usize = 6;

pub struct MentionPopup {
    /// Byte offset of the `@` that opened the popup.
    anchor: usize,
    query: String,
    matches: Vec<Mention>,
    selected_idx: Option<usize>,
    scroll_top: usize,
}

impl MentionPopup {
    pub fn new(anchor: usize, query: &str, index: &MentionIndex) -> Self {
        let mut popup = Self {
            anchor,
            query: String::new(),
            matches: Vec::new(),
            selected_idx: None,
            scroll_top: 0,
        };
        popup.set_query(anchor, query, index);
        popup
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    #[cfg(test)]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub fn matches(&self) -> &[Mention] {
        &self.matches
    }

    /// Re-filters against `index`. Keeps the selection when it is still in range.
    pub fn set_query(&mut self, anchor: usize, query: &str, index: &MentionIndex) {
        self.anchor = anchor;
        self.query = query.to_string();
        self.matches = index.filter(query).into_iter().cloned().collect();
        self.clamp_selection();
    }

    pub fn move_up(&mut self) {
        let len = self.matches.len();
        if len == 0 {
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        });
        self.ensure_visible();
    }

    pub fn move_down(&mut self) {
        let len = self.matches.len();
        if len == 0 {
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) if idx + 1 < len => idx + 1,
            _ => 0,
        });
        self.ensure_visible();
    }

    pub fn selected_mention(&self) -> Option<&Mention> {
        self.matches.get(self.selected_idx?)
    }

    pub fn calculate_required_height(&self) -> u16 {
        let visible = self.matches.len().clamp(1, MAX_POPUP_ROWS);
        (visible as u16).saturating_add(1)
    }

    fn clamp_selection(&mut self) {
        let len = self.matches.len();
        self.selected_idx = match self.selected_idx {
            _ if len == 0 => None,
            Some(idx) if idx < len => Some(idx),
            _ => Some(0),
        };
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let Some(selected) = self.selected_idx else {
            self.scroll_top = 0;
            return;
        };
        if selected < self.scroll_top {
            self.scroll_top = selected;
        } else if selected >= self.scroll_top + MAX_POPUP_ROWS {
            self.scroll_top = selected + 1 - MAX_POPUP_ROWS;
        }
    }

    fn row_line(&self, idx: usize, mention: &Mention) -> Line<'static> {
        let selected = self.selected_idx == Some(idx);
        let marker: Span<'static> = if selected { "› ".cyan() } else { "  ".into() };
        let name: Span<'static> = if selected {
            mention.display_name.clone().cyan().bold()
        } else {
            mention.display_name.clone().into()
        };
        Line::from(vec![
            marker,
            format!("{} ", mention.kind.glyph()).dim(),
            name,
            format!("  {}", mention.kind).dim(),
        ])
    }
}

impl Renderable for MentionPopup {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let list_rows = usize::from(area.height.saturating_sub(1)).min(MAX_POPUP_ROWS);
        let mut lines: Vec<Line<'static>> = if self.matches.is_empty() {
            vec![Line::from("  no matches".dim().italic())]
        } else {
            self.matches
                .iter()
                .enumerate()
                .skip(self.scroll_top)
                .take(list_rows.max(1))
                .map(|(idx, mention)| self.row_line(idx, mention))
                .collect()
        };
        if area.height > 1 {
            lines.push(mention_popup_hint_line());
        }
        Paragraph::new(lines).render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        self.calculate_required_height()
    }
}

fn mention_popup_hint_line() -> Line<'static> {
    Line::from(vec![
        "  Press ".dim(),
        "enter".bold(),
        " to insert or ".dim(),
        "esc".bold(),
        " to close".dim(),
    ])
}
