//! Scrollable transcript viewport.
//!
//! Scroll positions are measured in rows from the top of the transcript. The view owns the follow
//! controller and applies its effects; terminals cannot animate, so smooth and instant scrolls
//! both jump straight to the target row.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;

use crate::scroll_follow::ContentChange;
use crate::scroll_follow::ScrollEffect;
use crate::scroll_follow::ScrollFollowController;
use crate::scroll_follow::ScrollMetrics;

pub const DEFAULT_NEAR_BOTTOM_ROWS: u16 = 5;
/// Rows moved by one mouse wheel notch.
pub const WHEEL_SCROLL_ROWS: i32 = 3;

#[derive(Debug)]
pub struct TranscriptView {
    follow: ScrollFollowController,
    scroll_top: usize,
    content_height: usize,
    viewport_height: u16,
}

impl TranscriptView {
    pub fn new(near_bottom_rows: u16) -> Self {
        Self {
            follow: ScrollFollowController::new(f32::from(near_bottom_rows)),
            scroll_top: 0,
            content_height: 0,
            viewport_height: 0,
        }
    }

    pub fn show_jump_to_latest(&self) -> bool {
        self.follow.show_jump_to_latest()
    }

    /// Records the new content/viewport size and reacts to the content changes that produced it.
    pub fn sync(&mut self, content_height: usize, viewport_height: u16, changes: &[ContentChange]) {
        let resized = viewport_height != self.viewport_height;
        self.content_height = content_height;
        self.viewport_height = viewport_height;

        for change in changes {
            let effects = self.follow.on_content_change(*change, self.metrics());
            self.apply(effects);
        }

        if resized && self.follow.at_bottom() {
            self.scroll_top = self.max_scroll();
        }
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    /// Manual scroll; positive `delta` moves toward the latest message.
    pub fn scroll_by(&mut self, delta: i32) {
        let rows = delta.unsigned_abs() as usize;
        let target = if delta < 0 {
            self.scroll_top.saturating_sub(rows)
        } else {
            self.scroll_top.saturating_add(rows)
        };
        self.scroll_top = target.min(self.max_scroll());
        self.follow.on_scroll(self.metrics());
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.page_rows());
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page_rows());
    }

    pub fn jump_to_latest(&mut self) {
        let effect = self.follow.scroll_to_bottom();
        self.apply(vec![effect]);
    }

    pub fn reset(&mut self) {
        self.follow.reset();
        self.scroll_top = 0;
        self.content_height = 0;
    }

    /// Draws the rows of `lines` visible at the current scroll position.
    pub fn render(&self, lines: Vec<Line<'static>>, area: Rect, buf: &mut Buffer) {
        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(self.scroll_top)
            .take(usize::from(area.height))
            .collect();
        Paragraph::new(Text::from(visible)).render(area, buf);

        if self.show_jump_to_latest() && area.height > 0 {
            let hint = Line::from(vec![
                " ↓ Jump to latest ".black().on_cyan(),
                " ctrl+end ".dim(),
            ])
            .right_aligned();
            let hint_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);
            hint.render(hint_area, buf);
        }
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_height: self.content_height as f32,
            scroll_top: self.scroll_top as f32,
            client_height: f32::from(self.viewport_height),
        }
    }

    fn max_scroll(&self) -> usize {
        self.content_height
            .saturating_sub(usize::from(self.viewport_height))
    }

    fn page_rows(&self) -> i32 {
        i32::from(self.viewport_height.saturating_sub(1).max(1))
    }

    fn apply(&mut self, effects: Vec<ScrollEffect>) {
        for effect in effects {
            match effect {
                ScrollEffect::ScrollToBottom { .. } => self.scroll_top = self.max_scroll(),
            }
        }
    }
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self::new(DEFAULT_NEAR_BOTTOM_ROWS)
    }
}
