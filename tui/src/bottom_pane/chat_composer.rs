//! The chat composer is the bottom-pane draft state machine.
//!
//! It is responsible for:
//!
//! - Editing the draft text and cursor, with an optional character limit enforced at the edit
//!   boundary (an edit that would exceed the limit is rejected whole).
//! - Detecting the active `@`-query and keeping the [`MentionPopup`] in sync with it.
//! - Staging attachments through [`AttachmentStaging`].
//! - Holding the session-level mode, research tool flags and model selection.
//! - Turning the draft into a [`SubmissionPayload`] on Enter and resetting itself.
//!
//! # Key Event Routing
//!
//! [`ChatComposer::handle_key_event`] dispatches to the popup handler when the mention popup is
//! visible and otherwise to the plain editing handler. Every text mutation goes through
//! [`ChatComposer::on_text_change`], which re-runs mention-query detection, so the popup always
//! follows the latest buffer/cursor.
//!
//! # Mention Queries
//!
//! The active query is the text between the last `@` before the cursor and the cursor, as long as
//! it contains no whitespace. Escape dismisses the popup for that particular `@`; it reopens only
//! once a different `@` becomes active. Mentions are never pruned when their `@Name` text is
//! edited away.
use std::collections::BTreeSet;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use parley_protocol::Attachment;
use parley_protocol::AttachmentId;
use parley_protocol::ComposerMode;
use parley_protocol::FileRef;
use parley_protocol::Mention;
use parley_protocol::ModeOptions;
use parley_protocol::ResearchTool;
use parley_protocol::SubmissionPayload;
use parley_protocol::SubmitOptions;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Widget;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::attachment_staging::AttachmentStaging;
use super::mention_popup::MentionPopup;
use crate::clipboard_paste::pasted_file_refs;
use crate::mention_index::MentionIndex;
use crate::render::renderable::Renderable;

/// Prompt marker drawn before the first input row.
const PROMPT_PREFIX: &str = "› ";
const PROMPT_PREFIX_COLS: u16 = 2;
/// The input grows with its content up to this many rows, then scrolls with the cursor.
const MAX_INPUT_ROWS: u16 = 8;

/// Counter turns into a warning once the draft uses more than this share of the limit.
const NEAR_LIMIT_RATIO: f64 = 0.9;

/// Placeholder shown for each non-default mode. `ComposerMode::None` uses the configured
/// default placeholder instead.
const MODE_PLACEHOLDERS: [(ComposerMode, &str); 4] = [
    (ComposerMode::Agent, "Describe a task for the agent..."),
    (ComposerMode::Research, "What would you like to research?"),
    (ComposerMode::Image, "Describe the image you want to create..."),
    (ComposerMode::Think, "What should I think through carefully?"),
];

pub fn placeholder_for_mode(mode: ComposerMode) -> Option<&'static str> {
    MODE_PLACEHOLDERS
        .iter()
        .find(|(candidate, _)| *candidate == mode)
        .map(|(_, text)| *text)
}

/// Result returned when the user interacts with the composer.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    Submitted(SubmissionPayload),
    None,
}

pub struct ChatComposerParams {
    pub mention_index: MentionIndex,
    pub placeholder_text: String,
    pub max_length: Option<usize>,
    pub model: String,
}

pub struct ChatComposer {
    text: String,
    /// Byte offset into `text`, always on a char boundary.
    cursor: usize,
    mentions: Vec<Mention>,
    attachments: AttachmentStaging,
    mention_index: MentionIndex,
    mention_popup: Option<MentionPopup>,
    dismissed_mention_anchor: Option<usize>,
    mode: ComposerMode,
    tool_flags: BTreeSet<ResearchTool>,
    model: String,
    max_length: Option<usize>,
    default_placeholder: String,
}

impl ChatComposer {
    pub fn new(params: ChatComposerParams) -> Self {
        let ChatComposerParams {
            mention_index,
            placeholder_text,
            max_length,
            model,
        } = params;
        Self {
            text: String::new(),
            cursor: 0,
            mentions: Vec::new(),
            attachments: AttachmentStaging::new(),
            mention_index,
            mention_popup: None,
            dismissed_mention_anchor: None,
            mode: ComposerMode::None,
            tool_flags: BTreeSet::new(),
            model,
            max_length,
            default_placeholder: placeholder_text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.items()
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn tool_flags(&self) -> &BTreeSet<ResearchTool> {
        &self.tool_flags
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn mention_index(&self) -> &MentionIndex {
        &self.mention_index
    }

    pub fn mention_popup(&self) -> Option<&MentionPopup> {
        self.mention_popup.as_ref()
    }

    pub fn is_mention_popup_open(&self) -> bool {
        self.mention_popup.is_some()
    }

    /// Returns true if the draft has neither text nor attachments.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.attachments.is_empty()
    }

    /// Whether `submit` would currently produce a payload.
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty() || !self.attachments.is_empty()
    }

    pub fn placeholder_text(&self) -> &str {
        placeholder_for_mode(self.mode).unwrap_or(&self.default_placeholder)
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// `(length, limit)` for the live counter, only while a limit is set and the draft has text.
    pub fn limit_counter(&self) -> Option<(usize, usize)> {
        let limit = self.max_length?;
        let len = self.char_count();
        (len > 0).then_some((len, limit))
    }

    pub fn is_near_limit(&self) -> bool {
        self.limit_counter()
            .is_some_and(|(len, limit)| len as f64 > limit as f64 * NEAR_LIMIT_RATIO)
    }

    /// Replaces the draft text and cursor, then re-evaluates the mention query.
    ///
    /// Returns `false` (leaving the draft untouched) when `new_text` exceeds the character limit.
    /// Mentions and attachments are never modified here.
    pub fn on_text_change(&mut self, new_text: String, cursor: usize) -> bool {
        if !self.within_limit(&new_text) {
            tracing::trace!(
                len = new_text.chars().count(),
                limit = ?self.max_length,
                "rejected edit over character limit"
            );
            return false;
        }
        self.cursor = clamp_to_char_boundary(&new_text, cursor);
        self.text = new_text;
        self.sync_mention_popup();
        true
    }

    /// Inserts `s` at the cursor.
    pub fn insert_str(&mut self, s: &str) -> bool {
        let mut new_text = String::with_capacity(self.text.len() + s.len());
        new_text.push_str(&self.text[..self.cursor]);
        new_text.push_str(s);
        new_text.push_str(&self.text[self.cursor..]);
        let new_cursor = self.cursor + s.len();
        self.on_text_change(new_text, new_cursor)
    }

    /// Integrate pasted text: file paths are attached, anything else is inserted as text.
    pub fn handle_paste(&mut self, pasted: String) -> bool {
        if let Some(files) = pasted_file_refs(&pasted) {
            self.attach(files);
            return true;
        }
        self.insert_str(&pasted)
    }

    /// Handle a key event coming from the main UI. The boolean reports whether a redraw is needed.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if key_event.kind == KeyEventKind::Release {
            return (InputResult::None, false);
        }

        if self.mention_popup.is_some() {
            self.handle_key_event_with_mention_popup(key_event)
        } else {
            self.handle_key_event_without_popup(key_event)
        }
    }

    fn handle_key_event_with_mention_popup(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        let Some(popup) = self.mention_popup.as_mut() else {
            return self.handle_key_event_without_popup(key_event);
        };

        match key_event {
            KeyEvent {
                code: KeyCode::Up, ..
            }
            | KeyEvent {
                code: KeyCode::Char('p'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                popup.move_up();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Down,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('n'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                popup.move_down();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                self.close_mention_popup();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Tab, ..
            }
            | KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            } => {
                if let Some(selected) = popup.selected_mention().cloned() {
                    self.insert_mention(selected);
                    return (InputResult::None, true);
                }
                // Nothing matches: close the popup and let Enter submit as usual.
                self.close_mention_popup();
                if key_event.code == KeyCode::Enter {
                    let (result, _) = self.handle_key_event_without_popup(key_event);
                    return (result, true);
                }
                (InputResult::None, true)
            }
            input => self.handle_key_event_without_popup(input),
        }
    }

    fn handle_key_event_without_popup(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers,
                ..
            } if modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                (InputResult::None, self.insert_str("\n"))
            }
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => match self.submit() {
                Some(payload) => (InputResult::Submitted(payload), true),
                None => (InputResult::None, false),
            },
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                let mut buf = [0u8; 4];
                (InputResult::None, self.insert_str(c.encode_utf8(&mut buf)))
            }
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => (InputResult::None, self.delete_backward()),
            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => (InputResult::None, self.delete_forward()),
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => (InputResult::None, self.move_cursor_to(self.prev_boundary())),
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => (InputResult::None, self.move_cursor_to(self.next_boundary())),
            KeyEvent {
                code: KeyCode::Home,
                ..
            } => (InputResult::None, self.move_cursor_to(self.line_start())),
            KeyEvent {
                code: KeyCode::End, ..
            } => (InputResult::None, self.move_cursor_to(self.line_end())),
            KeyEvent {
                code: KeyCode::Char('u'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                let start = self.line_start();
                let mut new_text = self.text.clone();
                new_text.replace_range(start..self.cursor, "");
                (InputResult::None, self.on_text_change(new_text, start))
            }
            _ => (InputResult::None, false),
        }
    }

    /// Replaces the most recent unconsumed `@query` with `@<display_name> ` and records the
    /// mention.
    ///
    /// "Unconsumed" means the popup's anchor, or else an `@` before the cursor with no whitespace
    /// in between. Without one, the mention is inserted at the cursor.
    pub fn insert_mention(&mut self, mention: Mention) -> bool {
        let start = self
            .mention_popup
            .as_ref()
            .map(MentionPopup::anchor)
            .filter(|anchor| *anchor <= self.cursor)
            .or_else(|| active_mention_query(&self.text, self.cursor).map(|(at, _)| at))
            .unwrap_or(self.cursor);
        let inserted = mention.insert_text();

        let mut new_text = String::with_capacity(self.text.len() + inserted.len());
        new_text.push_str(&self.text[..start]);
        new_text.push_str(&inserted);
        new_text.push_str(&self.text[self.cursor..]);
        let new_cursor = start + inserted.len();
        if !self.within_limit(&new_text) {
            return false;
        }

        self.mention_popup = None;
        self.on_text_change(new_text, new_cursor);
        tracing::debug!(mention = %mention.display_name, "inserted mention");
        self.mentions.push(mention);
        true
    }

    /// Appends `@<display_name> ` to the end of the draft (the quick-mention shortcut list).
    pub fn insert_quick_mention(&mut self, mention: Mention) -> bool {
        let mut new_text = self.text.clone();
        new_text.push_str(&mention.insert_text());
        let new_cursor = new_text.len();
        if !self.on_text_change(new_text, new_cursor) {
            return false;
        }
        self.mentions.push(mention);
        true
    }

    /// Hides the popup without modifying the draft (Escape / click-away).
    pub fn close_mention_popup(&mut self) {
        if let Some(popup) = self.mention_popup.take() {
            self.dismissed_mention_anchor = Some(popup.anchor());
        }
    }

    pub fn attach(&mut self, files: Vec<FileRef>) -> Vec<Attachment> {
        self.attachments.add(files)
    }

    /// Returns whether something was removed; removing an unknown id is a no-op.
    pub fn remove_attachment(&mut self, id: AttachmentId) -> bool {
        self.attachments.remove(id).is_some()
    }

    /// Toggles `mode`: choosing the active mode clears it, any other mode replaces it.
    pub fn set_mode(&mut self, mode: ComposerMode) -> ComposerMode {
        self.mode = if self.mode == mode {
            ComposerMode::None
        } else {
            mode
        };
        tracing::debug!(mode = %self.mode, "composer mode changed");
        self.mode
    }

    /// Flips `tool` while a tool-using mode is active. Returns `false` otherwise.
    pub fn toggle_tool(&mut self, tool: ResearchTool) -> bool {
        if !self.mode.uses_tools() {
            return false;
        }
        if !self.tool_flags.remove(&tool) {
            self.tool_flags.insert(tool);
        }
        true
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Builds the payload and resets the draft. The text is sent as typed, including leading
    /// indentation and trailing newlines.
    ///
    /// Returns `None` and leaves the draft untouched when there is neither non-blank text nor an
    /// attachment. Mode, tool flags and model persist across submits.
    pub fn submit(&mut self) -> Option<SubmissionPayload> {
        if !self.can_submit() {
            return None;
        }

        let payload = SubmissionPayload {
            text: std::mem::take(&mut self.text),
            mentions: std::mem::take(&mut self.mentions),
            attachments: self.attachments.take_all(),
            options: SubmitOptions {
                model: self.model.clone(),
                mode: ModeOptions::for_mode(self.mode, &self.tool_flags),
            },
        };
        self.clear_draft();
        Some(payload)
    }

    /// Discards text, mentions and staged attachments. Mode, tools and model are kept.
    pub fn clear_draft(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.mentions.clear();
        self.attachments.take_all();
        self.mention_popup = None;
        self.dismissed_mention_anchor = None;
    }

    fn within_limit(&self, text: &str) -> bool {
        self.max_length
            .is_none_or(|limit| text.chars().count() <= limit)
    }

    fn sync_mention_popup(&mut self) {
        let Some((anchor, query)) = active_mention_query(&self.text, self.cursor) else {
            self.mention_popup = None;
            self.dismissed_mention_anchor = None;
            return;
        };

        if self.dismissed_mention_anchor == Some(anchor) {
            return;
        }
        self.dismissed_mention_anchor = None;

        match self.mention_popup.as_mut() {
            Some(popup) => popup.set_query(anchor, &query, &self.mention_index),
            None => {
                self.mention_popup = Some(MentionPopup::new(anchor, &query, &self.mention_index));
            }
        }
    }

    fn delete_backward(&mut self) -> bool {
        let start = self.prev_boundary();
        if start == self.cursor {
            return false;
        }
        let mut new_text = self.text.clone();
        new_text.replace_range(start..self.cursor, "");
        self.on_text_change(new_text, start)
    }

    fn delete_forward(&mut self) -> bool {
        let end = self.next_boundary();
        if end == self.cursor {
            return false;
        }
        let mut new_text = self.text.clone();
        new_text.replace_range(self.cursor..end, "");
        self.on_text_change(new_text, self.cursor)
    }

    fn move_cursor_to(&mut self, pos: usize) -> bool {
        if pos == self.cursor {
            return false;
        }
        self.cursor = pos;
        self.sync_mention_popup();
        true
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
            .unwrap_or(self.cursor)
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor]
            .rfind('\n')
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    fn line_end(&self) -> usize {
        self.text[self.cursor..]
            .find('\n')
            .map(|idx| self.cursor + idx)
            .unwrap_or(self.text.len())
    }
}

impl Renderable for ChatComposer {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let prefix_area = Rect::new(area.x, area.y, PROMPT_PREFIX_COLS.min(area.width), 1);
        Line::from(PROMPT_PREFIX.bold()).render(prefix_area, buf);

        let text_area = Rect {
            x: area.x.saturating_add(PROMPT_PREFIX_COLS),
            width: area.width.saturating_sub(PROMPT_PREFIX_COLS),
            ..area
        };
        if text_area.is_empty() {
            return;
        }

        if self.text.is_empty() {
            Line::from(self.placeholder_text().to_string().dim().italic())
                .render(Rect { height: 1, ..text_area }, buf);
            return;
        }

        let layout = wrap_input(&self.text, self.cursor, text_area.width);
        let offset = layout.scroll_offset(text_area.height);
        for (i, row) in layout
            .rows
            .iter()
            .skip(usize::from(offset))
            .take(usize::from(text_area.height))
            .enumerate()
        {
            let row_area = Rect::new(text_area.x, text_area.y + i as u16, text_area.width, 1);
            Line::from(row.as_str()).render(row_area, buf);
        }
    }

    fn desired_height(&self, width: u16) -> u16 {
        let text_width = width.saturating_sub(PROMPT_PREFIX_COLS).max(1);
        let rows = wrap_input(&self.text, self.cursor, text_width).rows.len();
        u16::try_from(rows).unwrap_or(u16::MAX).clamp(1, MAX_INPUT_ROWS)
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if area.width <= PROMPT_PREFIX_COLS || area.height == 0 {
            return None;
        }
        let text_width = area.width - PROMPT_PREFIX_COLS;
        let layout = wrap_input(&self.text, self.cursor, text_width);
        let (col, row) = layout.cursor;
        let row = row.saturating_sub(layout.scroll_offset(area.height));
        Some((area.x + PROMPT_PREFIX_COLS + col, area.y + row))
    }
}

/// Draft text broken into display rows, plus the cursor's `(column, row)` within them.
#[derive(Debug, PartialEq)]
struct InputLayout {
    rows: Vec<String>,
    cursor: (u16, u16),
}

impl InputLayout {
    /// First visible row so the cursor stays inside a viewport of `height` rows.
    fn scroll_offset(&self, height: u16) -> u16 {
        let cursor_row = self.cursor.1;
        if height == 0 || cursor_row < height {
            0
        } else {
            cursor_row + 1 - height
        }
    }
}

/// Hard-wraps `text` at `width` columns by grapheme, honoring explicit newlines.
fn wrap_input(text: &str, cursor: usize, width: u16) -> InputLayout {
    let width = usize::from(width.max(1));
    let mut rows = vec![String::new()];
    let mut col = 0usize;
    let mut cursor_at = None;

    for (idx, grapheme) in text.grapheme_indices(true) {
        if grapheme == "\n" || grapheme == "\r\n" {
            if idx == cursor {
                cursor_at = Some((col, rows.len() - 1));
            }
            rows.push(String::new());
            col = 0;
            continue;
        }
        let grapheme_width = UnicodeWidthStr::width(grapheme);
        if col > 0 && col + grapheme_width > width {
            rows.push(String::new());
            col = 0;
        }
        if idx == cursor {
            cursor_at = Some((col, rows.len() - 1));
        }
        if let Some(row) = rows.last_mut() {
            row.push_str(grapheme);
        }
        col += grapheme_width;
    }

    let (col, row) = match cursor_at {
        Some(position) => position,
        None if col >= width => {
            rows.push(String::new());
            (0, rows.len() - 1)
        }
        None => (col, rows.len() - 1),
    };
    InputLayout {
        rows,
        cursor: (
            u16::try_from(col).unwrap_or(u16::MAX),
            u16::try_from(row).unwrap_or(u16::MAX),
        ),
    }
}

/// The query is active when the last `@` before the cursor is followed by no whitespace up to
/// the cursor.
fn active_mention_query(text: &str, cursor: usize) -> Option<(usize, String)> {
    let before_cursor = &text[..cursor];
    let at = before_cursor.rfind('@')?;
    let query = &before_cursor[at + 1..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    Some((at, query.to_string()))
}

#[inline]
fn clamp_to_char_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos.min(text.len());
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_protocol::MentionKind;
    use pretty_assertions::assert_eq;

    fn composer() -> ChatComposer {
        composer_with_limit(None)
    }

    fn composer_with_limit(max_length: Option<usize>) -> ChatComposer {
        ChatComposer::new(ChatComposerParams {
            mention_index: MentionIndex::sample(),
            placeholder_text: "Ask anything...".to_string(),
            max_length,
            model: "claude-3.5-sonnet".to_string(),
        })
    }

    fn type_chars(composer: &mut ChatComposer, text: &str) {
        for ch in text.chars() {
            composer.handle_key_event(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn press(composer: &mut ChatComposer, code: KeyCode) -> InputResult {
        composer.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE)).0
    }

    fn alice() -> Mention {
        Mention::new("1", MentionKind::User, "Alice")
    }

    #[test]
    fn empty_or_blank_submit_is_rejected_without_changes() {
        let mut composer = composer();
        assert_eq!(press(&mut composer, KeyCode::Enter), InputResult::None);

        composer.on_text_change("   \n ".to_string(), 2);
        assert!(composer.submit().is_none());
        assert_eq!(composer.text(), "   \n ");
        assert_eq!(composer.cursor, 2);
    }

    #[test]
    fn attachments_alone_are_submittable() {
        let mut composer = composer();
        composer.attach(vec![FileRef::new("a.png", 10, Some("image/png"))]);

        let payload = composer.submit().expect("payload");
        assert_eq!(payload.text, "");
        assert_eq!(payload.attachments.len(), 1);
        assert!(composer.attachments().is_empty());
    }

    #[test]
    fn mention_insertion_replaces_query() {
        let mut composer = composer();
        composer.on_text_change("hello @".to_string(), 7);
        assert!(composer.is_mention_popup_open());

        assert!(composer.insert_mention(alice()));
        assert_eq!(composer.text(), "hello @Alice ");
        assert_eq!(composer.cursor, "hello @Alice ".len());
        assert_eq!(composer.mentions, &[alice()]);
        assert!(!composer.is_mention_popup_open());
    }

    #[test]
    fn mention_insertion_keeps_text_after_cursor() {
        let mut composer = composer();
        composer.on_text_change("ping @al and more".to_string(), "ping @al".len());

        assert!(composer.insert_mention(alice()));
        assert_eq!(composer.text(), "ping @Alice  and more");
    }

    #[test]
    fn typing_at_opens_and_filters_popup() {
        let mut composer = composer();
        type_chars(&mut composer, "hi @");
        let popup = composer.mention_popup().expect("popup open");
        assert_eq!(popup.matches().len(), 6);

        type_chars(&mut composer, "BO");
        let popup = composer.mention_popup().expect("popup open");
        assert_eq!(popup.query(), "BO");
        assert_eq!(popup.matches().len(), 1);
        assert_eq!(popup.matches()[0].display_name, "Bob Smith");

        type_chars(&mut composer, " ");
        assert!(!composer.is_mention_popup_open());
    }

    #[test]
    fn enter_in_popup_inserts_selection_instead_of_submitting() {
        let mut composer = composer();
        type_chars(&mut composer, "@cod");
        assert_eq!(press(&mut composer, KeyCode::Enter), InputResult::None);
        assert_eq!(composer.text(), "@Code Assistant ");
        assert_eq!(composer.mentions.len(), 1);
    }

    #[test]
    fn enter_submits_when_the_mention_query_has_no_matches() {
        let mut composer = composer();
        type_chars(&mut composer, "mail bob@corp.com");
        let popup = composer.mention_popup().expect("popup open");
        assert!(popup.matches().is_empty());

        match press(&mut composer, KeyCode::Enter) {
            InputResult::Submitted(payload) => assert_eq!(payload.text, "mail bob@corp.com"),
            other => panic!("expected submission, got {other:?}"),
        }
        assert!(composer.is_empty());
        assert!(!composer.is_mention_popup_open());
    }

    #[test]
    fn submit_sends_text_as_typed() {
        let mut composer = composer();
        composer.on_text_change("    fn main() {}\n".to_string(), 17);

        let payload = composer.submit().expect("payload");
        assert_eq!(payload.text, "    fn main() {}\n");
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn escape_closes_popup_until_another_at_is_typed() {
        let mut composer = composer();
        type_chars(&mut composer, "@al");
        press(&mut composer, KeyCode::Esc);
        assert!(!composer.is_mention_popup_open());
        assert_eq!(composer.text(), "@al");

        type_chars(&mut composer, "i");
        assert!(!composer.is_mention_popup_open());

        type_chars(&mut composer, " @");
        assert!(composer.is_mention_popup_open());
    }

    #[test]
    fn deleting_mention_text_keeps_mention() {
        let mut composer = composer();
        composer.on_text_change("@".to_string(), 1);
        composer.insert_mention(alice());

        composer.on_text_change(String::new(), 0);
        assert_eq!(composer.mentions, &[alice()]);
    }

    #[test]
    fn quick_mention_appends_to_end() {
        let mut composer = composer();
        composer.on_text_change("hey".to_string(), 0);
        assert!(composer.insert_quick_mention(alice()));
        assert_eq!(composer.text(), "hey@Alice ");
        assert_eq!(composer.mentions.len(), 1);
    }

    #[test]
    fn shift_enter_inserts_newline_and_enter_submits() {
        let mut composer = composer();
        type_chars(&mut composer, "line one");
        composer.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_chars(&mut composer, "two ");

        match press(&mut composer, KeyCode::Enter) {
            InputResult::Submitted(payload) => assert_eq!(payload.text, "line one\ntwo "),
            other => panic!("expected submission, got {other:?}"),
        }
        assert!(composer.is_empty());
        assert_eq!(composer.cursor, 0);
    }

    #[test]
    fn mode_toggles_and_drives_placeholder() {
        let mut composer = composer();
        assert_eq!(composer.placeholder_text(), "Ask anything...");

        assert_eq!(composer.set_mode(ComposerMode::Research), ComposerMode::Research);
        assert_eq!(
            composer.placeholder_text(),
            "What would you like to research?"
        );

        assert_eq!(composer.set_mode(ComposerMode::Image), ComposerMode::Image);
        assert_eq!(composer.set_mode(ComposerMode::Image), ComposerMode::None);
        assert_eq!(composer.placeholder_text(), "Ask anything...");
    }

    #[test]
    fn every_non_default_mode_has_a_placeholder() {
        for mode in ComposerMode::ALL {
            assert_eq!(
                placeholder_for_mode(mode).is_some(),
                mode != ComposerMode::None,
                "{mode}"
            );
        }
    }

    #[test]
    fn tools_only_toggle_in_research_and_only_submit_there() {
        let mut composer = composer();
        assert!(!composer.toggle_tool(ResearchTool::WebSearch));
        assert!(composer.tool_flags().is_empty());

        composer.set_mode(ComposerMode::Research);
        assert!(composer.toggle_tool(ResearchTool::WebSearch));
        assert!(composer.toggle_tool(ResearchTool::News));
        assert!(composer.toggle_tool(ResearchTool::News));

        composer.on_text_change("find papers".to_string(), 11);
        let payload = composer.submit().expect("payload");
        assert_eq!(
            payload.options.mode,
            ModeOptions::Research {
                tools: vec![ResearchTool::WebSearch]
            }
        );

        composer.set_mode(ComposerMode::Agent);
        composer.on_text_change("do it".to_string(), 5);
        let payload = composer.submit().expect("payload");
        assert_eq!(payload.options.mode, ModeOptions::Agent);
        assert_eq!(payload.options.mode.tools(), None);
    }

    #[test]
    fn submit_resets_draft_but_keeps_session_choices() {
        let mut composer = composer();
        composer.set_mode(ComposerMode::Think);
        composer.set_model("claude-3-opus");
        composer.on_text_change("@".to_string(), 1);
        composer.insert_mention(alice());
        composer.attach(vec![FileRef::new("a.txt", 1, None)]);

        let payload = composer.submit().expect("payload");
        assert_eq!(payload.text, "@Alice ");
        assert_eq!(payload.mentions, vec![alice()]);
        assert_eq!(payload.options.model, "claude-3-opus");

        assert!(composer.is_empty());
        assert!(composer.mentions.is_empty());
        assert_eq!(composer.mode(), ComposerMode::Think);
        assert_eq!(composer.model(), "claude-3-opus");
    }

    #[test]
    fn edits_beyond_limit_are_rejected() {
        let mut composer = composer_with_limit(Some(5));
        type_chars(&mut composer, "hello!");
        assert_eq!(composer.text(), "hello");
        assert_eq!(composer.limit_counter(), Some((5, 5)));
        assert!(composer.is_near_limit());

        assert!(!composer.on_text_change("toolong".to_string(), 7));
        assert_eq!(composer.text(), "hello");

        composer.on_text_change("@".to_string(), 1);
        assert!(!composer.insert_mention(alice()));
        assert_eq!(composer.text(), "@");
        assert!(composer.mentions.is_empty());
    }

    #[test]
    fn counter_is_hidden_without_limit_or_text() {
        let mut composer = composer_with_limit(Some(2000));
        assert_eq!(composer.limit_counter(), None);
        type_chars(&mut composer, "hi");
        assert_eq!(composer.limit_counter(), Some((2, 2000)));
        assert!(!composer.is_near_limit());
        assert_eq!(self::composer().limit_counter(), None);
    }

    #[test]
    fn backspace_and_arrows_respect_graphemes() {
        let mut composer = composer();
        type_chars(&mut composer, "héllo");
        press(&mut composer, KeyCode::Left);
        press(&mut composer, KeyCode::Left);
        press(&mut composer, KeyCode::Left);
        press(&mut composer, KeyCode::Backspace);
        assert_eq!(composer.text(), "hllo");
        assert_eq!(composer.cursor, 1);

        press(&mut composer, KeyCode::End);
        press(&mut composer, KeyCode::Delete);
        assert_eq!(composer.text(), "hllo");
        press(&mut composer, KeyCode::Home);
        press(&mut composer, KeyCode::Delete);
        assert_eq!(composer.text(), "llo");
    }

    #[test]
    fn removing_attachment_twice_is_a_noop() {
        let mut composer = composer();
        let added = composer.attach(vec![
            FileRef::new("a.txt", 1, None),
            FileRef::new("a.txt", 1, None),
        ]);
        assert_ne!(added[0].id, added[1].id);

        assert!(composer.remove_attachment(added[0].id));
        assert!(!composer.remove_attachment(added[0].id));
        assert_eq!(composer.attachments()[0].id, added[1].id);
    }

    #[test]
    fn paste_of_plain_text_is_inserted_at_cursor() {
        let mut composer = composer();
        type_chars(&mut composer, "ab");
        press(&mut composer, KeyCode::Left);
        assert!(composer.handle_paste("XY".to_string()));
        assert_eq!(composer.text(), "aXYb");
        assert_eq!(composer.cursor, 3);
    }

    #[test]
    fn paste_of_existing_file_path_attaches_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("diagram.png");
        std::fs::write(&path, [0u8; 16]).expect("write");

        let mut composer = composer();
        assert!(composer.handle_paste(path.display().to_string()));
        assert_eq!(composer.text(), "");
        assert_eq!(composer.attachments().len(), 1);
        assert_eq!(composer.attachments()[0].file.name, "diagram.png");
    }

    #[test]
    fn active_query_requires_no_whitespace() {
        assert_eq!(active_mention_query("hi @", 4), Some((3, String::new())));
        assert_eq!(active_mention_query("hi @bo", 6), Some((3, "bo".to_string())));
        assert_eq!(active_mention_query("hi @bo x", 8), None);
        assert_eq!(active_mention_query("hi @bo", 2), None);
        assert_eq!(active_mention_query("no mention", 10), None);
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn wrap_input_breaks_rows_and_tracks_cursor() {
        assert_eq!(
            wrap_input("abcdef", 6, 4),
            InputLayout {
                rows: vec!["abcd".to_string(), "ef".to_string()],
                cursor: (2, 1),
            }
        );
        assert_eq!(wrap_input("abcd", 4, 4).cursor, (0, 1));
        assert_eq!(wrap_input("ab\ncd", 3, 10).cursor, (0, 1));
        assert_eq!(wrap_input("ab\ncd", 2, 10).cursor, (2, 0));
        assert_eq!(
            wrap_input("你好", 6, 3).rows,
            vec!["你".to_string(), "好".to_string()]
        );
    }

    #[test]
    fn empty_composer_renders_placeholder() {
        let composer = composer();
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        composer.render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), "› Ask anything...");
        assert_eq!(composer.cursor_pos(area), Some((2, 0)));
    }

    #[test]
    fn input_grows_then_scrolls_with_cursor() {
        let mut composer = composer();
        composer.on_text_change("x\n".repeat(20), 40);
        assert_eq!(composer.desired_height(20), MAX_INPUT_ROWS);

        let area = Rect::new(0, 3, 20, MAX_INPUT_ROWS);
        assert_eq!(composer.cursor_pos(area), Some((2, 3 + MAX_INPUT_ROWS - 1)));
    }
}
