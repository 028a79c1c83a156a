//! Bottom pane: everything under the transcript.
//!
//! From top to bottom it stacks a decorative rule, the assistant status bar, the mention popup
//! (while an `@`-query is active), staged attachment chips, the composer input and the footer.
//! The pane owns the [`ChatComposer`]; the owner pushes session state (assistant status, copy
//! notices) into it before each draw.

mod attachment_chips;
pub mod attachment_staging;
mod chat_composer;
mod footer;
pub mod mention_popup;
mod status_bar;

pub use chat_composer::ChatComposer;
pub use chat_composer::ChatComposerParams;
pub use chat_composer::InputResult;
pub use chat_composer::placeholder_for_mode;

use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Widget;

use self::attachment_chips::AttachmentChips;
use self::footer::Footer;
use self::footer::FooterProps;
use self::status_bar::StatusBar;
use crate::chat_session::AssistantStatus;
use crate::render::Insets;
use crate::render::renderable::ColumnRenderable;
use crate::render::renderable::InsetRenderable;
use crate::render::renderable::Renderable;
use crate::render::renderable::RenderableItem;
use crate::ui_colors::Theme;

/// Columns kept free on each side of the pane.
const HORIZONTAL_PADDING: u16 = 1;

pub struct BottomPaneParams {
    pub composer: ChatComposerParams,
    pub theme: Theme,
}

pub struct BottomPane {
    composer: ChatComposer,
    theme: Theme,
    status: AssistantStatus,
    status_detail: Option<String>,
    notice: Option<String>,
}

impl BottomPane {
    pub fn new(params: BottomPaneParams) -> Self {
        let BottomPaneParams { composer, theme } = params;
        Self {
            composer: ChatComposer::new(composer),
            theme,
            status: AssistantStatus::Ready,
            status_detail: None,
            notice: None,
        }
    }

    pub fn composer(&self) -> &ChatComposer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut ChatComposer {
        &mut self.composer
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        self.composer.handle_key_event(key_event)
    }

    pub fn handle_paste(&mut self, pasted: String) -> bool {
        self.composer.handle_paste(pasted)
    }

    /// Returns true when the displayed status changed.
    pub fn set_status(&mut self, status: AssistantStatus, detail: Option<String>) -> bool {
        if self.status == status && self.status_detail == detail {
            return false;
        }
        self.status = status;
        self.status_detail = detail;
        true
    }

    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    fn footer_props(&self) -> FooterProps<'_> {
        let composer = &self.composer;
        FooterProps {
            model: composer.model(),
            mode: composer.mode(),
            tools: composer.tool_flags().iter().copied().collect(),
            counter: composer.limit_counter(),
            near_limit: composer.is_near_limit(),
            popup_open: composer.is_mention_popup_open(),
            notice: self.notice.as_deref(),
        }
    }

    fn as_renderable(&self) -> InsetRenderable<'_> {
        let column: Vec<RenderableItem<'_>> = vec![
            PatternRule { theme: self.theme }.into(),
            StatusBar::new(self.status, self.status_detail.as_deref()).into(),
            self.composer.mention_popup().into(),
            AttachmentChips::new(self.composer.attachments()).into(),
            (&self.composer).into(),
            Footer::new(self.footer_props()).into(),
        ];
        InsetRenderable::new(
            ColumnRenderable::with(column),
            Insets::tlbr(0, HORIZONTAL_PADDING, 0, HORIZONTAL_PADDING),
        )
    }
}

impl Renderable for BottomPane {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.as_renderable().render(area, buf);
    }

    fn desired_height(&self, width: u16) -> u16 {
        self.as_renderable().desired_height(width)
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        self.as_renderable().cursor_pos(area)
    }
}

/// Separator between the transcript and the pane, drawn with the background pattern glyph.
struct PatternRule {
    theme: Theme,
}

impl Renderable for PatternRule {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        Line::from(self.theme.pattern_rule(area.width).fg(self.theme.accent).dim())
            .render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        1
    }
}
