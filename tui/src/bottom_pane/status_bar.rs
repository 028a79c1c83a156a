use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;

use crate::chat_session::AssistantStatus;
use crate::render::renderable::Renderable;

/// One-row assistant status: a colored dot, the status label and an optional error detail.
pub struct StatusBar<'a> {
    status: AssistantStatus,
    detail: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(status: AssistantStatus, detail: Option<&'a str>) -> Self {
        Self { status, detail }
    }

    fn line(&self) -> Line<'static> {
        let dot = match self.status {
            AssistantStatus::Ready => "● ".green(),
            AssistantStatus::Typing => "● ".yellow(),
            AssistantStatus::Error => "● ".red(),
        };
        let mut spans: Vec<Span<'static>> = vec![dot, self.status.label().dim()];
        if self.status == AssistantStatus::Error
            && let Some(detail) = self.detail
        {
            spans.push(format!(": {detail}").red());
        }
        Line::from(spans)
    }
}

impl Renderable for StatusBar<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.line().render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_detail_only_shown_for_errors() {
        let ready = StatusBar::new(AssistantStatus::Ready, Some("ignored"));
        assert_eq!(ready.line().to_string(), "● Assistant is ready");

        let error = StatusBar::new(AssistantStatus::Error, Some("no responses configured"));
        assert_eq!(
            error.line().to_string(),
            "● Connection error: no responses configured"
        );
    }
}
