//! The bottom-pane footer renders the session line and key hints under the composer.
//!
//! The footer is pure rendering: it formats `FooterProps` into `Line`s without mutating any state.
//! It does not decide which hints apply; the owner passes `popup_open` and any transient notice.
use parley_protocol::ComposerMode;
use parley_protocol::ResearchTool;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;

use crate::render::renderable::Renderable;

/// The rendering inputs for the footer area under the composer.
#[derive(Clone, Debug)]
pub struct FooterProps<'a> {
    pub model: &'a str,
    pub mode: ComposerMode,
    /// Research tools currently enabled; only shown in research mode.
    pub tools: Vec<ResearchTool>,
    /// `(length, limit)` of the draft when a limit is configured.
    pub counter: Option<(usize, usize)>,
    pub near_limit: bool,
    pub popup_open: bool,
    /// Short-lived message such as a copy confirmation.
    pub notice: Option<&'a str>,
}

pub struct Footer<'a> {
    props: FooterProps<'a>,
}

impl<'a> Footer<'a> {
    pub fn new(props: FooterProps<'a>) -> Self {
        Self { props }
    }

    fn session_line(&self) -> Line<'static> {
        let props = &self.props;
        let mut spans: Vec<Span<'static>> = vec![
            props.model.to_string().dim(),
            " · ".dim(),
            props.mode.label().to_string().magenta(),
        ];
        if props.mode.uses_tools() {
            let tools = if props.tools.is_empty() {
                "no tools".to_string()
            } else {
                props
                    .tools
                    .iter()
                    .map(|tool| tool.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            spans.push(format!(" [{tools}]").dim());
        }
        if let Some(notice) = props.notice {
            spans.push("  ".into());
            spans.push(notice.to_string().green());
        }
        Line::from(spans)
    }

    fn counter_line(&self) -> Option<Line<'static>> {
        let (len, limit) = self.props.counter?;
        let text = format!("{len}/{limit}");
        let span = if self.props.near_limit {
            text.red().bold()
        } else {
            text.dim()
        };
        Some(Line::from(span).right_aligned())
    }

    fn hint_line(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = if self.props.popup_open {
            &[("↑↓", "select"), ("tab", "insert"), ("esc", "close")]
        } else {
            &[
                ("enter", "send"),
                ("shift+enter", "newline"),
                ("@", "mention"),
                ("F2-F5", "mode"),
                ("ctrl+o", "model"),
                ("ctrl+y", "copy"),
                ("ctrl+n", "new chat"),
            ]
        };
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, (key, action)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(" · ".dim());
            }
            spans.push(key.to_string().into());
            spans.push(format!(" {action}").dim());
        }
        Line::from(spans)
    }
}

impl Renderable for Footer<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let first_row = Rect { height: 1, ..area };
        self.session_line().render(first_row, buf);
        if let Some(counter) = self.counter_line() {
            counter.render(first_row, buf);
        }
        if area.height > 1 {
            let second_row = Rect::new(area.x, area.y + 1, area.width, 1);
            self.hint_line().render(second_row, buf);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props() -> FooterProps<'static> {
        FooterProps {
            model: "claude-3.5-sonnet",
            mode: ComposerMode::None,
            tools: Vec::new(),
            counter: None,
            near_limit: false,
            popup_open: false,
            notice: None,
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn research_mode_lists_enabled_tools() {
        let footer = Footer::new(FooterProps {
            mode: ComposerMode::Research,
            tools: vec![ResearchTool::WebSearch, ResearchTool::News],
            ..props()
        });
        assert_eq!(
            footer.session_line().to_string(),
            "claude-3.5-sonnet · Research [Web, News]"
        );

        let footer = Footer::new(FooterProps {
            mode: ComposerMode::Agent,
            tools: vec![ResearchTool::WebSearch],
            ..props()
        });
        assert_eq!(footer.session_line().to_string(), "claude-3.5-sonnet · Agent");
    }

    #[test]
    fn counter_renders_right_aligned() {
        let footer = Footer::new(FooterProps {
            counter: Some((95, 100)),
            near_limit: true,
            notice: Some("Copied"),
            ..props()
        });
        let area = Rect::new(0, 0, 50, 2);
        let mut buf = Buffer::empty(area);
        footer.render(area, &mut buf);

        let first = row_text(&buf, 0);
        assert!(first.starts_with("claude-3.5-sonnet · Chat  Copied"));
        assert!(first.ends_with("95/100"));
        assert!(row_text(&buf, 1).starts_with("enter send · shift+enter newline"));
    }

    #[test]
    fn popup_hints_replace_default_hints() {
        let footer = Footer::new(FooterProps {
            popup_open: true,
            ..props()
        });
        assert_eq!(
            footer.hint_line().to_string(),
            "↑↓ select · tab insert · esc close"
        );
    }
}
