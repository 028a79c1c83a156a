use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;

pub mod renderable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

impl Insets {
    pub fn tlbr(top: u16, left: u16, bottom: u16, right: u16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

pub trait RectExt {
    fn inset(&self, insets: Insets) -> Rect;
}

impl RectExt for Rect {
    fn inset(&self, insets: Insets) -> Rect {
        let horizontal = insets.left.saturating_add(insets.right);
        let vertical = insets.top.saturating_add(insets.bottom);
        Rect {
            x: self.x.saturating_add(insets.left),
            y: self.y.saturating_add(insets.top),
            width: self.width.saturating_sub(horizontal),
            height: self.height.saturating_sub(vertical),
        }
    }
}

/// Turns message content into display lines for a given width.
pub trait ContentRenderer {
    fn render(&self, text: &str, width: u16) -> Vec<Line<'static>>;
}

/// Word-wraps content line by line. Headings are bold, fences and quotes are dimmed; everything
/// else is shown verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl ContentRenderer for PlainTextRenderer {
    fn render(&self, text: &str, width: u16) -> Vec<Line<'static>> {
        let width = usize::from(width.max(1));
        let mut lines = Vec::new();
        let mut in_fence = false;
        for source in text.split('\n') {
            let is_fence = source.trim_start().starts_with("```");
            if is_fence {
                in_fence = !in_fence;
            }
            for piece in textwrap::wrap(source, width) {
                let piece = piece.into_owned();
                let line = if is_fence || source.starts_with("> ") {
                    Line::from(piece.dim())
                } else if in_fence {
                    Line::from(piece.cyan())
                } else if source.starts_with('#') {
                    Line::from(piece.bold())
                } else {
                    Line::from(piece)
                };
                lines.push(line);
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn wraps_each_source_line_and_keeps_blank_lines() {
        let lines = PlainTextRenderer.render("one two three\n\nfour", 8);
        assert_eq!(
            texts(&lines),
            vec![
                "one two".to_string(),
                "three".to_string(),
                String::new(),
                "four".to_string(),
            ]
        );
    }

    #[test]
    fn empty_text_is_one_blank_line() {
        assert_eq!(texts(&PlainTextRenderer.render("", 10)), vec![String::new()]);
    }

    #[test]
    fn inset_shrinks_without_underflow() {
        let area = Rect::new(1, 1, 10, 2);
        assert_eq!(area.inset(Insets::tlbr(0, 2, 0, 0)), Rect::new(3, 1, 8, 2));
        assert_eq!(area.inset(Insets::tlbr(5, 20, 0, 0)).height, 0);
    }
}
