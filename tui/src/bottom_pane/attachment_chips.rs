//! Staged attachments shown as chips above the composer input.

use parley_protocol::Attachment;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;

use crate::render::renderable::Renderable;

/// Names longer than this are shortened with an ellipsis.
const MAX_NAME_CHARS: usize = 24;
const CHIP_GAP: &str = "  ";

pub struct AttachmentChips<'a> {
    attachments: &'a [Attachment],
}

impl<'a> AttachmentChips<'a> {
    pub fn new(attachments: &'a [Attachment]) -> Self {
        Self { attachments }
    }

    /// Packs chips greedily into rows no wider than `width`. A chip wider than a whole row gets a
    /// row to itself and is clipped on render.
    fn rows(&self, width: u16) -> Vec<Line<'static>> {
        let width = usize::from(width);
        let mut rows: Vec<Line<'static>> = Vec::new();
        let mut current: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0usize;

        for attachment in self.attachments {
            let chip = chip_spans(attachment);
            let chip_width: usize = chip.iter().map(Span::width).sum();
            if !current.is_empty() && current_width + CHIP_GAP.len() + chip_width > width {
                rows.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(CHIP_GAP.into());
                current_width += CHIP_GAP.len();
            }
            current.extend(chip);
            current_width += chip_width;
        }
        if !current.is_empty() {
            rows.push(Line::from(current));
        }
        rows
    }
}

impl Renderable for AttachmentChips<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        for (i, row) in self.rows(area.width).into_iter().enumerate() {
            let Ok(offset) = u16::try_from(i) else {
                break;
            };
            if offset >= area.height {
                break;
            }
            row.render(Rect::new(area.x, area.y + offset, area.width, 1), buf);
        }
    }

    fn desired_height(&self, width: u16) -> u16 {
        u16::try_from(self.rows(width).len()).unwrap_or(u16::MAX)
    }
}

fn chip_spans(attachment: &Attachment) -> Vec<Span<'static>> {
    vec![
        format!("[{} ", attachment.kind.glyph()).cyan(),
        shorten_name(&attachment.file.name).into(),
        format!(" {}", attachment.display_size).dim(),
        "]".cyan(),
    ]
}

fn shorten_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_string();
    }
    let head: String = name.chars().take(MAX_NAME_CHARS - 1).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_protocol::AttachmentId;
    use parley_protocol::FileRef;
    use pretty_assertions::assert_eq;

    fn attachment(id: u64, name: &str, size: u64) -> Attachment {
        Attachment::new(AttachmentId(id), FileRef::new(name, size, None))
    }

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn chips_wrap_onto_new_rows() {
        let attachments = vec![
            attachment(1, "notes.md", 512),
            attachment(2, "main.rs", 2048),
            attachment(3, "data.tar", 10),
        ];
        let chips = AttachmentChips::new(&attachments);

        assert_eq!(
            texts(&chips.rows(80)),
            vec!["[📄 notes.md 512 B]  [</> main.rs 2.0 KB]  [▤ data.tar 10 B]".to_string()]
        );
        assert_eq!(chips.desired_height(30), 3);
    }

    #[test]
    fn long_names_are_shortened() {
        assert_eq!(
            shorten_name("a-very-long-file-name-for-testing.txt"),
            "a-very-long-file-name-f…"
        );
        assert_eq!(shorten_name("short.txt"), "short.txt");
    }

    #[test]
    fn no_attachments_take_no_space() {
        assert_eq!(AttachmentChips::new(&[]).desired_height(40), 0);
    }
}
