//! Whitepaper PDF rendering
//!
//! One fixed A4 page. Sections are laid out top to bottom in a constant order,
//! body text is hard-wrapped at 90 characters without regard for word
//! boundaries, and anything that does not fit above the bottom margin is
//! dropped. There is no second page.

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Pt, Rgb};
use tracing::debug;

use crate::models::agent::Whitepaper;

/// A4 in points
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

const MARGIN_LEFT: f32 = 50.0;
const START_Y: f32 = 800.0;
/// Nothing is drawn once the cursor falls below this line
pub const BOTTOM_LIMIT: f32 = 50.0;

const BODY_SIZE: f32 = 12.0;
const HEADING_SIZE: f32 = BODY_SIZE + 2.0;
const LINE_SPACING: f32 = 18.0;
const HEADING_SPACING: f32 = LINE_SPACING + 2.0;
const SECTION_SPACING: f32 = 24.0;

/// Characters per body line
pub const WRAP_WIDTH: usize = 90;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Body,
}

/// One positioned run of text, in points from the bottom-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub kind: LineKind,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Splits on line breaks, then cuts every `width` characters.
///
/// Empty segments produce no line.
pub fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    text.split(['\n', '\r', '\u{2028}', '\u{2029}'])
        .filter(|segment| !segment.is_empty())
        .flat_map(|segment| {
            let chars: Vec<char> = segment.chars().collect();
            chars
                .chunks(width.max(1))
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Computes every line the page will carry.
pub fn layout(whitepaper: &Whitepaper) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut y = START_Y;

    for (title, content) in whitepaper.sections() {
        let Some(content) = content.filter(|c| !c.is_empty()) else {
            continue;
        };
        if y < BOTTOM_LIMIT {
            break;
        }

        lines.push(TextLine {
            kind: LineKind::Heading,
            text: title.to_string(),
            x: MARGIN_LEFT,
            y,
            size: HEADING_SIZE,
        });
        y -= HEADING_SPACING;

        for body in hard_wrap(content, WRAP_WIDTH) {
            if y < BOTTOM_LIMIT {
                break;
            }
            lines.push(TextLine {
                kind: LineKind::Body,
                text: body,
                x: MARGIN_LEFT,
                y,
                size: BODY_SIZE,
            });
            y -= LINE_SPACING;
        }

        y -= SECTION_SPACING;
    }

    lines
}

/// The built-in Helvetica only covers Latin-1
fn encodable(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 && !c.is_control() { c } else { '?' })
        .collect()
}

/// Renders the whitepaper into PDF bytes.
pub fn render(whitepaper: &Whitepaper) -> Result<Vec<u8>, PdfError> {
    let lines = layout(whitepaper);
    debug!(lines = lines.len(), "Rendering whitepaper PDF");

    let (doc, page, layer) = PdfDocument::new(
        "Whitepaper",
        Mm::from(Pt(PAGE_WIDTH)),
        Mm::from(Pt(PAGE_HEIGHT)),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    let canvas = doc.get_page(page).get_layer(layer);

    for line in &lines {
        let color = match line.kind {
            LineKind::Heading => Rgb::new(0.1, 0.1, 0.5, None),
            LineKind::Body => Rgb::new(0.0, 0.0, 0.0, None),
        };
        canvas.set_fill_color(Color::Rgb(color));
        canvas.use_text(
            encodable(&line.text),
            line.size,
            Mm::from(Pt(line.x)),
            Mm::from(Pt(line.y)),
            &font,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| PdfError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(introduction: &str) -> Whitepaper {
        Whitepaper {
            introduction: Some(introduction.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_whitepaper_renders_blank_page() {
        let wp = Whitepaper {
            introduction: Some(String::new()),
            background: Some(String::new()),
            problems: Some(String::new()),
            solution: Some(String::new()),
            technologies: Some(String::new()),
            conclusion: Some(String::new()),
        };
        assert!(layout(&wp).is_empty());

        let bytes = render(&wp).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let bytes = render(&Whitepaper::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_sections_keep_fixed_order_and_skip_missing() {
        let wp = Whitepaper {
            conclusion: Some("Ship it.".into()),
            introduction: Some("Hello.".into()),
            problems: Some(String::new()),
            ..Default::default()
        };
        let headings: Vec<_> = layout(&wp)
            .into_iter()
            .filter(|l| l.kind == LineKind::Heading)
            .map(|l| l.text)
            .collect();
        assert_eq!(headings, vec!["Introduction:", "Conclusion:"]);
    }

    #[test]
    fn test_wrap_splits_words_at_ninety_chars() {
        let text = format!("{}{}", "a".repeat(88), "word");
        let lines = hard_wrap(&text, WRAP_WIDTH);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 90);
        assert!(lines[0].ends_with("wo"));
        assert_eq!(lines[1], "rd");
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        let text = "é".repeat(91);
        let lines = hard_wrap(&text, WRAP_WIDTH);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 90);
    }

    #[test]
    fn test_wrap_breaks_at_newlines_and_drops_blank_segments() {
        let lines = hard_wrap("first\n\nsecond\r\nthird", WRAP_WIDTH);
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cursor_positions() {
        let lines = layout(&paper("one line"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].y, 800.0);
        assert_eq!(lines[0].size, 14.0);
        assert_eq!(lines[1].y, 780.0);
        assert_eq!(lines[1].size, 12.0);

        let two = Whitepaper {
            introduction: Some("x".into()),
            background: Some("y".into()),
            ..Default::default()
        };
        let lines = layout(&two);
        // 780 - 18 - 24
        assert_eq!(lines[2].y, 738.0);
    }

    #[test]
    fn test_overflow_is_truncated_not_paginated() {
        // Far more text than one page can hold
        let long = "x".repeat(WRAP_WIDTH * 200);
        let lines = layout(&paper(&long));

        assert!(lines.len() < 201);
        assert!(lines.iter().all(|l| l.y >= BOTTOM_LIMIT));

        let body = lines.iter().filter(|l| l.kind == LineKind::Body).count();
        // First body line at 780, then every 18pt while y >= 50
        assert_eq!(body, ((780.0 - 50.0) / 18.0) as usize + 1);
        assert!(render(&paper(&long)).is_ok());
    }

    #[test]
    fn test_sections_after_overflow_are_dropped() {
        let wp = Whitepaper {
            introduction: Some("x".repeat(WRAP_WIDTH * 200)),
            conclusion: Some("never shown".into()),
            ..Default::default()
        };
        assert!(!layout(&wp).iter().any(|l| l.text == "Conclusion:"));
    }

    #[test]
    fn test_non_latin_text_is_replaced() {
        assert_eq!(encodable("café 🚀"), "café ?");
        assert!(render(&paper("日本語のテキスト")).is_ok());
    }
}
