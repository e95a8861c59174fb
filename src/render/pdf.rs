use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, StringFormat, Stream, dictionary};

use super::style::{RenderConfig, Rgb};
use super::{DocumentSink, TextBlock};
use crate::util::ensure_parent_directory;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Glyphs mapped onto codes 128.. through the font encoding's `Differences`.
const EXTRA_GLYPHS: [(char, &str); 16] = [
    ('ą', "aogonek"),
    ('Ą', "Aogonek"),
    ('ć', "cacute"),
    ('Ć', "Cacute"),
    ('ę', "eogonek"),
    ('Ę', "Eogonek"),
    ('ł', "lslash"),
    ('Ł', "Lslash"),
    ('ń', "nacute"),
    ('Ń', "Nacute"),
    ('ś', "sacute"),
    ('Ś', "Sacute"),
    ('ź', "zacute"),
    ('Ź', "Zacute"),
    ('ż', "zdotaccent"),
    ('Ż', "Zdotaccent"),
];
const EXTRA_GLYPH_BASE: u8 = 128;

/// Paginating sink that lays text blocks out top-down and assembles a PDF with lopdf.
pub struct PdfDocumentBuilder {
    config: RenderConfig,
    title: String,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor_y: f32,
}

impl PdfDocumentBuilder {
    pub fn new(config: RenderConfig, title: &str) -> Self {
        let cursor_y = config.page_height - config.margin;
        Self {
            config,
            title: title.to_string(),
            pages: Vec::new(),
            current: Vec::new(),
            cursor_y,
        }
    }

    fn top(&self) -> f32 {
        self.config.page_height - self.config.margin
    }

    fn flush_page(&mut self) {
        let operations = std::mem::take(&mut self.current);
        self.pages.push(operations);
        self.cursor_y = self.top();
    }

    pub fn finish(mut self) -> Result<Document> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.flush_page();
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let encoding_id = doc.add_object(dictionary! {
            "Type" => "Encoding",
            "BaseEncoding" => "WinAnsiEncoding",
            "Differences" => glyph_differences(),
        });
        let family = self.config.font_family;
        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => family.base_font(false),
            "Encoding" => encoding_id,
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => family.base_font(true),
            "Encoding" => encoding_id,
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let encoded = content.encode().context("failed to encode page content")?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let page_count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(self.config.page_width),
                Object::from(self.config.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(utf16_text(&self.title), StringFormat::Hexadecimal),
            "Producer" => Object::string_literal("quizmerge"),
        });
        doc.trailer.set("Info", info_id);

        doc.compress();
        Ok(doc)
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut doc = self.finish()?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .context("failed to serialize pdf document")?;
        Ok(bytes)
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let bytes = self.into_bytes()?;
        ensure_parent_directory(path)?;
        fs::write(path, bytes).with_context(|| format!("failed to write pdf: {}", path.display()))
    }
}

impl DocumentSink for PdfDocumentBuilder {
    fn push_block(&mut self, block: &TextBlock) {
        let style = *self.config.style_for(block.style);
        let family = self.config.font_family;
        let glyph_width = style.size * family.average_width(style.bold);
        let usable = self.config.page_width - 2.0 * self.config.margin - style.indent;
        let max_chars = ((usable / glyph_width).floor() as usize).max(1);
        let font = if style.bold { BOLD_FONT } else { REGULAR_FONT };
        let bottom = self.config.margin;

        for line in wrap_text(&block.text, max_chars) {
            if self.cursor_y - style.leading < bottom && !self.current.is_empty() {
                self.flush_page();
            }
            self.cursor_y -= style.leading;

            let x = if style.centered {
                let width = line.chars().count() as f32 * glyph_width;
                ((self.config.page_width - width) / 2.0).max(self.config.margin)
            } else {
                self.config.margin + style.indent
            };

            let Rgb(r, g, b) = style.color;
            self.current.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font.into(), style.size.into()]),
                Operation::new("rg", vec![r.into(), g.into(), b.into()]),
                Operation::new("Td", vec![x.into(), self.cursor_y.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(encode_text(&line), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]);
        }

        self.cursor_y -= style.space_after;
    }

    fn spacer(&mut self, points: f32) {
        self.cursor_y -= points;
        if self.cursor_y < self.config.margin {
            if self.current.is_empty() {
                self.cursor_y = self.top();
            } else {
                self.flush_page();
            }
        }
    }

    fn page_break(&mut self) {
        if !self.current.is_empty() {
            self.flush_page();
        }
    }
}

fn glyph_differences() -> Vec<Object> {
    let mut differences = vec![Object::Integer(i64::from(EXTRA_GLYPH_BASE))];
    differences.extend(EXTRA_GLYPHS.iter().map(|(_, name)| Object::from(*name)));
    differences
}

/// Single-byte text for the extended WinAnsi font encoding; unmappable characters become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{00A0}'..='\u{00FF}' => ch as u32 as u8,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => EXTRA_GLYPHS
                .iter()
                .position(|(glyph, _)| *glyph == ch)
                .map(|index| EXTRA_GLYPH_BASE + index as u8)
                .unwrap_or(b'?'),
        })
        .collect()
}

fn utf16_text(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend(unit.to_be_bytes());
    }
    bytes
}

/// Greedy word wrap by character count; words longer than a line are split.
///
/// A word starting with `-` never opens a continuation line; it stays on the
/// previous line even when that overruns the width.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            let rest = word.split_off(max_chars);
            let chunk: String = word.into_iter().collect();
            word = rest;
            if line_chars > 0 {
                let mut finished = std::mem::take(&mut line);
                line_chars = 0;
                if chunk.starts_with('-') {
                    finished.push(' ');
                    finished.push_str(&chunk);
                    lines.push(finished);
                    continue;
                }
                lines.push(finished);
            }
            lines.push(chunk);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if line_chars == 0 { word.len() } else { line_chars + 1 + word.len() };
        let opens_bullet = word.first() == Some(&'-');
        if needed > max_chars && !(opens_bullet && line_chars > 0) {
            lines.push(std::mem::take(&mut line));
            line_chars = 0;
        }
        if line_chars > 0 {
            line.push(' ');
            line_chars += 1;
        }
        line.extend(word.iter());
        line_chars += word.len();
    }

    if line_chars > 0 {
        lines.push(line);
    }
    lines
}
