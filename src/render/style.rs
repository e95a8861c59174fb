use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use super::BlockStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    pub fn base_font(self, bold: bool) -> &'static str {
        match (self, bold) {
            (Self::Helvetica, false) => "Helvetica",
            (Self::Helvetica, true) => "Helvetica-Bold",
            (Self::Times, false) => "Times-Roman",
            (Self::Times, true) => "Times-Bold",
            (Self::Courier, false) => "Courier",
            (Self::Courier, true) => "Courier-Bold",
        }
    }

    /// Average glyph advance as a fraction of the font size.
    pub fn average_width(self, bold: bool) -> f32 {
        match (self, bold) {
            (Self::Helvetica, false) => 0.52,
            (Self::Helvetica, true) => 0.57,
            (Self::Times, false) => 0.48,
            (Self::Times, true) => 0.52,
            (Self::Courier, _) => 0.60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Self = Self(0.0, 0.0, 0.0);
    pub const GREEN: Self = Self(0.0, 0.5, 0.0);
    pub const RED: Self = Self(1.0, 0.0, 0.0);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub size: f32,
    /// Baseline-to-baseline distance.
    pub leading: f32,
    pub indent: f32,
    pub space_after: f32,
    pub bold: bool,
    pub color: Rgb,
    pub centered: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 11.0,
            leading: 14.0,
            indent: 0.0,
            space_after: 4.0,
            bold: false,
            color: Rgb::BLACK,
            centered: false,
        }
    }
}

/// Page geometry, font family and per-role text styles for rendered documents.
///
/// Every field is optional in the JSON form; roles that are left out keep
/// their defaults, while a role given partially falls back to the generic
/// `TextStyle` default for its missing fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub font_family: FontFamily,
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub title_spacing: f32,
    pub title: TextStyle,
    pub heading: TextStyle,
    pub question: TextStyle,
    pub answer: TextStyle,
    pub correct: TextStyle,
    pub unidentified: TextStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let body = TextStyle::default();
        Self {
            font_family: FontFamily::Helvetica,
            page_width: 595.0,
            page_height: 842.0,
            margin: 72.0,
            title_spacing: 24.0,
            title: TextStyle {
                size: 16.0,
                leading: 20.0,
                bold: true,
                centered: true,
                ..body
            },
            heading: TextStyle {
                bold: true,
                space_after: 2.0,
                ..body
            },
            question: TextStyle {
                bold: true,
                space_after: 10.0,
                ..body
            },
            answer: TextStyle {
                indent: 18.0,
                space_after: 2.0,
                ..body
            },
            correct: TextStyle {
                indent: 18.0,
                space_after: 2.0,
                color: Rgb::GREEN,
                ..body
            },
            unidentified: TextStyle {
                color: Rgb::RED,
                ..body
            },
        }
    }
}

impl RenderConfig {
    pub fn style_for(&self, style: BlockStyle) -> &TextStyle {
        match style {
            BlockStyle::Title => &self.title,
            BlockStyle::QuestionHeading | BlockStyle::AnswersHeading | BlockStyle::CorrectHeading => {
                &self.heading
            }
            BlockStyle::Question => &self.question,
            BlockStyle::Answer => &self.answer,
            BlockStyle::CorrectOption | BlockStyle::CorrectAnswer => &self.correct,
            BlockStyle::Unidentified => &self.unidentified,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read style config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse style config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at `path`, degrading to the defaults when it is absent or unusable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded style config");
                config
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    path = %path.display(),
                    reason = %reason,
                    "style config unusable; using default styles"
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            bail!(
                "page size must be positive, got {}x{}",
                self.page_width,
                self.page_height
            );
        }
        if self.margin < 0.0
            || self.margin * 2.0 >= self.page_width
            || self.margin * 2.0 >= self.page_height
        {
            bail!("margin {} leaves no printable area", self.margin);
        }

        let roles = [
            ("title", &self.title),
            ("heading", &self.heading),
            ("question", &self.question),
            ("answer", &self.answer),
            ("correct", &self.correct),
            ("unidentified", &self.unidentified),
        ];
        for (role, style) in roles {
            if style.size <= 0.0 || style.leading <= 0.0 {
                bail!("{role} style needs a positive size and leading");
            }
            if style.indent < 0.0 || self.margin * 2.0 + style.indent >= self.page_width {
                bail!("{role} style indent does not fit the page");
            }
            let Rgb(r, g, b) = style.color;
            if ![r, g, b].iter().all(|channel| (0.0..=1.0).contains(channel)) {
                bail!("{role} style color channels must be within 0..=1");
            }
        }

        Ok(())
    }
}
