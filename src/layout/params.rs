use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::prompt::PARTICLE_SCORE;

pub const DEFAULT_FONT_SIZE: u32 = 48;
pub const DEFAULT_MIN_FONT_SIZE: u32 = 24;
pub const DEFAULT_FONT_SIZE_STEP: u32 = 4;
pub const DEFAULT_LINE_BREAK_THRESHOLD: u8 = 80;
pub const DEFAULT_LINE_BREAK_THRESHOLD_STEP: u8 = 10;
pub const DEFAULT_MAX_LINES: usize = 3;

/// How readings are shown for kanji-bearing tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubyMode {
    /// Kanji on the line, reading at half size above it
    #[default]
    #[serde(alias = "A")]
    AboveReading,
    /// Reading on the line, kanji at full size above it
    #[serde(alias = "B")]
    SwapPrimary,
}

/// Bounds and geometry for one layout call.
///
/// The search starts at the upper bounds (`font_size`, `line_break_threshold`)
/// and relaxes down to the lower ones.
///
/// ```rust
/// use voist_rs::{LayoutParameters, RubyMode};
///
/// let params = LayoutParameters::builder()
///     .available_width_px(800)
///     .max_lines(2)
///     .ruby_mode(RubyMode::SwapPrimary)
///     .build()
///     .unwrap();
/// assert_eq!(params.font_size, 48);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct LayoutParameters {
    /// Font size the search starts from, in pixels
    #[builder(default = "DEFAULT_FONT_SIZE")]
    pub font_size: u32,
    #[builder(default = "DEFAULT_MIN_FONT_SIZE")]
    pub min_font_size: u32,
    /// Zero keeps the font size fixed
    #[builder(default = "DEFAULT_FONT_SIZE_STEP")]
    pub font_size_step: u32,
    /// Break score required to end a line, at the start of the search
    #[builder(default = "DEFAULT_LINE_BREAK_THRESHOLD")]
    pub line_break_threshold: u8,
    #[builder(default = "PARTICLE_SCORE")]
    pub min_line_break_threshold: u8,
    /// Zero keeps the threshold fixed
    #[builder(default = "DEFAULT_LINE_BREAK_THRESHOLD_STEP")]
    pub line_break_threshold_step: u8,
    #[builder(default)]
    pub ruby_mode: RubyMode,
    #[builder(default = "DEFAULT_MAX_LINES")]
    pub max_lines: usize,
    pub available_width_px: u32,
}

impl LayoutParameters {
    pub fn builder() -> LayoutParametersBuilder {
        LayoutParametersBuilder::default()
    }

    /// Upper bound on fit passes before falling back to forced placement.
    pub fn max_attempts(&self) -> usize {
        let font_steps = steps(self.font_size, self.min_font_size, self.font_size_step);
        let threshold_steps = steps(
            u32::from(self.line_break_threshold),
            u32::from(self.min_line_break_threshold),
            u32::from(self.line_break_threshold_step),
        );
        font_steps * threshold_steps
    }
}

fn steps(upper: u32, lower: u32, step: u32) -> usize {
    if step == 0 {
        1
    } else {
        (upper.saturating_sub(lower) / step) as usize + 1
    }
}

impl LayoutParametersBuilder {
    fn validate(&self) -> Result<(), String> {
        let font = self.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let min_font = self.min_font_size.unwrap_or(DEFAULT_MIN_FONT_SIZE);
        if font == 0 || min_font == 0 {
            return Err("font sizes must be positive".into());
        }
        if min_font > font {
            return Err(format!(
                "min_font_size {min_font} is above font_size {font}"
            ));
        }

        let threshold = self
            .line_break_threshold
            .unwrap_or(DEFAULT_LINE_BREAK_THRESHOLD);
        let min_threshold = self.min_line_break_threshold.unwrap_or(PARTICLE_SCORE);
        if threshold > 100 || min_threshold > 100 {
            return Err("line break thresholds must be within 0..=100".into());
        }
        if min_threshold > threshold {
            return Err(format!(
                "min_line_break_threshold {min_threshold} is above line_break_threshold {threshold}"
            ));
        }

        if self.max_lines == Some(0) {
            return Err("max_lines must be at least 1".into());
        }
        Ok(())
    }
}
