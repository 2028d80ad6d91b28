//! Caller-owned layout settings, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "upper_font_size": 64, "max_lines": 2, "ruby_mode": "swap_primary" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoistError};
use crate::layout::{Canvas, LayoutParameters, RubyMode};
use crate::prompt::PARTICLE_SCORE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Smallest font size a user may pick
    pub min_font_size: u32,
    /// Largest font size a user may pick
    pub max_font_size: u32,
    /// Font size the search starts from
    pub upper_font_size: u32,
    /// Font size the search may shrink to
    pub lower_font_size: u32,
    pub font_size_step: u32,
    /// Break score required at the start of the search
    pub upper_line_break_threshold: u8,
    pub line_break_threshold_step: u8,
    /// Allow the search to relax down to breaks after particles; otherwise
    /// the threshold stays at its upper bound.
    pub line_break_at_particle: bool,
    pub max_lines: usize,
    pub ruby_mode: RubyMode,
    #[serde(flatten)]
    pub canvas: Canvas,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_font_size: 16,
            max_font_size: 96,
            upper_font_size: 48,
            lower_font_size: 24,
            font_size_step: 4,
            upper_line_break_threshold: 80,
            line_break_threshold_step: 10,
            line_break_at_particle: true,
            max_lines: 3,
            ruby_mode: RubyMode::AboveReading,
            canvas: Canvas::default(),
        }
    }
}

impl LayoutConfig {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!(
            "Loaded layout config from {}: font {}..={}, threshold {}, {} line(s)",
            path.display(),
            config.lower_font_size,
            config.upper_font_size,
            config.upper_line_break_threshold,
            config.max_lines
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            return Err(VoistError::Config(format!(
                "font size range {}..={} is empty",
                self.min_font_size, self.max_font_size
            )));
        }
        if self.upper_line_break_threshold > 100 {
            return Err(VoistError::Config(format!(
                "line break threshold {} is outside 0..=100",
                self.upper_line_break_threshold
            )));
        }
        if self.max_lines == 0 {
            return Err(VoistError::Config("max_lines must be at least 1".into()));
        }
        Ok(())
    }

    /// Font size the search starts from, clamped into the allowed range.
    pub fn effective_upper_font_size(&self) -> u32 {
        self.upper_font_size.clamp(self.min_font_size, self.max_font_size)
    }

    /// Font size floor, clamped into the allowed range and below the upper bound.
    pub fn effective_lower_font_size(&self) -> u32 {
        let lower = self.lower_font_size.clamp(self.min_font_size, self.max_font_size);
        lower.min(self.effective_upper_font_size())
    }

    /// Threshold floor: the particle score when particle breaks are allowed,
    /// the upper threshold otherwise.
    pub fn lower_line_break_threshold(&self) -> u8 {
        if self.line_break_at_particle {
            PARTICLE_SCORE.min(self.upper_line_break_threshold)
        } else {
            self.upper_line_break_threshold
        }
    }

    /// Layout parameters for a prompt panel `panel_width` pixels wide.
    /// The canvas margin is kept free on both sides.
    pub fn parameters(&self, panel_width: u32) -> Result<LayoutParameters> {
        self.validate()?;
        let margin = self.canvas.x.max(0) as u32;
        let width = panel_width.saturating_sub(margin.saturating_mul(2));
        let params = LayoutParameters::builder()
            .font_size(self.effective_upper_font_size())
            .min_font_size(self.effective_lower_font_size())
            .font_size_step(self.font_size_step)
            .line_break_threshold(self.upper_line_break_threshold)
            .min_line_break_threshold(self.lower_line_break_threshold())
            .line_break_threshold_step(self.line_break_threshold_step)
            .ruby_mode(self.ruby_mode)
            .max_lines(self.max_lines)
            .available_width_px(width)
            .build()?;
        Ok(params)
    }
}
