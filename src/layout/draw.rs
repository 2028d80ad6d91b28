use serde::{Deserialize, Serialize};

use crate::prompt::Token;

use super::engine::LayoutOutcome;
use super::params::RubyMode;

/// Origin of the prompt area on the renderer's surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    /// Left margin; also kept free on the right
    pub x: i32,
    /// Baseline of the first line
    pub y: i32,
    /// Distance between consecutive baselines
    pub line_gap: i32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            x: 20,
            y: 90,
            line_gap: 110,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrawRole {
    /// Text sitting on the line's baseline
    Primary,
    /// Annotation drawn above a primary text
    Ruby,
}

/// One string for the renderer to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawCommand {
    pub text: String,
    /// Left edge of the text
    pub x: i32,
    /// Baseline
    pub y: i32,
    pub font_size: u32,
    pub role: DrawRole,
    /// Kanji-bearing text and its annotation are highlighted
    pub emphasis: bool,
}

/// Turn a layout into text runs, following the ruby drawing contract.
///
/// In [`RubyMode::AboveReading`] the kanji sits on the line and its reading
/// is centered above it at half size. In [`RubyMode::SwapPrimary`] the
/// reading takes the kanji's place on the line and the kanji is drawn above
/// it at full size, left-aligned with the reading.
pub fn plan_draw(
    tokens: &[Token],
    outcome: &LayoutOutcome,
    ruby_mode: RubyMode,
    canvas: &Canvas,
) -> Vec<DrawCommand> {
    let font = outcome.font_size as i32;
    let mut commands = Vec::with_capacity(tokens.len() * 2);

    for (token, placement) in tokens.iter().zip(&outcome.placements) {
        let x = canvas.x + placement.x_offset_px as i32;
        let baseline = canvas.y + placement.line_index as i32 * canvas.line_gap;
        let swapped = ruby_mode == RubyMode::SwapPrimary && placement.draws_ruby_above;

        commands.push(DrawCommand {
            text: if swapped {
                token.ruby.clone()
            } else {
                token.text.clone()
            },
            x,
            y: baseline,
            font_size: outcome.font_size,
            role: DrawRole::Primary,
            emphasis: token.kanji_bearing,
        });

        if !placement.draws_ruby_above {
            continue;
        }
        let annotation = match ruby_mode {
            RubyMode::AboveReading => {
                let text_width = token.char_len() as i32 * font;
                let ruby_width = token.ruby.chars().count() as i32 * font / 2;
                DrawCommand {
                    text: token.ruby.clone(),
                    x: x + (text_width - ruby_width) / 2,
                    y: baseline - font,
                    font_size: outcome.font_size / 2,
                    role: DrawRole::Ruby,
                    emphasis: true,
                }
            }
            RubyMode::SwapPrimary => DrawCommand {
                text: token.text.clone(),
                x,
                y: baseline - font,
                font_size: outcome.font_size,
                role: DrawRole::Ruby,
                emphasis: true,
            },
        };
        commands.push(annotation);
    }

    commands
}
