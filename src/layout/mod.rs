//! Adaptive prompt layout.
//!
//! [`layout`] searches font size × line-break threshold for a placement that
//! keeps every line inside the available width and breaks only at
//! linguistically acceptable points. [`plan_draw`] turns the result into
//! text runs for an external renderer.

mod draw;
mod engine;
mod params;

pub use draw::{plan_draw, Canvas, DrawCommand, DrawRole};
pub use engine::{effective_length, layout, LayoutOutcome, Placement};
pub use params::{
    LayoutParameters, LayoutParametersBuilder, LayoutParametersBuilderError, RubyMode,
    DEFAULT_FONT_SIZE, DEFAULT_FONT_SIZE_STEP, DEFAULT_LINE_BREAK_THRESHOLD,
    DEFAULT_LINE_BREAK_THRESHOLD_STEP, DEFAULT_MAX_LINES, DEFAULT_MIN_FONT_SIZE,
};
