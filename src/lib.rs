//! # voist-rs
//!
//! Prompt preparation for speech-corpus recording: turns an annotated script
//! into display tokens with line-break scores and ruby (reading) annotations,
//! then finds a legible multi-line layout for a fixed display area.
//!
//! ## Features
//!
//! - **Segmentation**: morpheme-aware tokens split at kanji/kana/Latin/digit boundaries
//! - **Ruby alignment**: `kanji@reading/` annotations matched to kanji tokens
//! - **Adaptive layout**: font size × line-break threshold search with forced fallback
//! - **MeCab adapter**: feature `mecab` drives the `mecab` CLI as the analyzer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voist_rs::{analyzers::mecab::MecabSource, LayoutParameters, Prompt, PromptMetadata};
//!
//! let source = MecabSource::new();
//! let meta = PromptMetadata { id: "0001".into(), ..Default::default() };
//! let prompt = Prompt::parse(meta, "/漢字@かんじ/を;/書@か/く", &source)?;
//!
//! let params = LayoutParameters::builder()
//!     .available_width_px(640)
//!     .build()?;
//! let outcome = prompt.layout(&params);
//! println!("{} lines at {}px", outcome.line_count, outcome.font_size);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analyzers;
pub mod config;
pub mod error;
pub mod layout;
pub mod prompt;

pub use config::LayoutConfig;
pub use error::{AlignmentError, Result, VoistError};
pub use layout::{
    layout, plan_draw, Canvas, DrawCommand, DrawRole, LayoutOutcome, LayoutParameters,
    Placement, RubyMode,
};
pub use prompt::{Prompt, PromptMetadata, PromptSet, Token, PARTICLE_SCORE};

/// One unit of morphological analysis output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    /// Surface text exactly as it appears in the analyzed input
    pub surface: String,
    /// Comma-delimited grammatical categories, IPADIC style (e.g. `助詞,格助詞,一般,*`)
    pub feature: String,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, feature: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            feature: feature.into(),
        }
    }
}

/// Common interface for morphological analyzers feeding the segmenter.
///
/// Implementations must return morphemes in input order, and their surfaces
/// concatenated must reproduce the analyzed text; text the analyzer itself
/// skips (spaces, line breaks) comes back as `記号,空白` morphemes. Feature tags are matched
/// by prefix/suffix against the IPADIC vocabulary, so analyzers with another
/// tag set need to remap to it.
pub trait MorphologicalSource {
    /// Split `text` into morphemes.
    fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>>;
}

impl<T: MorphologicalSource + ?Sized> MorphologicalSource for &T {
    fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>> {
        (**self).tokenize(text)
    }
}
