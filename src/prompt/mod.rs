//! Prompts: annotated scripts turned into display tokens.
//!
//! # Script Format
//!
//! A script is plain UTF-8 text with three reserved ASCII symbols:
//!
//! | Symbol | Meaning |
//! |---|---|
//! | `/` | ruby section delimiter |
//! | `@` | separates a kanji run from its reading inside a section |
//! | `;` | forced new line |
//!
//! ```text
//! /今日@きょう/は/晴@は/れ;/明日@あした/も/晴@は/れ。
//! ```
//!
//! Parsing strips the annotations, runs the de-annotated text through a
//! [`MorphologicalSource`], cuts morphemes at kanji/kana/Latin/digit
//! boundaries, scores every boundary, and finally hands the readings to
//! the kanji tokens.

mod ruby;
mod segment;
mod set;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoistError};
use crate::layout::{layout, LayoutOutcome, LayoutParameters};
use crate::MorphologicalSource;

pub use ruby::{align, parse_pairs, to_hiragana, RubyPair};
pub use segment::{
    break_score, collapse_new_lines, is_kanji_bearing, segment, strip_ruby, NEW_LINE_SYMBOL,
    RUBY_BOUNDARY_SYMBOL, RUBY_SECTION_SYMBOL,
};
pub use set::PromptSet;

/// Break score after a particle; the natural phrase-boundary threshold.
pub const PARTICLE_SCORE: u8 = 50;

/// One display unit of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Text as it appears in the de-annotated script
    pub text: String,
    /// Reading in hiragana; empty for tokens that are not kanji-bearing
    pub ruby: String,
    /// How acceptable it is to end a line after this token (0..=100)
    pub break_score: u8,
    /// Logographic or full-width Latin text, eligible for a reading
    pub kanji_bearing: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, break_score: u8, kanji_bearing: bool) -> Self {
        Self {
            text: text.into(),
            ruby: String::new(),
            break_score: break_score.min(100),
            kanji_bearing,
        }
    }

    /// Number of characters this token occupies on a line.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Descriptive fields of a prompt, as found in prompt set files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub copyright: String,
    pub language: String,
    pub content_type: String,
    pub style: String,
    pub voice_db: String,
    pub id: String,
}

/// A script ready for display: metadata plus aligned tokens.
///
/// Built once by [`Prompt::parse`]; layouts borrow the tokens read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    metadata: PromptMetadata,
    script: String,
    tokens: Vec<Token>,
}

impl Prompt {
    /// Segment and align an annotated script.
    ///
    /// Fails with [`VoistError::MissingField`] when the id or script is empty,
    /// and with [`VoistError::MalformedScript`] when the readings cannot be
    /// matched to the kanji tokens. No partial prompt is ever returned.
    pub fn parse<S: MorphologicalSource>(
        metadata: PromptMetadata,
        script: &str,
        source: &S,
    ) -> Result<Self> {
        if metadata.id.is_empty() {
            return Err(VoistError::MissingField("id"));
        }
        if script.is_empty() {
            return Err(VoistError::MissingField("script"));
        }

        let script = collapse_new_lines(script);
        let morphemes = source.tokenize(&strip_ruby(&script))?;
        for morpheme in &morphemes {
            log::trace!("{}\t{}", morpheme.surface, morpheme.feature);
        }

        let malformed = |reason| VoistError::MalformedScript {
            id: metadata.id.clone(),
            reason,
        };
        let pairs = parse_pairs(&script).map_err(malformed)?;
        let tokens = align(segment(&morphemes), &pairs).map_err(malformed)?;

        if log::log_enabled!(log::Level::Debug) {
            for (i, token) in tokens.iter().enumerate() {
                log::debug!("[{:02}] {:3} pts. {}", i, token.break_score, token.text);
            }
        }

        Ok(Self {
            metadata,
            script,
            tokens,
        })
    }

    pub fn metadata(&self) -> &PromptMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// The annotated script, with new-line runs collapsed.
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The displayed text: every token's text in order.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Lay this prompt out; see [`crate::layout::layout`].
    pub fn layout(&self, params: &LayoutParameters) -> LayoutOutcome {
        layout(&self.tokens, params)
    }

    /// File name used for recordings of this prompt, e.g.
    /// `nitech_jp_atr503_x00000_normal_m001_a01.wav`. Empty fields are skipped.
    pub fn full_name(&self, ext: &str) -> String {
        let m = &self.metadata;
        let name = join_non_empty(&[
            &m.copyright,
            &m.language,
            &m.content_type,
            "x00000",
            &m.style,
            &m.voice_db,
            &m.id,
        ]);
        if ext.is_empty() {
            name
        } else {
            format!("{name}.{ext}")
        }
    }

    /// Short name, `style_db_id`.
    pub fn simple_name(&self) -> String {
        let m = &self.metadata;
        join_non_empty(&[&m.style, &m.voice_db, &m.id])
    }
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
