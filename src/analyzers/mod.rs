//! Morphological analyzers.
//!
//! This module contains adapters implementing [`crate::MorphologicalSource`].
//!
//! # Available Analyzers
//!
//! Enable analyzers via Cargo features:
//! - `mecab` - MeCab with an IPADIC dictionary (the `mecab` binary must be installed)

#[cfg(feature = "mecab")]
pub mod mecab;
