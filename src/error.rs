/// Why a script's ruby annotations could not be reconciled with its tokens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("no reading left for kanji token {token:?}")]
    MissingReading { token: String },
    #[error("{count} reading(s) left over after the last token, first is {kanji:?}")]
    ExcessReading { kanji: String, count: usize },
    #[error("token {token:?} does not match annotated kanji {kanji:?}")]
    Mismatch { token: String, kanji: String },
    #[error("ran out of tokens while merging towards annotated kanji {kanji:?}")]
    MergePastEnd { kanji: String },
    #[error("ruby section {section:?} has an empty kanji run or reading")]
    EmptyPair { section: String },
}

#[derive(thiserror::Error, Debug)]
pub enum VoistError {
    #[error("Malformed script for prompt '{id}': {reason}")]
    MalformedScript { id: String, reason: AlignmentError },
    #[error(
        "mecab not found. Install: Linux: `sudo apt-get install mecab mecab-ipadic-utf8`, \
         macOS: `brew install mecab mecab-ipadic`"
    )]
    AnalyzerUnavailable,
    #[error("Morphological analysis failed: {0}")]
    AnalyzerFailed(String),
    #[error("Prompt field '{0}' must not be empty")]
    MissingField(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid prompt set XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Invalid layout config: {0}")]
    Config(String),
    #[error("Invalid layout parameters: {0}")]
    InvalidParameters(#[from] crate::layout::LayoutParametersBuilderError),
}

pub type Result<T> = std::result::Result<T, VoistError>;
