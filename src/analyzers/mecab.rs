//! MeCab morphological analyzer.
//!
//! Drives the `mecab` command-line tool as a subprocess and reads its
//! default output format, one `surface\tfeature` line per morpheme with an
//! `EOS` line closing every input line.
//!
//! # System Requirements
//!
//! **mecab** and an IPADIC dictionary must be installed:
//! - **Linux**: `sudo apt-get install mecab mecab-ipadic-utf8`
//! - **macOS**: `brew install mecab mecab-ipadic`
//!
//! # Examples
//!
//! ```rust,no_run
//! use voist_rs::{analyzers::mecab::MecabSource, MorphologicalSource};
//!
//! let source = MecabSource::new();
//! for m in source.tokenize("今日は晴れ")? {
//!     println!("{}\t{}", m.surface, m.feature);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::borrow::Cow;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{Result, VoistError};
use crate::prompt::NEW_LINE_SYMBOL;
use crate::{Morpheme, MorphologicalSource};

const NEW_LINE_FEATURE: &str = "記号,一般,*,*,*,*,;";
const WHITESPACE_FEATURE: &str = "記号,空白,*,*,*,*,*";

/// [`MorphologicalSource`] backed by the `mecab` binary.
#[derive(Debug, Clone, Default)]
pub struct MecabSource {
    /// Path to the mecab binary. `None` uses `mecab` from PATH.
    pub bin_path: Option<PathBuf>,
    /// Dictionary directory passed as `-d`. `None` uses mecab's default.
    pub dic_dir: Option<PathBuf>,
}

impl MecabSource {
    /// Use `mecab` from PATH with its default dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit binary and/or dictionary, e.g. when bundling mecab.
    pub fn with_paths(bin_path: Option<PathBuf>, dic_dir: Option<PathBuf>) -> Self {
        Self { bin_path, dic_dir }
    }

    fn command(&self) -> Command {
        let mut cmd = match &self.bin_path {
            Some(path) => Command::new(path),
            None => Command::new("mecab"),
        };
        if let Some(dir) = &self.dic_dir {
            cmd.arg("-d").arg(dir);
        }
        cmd
    }

    fn run(&self, input: &str) -> Result<String> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VoistError::AnalyzerUnavailable
                } else {
                    VoistError::Io(e)
                }
            })?;

        // Feed stdin from its own thread so a large batch cannot fill the
        // stdout pipe while we are still writing.
        let payload = terminate_line(input);
        let output = std::thread::scope(|scope| -> Result<_> {
            let writer = child
                .stdin
                .take()
                .map(|mut stdin| scope.spawn(move || stdin.write_all(payload.as_bytes())));
            let output = child.wait_with_output()?;
            if let Some(writer) = writer {
                writer
                    .join()
                    .map_err(|_| VoistError::AnalyzerFailed("stdin writer panicked".into()))??;
            }
            Ok(output)
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoistError::AnalyzerFailed(format!(
                "mecab exited with code {:?}: {stderr}",
                output.status.code()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MorphologicalSource for MecabSource {
    fn tokenize(&self, text: &str) -> Result<Vec<Morpheme>> {
        // mecab groups adjacent symbols into one unknown word, so newline
        // markers are cut out and the pieces analyzed as separate lines.
        let pieces: Vec<&str> = text.split(NEW_LINE_SYMBOL).collect();
        let lines: Vec<&str> = pieces.iter().copied().flat_map(analyzed_lines).collect();

        let sentences = if lines.is_empty() {
            Vec::new()
        } else {
            parse_output(&self.run(&lines.join("\n"))?)?
        };
        reassemble(&pieces, sentences)
    }
}

/// Lines of a piece that are sent to mecab. Blank lines produce no
/// morphemes, so they are left to gap filling.
fn analyzed_lines(piece: &str) -> impl Iterator<Item = &str> {
    piece.lines().filter(|line| !line.trim().is_empty())
}

/// Rebuild the morpheme stream for `;`-separated `pieces` from one analyzed
/// sentence per non-blank line, with a marker morpheme between pieces.
fn reassemble(pieces: &[&str], sentences: Vec<Vec<Morpheme>>) -> Result<Vec<Morpheme>> {
    let expected: usize = pieces.iter().map(|p| analyzed_lines(p).count()).sum();
    if sentences.len() != expected {
        return Err(VoistError::AnalyzerFailed(format!(
            "expected {} sentences from mecab, got {}",
            expected,
            sentences.len()
        )));
    }

    let mut morphemes = Vec::new();
    let mut analyzed = sentences.into_iter();
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            morphemes.push(Morpheme::new(NEW_LINE_SYMBOL, NEW_LINE_FEATURE));
        }
        let mut piece_morphemes = Vec::new();
        for _ in analyzed_lines(piece) {
            piece_morphemes.extend(analyzed.next().unwrap_or_default());
        }
        morphemes.extend(fill_gaps(piece, piece_morphemes));
    }
    Ok(morphemes)
}

/// Put back the text mecab skips (ASCII spaces, tabs, line breaks) as
/// whitespace morphemes, so surfaces concatenate to `text` again.
fn fill_gaps(text: &str, morphemes: Vec<Morpheme>) -> Vec<Morpheme> {
    let mut filled = Vec::with_capacity(morphemes.len());
    let mut rest = text;
    for morpheme in morphemes {
        if let Some(at) = rest.find(morpheme.surface.as_str()) {
            let (gap, tail) = rest.split_at(at);
            if !gap.is_empty() {
                filled.push(Morpheme::new(gap, WHITESPACE_FEATURE));
            }
            rest = &tail[morpheme.surface.len()..];
        }
        filled.push(morpheme);
    }
    if !rest.is_empty() {
        filled.push(Morpheme::new(rest, WHITESPACE_FEATURE));
    }
    filled
}

fn terminate_line(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Split mecab output into sentences of morphemes, one per `EOS`.
fn parse_output(output: &str) -> Result<Vec<Vec<Morpheme>>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    for line in output.lines() {
        if line == "EOS" {
            sentences.push(std::mem::take(&mut current));
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let (surface, feature) = line.split_once('\t').ok_or_else(|| {
            VoistError::AnalyzerFailed(format!("unexpected mecab output line: {line:?}"))
        })?;
        current.push(Morpheme::new(surface, feature));
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sentences_separated_by_eos() {
        let output = "猫\t名詞,一般,*,*,*,*,猫,ネコ,ネコ\nが\t助詞,格助詞,一般,*,*,*,が,ガ,ガ\nEOS\nEOS\n";
        let sentences = parse_output(output).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(
            sentences[0][0],
            Morpheme::new("猫", "名詞,一般,*,*,*,*,猫,ネコ,ネコ")
        );
        assert_eq!(sentences[0][1].surface, "が");
        assert!(sentences[1].is_empty());
    }

    #[test]
    fn rejects_lines_without_feature() {
        assert!(matches!(
            parse_output("猫\nEOS\n"),
            Err(VoistError::AnalyzerFailed(_))
        ));
    }

    fn sentence(surfaces: &[&str]) -> Vec<Morpheme> {
        surfaces
            .iter()
            .map(|s| Morpheme::new(*s, "名詞,一般,*,*,*,*,*"))
            .collect()
    }

    fn surfaces(morphemes: &[Morpheme]) -> Vec<&str> {
        morphemes.iter().map(|m| m.surface.as_str()).collect()
    }

    #[test]
    fn reassembles_pieces_around_markers() {
        let morphemes = reassemble(
            &["猫が", "犬も"],
            vec![sentence(&["猫", "が"]), sentence(&["犬", "も"])],
        )
        .unwrap();
        assert_eq!(surfaces(&morphemes), ["猫", "が", ";", "犬", "も"]);
        assert_eq!(morphemes[2].feature, NEW_LINE_FEATURE);
    }

    #[test]
    fn reassembles_leading_trailing_and_doubled_markers() {
        let leading = reassemble(&["", "猫"], vec![sentence(&["猫"])]).unwrap();
        assert_eq!(surfaces(&leading), [";", "猫"]);

        let trailing = reassemble(&["猫", ""], vec![sentence(&["猫"])]).unwrap();
        assert_eq!(surfaces(&trailing), ["猫", ";"]);

        let doubled =
            reassemble(&["猫", "", "犬"], vec![sentence(&["猫"]), sentence(&["犬"])]).unwrap();
        assert_eq!(surfaces(&doubled), ["猫", ";", ";", "犬"]);

        let only_markers = reassemble(&["", "", ""], Vec::new()).unwrap();
        assert_eq!(surfaces(&only_markers), [";", ";"]);
    }

    #[test]
    fn reassembly_rejects_sentence_count_mismatch() {
        assert!(matches!(
            reassemble(&["猫", "犬"], vec![sentence(&["猫"])]),
            Err(VoistError::AnalyzerFailed(_))
        ));
    }

    #[test]
    fn restores_skipped_whitespace() {
        let morphemes = reassemble(
            &[" I am\n猫 "],
            vec![sentence(&["I", "am"]), sentence(&["猫"])],
        )
        .unwrap();
        assert_eq!(surfaces(&morphemes), [" ", "I", " ", "am", "\n", "猫", " "]);
        assert_eq!(morphemes[0].feature, WHITESPACE_FEATURE);
        assert_eq!(morphemes[4].feature, WHITESPACE_FEATURE);
        let joined: String = morphemes.iter().map(|m| m.surface.as_str()).collect();
        assert_eq!(joined, " I am\n猫 ");
    }

    #[cfg(unix)]
    #[test]
    fn large_input_does_not_block_on_full_pipes() {
        // `cat` echoes stdin, so its output fills the pipe while input is
        // still being written.
        if Command::new("cat").arg("/dev/null").output().is_err() {
            return;
        }
        let source = MecabSource::with_paths(Some(PathBuf::from("cat")), None);
        let input = "猫が好き\n".repeat(100_000);
        let output = source.run(&input).unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[test]
    fn analyzes_with_installed_mecab() {
        // Skip when mecab is unavailable in the execution environment.
        if Command::new("mecab").arg("--version").output().is_err() {
            return;
        }

        let source = MecabSource::new();
        let morphemes = source.tokenize("猫が好き;犬も").expect("mecab should succeed");
        let joined: String = morphemes.iter().map(|m| m.surface.as_str()).collect();
        assert_eq!(joined, "猫が好き;犬も");
        let surfaces: String = morphemes
            .iter()
            .filter(|m| m.surface != ";")
            .map(|m| m.surface.as_str())
            .collect();
        assert_eq!(surfaces, "猫が好き犬も");
        assert_eq!(morphemes.iter().filter(|m| m.surface == ";").count(), 1);
    }
}
