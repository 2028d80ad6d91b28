use crate::error::AlignmentError;

use super::segment::{is_kanji_bearing, RUBY_BOUNDARY_SYMBOL, RUBY_SECTION_SYMBOL};
use super::Token;

/// A kanji run and the reading annotated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyPair {
    pub kanji: String,
    pub reading: String,
}

/// Fold katakana to hiragana. `ヴ` becomes `う゛`; `ヵ`/`ヶ` become `か`/`け`.
pub fn to_hiragana(katakana: &str) -> String {
    let mut out = String::with_capacity(katakana.len());
    for c in katakana.chars() {
        match c {
            'ァ'..='ン' => {
                // Both blocks share the same layout, 0x60 apart.
                out.push(char::from_u32(c as u32 - 0x60).unwrap_or(c));
            }
            'ヵ' => out.push('か'),
            'ヶ' => out.push('け'),
            'ヴ' => out.push_str("う゛"),
            _ => out.push(c),
        }
    }
    out
}

/// Collect `kanji@reading` pairs in script order.
///
/// `script` must already have its newline markers collapsed.
pub fn parse_pairs(script: &str) -> Result<Vec<RubyPair>, AlignmentError> {
    script
        .split(RUBY_SECTION_SYMBOL)
        .filter(|section| section.contains(RUBY_BOUNDARY_SYMBOL))
        .map(|section| {
            let mut parts = section.split(RUBY_BOUNDARY_SYMBOL);
            let kanji = parts.next().unwrap_or_default();
            let reading = parts.next().unwrap_or_default();
            if kanji.is_empty() || reading.is_empty() {
                return Err(AlignmentError::EmptyPair {
                    section: section.to_string(),
                });
            }
            Ok(RubyPair {
                kanji: kanji.to_string(),
                reading: to_hiragana(reading),
            })
        })
        .collect()
}

/// Reconcile ruby pairs with token boundaries.
///
/// Each kanji-bearing token takes the next pair. A token longer than the
/// pair's kanji run is split after it; a shorter one absorbs the following
/// token and is tested again. Tokens are moved into a fresh vector, so every
/// input token is visited once and merges are bounded by the token count.
pub fn align(tokens: Vec<Token>, pairs: &[RubyPair]) -> Result<Vec<Token>, AlignmentError> {
    let mut aligned = Vec::with_capacity(tokens.len() + pairs.len());
    let mut remaining = tokens.into_iter();
    let mut current = remaining.next();
    let mut next_pair = 0;

    while let Some(mut token) = current.take() {
        if !token.kanji_bearing {
            token.ruby.clear();
            aligned.push(token);
            current = remaining.next();
            continue;
        }

        let pair = pairs
            .get(next_pair)
            .ok_or_else(|| AlignmentError::MissingReading {
                token: token.text.clone(),
            })?;
        let token_len = token.text.chars().count();
        let kanji_len = pair.kanji.chars().count();

        match token_len.cmp(&kanji_len) {
            std::cmp::Ordering::Equal => {
                if token.text != pair.kanji {
                    return Err(mismatch(&token, pair));
                }
                token.ruby = pair.reading.clone();
                aligned.push(token);
                next_pair += 1;
                current = remaining.next();
            }
            std::cmp::Ordering::Greater => {
                let rest = token
                    .text
                    .strip_prefix(pair.kanji.as_str())
                    .ok_or_else(|| mismatch(&token, pair))?;
                let remainder = Token::new(rest, token.break_score, is_kanji_bearing(rest));
                aligned.push(Token {
                    text: pair.kanji.clone(),
                    ruby: pair.reading.clone(),
                    break_score: 0,
                    kanji_bearing: true,
                });
                next_pair += 1;
                current = Some(remainder);
            }
            std::cmp::Ordering::Less => {
                let next = remaining
                    .next()
                    .ok_or_else(|| AlignmentError::MergePastEnd {
                        kanji: pair.kanji.clone(),
                    })?;
                token.text.push_str(&next.text);
                token.break_score = next.break_score;
                current = Some(token);
            }
        }
    }

    if let Some(pair) = pairs.get(next_pair) {
        return Err(AlignmentError::ExcessReading {
            kanji: pair.kanji.clone(),
            count: pairs.len() - next_pair,
        });
    }

    Ok(aligned)
}

fn mismatch(token: &Token, pair: &RubyPair) -> AlignmentError {
    AlignmentError::Mismatch {
        token: token.text.clone(),
        kanji: pair.kanji.clone(),
    }
}
