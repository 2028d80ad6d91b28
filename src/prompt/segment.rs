use crate::Morpheme;

use super::{Token, PARTICLE_SCORE};

/// Separates ruby sections in an annotated script.
pub const RUBY_SECTION_SYMBOL: char = '/';
/// Separates a kanji run from its reading inside a ruby section.
pub const RUBY_BOUNDARY_SYMBOL: char = '@';
/// Forces a line break; never emitted as a token.
pub const NEW_LINE_SYMBOL: char = ';';

const NEW_LINE_FEATURE: &str = ";";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharType {
    Other,
    Kana,
    Kanji,
    Latin,
    Digit,
}

fn char_type(c: char) -> CharType {
    match c {
        '\u{4E00}'..='\u{9FFF}' | '々' | 'ヵ' | 'ヶ' | '○' => CharType::Kanji,
        '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' => CharType::Kana,
        '０'..='９' => CharType::Digit,
        'Ａ'..='Ｚ' | 'ａ'..='ｚ' => CharType::Latin,
        _ => CharType::Other,
    }
}

/// Whether a run ending in `text` can carry a reading.
pub fn is_kanji_bearing(text: &str) -> bool {
    text.chars()
        .next_back()
        .map(|c| matches!(char_type(c), CharType::Kanji | CharType::Latin))
        .unwrap_or(false)
}

fn needs_resegmenting(surface: &str) -> bool {
    surface.chars().any(|c| char_type(c) == CharType::Kanji)
        || surface
            .chars()
            .next()
            .map(|c| char_type(c) == CharType::Latin)
            .unwrap_or(false)
}

/// Collapse every run of newline markers into a single marker.
pub fn collapse_new_lines(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut prev_new_line = false;
    for c in script.chars() {
        let is_new_line = c == NEW_LINE_SYMBOL;
        if !(is_new_line && prev_new_line) {
            out.push(c);
        }
        prev_new_line = is_new_line;
    }
    out
}

/// Remove ruby annotations: `@reading/` is dropped whole, then any stray
/// section symbol. A boundary symbol with no closing section symbol is kept.
pub fn strip_ruby(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut rest = script;
    while let Some(at) = rest.find(RUBY_BOUNDARY_SYMBOL) {
        let (before, annotated) = rest.split_at(at);
        out.push_str(before);
        match annotated.find(RUBY_SECTION_SYMBOL) {
            Some(end) => rest = &annotated[end + RUBY_SECTION_SYMBOL.len_utf8()..],
            None => {
                out.push_str(annotated);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.retain(|c| c != RUBY_SECTION_SYMBOL);
    out
}

/// Line-break score for the boundary between a morpheme tagged `previous`
/// and the following one tagged `next` (empty at end of text).
///
/// Returns `None` when there is no previous morpheme to attach a score to.
pub fn break_score(previous: &str, next: &str) -> Option<u8> {
    if previous.is_empty() {
        return None;
    }
    if previous == NEW_LINE_FEATURE {
        return Some(100);
    }

    let never_before = next.ends_with('」')
        || next.starts_with("記号,句点")
        || next.ends_with('？')
        || next.ends_with('！')
        || next.starts_with("記号,読点")
        || next.starts_with("記号,空白");
    if never_before {
        return Some(0);
    }

    let score = if previous.ends_with('」')
        || previous.starts_with("記号,句点")
        || previous.ends_with('？')
        || previous.ends_with('！')
    {
        100
    } else if previous.starts_with("記号,読点") {
        95
    } else if previous.starts_with("記号,空白") {
        90
    } else if previous.starts_with("助詞") {
        PARTICLE_SCORE
    } else if previous.starts_with("名詞") {
        8
    } else if previous.starts_with("動詞") {
        5
    } else {
        1
    };
    Some(score)
}

/// Turn analyzer output into display tokens with break scores.
///
/// Morphemes containing kanji (or starting with a full-width Latin letter)
/// are cut at every character-category change. Runs inside one morpheme
/// score 0; the boundary after a morpheme's last run is scored from the
/// morpheme's feature and the next one's.
pub fn segment(morphemes: &[Morpheme]) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(morphemes.len());
    let mut previous_feature: Option<&str> = None;

    for morpheme in morphemes {
        let surface = morpheme.surface.as_str();
        if surface.is_empty() {
            continue;
        }
        if surface.len() == 1 && surface.starts_with(NEW_LINE_SYMBOL) {
            if !tokens.is_empty() {
                previous_feature = Some(NEW_LINE_FEATURE);
            }
            continue;
        }

        if let (Some(previous), Some(last)) = (previous_feature, tokens.last_mut()) {
            if let Some(score) = break_score(previous, &morpheme.feature) {
                last.break_score = score;
            }
        }

        if needs_resegmenting(surface) {
            push_runs(&mut tokens, surface);
        } else {
            tokens.push(Token::new(surface, 0, false));
        }
        previous_feature = Some(morpheme.feature.as_str());
    }

    if let (Some(previous), Some(last)) = (previous_feature, tokens.last_mut()) {
        if let Some(score) = break_score(previous, "") {
            last.break_score = score;
        }
    }

    tokens
}

fn push_runs(tokens: &mut Vec<Token>, surface: &str) {
    let mut run_start = 0;
    let mut run_type = None;
    for (idx, c) in surface.char_indices() {
        let ty = char_type(c);
        if run_type.is_some_and(|t| t != ty) {
            let run = &surface[run_start..idx];
            tokens.push(Token::new(run, 0, is_kanji_bearing(run)));
            run_start = idx;
        }
        run_type = Some(ty);
    }
    let run = &surface[run_start..];
    tokens.push(Token::new(run, 0, is_kanji_bearing(run)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(surface: &str, feature: &str) -> Morpheme {
        Morpheme::new(surface, feature)
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn strips_readings_and_section_symbols() {
        assert_eq!(strip_ruby("/漢字@かんじ/だよ"), "漢字だよ");
        assert_eq!(strip_ruby("今日@きょう/は/晴@は/れ"), "今日は晴れ");
        assert_eq!(strip_ruby("a@b"), "a@b");
    }

    #[test]
    fn collapses_consecutive_new_lines() {
        assert_eq!(collapse_new_lines("あ;;;い;う"), "あ;い;う");
    }

    #[test]
    fn scores_follow_previous_feature() {
        assert_eq!(break_score("助詞,格助詞,一般,*", "名詞,一般,*,*"), Some(50));
        assert_eq!(break_score("名詞,一般,*,*", "助詞,係助詞,*,*"), Some(8));
        assert_eq!(break_score("動詞,自立,*,*", "助動詞,*,*,*"), Some(5));
        assert_eq!(break_score("助動詞,*,*,*", "名詞,一般,*,*"), Some(1));
        assert_eq!(break_score("記号,読点,*,*", "名詞,一般,*,*"), Some(95));
        assert_eq!(break_score("記号,空白,*,*", "名詞,一般,*,*"), Some(90));
        assert_eq!(break_score("記号,句点,*,*", ""), Some(100));
        assert_eq!(break_score("記号,括弧閉,*,*,*,*,」", "名詞,一般,*,*"), Some(100));
    }

    #[test]
    fn never_breaks_before_closing_punctuation() {
        assert_eq!(break_score("助詞,終助詞,*,*", "記号,句点,*,*"), Some(0));
        assert_eq!(break_score("助詞,終助詞,*,*", "記号,読点,*,*"), Some(0));
        assert_eq!(break_score("名詞,一般,*,*", "記号,一般,*,*,*,*,？"), Some(0));
    }

    #[test]
    fn new_line_overrides_next_feature() {
        assert_eq!(break_score(";", "記号,句点,*,*"), Some(100));
        assert_eq!(break_score("", "名詞"), None);
    }

    #[test]
    fn splits_morpheme_at_category_changes() {
        let tokens = segment(&[m("書き込む", "動詞,自立,*,*"), m("。", "記号,句点,*,*")]);
        assert_eq!(texts(&tokens), vec!["書", "き", "込", "む", "。"]);
        assert_eq!(
            tokens.iter().map(|t| t.kanji_bearing).collect::<Vec<_>>(),
            vec![true, false, true, false, false]
        );
        assert_eq!(
            tokens.iter().map(|t| t.break_score).collect::<Vec<_>>(),
            vec![0, 0, 0, 0, 100]
        );
    }

    #[test]
    fn full_width_latin_is_kanji_bearing() {
        let tokens = segment(&[m("ＡＢＣ１２", "名詞,固有名詞,*,*")]);
        assert_eq!(texts(&tokens), vec!["ＡＢＣ", "１２"]);
        assert!(tokens[0].kanji_bearing);
        assert!(!tokens[1].kanji_bearing);
    }

    #[test]
    fn new_line_marker_is_consumed_and_forces_break() {
        let tokens = segment(&[
            m("猫", "名詞,一般,*,*"),
            m(";", "記号,一般,*,*"),
            m("が", "助詞,格助詞,一般,*"),
        ]);
        assert_eq!(texts(&tokens), vec!["猫", "が"]);
        assert_eq!(tokens[0].break_score, 100);
        assert_eq!(tokens[1].break_score, PARTICLE_SCORE);
    }

    #[test]
    fn leading_new_line_is_ignored() {
        let tokens = segment(&[m(";", "記号,一般,*,*"), m("猫", "名詞,一般,*,*")]);
        assert_eq!(texts(&tokens), vec!["猫"]);
        assert_eq!(tokens[0].break_score, 8);
    }
}
