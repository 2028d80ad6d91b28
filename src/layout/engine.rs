use serde::Serialize;

use crate::prompt::Token;

use super::params::{LayoutParameters, RubyMode};

/// Where one token goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub line_index: usize,
    /// Offset of the token's primary text from the line start, in pixels
    pub x_offset_px: u32,
    pub draws_ruby_above: bool,
}

/// Result of a layout call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutOutcome {
    /// One placement per token, in token order
    pub placements: Vec<Placement>,
    /// Font size actually used
    pub font_size: u32,
    /// Line-break threshold actually used
    pub line_break_threshold: u8,
    pub line_count: usize,
    /// True when no parameter combination fit and tokens were wrapped
    /// regardless of break scores; `line_count` may exceed `max_lines`.
    pub forced: bool,
    /// Fit passes tried
    pub attempts: usize,
}

/// Characters a token occupies on its line in the given mode.
pub fn effective_length(token: &Token, mode: RubyMode) -> usize {
    match mode {
        RubyMode::SwapPrimary if token.kanji_bearing => token.ruby.chars().count(),
        _ => token.char_len(),
    }
}

/// Find a legible layout for `tokens`.
///
/// Starting from the upper font size and threshold, each fit pass only ends
/// lines after tokens scoring at least the threshold. A failed pass shrinks
/// the font; once the font is at its floor the threshold is lowered and the
/// font reset. When both are exhausted every token is wrapped greedily,
/// ignoring break scores and `max_lines`.
///
/// Pure: all line state lives in this call, so it can be re-run per frame.
pub fn layout(tokens: &[Token], params: &LayoutParameters) -> LayoutOutcome {
    let widths: Vec<usize> = tokens
        .iter()
        .map(|t| effective_length(t, params.ruby_mode))
        .collect();

    let mut font = params.font_size;
    let mut threshold = params.line_break_threshold;
    let mut attempts = 0;

    loop {
        attempts += 1;
        if let Some(lines) = fit_pass(tokens, &widths, font, threshold, params) {
            return place(tokens, &widths, &lines, font, threshold, false, attempts);
        }

        let smaller_font = font
            .checked_sub(params.font_size_step)
            .filter(|f| *f < font && *f >= params.min_font_size);
        if let Some(smaller) = smaller_font {
            font = smaller;
            log::debug!("Layout did not fit; font size {}", font);
        } else if let Some(lower) = threshold
            .checked_sub(params.line_break_threshold_step)
            .filter(|t| *t < threshold && *t >= params.min_line_break_threshold)
        {
            threshold = lower;
            font = params.font_size;
            log::debug!("Layout did not fit; line break threshold {}", threshold);
        } else {
            break;
        }
    }

    log::warn!(
        "No layout fits {}px in {} line(s); wrapping {} tokens at {}px",
        params.available_width_px,
        params.max_lines,
        tokens.len(),
        font
    );
    let lines = forced_lines(&widths, font, params.available_width_px);
    place(tokens, &widths, &lines, font, threshold, true, attempts)
}

fn fits(chars: usize, font: u32, width: u32) -> bool {
    chars as u64 * u64::from(font) <= u64::from(width)
}

/// One try at a font size and threshold. Returns the line of every token,
/// or `None` if some run between acceptable breaks cannot be placed.
fn fit_pass(
    tokens: &[Token],
    widths: &[usize],
    font: u32,
    threshold: u8,
    params: &LayoutParameters,
) -> Option<Vec<usize>> {
    let mut lines = vec![0; tokens.len()];
    let mut line = 0;
    // Characters committed to the current line, and the run since the last break.
    let mut committed = 0;
    let mut run_start = 0;
    let mut run_width = 0;

    let mut i = 0;
    while i < tokens.len() {
        if fits(committed + run_width + widths[i], font, params.available_width_px) {
            run_width += widths[i];
            if tokens[i].break_score >= threshold || i + 1 == tokens.len() {
                lines[run_start..=i].fill(line);
                committed += run_width;
                run_start = i + 1;
                run_width = 0;
            }
            i += 1;
        } else if committed > 0 && line + 1 < params.max_lines {
            // Carry the open run over; token i is re-tested on the new line.
            line += 1;
            committed = 0;
        } else {
            return None;
        }
    }
    Some(lines)
}

/// Greedy wrap: a new line starts whenever a non-empty line would overflow.
fn forced_lines(widths: &[usize], font: u32, width: u32) -> Vec<usize> {
    let mut lines = Vec::with_capacity(widths.len());
    let mut line = 0;
    let mut used = 0;
    for &w in widths {
        if used > 0 && !fits(used + w, font, width) {
            line += 1;
            used = 0;
        }
        lines.push(line);
        used += w;
    }
    lines
}

fn place(
    tokens: &[Token],
    widths: &[usize],
    lines: &[usize],
    font: u32,
    threshold: u8,
    forced: bool,
    attempts: usize,
) -> LayoutOutcome {
    let mut placements = Vec::with_capacity(tokens.len());
    let mut current_line = 0;
    let mut used = 0usize;
    for ((token, &w), &line) in tokens.iter().zip(widths).zip(lines) {
        if line != current_line {
            current_line = line;
            used = 0;
        }
        placements.push(Placement {
            line_index: line,
            x_offset_px: (used as u32).saturating_mul(font),
            draws_ruby_above: token.kanji_bearing && !token.ruby.is_empty(),
        });
        used += w;
    }

    LayoutOutcome {
        line_count: lines.last().map(|l| l + 1).unwrap_or(0),
        placements,
        font_size: font,
        line_break_threshold: threshold,
        forced,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, score: u8) -> Token {
        Token::new(text, score, false)
    }

    fn kanji(text: &str, ruby: &str, score: u8) -> Token {
        Token {
            ruby: ruby.to_string(),
            ..Token::new(text, score, true)
        }
    }

    fn params(width: u32) -> crate::layout::LayoutParametersBuilder {
        let mut builder = LayoutParameters::builder();
        builder
            .available_width_px(width)
            .font_size(40)
            .min_font_size(20)
            .font_size_step(10)
            .line_break_threshold(80)
            .min_line_break_threshold(50)
            .line_break_threshold_step(30)
            .max_lines(2);
        builder
    }

    fn lines_of(outcome: &LayoutOutcome) -> Vec<usize> {
        outcome.placements.iter().map(|p| p.line_index).collect()
    }

    #[test]
    fn fits_on_one_line_at_upper_bounds() {
        let tokens = vec![token("あいう", 1), token("えお", 100)];
        let outcome = layout(&tokens, &params(400).build().unwrap());
        assert!(!outcome.forced);
        assert_eq!(outcome.font_size, 40);
        assert_eq!(outcome.line_count, 1);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.placements[1].x_offset_px, 120);
    }

    #[test]
    fn breaks_only_at_scores_above_threshold() {
        // 4 chars per line at 40px; the only allowed break is after "いい".
        let tokens = vec![token("あ", 1), token("いい", 90), token("うう", 1), token("え", 100)];
        let outcome = layout(&tokens, &params(160).build().unwrap());
        assert!(!outcome.forced);
        assert_eq!(outcome.font_size, 40);
        assert_eq!(lines_of(&outcome), vec![0, 0, 1, 1]);
        assert_eq!(outcome.placements[2].x_offset_px, 0);
        assert_eq!(outcome.placements[3].x_offset_px, 80);
    }

    #[test]
    fn shrinks_font_before_relaxing_threshold() {
        // 6 chars, one line allowed: needs 6 * font <= 200, i.e. font 30 or less.
        let tokens = vec![token("あいう", 1), token("えおか", 100)];
        let outcome = layout(&tokens, &params(200).max_lines(1).build().unwrap());
        assert!(!outcome.forced);
        assert_eq!(outcome.font_size, 30);
        assert_eq!(outcome.line_break_threshold, 80);
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn relaxes_threshold_and_resets_font() {
        // Break after "あいう" needs threshold <= 50; then each line is 3 chars.
        let tokens = vec![token("あいう", 50), token("えおか", 100)];
        let p = params(120).min_font_size(30).build().unwrap();
        let outcome = layout(&tokens, &p);
        assert!(!outcome.forced);
        assert_eq!(outcome.line_break_threshold, 50);
        assert_eq!(outcome.font_size, 40);
        assert_eq!(lines_of(&outcome), vec![0, 1]);
        assert_eq!(outcome.attempts, 3);
    }

    #[test]
    fn forced_placement_places_every_token_once() {
        let tokens: Vec<Token> = (0..5).map(|_| token("あいうえお", 1)).collect();
        let p = params(30).max_lines(1).build().unwrap();
        let outcome = layout(&tokens, &p);
        assert!(outcome.forced);
        assert_eq!(outcome.placements.len(), tokens.len());
        assert_eq!(lines_of(&outcome), vec![0, 1, 2, 3, 4]);
        assert!(outcome.line_count > p.max_lines);
        assert!(outcome.placements.iter().all(|pl| pl.x_offset_px == 0));
        assert_eq!(outcome.font_size, 20);
        assert_eq!(outcome.line_break_threshold, 50);
    }

    #[test]
    fn attempts_never_exceed_parameter_grid() {
        let tokens: Vec<Token> = (0..12).map(|i| token("あい", (i * 9) as u8)).collect();
        for width in [10, 50, 90, 130, 200, 400, 1000] {
            for max_lines in 1..4 {
                let p = params(width).max_lines(max_lines).build().unwrap();
                let outcome = layout(&tokens, &p);
                assert!(outcome.attempts <= p.max_attempts());
                assert_eq!(outcome.placements.len(), tokens.len());
                if !outcome.forced {
                    assert!(outcome.line_count <= max_lines);
                }
            }
        }
    }

    #[test]
    fn oversized_steps_fall_back_without_overflow() {
        let tokens = vec![token("あいうえお", 100)];
        let p = params(10)
            .font_size(48)
            .min_font_size(24)
            .font_size_step(u32::MAX)
            .line_break_threshold(100)
            .min_line_break_threshold(0)
            .line_break_threshold_step(u8::MAX)
            .build()
            .unwrap();
        let outcome = layout(&tokens, &p);
        assert!(outcome.forced);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.font_size, 48);
        assert_eq!(outcome.placements.len(), 1);
    }

    #[test]
    fn swap_mode_measures_readings() {
        let tokens = vec![kanji("漢", "かんじ", 100), token("だ", 100)];
        let above = layout(&tokens, &params(400).build().unwrap());
        assert_eq!(above.placements[1].x_offset_px, 40);
        assert!(above.placements[0].draws_ruby_above);
        assert!(!above.placements[1].draws_ruby_above);

        let swapped = layout(
            &tokens,
            &params(400).ruby_mode(RubyMode::SwapPrimary).build().unwrap(),
        );
        assert_eq!(swapped.placements[1].x_offset_px, 120);
    }

    #[test]
    fn empty_prompt_has_no_lines() {
        let outcome = layout(&[], &params(100).build().unwrap());
        assert_eq!(outcome.line_count, 0);
        assert!(outcome.placements.is_empty());
        assert!(!outcome.forced);
    }
}
