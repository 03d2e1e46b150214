// This file is part of swash, a POSIX-compatible command shell.
// Copyright (C) 2024 the swash authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Brace expansion
//!
//! Brace expansion rewrites `a{b,c}d` into `abd acd` and `a{1..3}b` into
//! `a1b a2b a3b` before field splitting. Quoted braces do not expand; the
//! four-expansion stage has already backslashed everything quoted, so a scan
//! that skips escape pairs sees only the structural characters.
//!
//! The splittability mask travels with the word: alternative and sequence
//! output copies the input mask byte for byte, and generated numerals are
//! never splittable.

use crate::error::{Error, Result};
use crate::expanded::ExpandedWord;

/// Maximum depth of recursive brace expansions.
const MAX_DEPTH: usize = 128;

/// Maximum number of values a numeric sequence may enumerate.
const MAX_SEQUENCE: u128 = 4096;

/// Performs brace expansion in each of the given words.
pub(crate) fn expand_each(words: Vec<ExpandedWord>) -> Result<Vec<ExpandedWord>> {
    let mut out = Vec::with_capacity(words.len());
    for word in words {
        expand(word, &mut out, 0)?;
    }
    Ok(out)
}

/// Performs brace expansion in a single word, appending results to `out`.
fn expand(word: ExpandedWord, out: &mut Vec<ExpandedWord>, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::BraceNestingTooDeep);
    }

    let mut from = 0;
    loop {
        let chars = word.chars();
        let Some(open) = find_unescaped(chars, from, "{") else {
            out.push(word);
            return Ok(());
        };
        if open + 1 >= chars.len() {
            // a '{' at the end of the word cannot expand
            out.push(word);
            return Ok(());
        }

        if try_sequence(&word, open, out, depth)? {
            return Ok(());
        }

        // collect the positions just after '{' and each top-level ','
        let mut points = vec![open + 1];
        let mut close = None;
        let mut nest = 0u32;
        let mut i = open + 1;
        while let Some(j) = find_unescaped(chars, i, "{,}") {
            match chars[j] {
                '{' => nest += 1,
                ',' if nest == 0 => points.push(j + 1),
                '}' if nest > 0 => nest -= 1,
                '}' => {
                    if points.len() > 1 {
                        close = Some(j);
                    }
                    break;
                }
                _ => {}
            }
            i = j + 1;
        }
        let Some(close) = close else {
            // no comma or no matching '}': try the next '{'
            from = open + 1;
            continue;
        };

        let head = word.slice(0..open);
        let tail = word.slice(close + 1..chars.len());
        points.push(close + 1);
        for pair in points.windows(2) {
            let mut alternative = head.clone();
            alternative.push_word(&word.slice(pair[0]..pair[1] - 1));
            alternative.push_word(&tail);
            expand(alternative, out, depth + 1)?;
        }
        return Ok(());
    }
}

/// Tries numeric sequence expansion like `{01..05}` at the brace at `open`.
///
/// Returns false without side effects if the braces do not contain a valid
/// sequence.
fn try_sequence(
    word: &ExpandedWord,
    open: usize,
    out: &mut Vec<ExpandedWord>,
    depth: usize,
) -> Result<bool> {
    let chars = word.chars();
    let body = &chars[open + 1..];

    // starting point
    let Some(dot) = body.iter().position(|&c| c == '.') else {
        return Ok(false);
    };
    if dot == 0 || body.get(dot + 1) != Some(&'.') {
        return Ok(false);
    }
    let Some(start) = parse_int(&body[..dot]) else {
        return Ok(false);
    };

    // ending point
    let after_start = dot + 2;
    let tail = &body[after_start..];
    let Some(stop) = tail.iter().position(|&c| c == '.' || c == '}') else {
        return Ok(false);
    };
    if stop == 0 || (tail[stop] == '.' && tail.get(stop + 1) != Some(&'.')) {
        return Ok(false);
    }
    let Some(end) = parse_int(&tail[..stop]) else {
        return Ok(false);
    };

    // step
    let (step, close);
    if tail[stop] == '.' {
        let step_start = after_start + stop + 2;
        let step_body = &body[step_start..];
        let Some(brace) = step_body.iter().position(|&c| c == '}') else {
            return Ok(false);
        };
        if brace == 0 {
            return Ok(false);
        }
        let Some(parsed) = parse_int(&step_body[..brace]) else {
            return Ok(false);
        };
        if parsed.value == 0 {
            return Ok(false);
        }
        step = parsed.value;
        close = open + 1 + step_start + brace;
    } else {
        step = if start.value <= end.value { 1 } else { -1 };
        close = open + 1 + after_start + stop;
    }

    // enumerate
    let forward = step > 0;
    let count = if forward == (start.value <= end.value) {
        (end.value as i128 - start.value as i128).unsigned_abs() / step.unsigned_abs() as u128 + 1
    } else {
        1
    };
    if count > MAX_SEQUENCE {
        return Err(Error::BraceSequenceTooLong);
    }

    let signed = start.explicit_plus || end.explicit_plus;
    let width = start
        .zero_padded_width
        .max(end.zero_padded_width)
        .unwrap_or(0);
    let head = word.slice(0..open);
    let tail = word.slice(close + 1..chars.len());

    let mut value = start.value;
    loop {
        let numeral = if signed {
            format!("{value:+0width$}")
        } else {
            format!("{value:0width$}")
        };
        let mut result = head.clone();
        result.push_str(&numeral, false);
        result.push_word(&tail);
        expand(result, out, depth + 1)?;

        match value.checked_add(step) {
            Some(next) => value = next,
            None => break,
        }
        if forward {
            if value > end.value {
                break;
            }
        } else if value < end.value {
            break;
        }
    }
    Ok(true)
}

/// Parsed sequence endpoint or step.
struct SequenceInt {
    value: i64,
    /// The numeral carried an explicit `+`.
    explicit_plus: bool,
    /// Token width when the numeral has leading zeros, `None` otherwise.
    zero_padded_width: Option<usize>,
}

/// Parses a sequence numeral: optional whitespace, optional sign, digits.
fn parse_int(token: &[char]) -> Option<SequenceInt> {
    let text: String = token.iter().collect();
    let trimmed = text.trim_start();
    let explicit_plus = trimmed.starts_with('+');
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = trimmed.parse().ok()?;
    let zero_padded_width = digits.starts_with('0').then_some(token.len());
    Some(SequenceInt {
        value,
        explicit_plus,
        zero_padded_width,
    })
}

/// Finds the next unescaped occurrence of any `accept` character.
fn find_unescaped(chars: &[char], from: usize, accept: &str) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
        } else if accept.contains(chars[i]) {
            return Some(i);
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn expand_text(text: &str) -> Vec<String> {
        let word = ExpandedWord::from_str_uniform(text, false);
        expand_each(vec![word])
            .unwrap()
            .iter()
            .map(ExpandedWord::text)
            .collect()
    }

    #[test]
    fn no_braces() {
        assert_eq!(expand_text("abc"), ["abc"]);
        assert_eq!(expand_text(""), [""]);
        assert_eq!(expand_text("a{b"), ["a{b"]);
        assert_eq!(expand_text("a{"), ["a{"]);
        assert_eq!(expand_text("a}b{"), ["a}b{"]);
    }

    #[test]
    fn simple_alternatives() {
        assert_eq!(expand_text("a{b,c}d"), ["abd", "acd"]);
        assert_eq!(expand_text("{a,b,c}"), ["a", "b", "c"]);
        assert_eq!(expand_text("{,x}"), ["", "x"]);
    }

    #[test]
    fn nested_alternatives() {
        assert_eq!(expand_text("a{b,c{d,e},f}"), ["ab", "acd", "ace", "af"]);
    }

    #[test]
    fn cartesian_product_order() {
        assert_eq!(expand_text("{a,b}{c,d}"), ["ac", "ad", "bc", "bd"]);
        assert_eq!(expand_text("{1..2}{a,b}"), ["1a", "1b", "2a", "2b"]);
    }

    #[test]
    fn no_comma_is_not_expanded() {
        assert_eq!(expand_text("{abc}"), ["{abc}"]);
        assert_eq!(expand_text("{a{b,c}}"), ["{ab}", "{ac}"]);
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert_eq!(expand_text("\\{a,b}"), ["\\{a,b}"]);
        assert_eq!(expand_text("{a\\,b}"), ["{a\\,b}"]);
        assert_eq!(expand_text("{a,b\\}c}"), ["a", "b\\}c"]);
    }

    #[test]
    fn sequences() {
        assert_eq!(expand_text("pre{1..3}post"), ["pre1post", "pre2post", "pre3post"]);
        assert_eq!(expand_text("{3..1}"), ["3", "2", "1"]);
        assert_eq!(expand_text("{1..10..3}"), ["1", "4", "7", "10"]);
        assert_eq!(expand_text("{10..1..-3}"), ["10", "7", "4", "1"]);
        assert_eq!(expand_text("{-1..1}"), ["-1", "0", "1"]);
    }

    #[test]
    fn sequence_zero_padding() {
        assert_eq!(expand_text("{01..3}"), ["01", "02", "03"]);
        assert_eq!(expand_text("{1..03}"), ["01", "02", "03"]);
        assert_eq!(expand_text("{098..100}"), ["098", "099", "100"]);
    }

    #[test]
    fn sequence_explicit_plus() {
        assert_eq!(expand_text("{+1..2}"), ["+1", "+2"]);
    }

    #[test]
    fn sequence_step_away_from_end_emits_start() {
        assert_eq!(expand_text("{1..5..-1}"), ["1"]);
    }

    #[test]
    fn invalid_sequences_fall_back_to_alternatives() {
        assert_eq!(expand_text("{1..}"), ["{1..}"]);
        assert_eq!(expand_text("{..2}"), ["{..2}"]);
        assert_eq!(expand_text("{1..2..0}"), ["{1..2..0}"]);
        assert_eq!(expand_text("{1..2..}"), ["{1..2..}"]);
        assert_eq!(expand_text("{a..c}"), ["{a..c}"]);
        assert_eq!(expand_text("{1.2}"), ["{1.2}"]);
    }

    #[test]
    fn oversized_sequence_is_an_error() {
        let word = ExpandedWord::from_str_uniform("{1..100000}", false);
        assert_matches!(
            expand_each(vec![word]),
            Err(Error::BraceSequenceTooLong)
        );
    }

    #[test]
    fn mask_is_copied_through() {
        // "x{a,b}" with a splittable 'x'
        let mut word = ExpandedWord::new();
        word.push('x', true);
        word.push_str("{a,b}", false);
        let results = expand_each(vec![word]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text(), "xa");
        assert_eq!(results[0].mask(), [true, false]);
        assert_eq!(results[1].text(), "xb");
        assert_eq!(results[1].mask(), [true, false]);
    }

    #[test]
    fn sequence_numerals_are_unsplittable() {
        let word = ExpandedWord::from_str_uniform("{1..2}", true);
        let results = expand_each(vec![word]).unwrap();
        assert_eq!(results[0].text(), "1");
        assert_eq!(results[0].mask(), [false]);
    }
}
