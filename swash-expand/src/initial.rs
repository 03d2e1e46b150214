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

//! The four expansions
//!
//! [`expand_four`] performs tilde expansion, parameter expansion, command
//! substitution and arithmetic expansion over a word-unit chain, producing
//! [`ExpandedWord`]s in an [`Accumulator`]. Quote characters are interpreted
//! here: the contents of quoted regions are emitted backslash-escaped so that
//! the later stages can treat any unescaped character as structural.
//!
//! A word usually expands to a single expanded word, but `"$@"` and unquoted
//! `$@`/`$*` may produce any number of them.

use crate::env::Env;
use crate::error::Result;
use crate::escape::{escaped_remove, CHARS_ESCAPABLE, CHARS_ESCAPED};
use crate::expanded::ExpandedWord;
use crate::param::expand_param;
use crate::tilde::expand_tilde;
use crate::word::{TildeMode, Word, WordUnit};

/// Expansion state shared between the expansion functions.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    /// Completed expanded words.
    pub words: Vec<ExpandedWord>,
    /// Word being built.
    pub current: ExpandedWord,
    /// Set when a quoted `"$@"` with no positional parameters was expanded,
    /// so that the quoted empty word can be removed later.
    pub zero_word: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the current word into the completed list.
    pub fn flush(&mut self) {
        self.words.push(std::mem::take(&mut self.current));
    }
}

/// Performs the four expansions in a single word.
///
/// If `processquotes` is true, single and double quotations are recognized as
/// quotes; otherwise they are treated like backslashed characters. If
/// `escapeall` is true, the expanded word is entirely backslashed as if the
/// whole expansion were quoted. With both off, only backslashes before `$`,
/// `` ` `` and `\` keep their escaping role. `rec` must be true when this
/// expansion is part of another expansion; only then do plain literal
/// characters become splittable.
pub(crate) fn expand_four<E: Env>(
    env: &mut E,
    word: &Word,
    tilde: TildeMode,
    processquotes: bool,
    escapeall: bool,
    rec: bool,
    acc: &mut Accumulator,
) -> Result<()> {
    let mut indq = false; // in a double quote?

    for (i, unit) in word.units.iter().enumerate() {
        let first = i == 0;
        let has_next = i + 1 < word.units.len();
        match unit {
            WordUnit::Literal(text) => {
                let lit_splittable = |indq: bool| !indq && !escapeall && rec;
                let mut s: &str = text;

                if first && tilde != TildeMode::None {
                    if let Some((home, consumed)) = expand_tilde(env, s, has_next, tilde) {
                        acc.current.push_str_escaped(&home, "", false);
                        s = &s[consumed..];
                    }
                }

                while let Some(c) = s.chars().next() {
                    match c {
                        '"' if processquotes => {
                            indq = !indq;
                            acc.current.push('"', false);
                            s = &s[1..];
                        }
                        '\'' if processquotes && !indq => {
                            s = copy_single_quoted(&s[1..], &mut acc.current);
                        }
                        '\\' => {
                            if !processquotes {
                                if !escapeall {
                                    // a backslash keeps its role before $, `, \
                                    if let Some(c2 @ ('$' | '`' | '\\')) = s[1..].chars().next() {
                                        acc.current.push('\\', lit_splittable(indq));
                                        acc.current.push(c2, lit_splittable(indq));
                                        s = &s[2..];
                                        continue;
                                    }
                                }
                                // otherwise the backslash itself is escaped
                                acc.current.push('\\', lit_splittable(indq));
                                acc.current.push('\\', lit_splittable(indq));
                                s = &s[1..];
                            } else if indq
                                && matches!(
                                    s[1..].chars().next(),
                                    Some(c2) if !CHARS_ESCAPABLE.contains(c2))
                            {
                                // not escapable inside double quotes
                                acc.current.push('\\', lit_splittable(indq));
                                acc.current.push('\\', lit_splittable(indq));
                                s = &s[1..];
                            } else {
                                // keep the escape pair together
                                acc.current.push('\\', false);
                                match s[1..].chars().next() {
                                    Some(c2) => {
                                        acc.current.push(c2, false);
                                        s = &s[1 + c2.len_utf8()..];
                                    }
                                    None => s = &s[1..],
                                }
                            }
                        }
                        ':' if !indq && tilde == TildeMode::Multi => {
                            acc.current.push(':', lit_splittable(indq));
                            s = &s[1..];
                            // perform tilde expansion after a colon
                            if let Some((home, consumed)) = expand_tilde(env, s, has_next, tilde) {
                                acc.current.push_str_escaped(&home, "", false);
                                s = &s[consumed..];
                            }
                        }
                        '"' | '\'' => {
                            // reached with processquotes off (or a quote in
                            // double quotes): treat like a backslashed
                            // character
                            acc.current.push('\\', lit_splittable(indq));
                            acc.current.push(c, lit_splittable(indq));
                            s = &s[1..];
                        }
                        _ => {
                            if indq || escapeall {
                                acc.current.push('\\', lit_splittable(indq));
                            }
                            acc.current.push(c, lit_splittable(indq));
                            s = &s[c.len_utf8()..];
                        }
                    }
                }
            }
            WordUnit::Param(p) => expand_param(env, p, indq || escapeall, acc)?,
            WordUnit::CommandSubst(command) => {
                let output = env.command_substitution(command)?;
                push_substitution(acc, &output, indq || escapeall);
            }
            WordUnit::Arith(subword) => {
                let expression = crate::expand_single_and_unescape(
                    env,
                    subword,
                    TildeMode::None,
                    true,
                    false,
                )?;
                let value = env.arithmetic(&expression)?;
                push_substitution(acc, &value, indq || escapeall);
            }
        }
    }
    Ok(())
}

/// Appends the result of a command substitution or arithmetic expansion.
///
/// Characters special to the later expansion steps are escaped, or all of
/// them in a quoted context. The body is splittable iff unquoted.
fn push_substitution(acc: &mut Accumulator, s: &str, quoted: bool) {
    let set = if quoted { "" } else { CHARS_ESCAPED };
    acc.current.push_str_escaped(s, set, !quoted);
}

/// Copies a single-quoted region into the expanded word.
///
/// `rest` starts just after the opening quote. Each content character is
/// emitted backslash-escaped between the two quote marks. Returns the text
/// after the closing quote, which the parser guarantees to exist.
fn copy_single_quoted<'a>(rest: &'a str, word: &mut ExpandedWord) -> &'a str {
    word.push('\'', false);
    for (i, c) in rest.char_indices() {
        if c == '\'' {
            word.push('\'', false);
            return &rest[i + 1..];
        }
        word.push('\\', false);
        word.push(c, false);
    }
    word.push('\'', false);
    ""
}

/// Performs the four expansions and quote removal, without brace expansion,
/// field splitting or globbing.
///
/// The resulting strings keep their backslash escapes.
pub(crate) fn expand_four_and_remove_quotes<E: Env>(
    env: &mut E,
    word: &Word,
    tilde: TildeMode,
    processquotes: bool,
    escapeall: bool,
) -> Result<Vec<String>> {
    let mut acc = Accumulator::new();
    expand_four(env, word, tilde, processquotes, escapeall, false, &mut acc)?;

    let Accumulator {
        mut words,
        current,
        zero_word,
    } = acc;

    // remove the empty word for "$@" if there are no positional parameters
    if !(words.is_empty() && zero_word && current.text() == "\"\"") {
        words.push(current);
    }

    Ok(words
        .iter()
        .map(|w| escaped_remove(&w.text(), "\"'").into_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mock::MockEnv;

    fn expand(
        env: &mut MockEnv,
        word: &Word,
        tilde: TildeMode,
        processquotes: bool,
        escapeall: bool,
    ) -> Accumulator {
        let mut acc = Accumulator::new();
        expand_four(env, word, tilde, processquotes, escapeall, false, &mut acc)
            .expect("expansion should succeed");
        acc
    }

    #[test]
    fn plain_literal() {
        let mut env = MockEnv::new();
        let word = Word::literal("abc");
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "abc");
        assert_eq!(acc.current.mask(), [false, false, false]);
        assert!(acc.words.is_empty());
        assert!(!acc.zero_word);
    }

    #[test]
    fn double_quotes_escape_contents() {
        let mut env = MockEnv::new();
        let word = Word::literal("\"a b\"");
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "\"\\a\\ \\b\"");
        assert!(acc.current.mask().iter().all(|&b| !b));
    }

    #[test]
    fn single_quotes_escape_contents() {
        let mut env = MockEnv::new();
        let word = Word::literal("'a$b'");
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "'\\a\\$\\b'");
        assert!(acc.current.mask().iter().all(|&b| !b));
    }

    #[test]
    fn backslash_pair_outside_quotes() {
        let mut env = MockEnv::new();
        let word = Word::literal("\\xy");
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "\\xy");
    }

    #[test]
    fn backslash_in_double_quotes() {
        let mut env = MockEnv::new();
        // escapable character: the pair is kept
        let word = Word::literal("\"\\$\"");
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "\"\\$\"");

        // non-escapable character: the backslash becomes literal
        let word = Word::literal("\"\\x\"");
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "\"\\\\\\x\"");
    }

    #[test]
    fn no_quote_processing() {
        let mut env = MockEnv::new();
        let word = Word::literal("\"a\"");
        let acc = expand(&mut env, &word, TildeMode::None, false, false);
        assert_eq!(acc.current.text(), "\\\"a\\\"");
    }

    #[test]
    fn no_quote_processing_consumes_dollar_escapes() {
        let mut env = MockEnv::new();
        let word = Word::literal("\\$x");
        let acc = expand(&mut env, &word, TildeMode::None, false, false);
        assert_eq!(acc.current.text(), "\\$x");

        let word = Word::literal("\\y");
        let acc = expand(&mut env, &word, TildeMode::None, false, false);
        assert_eq!(acc.current.text(), "\\\\y");
    }

    #[test]
    fn escape_all() {
        let mut env = MockEnv::new();
        let word = Word::literal("ab");
        let acc = expand(&mut env, &word, TildeMode::None, false, true);
        assert_eq!(acc.current.text(), "\\a\\b");
    }

    #[test]
    fn tilde_on_first_unit_only() {
        let mut env = MockEnv::new();
        env.set_scalar("HOME", "/u/me");
        let word = Word {
            units: vec![
                WordUnit::Literal("~/x".to_owned()),
                WordUnit::Literal("~".to_owned()),
            ],
        };
        let acc = expand(&mut env, &word, TildeMode::Single, true, false);
        assert_eq!(acc.current.text(), "\\/\\u\\/\\m\\e/x~");
        assert!(acc.current.mask().iter().all(|&b| !b));
    }

    #[test]
    fn tilde_after_colon_in_multi_mode() {
        let mut env = MockEnv::new();
        env.set_scalar("HOME", "/h");
        let word = Word::literal("~:~");
        let acc = expand(&mut env, &word, TildeMode::Multi, true, false);
        assert_eq!(acc.current.text(), "\\/\\h:\\/\\h");
    }

    #[test]
    fn command_substitution_is_escaped_and_splittable() {
        let mut env = MockEnv::new();
        env.command_outputs
            .insert("echo".to_owned(), "a {b}".to_owned());
        let word = Word::from(WordUnit::CommandSubst("echo".to_owned()));
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "a \\{b\\}");
        assert!(acc.current.mask().iter().all(|&b| b));
    }

    #[test]
    fn quoted_command_substitution_is_not_splittable() {
        let mut env = MockEnv::new();
        env.command_outputs.insert("c".to_owned(), "a b".to_owned());
        let word = Word {
            units: vec![
                WordUnit::Literal("\"".to_owned()),
                WordUnit::CommandSubst("c".to_owned()),
                WordUnit::Literal("\"".to_owned()),
            ],
        };
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "\"\\a\\ \\b\"");
        assert!(acc.current.mask().iter().all(|&b| !b));
    }

    #[test]
    fn arithmetic_expansion() {
        let mut env = MockEnv::new();
        let word = Word::from(WordUnit::Arith(Word::literal("1+2")));
        let acc = expand(&mut env, &word, TildeMode::None, true, false);
        assert_eq!(acc.current.text(), "3");
        assert_eq!(acc.current.mask(), [true]);
    }

    #[test]
    fn mask_length_matches_at_every_step() {
        let mut env = MockEnv::new();
        env.set_scalar("HOME", "/u/me");
        env.command_outputs.insert("c".to_owned(), "out".to_owned());
        let word = Word {
            units: vec![
                WordUnit::Literal("~/'q q'\"d d\"\\x".to_owned()),
                WordUnit::CommandSubst("c".to_owned()),
                WordUnit::Literal("tail".to_owned()),
            ],
        };
        let acc = expand(&mut env, &word, TildeMode::Single, true, false);
        assert_eq!(acc.current.len(), acc.current.mask().len());
    }

    #[test]
    fn remove_quotes_drops_structural_quotes() {
        let mut env = MockEnv::new();
        let word = Word::literal("\"a b\"'c'");
        let values =
            expand_four_and_remove_quotes(&mut env, &word, TildeMode::None, true, false).unwrap();
        assert_eq!(values, ["\\a\\ \\b\\c"]);
    }

    #[test]
    fn zero_word_removal() {
        let mut env = MockEnv::new();
        // "$@" with no positional parameters expands to no words at all
        let word = Word {
            units: vec![
                WordUnit::Literal("\"".to_owned()),
                WordUnit::Param(crate::word::ParamExp::variable("@")),
                WordUnit::Literal("\"".to_owned()),
            ],
        };
        let values =
            expand_four_and_remove_quotes(&mut env, &word, TildeMode::None, true, false).unwrap();
        assert_eq!(values, Vec::<String>::new());
    }
}
