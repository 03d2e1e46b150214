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

//! Word expansion for the swash shell
//!
//! This crate turns parsed command words into the argument strings handed to
//! commands. Expansion is a pipeline:
//!
//! 1. **The four expansions**: tilde expansion, parameter expansion, command
//!    substitution and arithmetic expansion, producing expanded words that
//!    still carry quote marks and backslash escapes, each paired with a
//!    splittability mask (see [`ExpandedWord`]).
//! 2. **Brace expansion**: `a{b,c}` and `{1..3}`, when the `BraceExpand`
//!    option is on.
//! 3. **Field splitting** ([`split`]): cutting at `$IFS` separators where the
//!    mask allows.
//! 4. **Empty field removal**: a lone empty field disappears, as does the
//!    quoted empty word left by `"$@"` without positional parameters.
//! 5. **Quote removal** ([`escape`]): structural `'` and `"` marks are
//!    dropped; backslash escapes survive until the end.
//! 6. **Pathname expansion** ([`glob`]): fields containing pattern characters
//!    are matched against the file system.
//!
//! [`expand_line`] and [`expand_multiple`] run the whole pipeline.
//! [`expand_single`] runs only the first stage plus quote removal, for
//! contexts that must yield one string (assignment values, here-document
//! contents, arithmetic operands). [`expand_single_with_glob`] additionally
//! resolves the result against the file system, for redirection targets.
//!
//! Everything the expansion needs from the surrounding shell is behind the
//! [`env::Env`] trait; [`env::mock::MockEnv`] is an in-memory implementation
//! for tests.

mod brace;
pub mod env;
mod error;
pub mod escape;
pub mod expanded;
pub mod glob;
mod initial;
mod param;
pub mod pattern;
pub mod split;
mod tilde;
pub mod word;

pub use error::{Error, Result};
pub use escape::{escape, escaped_find, escaped_remove, unescape, unquote};
pub use expanded::ExpandedWord;
pub use split::{extract_fields, Ifs};
pub use word::{ParamExp, ParamType, TildeMode, Word, WordUnit};

#[doc(no_inline)]
pub use swash_quote::{quote_as_word, quote_as_word_into};

use env::{Env, ShellOption};
use initial::{expand_four, expand_four_and_remove_quotes, Accumulator};
use std::ffi::OsString;

/// Expands a command line.
///
/// Every word goes through the full expansion pipeline; the results are the
/// argument strings in order. On failure nothing is returned; the caller
/// decides whether the shell survives the error.
pub fn expand_line<E: Env>(env: &mut E, words: &[Word]) -> Result<Vec<String>> {
    let mut list = Vec::new();
    for word in words {
        expand_multiple(env, word, &mut list)?;
    }
    Ok(list)
}

/// Expands one word through the full pipeline into an existing sink.
///
/// The result may be any number of fields.
pub fn expand_multiple<E: Env>(env: &mut E, word: &Word, list: &mut Vec<String>) -> Result<()> {
    // four expansions, brace expansion and field splitting
    let mut fields = Vec::new();
    expand_and_split_words(env, word, &mut fields)?;

    // glob
    if env.options().is_on(ShellOption::Glob) {
        glob::glob_all(env, fields, list)?;
    } else {
        for field in fields {
            list.push(unescape(&field).into_owned());
        }
    }
    Ok(())
}

/// Performs the four expansions, brace expansion, field splitting, empty
/// field removal and quote removal in a word.
///
/// The resulting fields may still contain backslash escapes.
fn expand_and_split_words<E: Env>(
    env: &mut E,
    word: &Word,
    fields: &mut Vec<String>,
) -> Result<()> {
    let mut acc = Accumulator::new();
    expand_four(env, word, TildeMode::Single, true, false, false, &mut acc)?;
    let zero_word = acc.zero_word;
    acc.flush();
    let mut words = acc.words;

    // brace expansion
    if env.options().is_on(ShellOption::BraceExpand) {
        words = brace::expand_each(words)?;
    }

    // field splitting
    let ifs_string = env::ifs_chars(env);
    let ifs = Ifs::new(&ifs_string);
    let empty_last_field = env.options().is_on(ShellOption::EmptyLastField);
    let old_len = fields.len();
    for word in &words {
        split::split_into(word, &ifs, empty_last_field, fields);
    }

    // empty field removal
    if fields.len() - old_len == 1 {
        let field = &fields[old_len];
        if field.is_empty() || (zero_word && field == "\"\"") {
            fields.truncate(old_len);
        }
    }

    // quote removal
    for field in &mut fields[old_len..] {
        *field = escaped_remove(field, "\"'").into_owned();
    }
    Ok(())
}

/// Expands a single word: the four expansions and quote removal.
///
/// Brace expansion, field splitting and globbing are not performed. If the
/// word produces several values (from `"$@"`), they are joined by the first
/// `IFS` character, backslash-escaped. The result keeps its backslash
/// escapes.
pub fn expand_single<E: Env>(
    env: &mut E,
    word: &Word,
    tilde: TildeMode,
    processquotes: bool,
    escapeall: bool,
) -> Result<String> {
    let values = expand_four_and_remove_quotes(env, word, tilde, processquotes, escapeall)?;
    Ok(param::ifs_join(env, &values, true))
}

/// Like [`expand_single`], but the result is unescaped.
pub fn expand_single_and_unescape<E: Env>(
    env: &mut E,
    word: &Word,
    tilde: TildeMode,
    processquotes: bool,
    escapeall: bool,
) -> Result<String> {
    let result = expand_single(env, word, tilde, processquotes, escapeall)?;
    Ok(unescape(&result).into_owned())
}

/// Expands a single word and resolves it against the file system.
///
/// Used for redirection targets. Globbing requires the `Glob` option and a
/// word that actually contains pattern characters; the `NullGlob` option is
/// ignored here. A glob result of exactly one pathname is returned as the
/// target. Any other number of matches falls back to the literal pattern in
/// POSIX mode and is an error otherwise.
pub fn expand_single_with_glob<E: Env>(
    env: &mut E,
    word: &Word,
    tilde: TildeMode,
) -> Result<OsString> {
    let pattern = expand_single(env, word, tilde, true, false)?;

    if env.options().is_on(ShellOption::Glob) && glob::is_matching_pattern(&pattern) {
        let flags = glob::glob_flags(env);
        env.set_interruptible(true);
        let result = env.glob(&pattern, flags);
        env.set_interruptible(false);
        let mut matches = result?;
        if matches.len() == 1 {
            return Ok(matches.remove(0));
        }
        if !env.options().is_on(ShellOption::PosixlyCorrect) {
            return Err(Error::AmbiguousFilename {
                pattern: unescape(&pattern).into_owned(),
            });
        }
        // in POSIX mode, fall back to the pre-glob pattern
    }

    Ok(unescape(&pattern).into_owned().into())
}

/// Parses a string and expands it as a single word.
///
/// Used for here-document contents and similar strings that are expanded
/// without quote processing. If `esc` is true, backslashes before `$`,
/// `` ` `` and `\` keep their escaping role; otherwise every character is
/// taken literally.
pub fn parse_and_expand_string<E: Env>(
    env: &mut E,
    source: &str,
    filename: &str,
    esc: bool,
) -> Result<String> {
    let word = env.parse_string(source, filename)?;
    expand_single_and_unescape(env, &word, TildeMode::None, false, !esc)
}
