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

//! Parameter expansion
//!
//! A `${…}` expansion is evaluated in a fixed order: indices, value lookup,
//! index application, the switch operators, the unset check, the trim and
//! substitute operators, concatenation, the length operator, and finally
//! escaping and emission into the accumulator. An expansion of `@` or `*`
//! with several values emits several words; field splitting later turns
//! unquoted ones into separate fields.

mod index;
pub(crate) mod switch;
pub(crate) mod trim;

use self::index::{clamp_array_indices, parse_indextype, trim_array, trim_scalar, IndexType};
use self::switch::SwitchOutcome;
use crate::env::{self, Env, Lookup, ShellOption};
use crate::error::{Error, Result};
use crate::escape::{escape, unescape, CHARS_ESCAPED};
use crate::expanded::ExpandedWord;
use crate::initial::{expand_four_and_remove_quotes, Accumulator};
use crate::word::{ParamExp, ParamType, TildeMode, Word};
use itertools::Itertools;

/// Shape of the parameter value before indexing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ValueKind {
    Scalar,
    Array,
    ArrayConcat,
}

/// Performs parameter expansion into the accumulator.
///
/// `indq` tells whether the expansion is inside double quotes (or an
/// all-escaping context, which behaves the same).
pub(crate) fn expand_param<E: Env>(
    env: &mut E,
    p: &ParamExp,
    indq: bool,
    acc: &mut Accumulator,
) -> Result<()> {
    // Indices //
    let mut start = 0i64;
    let mut end = i64::MAX;
    let mut indextype = IndexType::None;
    if let Some(start_word) = &p.start {
        let start_text =
            crate::expand_single_and_unescape(env, start_word, TildeMode::None, true, false)?;
        indextype = parse_indextype(&start_text);
        if indextype != IndexType::None {
            if p.end.is_some() {
                return Err(Error::InvalidIndex);
            }
        } else {
            start = env.eval_index(&start_text)?;
            end = match &p.end {
                None => {
                    if start == -1 {
                        i64::MAX
                    } else {
                        start
                    }
                }
                Some(end_word) => {
                    let end_text = crate::expand_single_and_unescape(
                        env,
                        end_word,
                        TildeMode::None,
                        true,
                        false,
                    )?;
                    env.eval_index(&end_text)?
                }
            };
            // an explicit start of 0 designates a position past the end
            if start == 0 {
                start = i64::MAX;
            } else if start > 0 {
                start -= 1;
            }
        }
    }

    // Value lookup //
    let (kind, elements, mut unset) = fetch_value(env, p)?;

    // Index application //
    let mut concat = false;
    let mut slot = None;
    let mut values: Vec<String> = match kind {
        ValueKind::Scalar => {
            let s = elements.into_iter().next().unwrap_or_default();
            if indextype == IndexType::Number {
                vec![s.chars().count().to_string()]
            } else {
                vec![trim_scalar(&s, start, end)]
            }
        }
        ValueKind::Array | ValueKind::ArrayConcat => {
            concat = kind == ValueKind::ArrayConcat;
            if indextype == IndexType::Number {
                concat = false;
                vec![elements.len().to_string()]
            } else {
                if indextype == IndexType::Concat {
                    concat = true;
                }
                let (s, e) = clamp_array_indices(elements.len(), start, end);
                slot = Some((s, e));
                trim_array(elements, s, e)
            }
        }
    };

    // Empty value as unset //
    if p.flags.contains(ParamType::COLON) && all_empty(&values) {
        unset = true;
    }

    // Switch //
    match switch::apply(env, p, indq, acc, values, unset, kind, slot)? {
        SwitchOutcome::Finished => return Ok(()),
        SwitchOutcome::Continue {
            values: v,
            unset: u,
        } => {
            values = v;
            unset = u;
        }
    }

    if unset && !env.options().is_on(ShellOption::Unset) {
        return Err(Error::UnsetParameter {
            name: p.name.clone().unwrap_or_default(),
        });
    }

    // Trim and substitute //
    let empty_word = Word::default();
    if p.flags.contains(ParamType::SUBST) {
        let pattern_word = p.pattern.as_ref().unwrap_or(&empty_word);
        let subst_word = p.subst.as_ref().unwrap_or(&empty_word);
        let pattern = crate::expand_single(env, pattern_word, TildeMode::Single, true, false)?;
        let replacement =
            crate::expand_single_and_unescape(env, subst_word, TildeMode::Single, true, false)?;
        trim::subst_each(env, &mut values, &pattern, &replacement, p.flags);
    } else if p
        .flags
        .intersects(ParamType::MATCH_HEAD | ParamType::MATCH_TAIL)
    {
        let pattern_word = p.pattern.as_ref().unwrap_or(&empty_word);
        let pattern = crate::expand_single(env, pattern_word, TildeMode::Single, true, false)?;
        trim::match_each(env, &mut values, &pattern, p.flags);
    }

    // Concatenation //
    if concat && indq && values.len() != 1 {
        values = vec![ifs_join(env, &values, false)];
    }

    // Length //
    if p.flags.contains(ParamType::LENGTH) {
        for value in &mut values {
            *value = value.chars().count().to_string();
        }
    }

    // Escape and emit //
    let set = if indq { "" } else { CHARS_ESCAPED };
    let splittable = !indq;
    let mut iter = values.into_iter().map(|v| escape(&v, set).into_owned());
    let Some(first) = iter.next() else {
        if indq {
            acc.zero_word = true;
        }
        return Ok(());
    };
    acc.current.push_str(&first, splittable);
    let rest: Vec<String> = iter.collect();
    if let Some((last, middles)) = rest.split_last() {
        acc.flush();
        for middle in middles {
            acc.words
                .push(ExpandedWord::from_str_uniform(middle, splittable));
        }
        acc.current = ExpandedWord::from_str_uniform(last, splittable);
    }
    Ok(())
}

/// Obtains the value to expand, either from the variable store or by
/// expanding a nested word.
///
/// An unset variable yields a single empty scalar plus the `unset` marker.
fn fetch_value<E: Env>(env: &mut E, p: &ParamExp) -> Result<(ValueKind, Vec<String>, bool)> {
    if p.flags.contains(ParamType::NESTED) {
        let empty_word = Word::default();
        let nested = p.nested.as_ref().unwrap_or(&empty_word);
        let results = expand_four_and_remove_quotes(env, nested, TildeMode::None, true, true)?;
        let results: Vec<String> = results.iter().map(|s| unescape(s).into_owned()).collect();
        let kind = if results.len() == 1 {
            ValueKind::Scalar
        } else {
            ValueKind::Array
        };
        return Ok((kind, results, false));
    }

    let name = p.name.as_deref().unwrap_or_default();
    match env.variable(name) {
        Lookup::Unset => Ok((ValueKind::Scalar, vec![String::new()], true)),
        Lookup::Scalar(s) => Ok((ValueKind::Scalar, vec![s], false)),
        Lookup::Array(values) => Ok((ValueKind::Array, values, false)),
        Lookup::ArrayConcat(values) => Ok((ValueKind::ArrayConcat, values, false)),
    }
}

/// Tests for a value that counts as empty for the `:` modifier.
fn all_empty(values: &[String]) -> bool {
    match values {
        [] => true,
        [value] => value.is_empty(),
        _ => false,
    }
}

/// Joins values into one string separated by the first `IFS` character.
///
/// The separator is backslash-escaped when `escape_separator` is true. When
/// `IFS` is unset the separator is a space; when it is empty the values are
/// joined without separation.
pub(crate) fn ifs_join<E: Env>(env: &E, values: &[String], escape_separator: bool) -> String {
    let separator = match (escape_separator, env::ifs_separator(env)) {
        (true, Some(c)) => format!("\\{c}"),
        (true, None) => "\\".to_owned(),
        (false, Some(c)) => c.to_string(),
        (false, None) => String::new(),
    };
    values.iter().join(&separator)
}
