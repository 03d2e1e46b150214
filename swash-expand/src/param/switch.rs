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

//! Parameter expansion switch semantics
//!
//! The switch operators (`+`, `-`, `=`, `?`) act on the parameter value
//! depending on whether it is considered set. The default and alternate
//! operators re-enter the four-expansion with the accumulator so that a
//! `"$@"` inside the substitution can still produce multiple words.

use super::ValueKind;
use crate::env::{Env, Scope};
use crate::error::{Error, Result};
use crate::initial::{expand_four, Accumulator};
use crate::word::{ParamExp, ParamType, TildeMode, Word};

/// What the switch decided.
#[derive(Debug)]
pub(crate) enum SwitchOutcome {
    /// The expansion continues with these values.
    Continue { values: Vec<String>, unset: bool },
    /// The switch already emitted the final result into the accumulator.
    Finished,
}

/// Applies the switch operator, if any.
///
/// `slot` is the clamped index range when the value is an array; it decides
/// whether an assignment designates a single writable element.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply<E: Env>(
    env: &mut E,
    p: &ParamExp,
    indq: bool,
    acc: &mut Accumulator,
    values: Vec<String>,
    unset: bool,
    kind: ValueKind,
    slot: Option<(usize, usize)>,
) -> Result<SwitchOutcome> {
    let empty_word = Word::default();
    let subst_word = p.subst.as_ref().unwrap_or(&empty_word);

    if p.flags.contains(ParamType::PLUS) {
        if !unset {
            drop(values);
            expand_four(env, subst_word, TildeMode::Single, true, indq, true, acc)?;
            return Ok(SwitchOutcome::Finished);
        }
        return Ok(SwitchOutcome::Continue {
            values,
            unset: false,
        });
    }

    if p.flags.contains(ParamType::MINUS) {
        if unset {
            drop(values);
            expand_four(env, subst_word, TildeMode::Single, true, indq, true, acc)?;
            return Ok(SwitchOutcome::Finished);
        }
        return Ok(SwitchOutcome::Continue { values, unset });
    }

    if p.flags.contains(ParamType::ASSIGN) {
        if unset {
            let value = assign(env, p, kind, slot, subst_word)?;
            return Ok(SwitchOutcome::Continue {
                values: vec![value],
                unset: false,
            });
        }
        return Ok(SwitchOutcome::Continue { values, unset });
    }

    if p.flags.contains(ParamType::ERROR) {
        if unset {
            let message = match &p.subst {
                Some(word) => Some(crate::expand_single_and_unescape(
                    env,
                    word,
                    TildeMode::Single,
                    true,
                    false,
                )?),
                None => None,
            };
            return Err(Error::EmptyExpansion {
                name: p.name.clone(),
                message,
                colon: p.flags.contains(ParamType::COLON),
            });
        }
        return Ok(SwitchOutcome::Continue { values, unset });
    }

    Ok(SwitchOutcome::Continue { values, unset })
}

/// Expands the default value and assigns it to the parameter.
fn assign<E: Env>(
    env: &mut E,
    p: &ParamExp,
    kind: ValueKind,
    slot: Option<(usize, usize)>,
    subst_word: &Word,
) -> Result<String> {
    if p.flags.contains(ParamType::NESTED) {
        return Err(Error::AssignToNested);
    }
    let name = p.name.as_deref().unwrap_or_default();
    if !is_name(name) {
        return Err(Error::AssignToNonName {
            name: name.to_owned(),
        });
    }
    match kind {
        ValueKind::ArrayConcat => {
            return Err(Error::AssignToSlice {
                name: name.to_owned(),
            })
        }
        ValueKind::Array => {
            if !matches!(slot, Some((start, end)) if start + 1 == end) {
                return Err(Error::AssignToSlice {
                    name: name.to_owned(),
                });
            }
        }
        ValueKind::Scalar => {}
    }

    let value = crate::expand_single_and_unescape(env, subst_word, TildeMode::Single, true, false)?;
    match (kind, slot) {
        (ValueKind::Array, Some((start, _))) => {
            env.assign_array_element(name, start, value.clone())?;
        }
        _ => env.assign_variable(name, value.clone(), Scope::Global)?,
    }
    Ok(value)
}

/// Tests whether a string is a valid variable name.
fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
