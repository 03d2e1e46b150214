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

//! Types of errors that may occur in the word expansion
//!
//! Expansion errors are returned to the caller as values; it is the embedding
//! shell's business to print them and decide whether to abort. Environment
//! implementations construct the delegate-failure variants
//! ([`CommandSubstitution`](Error::CommandSubstitution),
//! [`Arithmetic`](Error::Arithmetic), [`IndexEvaluation`](Error::IndexEvaluation),
//! [`ReadOnlyVariable`](Error::ReadOnlyVariable), [`Parse`](Error::Parse),
//! [`GlobInterrupted`](Error::GlobInterrupted)) themselves so that failures of
//! their services propagate through the expansion with `?`.

use thiserror::Error;

/// Explanation of an expansion failure.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A parameter was referenced but is not set, and the `Unset` shell option
    /// is off.
    #[error("parameter `{name}` is not set")]
    UnsetParameter { name: String },

    /// A `${param:?message}` expansion hit an unset or empty value.
    #[error("{}", empty_expansion_message(name.as_deref(), message.as_deref(), *colon))]
    EmptyExpansion {
        /// Name of the parameter, or `None` for a nested expansion.
        name: Option<String>,
        /// Expanded message from the operator's right-hand side, if any.
        message: Option<String>,
        /// Whether the expansion treated empty values as unset.
        colon: bool,
    },

    /// The index of a parameter expansion is not usable.
    #[error("the parameter index is invalid")]
    InvalidIndex,

    /// The index expression did not evaluate to an integer.
    #[error("the index `{text}` is not a valid integer")]
    IndexEvaluation { text: String },

    /// A `${…=…}` expansion tried to assign through a nested expansion.
    #[error("a nested parameter expansion cannot be assigned")]
    AssignToNested,

    /// A `${…=…}` expansion named a parameter that is not an assignable
    /// identifier.
    #[error("cannot assign to parameter `{name}` in parameter expansion")]
    AssignToNonName { name: String },

    /// A `${…=…}` expansion used an index that does not designate a single
    /// writable array element.
    #[error(
        "the specified index does not support assignment \
         in the parameter expansion of array `{name}`"
    )]
    AssignToSlice { name: String },

    /// The variable store refused an assignment.
    #[error("cannot assign to read-only variable `{name}`")]
    ReadOnlyVariable { name: String },

    /// The command-substitution executor failed.
    #[error("error in command substitution: {message}")]
    CommandSubstitution { message: String },

    /// The arithmetic evaluator failed.
    #[error("error in arithmetic expansion: {message}")]
    Arithmetic { message: String },

    /// The parser failed in [`parse_and_expand_string`](crate::parse_and_expand_string).
    #[error("cannot parse the string: {message}")]
    Parse { message: String },

    /// Brace expansions were nested beyond the supported depth.
    #[error("brace expansion nested too deeply")]
    BraceNestingTooDeep,

    /// A numeric brace sequence would enumerate too many values.
    #[error("brace expansion would produce too many words")]
    BraceSequenceTooLong,

    /// Pathname expansion was interrupted by a signal.
    #[error("pathname expansion was interrupted")]
    GlobInterrupted,

    /// A single-target glob matched more than one file outside POSIX mode.
    #[error("filename `{pattern}` matches more than one file")]
    AmbiguousFilename { pattern: String },

    /// A pathname produced by the glob matcher cannot be represented in the
    /// expansion's string type.
    #[error("the expanded file name cannot be represented in the current encoding")]
    UnencodableFilename,
}

/// Result of word expansion.
pub type Result<T> = std::result::Result<T, Error>;

/// Formats the message for an empty-expansion error.
///
/// A message supplied in the expansion replaces the default wording, which
/// depends on whether empty values were treated as unset.
fn empty_expansion_message(name: Option<&str>, message: Option<&str>, colon: bool) -> String {
    match (name, message) {
        (Some(name), Some(message)) => format!("{name}: {message}"),
        (None, Some(message)) => message.to_owned(),
        (None, None) => "the parameter value is empty".to_owned(),
        (Some(name), None) => {
            if colon {
                format!("parameter `{name}` is not set or has an empty value")
            } else {
                format!("parameter `{name}` is not set")
            }
        }
    }
}
