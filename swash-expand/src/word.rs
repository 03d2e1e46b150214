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

//! Input data model: parsed words
//!
//! The parser hands the expansion a [`Word`], a chain of [`WordUnit`]s. The
//! expansion treats the chain as read-only. Literal units may contain quote
//! characters (`'`, `"`, `\`) that have not yet been interpreted; interpreting
//! them is the expansion's job, not the parser's.

use bitflags::bitflags;

/// Fragment of a word produced by the parser.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// Literal text, possibly containing quote characters, `~`, and `:`.
    Literal(String),
    /// Parameter expansion (`$foo`, `${foo:-bar}`, …).
    Param(ParamExp),
    /// Command substitution; the string is the command source to execute.
    CommandSubst(String),
    /// Arithmetic expansion; the inner word is expanded, then evaluated.
    Arith(Word),
}

/// Word to be expanded: an ordered chain of word units.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Word {
    pub units: Vec<WordUnit>,
}

impl Word {
    /// Creates a word made of a single literal unit.
    pub fn literal<S: Into<String>>(text: S) -> Self {
        Word {
            units: vec![WordUnit::Literal(text.into())],
        }
    }
}

impl From<WordUnit> for Word {
    fn from(unit: WordUnit) -> Self {
        Word { units: vec![unit] }
    }
}

bitflags! {
    /// Operator flags of a parameter expansion.
    ///
    /// `PLUS`, `MINUS`, `ASSIGN` and `ERROR` are mutually exclusive, as are
    /// the trim flags and `SUBST`. The parser guarantees a consistent
    /// combination.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ParamType: u16 {
        /// Treat an empty value as unset (`:`).
        const COLON = 1 << 0;
        /// Use the alternate value if set (`+`).
        const PLUS = 1 << 1;
        /// Use the default value if unset (`-`).
        const MINUS = 1 << 2;
        /// Assign the default value if unset (`=`).
        const ASSIGN = 1 << 3;
        /// Fail with a message if unset (`?`).
        const ERROR = 1 << 4;
        /// Remove a matching prefix (`#`, `##`).
        const MATCH_HEAD = 1 << 5;
        /// Remove a matching suffix (`%`, `%%`).
        const MATCH_TAIL = 1 << 6;
        /// Prefer the longest match (`##`, `%%`).
        const MATCH_LONGEST = 1 << 7;
        /// Substitute the matched part (`/`).
        const SUBST = 1 << 8;
        /// Substitute every match (`//`).
        const SUBST_ALL = 1 << 9;
        /// Expand to the length of the value (`${#…}`).
        const LENGTH = 1 << 10;
        /// The parameter is a nested expansion rather than a name.
        const NESTED = 1 << 11;
    }
}

/// Parameter-expansion descriptor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParamExp {
    /// Name of the parameter, or `None` when `NESTED` is set.
    pub name: Option<String>,
    /// Inner word replacing the name for a recursive `${…}`.
    pub nested: Option<Word>,
    /// Word yielding the first index.
    pub start: Option<Word>,
    /// Word yielding the second index.
    pub end: Option<Word>,
    /// Right-hand side of a switch operator or the substitution replacement.
    pub subst: Option<Word>,
    /// Pattern for the trim and substitute operators.
    pub pattern: Option<Word>,
    /// Operator flags.
    pub flags: ParamType,
}

impl ParamExp {
    /// Creates a plain expansion of the named parameter.
    pub fn variable<S: Into<String>>(name: S) -> Self {
        ParamExp {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Type of tilde expansion to perform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TildeMode {
    /// No tilde expansion.
    None,
    /// Expand a tilde at the start of the word only.
    Single,
    /// Additionally expand a tilde after every unquoted `:` in the word, as in
    /// the value of an assignment.
    Multi,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_word() {
        let word = Word::literal("foo");
        assert_eq!(word.units, [WordUnit::Literal("foo".to_owned())]);
    }

    #[test]
    fn param_exp_variable() {
        let p = ParamExp::variable("x");
        assert_eq!(p.name.as_deref(), Some("x"));
        assert_eq!(p.flags, ParamType::empty());
        assert_eq!(p.nested, None);
    }
}
