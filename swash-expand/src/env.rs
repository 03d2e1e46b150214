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

//! Part of the shell execution environment the word expansion depends on
//!
//! The expansion itself is a pure pipeline; everything that touches shared
//! shell state or the outside world goes through the [`Env`] trait: the
//! variable store, the command-substitution executor, the arithmetic
//! evaluator, the pattern and glob matchers, and the signal-interruption
//! toggle. Tests inject the [`mock`] implementation.

pub mod mock;

use crate::error::Result;
use crate::glob::GlobFlags;
use crate::pattern::{Matcher, PatternFlags};
use crate::word::Word;
use enumset::{EnumSet, EnumSetType};
use std::ffi::OsString;
use std::path::PathBuf;

/// Value of a variable as obtained from the store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Lookup {
    /// The variable is not set.
    Unset,
    /// Single-valued variable.
    Scalar(String),
    /// Array variable.
    Array(Vec<String>),
    /// Array variable referenced with `$*` semantics, whose elements are to
    /// be concatenated when the expansion is double-quoted.
    ArrayConcat(Vec<String>),
}

/// Scope to assign a variable in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scope {
    Global,
    Local,
}

/// State of a shell option: either enabled or disabled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    On,
    Off,
}

impl std::ops::Not for State {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            State::On => State::Off,
            State::Off => State::On,
        }
    }
}

/// Shell options the word expansion consults.
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
#[non_exhaustive]
pub enum ShellOption {
    /// Enables pathname expansion.
    Glob,
    /// Removes a glob pattern with zero matches instead of keeping it
    /// literal.
    NullGlob,
    /// Makes pathname expansion case-sensitive.
    CaseGlob,
    /// Makes `*` and `?` match file names starting with a period.
    DotGlob,
    /// Appends `/` to directory names resulting from pathname expansion.
    MarkDirs,
    /// Enables recursive directory matching in pathname expansion.
    ExtendedGlob,
    /// Enables brace expansion.
    BraceExpand,
    /// Preserves a trailing empty field produced by a non-whitespace IFS
    /// delimiter.
    EmptyLastField,
    /// Disables non-POSIX extensions.
    PosixlyCorrect,
    /// Expands unset variables to an empty string rather than erroring out.
    Unset,
    /// Enables the directory stack, including `~±N` tilde expansion.
    DirStack,
}

/// Set of shell options with their states.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionSet {
    enabled: EnumSet<ShellOption>,
}

impl OptionSet {
    /// Creates a set with every option off.
    #[must_use]
    pub fn empty() -> Self {
        OptionSet {
            enabled: EnumSet::empty(),
        }
    }

    /// Returns the state of an option.
    #[must_use]
    pub fn get(&self, option: ShellOption) -> State {
        if self.enabled.contains(option) {
            State::On
        } else {
            State::Off
        }
    }

    /// Tests whether an option is on.
    #[must_use]
    pub fn is_on(&self, option: ShellOption) -> bool {
        self.enabled.contains(option)
    }

    /// Changes the state of an option.
    pub fn set(&mut self, option: ShellOption, state: State) {
        match state {
            State::On => self.enabled.insert(option),
            State::Off => self.enabled.remove(option),
        };
    }
}

/// The default set has `Glob`, `CaseGlob`, `Unset` and `DirStack` on.
impl Default for OptionSet {
    fn default() -> Self {
        use ShellOption::*;
        OptionSet {
            enabled: Glob | CaseGlob | Unset | DirStack,
        }
    }
}

/// Shell execution environment for performing the word expansion in.
///
/// Delegate-failure results are constructed by the implementor from the
/// matching [`Error`](crate::Error) variants so they propagate through the
/// expansion unchanged.
pub trait Env: std::fmt::Debug {
    /// Looks up a variable or special parameter by name.
    ///
    /// Positional parameters are reached through the names `@`, `*`, `#` and
    /// the decimal digits. A lookup of `*` reports
    /// [`Lookup::ArrayConcat`].
    fn variable(&self, name: &str) -> Lookup;

    /// Assigns a scalar value to a variable.
    fn assign_variable(&mut self, name: &str, value: String, scope: Scope) -> Result<()>;

    /// Assigns a value to one element of an array variable.
    ///
    /// Fails if the index does not name an existing element.
    fn assign_array_element(&mut self, name: &str, index: usize, value: String) -> Result<()>;

    /// Executes a command substitution and returns its output.
    fn command_substitution(&mut self, command: &str) -> Result<String>;

    /// Evaluates an arithmetic expression.
    ///
    /// The expression has already been expanded and unescaped.
    fn arithmetic(&mut self, expression: &str) -> Result<String>;

    /// Evaluates a parameter-expansion index to an integer.
    fn eval_index(&mut self, text: &str) -> Result<i64>;

    /// Compiles a matching pattern.
    ///
    /// Returns `None` if the pattern is broken; a broken pattern matches
    /// nothing.
    fn compile_pattern(&self, pattern: &str, flags: PatternFlags) -> Option<Box<dyn Matcher>>;

    /// Expands a pattern against the file system.
    ///
    /// The pattern may contain backslash escapes. Matches are returned in the
    /// matcher's canonical order. An interrupted search fails with
    /// [`Error::GlobInterrupted`].
    fn glob(&mut self, pattern: &str, flags: GlobFlags) -> Result<Vec<OsString>>;

    /// Returns the home directory of the named user.
    fn home_directory(&self, user: &str) -> Option<PathBuf>;

    /// Resolves a directory-stack designator such as `+2` or `-0`.
    fn dirstack_entry(&self, designator: &str) -> Option<String>;

    /// Parses a string as a single word.
    ///
    /// Used by [`parse_and_expand_string`](crate::parse_and_expand_string).
    fn parse_string(&mut self, source: &str, filename: &str) -> Result<Word>;

    /// Makes the current operation interruptible by `SIGINT`, or not.
    ///
    /// The expansion turns this on only around pathname expansion.
    fn set_interruptible(&mut self, interruptible: bool);

    /// The current states of the shell options.
    fn options(&self) -> &OptionSet;
}

/// Returns the value of `IFS`, or the default separators when it is unset.
///
/// A non-scalar `IFS` counts as unset.
pub(crate) fn ifs_chars<E: Env>(env: &E) -> String {
    match env.variable("IFS") {
        Lookup::Scalar(value) => value,
        _ => crate::split::Ifs::DEFAULT.to_owned(),
    }
}

/// Returns the separator joining multi-field results: the first character of
/// `IFS`, a space when `IFS` is unset, or nothing when `IFS` is empty.
pub(crate) fn ifs_separator<E: Env>(env: &E) -> Option<char> {
    match env.variable("IFS") {
        Lookup::Scalar(value) => value.chars().next(),
        _ => Some(' '),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_set_get_and_set() {
        let mut options = OptionSet::empty();
        assert_eq!(options.get(ShellOption::Glob), State::Off);
        options.set(ShellOption::Glob, State::On);
        assert_eq!(options.get(ShellOption::Glob), State::On);
        assert!(options.is_on(ShellOption::Glob));
        options.set(ShellOption::Glob, State::Off);
        assert!(!options.is_on(ShellOption::Glob));
    }

    #[test]
    fn default_option_set() {
        let options = OptionSet::default();
        assert!(options.is_on(ShellOption::Glob));
        assert!(options.is_on(ShellOption::CaseGlob));
        assert!(options.is_on(ShellOption::Unset));
        assert!(options.is_on(ShellOption::DirStack));
        assert!(!options.is_on(ShellOption::BraceExpand));
        assert!(!options.is_on(ShellOption::NullGlob));
        assert!(!options.is_on(ShellOption::PosixlyCorrect));
    }

    #[test]
    fn state_negation() {
        assert_eq!(!State::On, State::Off);
        assert_eq!(!State::Off, State::On);
    }
}
