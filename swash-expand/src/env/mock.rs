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

//! Mock environment
//!
//! [`MockEnv`] implements [`Env`] entirely in memory: variables and
//! positional parameters live in plain maps and vectors, command substitution
//! is a table of canned outputs, the file system is a flat list of pathnames,
//! and the pattern matcher supports the `*` and `?` wildcards plus backslash
//! escapes. This is what the expansion tests inject instead of a real shell
//! environment.

use super::{Env, Lookup, OptionSet, Scope};
use crate::error::{Error, Result};
use crate::glob::GlobFlags;
use crate::pattern::{Matcher, PatternFlags};
use crate::word::{ParamExp, Word, WordUnit};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ffi::OsString;
use std::ops::Range;
use std::path::PathBuf;

/// In-memory implementation of [`Env`].
#[derive(Clone, Debug, Default)]
pub struct MockEnv {
    /// Named variables.
    pub variables: HashMap<String, Lookup>,
    /// Positional parameters (`$1`, `$2`, …).
    pub positional: Vec<String>,
    /// Names that refuse assignment.
    pub read_only: HashSet<String>,
    /// Shell option states.
    pub options: OptionSet,
    /// Home directories by user name; the empty name is the current user.
    pub home_dirs: HashMap<String, PathBuf>,
    /// Directory stack, oldest first.
    pub dirstack: Vec<String>,
    /// Canned command-substitution outputs by command source.
    pub command_outputs: HashMap<String, String>,
    /// Pathnames the fake file system contains.
    pub files: Vec<String>,
    /// Makes the next glob fail as interrupted.
    pub glob_interrupt: bool,
    /// Record of `set_interruptible` calls, for assertions.
    pub interruptible_calls: Vec<bool>,
}

impl MockEnv {
    /// Creates an environment with default options and nothing defined.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a scalar variable.
    pub fn set_scalar<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.variables
            .insert(name.into(), Lookup::Scalar(value.into()));
    }

    /// Defines an array variable.
    pub fn set_array<N: Into<String>, V: Into<String>, I: IntoIterator<Item = V>>(
        &mut self,
        name: N,
        values: I,
    ) {
        let values = values.into_iter().map(Into::into).collect();
        self.variables.insert(name.into(), Lookup::Array(values));
    }

    /// Sets the positional parameters.
    pub fn set_positional<V: Into<String>, I: IntoIterator<Item = V>>(&mut self, values: I) {
        self.positional = values.into_iter().map(Into::into).collect();
    }
}

impl Env for MockEnv {
    fn variable(&self, name: &str) -> Lookup {
        match name {
            "@" => return Lookup::Array(self.positional.clone()),
            "*" => return Lookup::ArrayConcat(self.positional.clone()),
            "#" => return Lookup::Scalar(self.positional.len().to_string()),
            _ => {}
        }
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
            let n: usize = name.parse().unwrap_or(0);
            return match n.checked_sub(1).and_then(|i| self.positional.get(i)) {
                Some(value) => Lookup::Scalar(value.clone()),
                None => Lookup::Unset,
            };
        }
        self.variables.get(name).cloned().unwrap_or(Lookup::Unset)
    }

    fn assign_variable(&mut self, name: &str, value: String, _scope: Scope) -> Result<()> {
        if self.read_only.contains(name) {
            return Err(Error::ReadOnlyVariable {
                name: name.to_owned(),
            });
        }
        self.variables.insert(name.to_owned(), Lookup::Scalar(value));
        Ok(())
    }

    fn assign_array_element(&mut self, name: &str, index: usize, value: String) -> Result<()> {
        if self.read_only.contains(name) {
            return Err(Error::ReadOnlyVariable {
                name: name.to_owned(),
            });
        }
        match self.variables.get_mut(name) {
            Some(Lookup::Array(values)) if index < values.len() => {
                values[index] = value;
                Ok(())
            }
            _ => Err(Error::AssignToSlice {
                name: name.to_owned(),
            }),
        }
    }

    fn command_substitution(&mut self, command: &str) -> Result<String> {
        match self.command_outputs.get(command) {
            Some(output) => Ok(output.clone()),
            None => Err(Error::CommandSubstitution {
                message: format!("no such command: {command}"),
            }),
        }
    }

    fn arithmetic(&mut self, expression: &str) -> Result<String> {
        let expression = expression.trim();
        if let Ok(value) = expression.parse::<i64>() {
            return Ok(value.to_string());
        }
        if let Some((left, right)) = expression.split_once('+') {
            if let (Ok(left), Ok(right)) = (left.trim().parse::<i64>(), right.trim().parse::<i64>())
            {
                return Ok((left + right).to_string());
            }
        }
        Err(Error::Arithmetic {
            message: format!("invalid expression: {expression}"),
        })
    }

    fn eval_index(&mut self, text: &str) -> Result<i64> {
        text.trim().parse().map_err(|_| Error::IndexEvaluation {
            text: text.to_owned(),
        })
    }

    fn compile_pattern(&self, pattern: &str, flags: PatternFlags) -> Option<Box<dyn Matcher>> {
        Some(Box::new(MockMatcher::new(pattern, flags)))
    }

    fn glob(&mut self, pattern: &str, flags: GlobFlags) -> Result<Vec<OsString>> {
        if self.glob_interrupt {
            return Err(Error::GlobInterrupted);
        }
        let fold = flags.contains(GlobFlags::CASE_FOLD);
        let pattern = if fold {
            pattern.to_lowercase()
        } else {
            pattern.to_owned()
        };
        let matcher = MockMatcher::new(
            &pattern,
            PatternFlags::HEAD_ONLY | PatternFlags::TAIL_ONLY,
        );
        let mut matches: Vec<OsString> = self
            .files
            .iter()
            .filter(|name| {
                let subject = if fold {
                    name.to_lowercase()
                } else {
                    (*name).clone()
                };
                matcher.find(&subject).is_some()
            })
            .map(OsString::from)
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn home_directory(&self, user: &str) -> Option<PathBuf> {
        self.home_dirs.get(user).cloned()
    }

    fn dirstack_entry(&self, designator: &str) -> Option<String> {
        if designator.len() < 2 || !designator.is_char_boundary(1) {
            return None;
        }
        let (sign, digits) = designator.split_at(1);
        let index: usize = digits.parse().ok()?;
        match sign {
            "+" => self.dirstack.iter().rev().nth(index).cloned(),
            "-" => self.dirstack.get(index).cloned(),
            _ => None,
        }
    }

    fn parse_string(&mut self, source: &str, _filename: &str) -> Result<Word> {
        Ok(parse_word(source))
    }

    fn set_interruptible(&mut self, interruptible: bool) {
        self.interruptible_calls.push(interruptible);
    }

    fn options(&self) -> &OptionSet {
        &self.options
    }
}

/// Parses `$name` references in a string; everything else is literal text.
///
/// This is only the small subset of the word grammar the tests need.
fn parse_word(source: &str) -> Word {
    let mut units = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }
        let name = match chars.peek() {
            Some(&c) if matches!(c, '@' | '*' | '#') => {
                chars.next();
                c.to_string()
            }
            Some(&c) if c.is_alphanumeric() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                name
            }
            _ => {
                literal.push('$');
                continue;
            }
        };
        if !literal.is_empty() {
            units.push(WordUnit::Literal(std::mem::take(&mut literal)));
        }
        units.push(WordUnit::Param(ParamExp::variable(name)));
    }
    if !literal.is_empty() {
        units.push(WordUnit::Literal(literal));
    }
    Word { units }
}

/// Pattern element of the mock matcher.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Token {
    Literal(char),
    AnyChar,
    AnySeq,
}

/// Backtracking matcher for `*`/`?` patterns with backslash escapes.
#[derive(Clone, Debug)]
pub struct MockMatcher {
    tokens: Vec<Token>,
    flags: PatternFlags,
}

impl MockMatcher {
    /// Compiles a pattern.
    #[must_use]
    pub fn new(pattern: &str, flags: PatternFlags) -> Self {
        let mut tokens = Vec::new();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(c) = chars.next() {
                        tokens.push(Token::Literal(c));
                    }
                }
                '?' => tokens.push(Token::AnyChar),
                '*' => tokens.push(Token::AnySeq),
                _ => tokens.push(Token::Literal(c)),
            }
        }
        MockMatcher { tokens, flags }
    }

    /// All positions where a match starting at `from` can end.
    fn match_ends(&self, text: &[char], from: usize) -> BTreeSet<usize> {
        fn go(tokens: &[Token], text: &[char], pos: usize, ends: &mut BTreeSet<usize>) {
            match tokens.split_first() {
                None => {
                    ends.insert(pos);
                }
                Some((Token::Literal(c), rest)) => {
                    if text.get(pos) == Some(c) {
                        go(rest, text, pos + 1, ends);
                    }
                }
                Some((Token::AnyChar, rest)) => {
                    if pos < text.len() {
                        go(rest, text, pos + 1, ends);
                    }
                }
                Some((Token::AnySeq, rest)) => {
                    for p in pos..=text.len() {
                        go(rest, text, p, ends);
                    }
                }
            }
        }
        let mut ends = BTreeSet::new();
        go(&self.tokens, text, from, &mut ends);
        ends
    }

    /// Finds a match as a range of character positions.
    fn find_chars(&self, text: &[char]) -> Option<Range<usize>> {
        let len = text.len();
        let head = self.flags.contains(PatternFlags::HEAD_ONLY);
        let tail = self.flags.contains(PatternFlags::TAIL_ONLY);
        let shortest = self.flags.contains(PatternFlags::SHORTEST);

        if head {
            let ends = self.match_ends(text, 0);
            let end = if tail {
                ends.contains(&len).then_some(len)
            } else if shortest {
                ends.first().copied()
            } else {
                ends.last().copied()
            };
            return end.map(|end| 0..end);
        }

        if tail {
            let starts: Vec<usize> = (0..=len)
                .filter(|&s| self.match_ends(text, s).contains(&len))
                .collect();
            let start = if shortest {
                starts.last()
            } else {
                starts.first()
            };
            return start.map(|&start| start..len);
        }

        // unanchored: leftmost match wins
        (0..=len).find_map(|s| {
            let ends = self.match_ends(text, s);
            let end = if shortest { ends.first() } else { ends.last() };
            end.map(|&end| s..end)
        })
    }
}

impl Matcher for MockMatcher {
    fn find(&self, s: &str) -> Option<Range<usize>> {
        let chars: Vec<char> = s.chars().collect();
        let offsets: Vec<usize> = s
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(s.len()))
            .collect();
        let range = self.find_chars(&chars)?;
        Some(offsets[range.start]..offsets[range.end])
    }

    fn replace(&self, s: &str, replacement: &str, all: bool) -> String {
        if self
            .flags
            .intersects(PatternFlags::HEAD_ONLY | PatternFlags::TAIL_ONLY)
        {
            return match self.find(s) {
                Some(range) => {
                    let mut result = s.to_owned();
                    result.replace_range(range, replacement);
                    result
                }
                None => s.to_owned(),
            };
        }

        let mut result = String::new();
        let mut rest = s;
        loop {
            let Some(range) = self.find(rest) else {
                result.push_str(rest);
                break;
            };
            result.push_str(&rest[..range.start]);
            result.push_str(replacement);
            if range.end > range.start {
                rest = &rest[range.end..];
            } else {
                // empty match: copy one character to make progress
                match rest[range.start..].chars().next() {
                    Some(c) => {
                        result.push(c);
                        rest = &rest[range.start + c.len_utf8()..];
                    }
                    None => rest = "",
                }
            }
            if !all || rest.is_empty() {
                result.push_str(rest);
                break;
            }
        }
        result
    }
}
