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

//! Pathname expansion dispatch
//!
//! The actual directory scanning is the environment's business; this module
//! decides which fields are worth handing to the matcher, maps the shell
//! options to matcher flags, and applies the `NullGlob` fallback. The matcher
//! runs inside a window where `SIGINT` interrupts it; an interruption is an
//! error and partial results are discarded.

use crate::env::{Env, ShellOption};
use crate::error::{Error, Result};
use crate::escape::{escaped_find, unescape};
use bitflags::bitflags;

bitflags! {
    /// Flags for the glob matcher.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct GlobFlags: u8 {
        /// Match case-insensitively.
        const CASE_FOLD = 1 << 0;
        /// Let wildcards match file names starting with a period.
        const DOT_FILES = 1 << 1;
        /// Append `/` to directory results.
        const MARK_DIRS = 1 << 2;
        /// Enable recursive directory matching.
        const RECURSIVE = 1 << 3;
    }
}

/// Makes a matcher flag set from the current shell options.
pub(crate) fn glob_flags<E: Env>(env: &E) -> GlobFlags {
    let options = env.options();
    let mut flags = GlobFlags::empty();
    if !options.is_on(ShellOption::CaseGlob) {
        flags |= GlobFlags::CASE_FOLD;
    }
    if options.is_on(ShellOption::DotGlob) {
        flags |= GlobFlags::DOT_FILES;
    }
    if options.is_on(ShellOption::MarkDirs) {
        flags |= GlobFlags::MARK_DIRS;
    }
    if options.is_on(ShellOption::ExtendedGlob) {
        flags |= GlobFlags::RECURSIVE;
    }
    flags
}

/// Tests whether the field, read with backslash escapes, contains an
/// unquoted pattern character.
pub(crate) fn is_matching_pattern(s: &str) -> bool {
    escaped_find(s, "*?[").is_some()
}

/// Performs pathname expansion on each pattern.
///
/// Fields without pattern characters are unescaped and passed through
/// without touching the file system. A pattern with no matches is passed
/// through the same way unless `NullGlob` is on, in which case it disappears.
pub(crate) fn glob_all<E: Env>(
    env: &mut E,
    patterns: Vec<String>,
    list: &mut Vec<String>,
) -> Result<()> {
    let flags = glob_flags(env);
    let nullglob = env.options().is_on(ShellOption::NullGlob);
    let mut interruptible = false;

    let mut run = || -> Result<()> {
        for pattern in patterns {
            if !is_matching_pattern(&pattern) {
                list.push(unescape(&pattern).into_owned());
                continue;
            }
            if !interruptible {
                env.set_interruptible(true);
                interruptible = true;
            }
            let matches = env.glob(&pattern, flags)?;
            if matches.is_empty() {
                if !nullglob {
                    list.push(unescape(&pattern).into_owned());
                }
            } else {
                for m in matches {
                    let m = m.into_string().map_err(|_| Error::UnencodableFilename)?;
                    list.push(m);
                }
            }
        }
        Ok(())
    };
    let result = run();

    if interruptible {
        env.set_interruptible(false);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mock::MockEnv;
    use crate::env::State;
    use assert_matches::assert_matches;

    #[test]
    fn pattern_detection() {
        assert!(is_matching_pattern("*.txt"));
        assert!(is_matching_pattern("a?c"));
        assert!(is_matching_pattern("a[bc]d"));
        assert!(!is_matching_pattern("plain"));
        assert!(!is_matching_pattern("\\*.txt"));
        assert!(!is_matching_pattern(""));
    }

    #[test]
    fn literal_fields_are_unescaped() {
        let mut env = MockEnv::new();
        let mut list = Vec::new();
        glob_all(&mut env, vec!["a\\ b".to_owned()], &mut list).unwrap();
        assert_eq!(list, ["a b"]);
        assert_eq!(env.interruptible_calls, Vec::<bool>::new());
    }

    #[test]
    fn matching_pattern_expands() {
        let mut env = MockEnv::new();
        env.files = vec!["a.txt".to_owned(), "b.txt".to_owned(), "c.log".to_owned()];
        let mut list = Vec::new();
        glob_all(&mut env, vec!["*.txt".to_owned()], &mut list).unwrap();
        assert_eq!(list, ["a.txt", "b.txt"]);
        assert_eq!(env.interruptible_calls, [true, false]);
    }

    #[test]
    fn no_match_keeps_pattern_without_nullglob() {
        let mut env = MockEnv::new();
        let mut list = Vec::new();
        glob_all(&mut env, vec!["*.nope".to_owned()], &mut list).unwrap();
        assert_eq!(list, ["*.nope"]);
    }

    #[test]
    fn no_match_disappears_with_nullglob() {
        let mut env = MockEnv::new();
        env.options.set(ShellOption::NullGlob, State::On);
        let mut list = Vec::new();
        glob_all(&mut env, vec!["*.nope".to_owned()], &mut list).unwrap();
        assert_eq!(list, Vec::<String>::new());
    }

    #[test]
    fn interruption_is_an_error_and_window_is_closed() {
        let mut env = MockEnv::new();
        env.glob_interrupt = true;
        let mut list = Vec::new();
        let result = glob_all(&mut env, vec!["*".to_owned()], &mut list);
        assert_matches!(result, Err(Error::GlobInterrupted));
        assert_eq!(env.interruptible_calls, [true, false]);
    }

    #[test]
    fn flags_follow_options() {
        let mut env = MockEnv::new();
        assert_eq!(glob_flags(&env), GlobFlags::empty());
        env.options.set(ShellOption::CaseGlob, State::Off);
        env.options.set(ShellOption::DotGlob, State::On);
        env.options.set(ShellOption::MarkDirs, State::On);
        env.options.set(ShellOption::ExtendedGlob, State::On);
        assert_eq!(
            glob_flags(&env),
            GlobFlags::CASE_FOLD | GlobFlags::DOT_FILES | GlobFlags::MARK_DIRS | GlobFlags::RECURSIVE
        );
    }
}
