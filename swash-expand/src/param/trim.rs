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

//! Parameter expansion trim and substitute semantics
//!
//! The pattern text handed in here still carries backslash escapes; the
//! matcher interprets an escaped character as a literal. A pattern the
//! matcher cannot compile matches nothing.

use crate::env::Env;
use crate::pattern::{Matcher, PatternFlags};
use crate::word::ParamType;

/// Converts trim operator flags to matcher flags.
fn match_flags(flags: ParamType) -> PatternFlags {
    let mut result = PatternFlags::empty();
    if flags.contains(ParamType::MATCH_HEAD) {
        result |= PatternFlags::HEAD_ONLY;
    }
    if flags.contains(ParamType::MATCH_TAIL) {
        result |= PatternFlags::TAIL_ONLY;
    }
    if !flags.contains(ParamType::MATCH_LONGEST) {
        result |= PatternFlags::SHORTEST;
    }
    result
}

/// Removes the part of each value matched by the pattern.
pub(crate) fn match_each<E: Env>(env: &E, values: &mut [String], pattern: &str, flags: ParamType) {
    let Some(matcher) = env.compile_pattern(pattern, match_flags(flags)) else {
        return;
    };
    for value in values {
        if let Some(range) = matcher.find(value) {
            value.replace_range(range, "");
        }
    }
}

/// Replaces the matched part of each value with the replacement.
///
/// The longest match is always preferred here; only the anchoring flags of
/// the operator apply.
pub(crate) fn subst_each<E: Env>(
    env: &E,
    values: &mut [String],
    pattern: &str,
    replacement: &str,
    flags: ParamType,
) {
    let mut pattern_flags = PatternFlags::empty();
    if flags.contains(ParamType::MATCH_HEAD) {
        pattern_flags |= PatternFlags::HEAD_ONLY;
    }
    if flags.contains(ParamType::MATCH_TAIL) {
        pattern_flags |= PatternFlags::TAIL_ONLY;
    }
    let Some(matcher) = env.compile_pattern(pattern, pattern_flags) else {
        return;
    };
    let all = flags.contains(ParamType::SUBST_ALL);
    for value in values {
        *value = matcher.replace(value, replacement, all);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mock::MockEnv;

    #[test]
    fn trim_shortest_prefix() {
        let env = MockEnv::new();
        let mut values = vec!["123123123".to_owned()];
        match_each(&env, &mut values, "*2", ParamType::MATCH_HEAD);
        assert_eq!(values, ["3123123"]);
    }

    #[test]
    fn trim_longest_prefix() {
        let env = MockEnv::new();
        let mut values = vec!["123123123".to_owned()];
        match_each(
            &env,
            &mut values,
            "*2",
            ParamType::MATCH_HEAD | ParamType::MATCH_LONGEST,
        );
        assert_eq!(values, ["3"]);
    }

    #[test]
    fn trim_longest_suffix() {
        let env = MockEnv::new();
        let mut values = vec!["123123123".to_owned()];
        match_each(
            &env,
            &mut values,
            "2*",
            ParamType::MATCH_TAIL | ParamType::MATCH_LONGEST,
        );
        assert_eq!(values, ["1"]);
    }

    #[test]
    fn trim_every_element() {
        let env = MockEnv::new();
        let mut values = vec!["0".to_owned(), "12321".to_owned(), "112211".to_owned()];
        match_each(&env, &mut values, "*2", ParamType::MATCH_HEAD);
        assert_eq!(values, ["0", "321", "211"]);
    }

    #[test]
    fn trim_with_escaped_pattern() {
        let env = MockEnv::new();
        let mut values = vec!["*x".to_owned()];
        match_each(&env, &mut values, "\\*", ParamType::MATCH_HEAD);
        assert_eq!(values, ["x"]);
    }

    #[test]
    fn substitute_first_and_all() {
        let env = MockEnv::new();
        let mut values = vec!["ababa".to_owned()];
        subst_each(&env, &mut values, "b", "B", ParamType::SUBST);
        assert_eq!(values, ["aBaba"]);

        let mut values = vec!["ababa".to_owned()];
        subst_each(
            &env,
            &mut values,
            "b",
            "B",
            ParamType::SUBST | ParamType::SUBST_ALL,
        );
        assert_eq!(values, ["aBaBa"]);
    }

    #[test]
    fn substitute_anchored() {
        let env = MockEnv::new();
        let mut values = vec!["abcab".to_owned()];
        subst_each(
            &env,
            &mut values,
            "ab",
            "X",
            ParamType::SUBST | ParamType::MATCH_HEAD,
        );
        assert_eq!(values, ["Xcab"]);

        let mut values = vec!["abcab".to_owned()];
        subst_each(
            &env,
            &mut values,
            "ab",
            "X",
            ParamType::SUBST | ParamType::MATCH_TAIL,
        );
        assert_eq!(values, ["abcX"]);
    }
}
