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

//! Escaping and quote-removal utilities
//!
//! Intermediate expansion results carry backslash escapes and structural
//! quote characters. The functions in this module add, strip and search
//! around them. They return [`Cow`] so that a string that needs no rewriting
//! is passed through without allocation.

use std::borrow::Cow;

/// Characters that have special meanings in brace expansion, quote removal,
/// and globbing. When an unquoted expansion includes these characters, they
/// are backslashed to protect them from the succeeding expansion steps.
pub(crate) const CHARS_ESCAPED: &str = "\\\"'{,}";

/// Characters a backslash can escape inside double quotes.
pub(crate) const CHARS_ESCAPABLE: &str = "$`\"\\";

/// Backslashes the characters of `s` that are contained in `set`.
///
/// When `set` is empty, every character is backslashed.
#[must_use]
pub fn escape<'a>(s: &'a str, set: &str) -> Cow<'a, str> {
    if !set.is_empty() && !s.contains(|c| set.contains(c)) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if set.is_empty() || set.contains(c) {
            result.push('\\');
        }
        result.push(c);
    }
    Cow::Owned(result)
}

/// Removes backslash escapes.
///
/// The character following each backslash is kept literally. A backslash at
/// the end of the string is dropped.
#[must_use]
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(c) => result.push(c),
                None => break,
            }
        } else {
            result.push(c);
        }
    }
    Cow::Owned(result)
}

/// Returns the byte position of the first unescaped occurrence of any
/// character of `accept` in `s`.
///
/// Backslash-escaped characters are skipped, as is a trailing lone backslash.
#[must_use]
pub fn escaped_find(s: &str, accept: &str) -> Option<usize> {
    let mut iter = s.char_indices();
    while let Some((i, c)) = iter.next() {
        if c == '\\' {
            iter.next();
        } else if accept.contains(c) {
            return Some(i);
        }
    }
    None
}

/// Removes unescaped occurrences of the characters of `reject` from `s`.
///
/// Escapes and escaped characters are kept in the result. Removing `"` and
/// `'` this way is the quote removal step of the expansion.
#[must_use]
pub fn escaped_remove<'a>(s: &'a str, reject: &str) -> Cow<'a, str> {
    let Some(first) = escaped_find(s, reject) else {
        return Cow::Borrowed(s);
    };

    let mut result = String::with_capacity(s.len());
    result.push_str(&s[..first]);
    let mut rest = &s[first..];
    loop {
        // skip the rejected character itself
        let mut iter = rest.chars();
        iter.next();
        rest = iter.as_str();

        match escaped_find(rest, reject) {
            Some(i) => {
                result.push_str(&rest[..i]);
                rest = &rest[i..];
            }
            None => {
                result.push_str(rest);
                return Cow::Owned(result);
            }
        }
    }
}

/// Removes quotes (`'`, `"`, `\`) from a string.
///
/// Unlike [`escaped_remove`], this function interprets the quotes: a
/// single-quoted region is copied verbatim, a double-quoted region honors the
/// double-quote escaping rules, and backslash escape pairs are collapsed to
/// the escaped character.
#[must_use]
pub fn unquote(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_double_quotes = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double_quotes => {
                // copy the single-quoted region verbatim
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    result.push(c);
                }
            }
            '"' => in_double_quotes = !in_double_quotes,
            '\\' => match chars.peek() {
                Some(&next) if !in_double_quotes || CHARS_ESCAPABLE.contains(next) => {
                    result.push(next);
                    chars.next();
                }
                _ => result.push(c),
            },
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow::{Borrowed, Owned};

    #[test]
    fn escape_selected() {
        assert_eq!(escape("abc", "b"), Owned::<str>("a\\bc".to_owned()));
        assert_eq!(escape("a{b,c}", "{,}"), Owned::<str>("a\\{b\\,c\\}".to_owned()));
        assert_eq!(escape("abc", "xyz"), Borrowed("abc"));
    }

    #[test]
    fn escape_all() {
        assert_eq!(escape("ab", ""), Owned::<str>("\\a\\b".to_owned()));
        assert_eq!(escape("", ""), Owned::<str>(String::new()));
    }

    #[test]
    fn unescape_pairs() {
        assert_eq!(unescape("abc"), Borrowed("abc"));
        assert_eq!(unescape("a\\bc"), Owned::<str>("abc".to_owned()));
        assert_eq!(unescape("\\\\"), Owned::<str>("\\".to_owned()));
        assert_eq!(unescape("a\\"), Owned::<str>("a".to_owned()));
    }

    #[test]
    fn escape_unescape_round_trip() {
        fn test(s: &str, set: &str) {
            assert_eq!(unescape(&escape(s, set)), s);
        }
        test("", "");
        test("abc", "");
        test("a b\\c'd\"e", "");
        test("a{b,c}*?", "{,}");
        test("\\\\", "\\");
    }

    #[test]
    fn escaped_find_skips_escapes() {
        assert_eq!(escaped_find("a{b", "{"), Some(1));
        assert_eq!(escaped_find("a\\{b{", "{"), Some(4));
        assert_eq!(escaped_find("a\\{b", "{"), None);
        assert_eq!(escaped_find("ab\\", "\\"), None);
        assert_eq!(escaped_find("", "{"), None);
    }

    #[test]
    fn escaped_remove_quotes() {
        assert_eq!(escaped_remove("abc", "\"'"), Borrowed("abc"));
        assert_eq!(
            escaped_remove("\"a b\"", "\"'"),
            Owned::<str>("a b".to_owned())
        );
        assert_eq!(
            escaped_remove("'\\a'\"b\"", "\"'"),
            Owned::<str>("\\ab".to_owned())
        );
        assert_eq!(
            escaped_remove("\\\"a\"", "\"'"),
            Owned::<str>("\\\"a".to_owned())
        );
    }

    #[test]
    fn escaped_remove_is_idempotent() {
        fn test(s: &str) {
            let once = escaped_remove(s, "\"'").into_owned();
            let twice = escaped_remove(&once, "\"'").into_owned();
            assert_eq!(once, twice);
        }
        test("");
        test("plain");
        test("\"a'b\"c");
        test("\\\"kept\\\"");
    }

    #[test]
    fn unquote_single_quotes() {
        assert_eq!(unquote("'a b'"), "a b");
        assert_eq!(unquote("'$x'"), "$x");
        assert_eq!(unquote("'a\\'"), "a\\");
    }

    #[test]
    fn unquote_double_quotes() {
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("\"\\$x\""), "$x");
        assert_eq!(unquote("\"\\a\""), "\\a");
    }

    #[test]
    fn unquote_backslashes() {
        assert_eq!(unquote("\\a\\ b"), "a b");
        assert_eq!(unquote("a\\"), "a\\");
    }
}
