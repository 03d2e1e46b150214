// This file is part of swash, a POSIX-compatible command shell.
// Copyright (C) 2024 the swash authors

//! This crate provides functions that quote arbitrary strings so that they can
//! be reused as part of a shell command word.
//!
//! When the result is parsed and expanded as a single word in a clean shell
//! environment, it yields exactly the original string. The quoting style
//! follows the shell's own conventions for printing words back to the user:
//!
//! - Characters from the safe set (alphanumerics and `.`, `-`, `_`, `/`) are
//!   emitted bare when the run they form is followed by nothing that needs
//!   quoting.
//! - Any other sequence is wrapped in single quotes.
//! - A single quote itself is emitted as `\'` between runs, since it cannot
//!   appear inside a single-quoted region.
//! - The empty string renders as `''`.
//!
//! # Examples
//!
//! ```
//! # use std::borrow::Cow::{Borrowed, Owned};
//! # use swash_quote::quote_as_word;
//! assert_eq!(quote_as_word("foo/bar-1.0"), Borrowed("foo/bar-1.0"));
//! assert_eq!(quote_as_word(""), Owned::<str>("''".to_owned()));
//! assert_eq!(quote_as_word("a b"), Owned::<str>("'a b'".to_owned()));
//! assert_eq!(quote_as_word("can't"), Owned::<str>(r"can\'t".to_owned()));
//! ```

use std::borrow::Cow::{self, Borrowed, Owned};

/// Tests whether a character may appear unquoted in a word.
fn is_safe(c: char) -> bool {
    matches!(c, '.' | '-' | '_' | '/') || c.is_alphanumeric()
}

/// Quotes a string using backslashes and single quotes.
///
/// The result is suitable for re-parsing as a shell command word that would
/// expand to the original string. If no quoting is needed, the return value
/// is `Borrowed(s)`.
#[must_use]
pub fn quote_as_word(s: &str) -> Cow<'_, str> {
    if !s.is_empty() && s.chars().all(is_safe) {
        return Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 2);
    quote_as_word_into(&mut result, s);
    Owned(result)
}

/// Quotes a string into an existing buffer.
///
/// This function appends the same result as [`quote_as_word`] to `buf`,
/// avoiding a separate allocation when the caller is already building a
/// larger string.
pub fn quote_as_word_into(buf: &mut String, s: &str) {
    if s.is_empty() {
        buf.push_str("''");
        return;
    }

    let mut rest = s;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('\'') {
            buf.push_str("\\'");
            rest = tail;
            continue;
        }

        let run = rest.find(|c| !is_safe(c)).unwrap_or(rest.len());
        if run == rest.len() || rest[run..].starts_with('\'') {
            // Nothing needs quoting up to the next single quote.
            buf.push_str(&rest[..run]);
            rest = &rest[run..];
            continue;
        }

        // Quote everything up to the next single quote or end of string.
        let end = rest.find('\'').unwrap_or(rest.len());
        buf.push('\'');
        buf.push_str(&rest[..end]);
        buf.push('\'');
        rest = &rest[end..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_strings_are_borrowed() {
        fn test(s: &str) {
            assert_eq!(quote_as_word(s), Borrowed(s));
        }
        test("a");
        test("Z9");
        test("foo.bar");
        test("-x_y/z");
        test("/usr/local/bin");
    }

    #[test]
    fn empty_string() {
        assert_eq!(quote_as_word(""), Owned::<str>("''".to_owned()));
    }

    #[test]
    fn unsafe_strings_are_single_quoted() {
        fn test(s: &str, expected: &str) {
            assert_eq!(quote_as_word(s), Owned::<str>(expected.to_owned()));
        }
        test(" ", "' '");
        test("a b", "'a b'");
        test("$HOME", "'$HOME'");
        test("*?[", "'*?['");
        test("a\tb\nc", "'a\tb\nc'");
        test("\\", "'\\'");
    }

    #[test]
    fn single_quotes_between_runs() {
        fn test(s: &str, expected: &str) {
            assert_eq!(quote_as_word(s), Owned::<str>(expected.to_owned()));
        }
        test("'", "\\'");
        test("can't", "can\\'t");
        test("it's a test", "it\\''s a test'");
        test("''", "\\'\\'");
        test("a'$'b", "a\\''$'\\'b");
    }

    #[test]
    fn into_appends_to_buffer() {
        let mut buf = "x=".to_owned();
        quote_as_word_into(&mut buf, "a b");
        assert_eq!(buf, "x='a b'");
    }
}
