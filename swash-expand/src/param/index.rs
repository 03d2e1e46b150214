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

//! Parameter-expansion indices
//!
//! Externally an index is 1-based and may be negative to count from the end;
//! `0` as a start means "past the end". Internally indices are normalized to
//! a 0-based half-open range, with [`i64::MAX`] standing for "to the end".

/// Type of a parameter-expansion index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum IndexType {
    /// Numeric index.
    None,
    /// `@`: all elements.
    All,
    /// `*`: all elements, concatenated when quoted.
    Concat,
    /// `#`: the number of elements.
    Number,
}

/// Classifies the textual form of the first index.
pub(crate) fn parse_indextype(text: &str) -> IndexType {
    match text {
        "@" => IndexType::All,
        "*" => IndexType::Concat,
        "#" => IndexType::Number,
        _ => IndexType::None,
    }
}

/// Keeps the code points of `s` in the range `[start, end)`.
///
/// Negative values wrap around the length; `i64::MAX` as `start` yields an
/// empty string.
pub(crate) fn trim_scalar(s: &str, start: i64, end: i64) -> String {
    if start == 0 && end == i64::MAX {
        return s.to_owned();
    }

    let len = s.chars().count() as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let end = if end < 0 { end + len + 1 } else { end };
    if start >= end || start >= len {
        return String::new();
    }

    s.chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect()
}

/// Clamps indices into an array of `count` elements.
///
/// The result satisfies `0 <= start <= end <= count`.
pub(crate) fn clamp_array_indices(count: usize, start: i64, end: i64) -> (usize, usize) {
    let count = count as i64;
    let start = if start < 0 {
        (start + count).max(0)
    } else {
        start.min(count)
    };
    let end = if end < 0 { end + count + 1 } else { end };
    let end = end.clamp(start, count);
    (start as usize, end as usize)
}

/// Keeps the elements of `values` in the range `[start, end)`.
pub(crate) fn trim_array(values: Vec<String>, start: usize, end: usize) -> Vec<String> {
    values
        .into_iter()
        .take(end)
        .skip(start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indextype_classification() {
        assert_eq!(parse_indextype("@"), IndexType::All);
        assert_eq!(parse_indextype("*"), IndexType::Concat);
        assert_eq!(parse_indextype("#"), IndexType::Number);
        assert_eq!(parse_indextype("1"), IndexType::None);
        assert_eq!(parse_indextype("@@"), IndexType::None);
        assert_eq!(parse_indextype(""), IndexType::None);
    }

    #[test]
    fn scalar_full_range() {
        assert_eq!(trim_scalar("abc", 0, i64::MAX), "abc");
    }

    #[test]
    fn scalar_subrange() {
        assert_eq!(trim_scalar("abcde", 1, 3), "bc");
        assert_eq!(trim_scalar("abcde", 0, 2), "ab");
        assert_eq!(trim_scalar("abcde", 4, i64::MAX), "e");
    }

    #[test]
    fn scalar_negative_indices() {
        assert_eq!(trim_scalar("abcde", -2, i64::MAX), "de");
        assert_eq!(trim_scalar("abcde", 0, -1), "abcde");
        assert_eq!(trim_scalar("abcde", 0, -2), "abcd");
        assert_eq!(trim_scalar("abcde", -10, 2), "ab");
    }

    #[test]
    fn scalar_empty_results() {
        assert_eq!(trim_scalar("abc", i64::MAX, i64::MAX), "");
        assert_eq!(trim_scalar("abc", 2, 1), "");
        assert_eq!(trim_scalar("abc", 5, 9), "");
        assert_eq!(trim_scalar("abc", 0, -9), "");
    }

    #[test]
    fn scalar_counts_code_points() {
        assert_eq!(trim_scalar("a\u{30A4}c", 1, 2), "\u{30A4}");
    }

    #[test]
    fn array_clamping() {
        assert_eq!(clamp_array_indices(3, 0, i64::MAX), (0, 3));
        assert_eq!(clamp_array_indices(3, 1, 2), (1, 2));
        assert_eq!(clamp_array_indices(3, 5, 9), (3, 3));
        assert_eq!(clamp_array_indices(3, -2, i64::MAX), (1, 3));
        assert_eq!(clamp_array_indices(3, 0, -1), (0, 3));
        assert_eq!(clamp_array_indices(3, 2, 1), (2, 2));
        assert_eq!(clamp_array_indices(3, -9, -9), (0, 0));
    }

    #[test]
    fn array_trimming() {
        let values = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        assert_eq!(trim_array(values.clone(), 0, 3), ["a", "b", "c"]);
        assert_eq!(trim_array(values.clone(), 1, 2), ["b"]);
        assert_eq!(trim_array(values, 3, 3), Vec::<String>::new());
    }
}
