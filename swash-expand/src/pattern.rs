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

//! Interface to the pattern matcher
//!
//! The trim and substitute operators of parameter expansion delegate the
//! actual pattern matching to the environment. The pattern source handed to
//! [`Env::compile_pattern`](crate::env::Env::compile_pattern) may contain
//! backslash escapes; an escaped character matches itself literally.

use bitflags::bitflags;
use std::ops::Range;

bitflags! {
    /// Flags controlling how a compiled pattern matches.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct PatternFlags: u8 {
        /// The match must start at the beginning of the subject.
        const HEAD_ONLY = 1 << 0;
        /// The match must end at the end of the subject.
        const TAIL_ONLY = 1 << 1;
        /// Prefer the shortest match over the longest.
        const SHORTEST = 1 << 2;
    }
}

/// Compiled pattern returned by the environment.
pub trait Matcher: std::fmt::Debug {
    /// Finds the matched range in the subject, if any.
    ///
    /// The range is in byte positions of `s`.
    fn find(&self, s: &str) -> Option<Range<usize>>;

    /// Replaces the matched part of the subject with `replacement`.
    ///
    /// If `all` is true, every match is replaced; otherwise only the first.
    /// A subject without a match is returned unchanged.
    fn replace(&self, s: &str, replacement: &str, all: bool) -> String;
}
