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

//! Tilde expansion

use crate::env::{Env, Lookup, ShellOption};
use crate::word::TildeMode;

/// Performs tilde expansion at the start of `text`.
///
/// `text` is the remaining literal text and must start with `~` for anything
/// to happen. `has_next_unit` tells whether another word unit follows the
/// literal; a user name cut short by the end of the literal cannot be
/// expanded then.
///
/// On success, returns the replacement string and the byte length of the
/// consumed `~name` prefix. Returns `None` to leave the text alone.
pub(crate) fn expand_tilde<E: Env>(
    env: &E,
    text: &str,
    has_next_unit: bool,
    mode: TildeMode,
) -> Option<(String, usize)> {
    let rest = text.strip_prefix('~')?;

    let stops: &[char] = match mode {
        TildeMode::Single => &['/'],
        TildeMode::Multi => &['/', ':'],
        TildeMode::None => return None,
    };
    let name_len = match rest.find(stops) {
        Some(len) => len,
        None if has_next_unit => return None,
        None => rest.len(),
    };
    let name = &rest[..name_len];
    let consumed = 1 + name_len;

    if name.is_empty() {
        return scalar(env, "HOME").map(|home| (home, consumed));
    }
    if name.contains(['"', '\'', '\\']) {
        // don't expand if the user name is quoted
        return None;
    }

    if !env.options().is_on(ShellOption::PosixlyCorrect) {
        match name {
            "+" => return scalar(env, "PWD").map(|pwd| (pwd, consumed)),
            "-" => return scalar(env, "OLDPWD").map(|pwd| (pwd, consumed)),
            _ => {
                if name.starts_with(['+', '-'])
                    && env.options().is_on(ShellOption::DirStack)
                    && name[1..].chars().all(|c| c.is_ascii_digit())
                {
                    if let Some(dir) = env.dirstack_entry(name) {
                        return Some((dir, consumed));
                    }
                }
            }
        }
    }

    let home = env.home_directory(name)?;
    let home = home.into_os_string().into_string().ok()?;
    Some((home, consumed))
}

/// Looks up a scalar variable, treating other values as unset.
fn scalar<E: Env>(env: &E, name: &str) -> Option<String> {
    match env.variable(name) {
        Lookup::Scalar(value) => Some(value),
        _ => None,
    }
}
