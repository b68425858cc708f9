// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File and folder names derived from arbitrary entity names

/// Characters rejected in file names on at least one mainstream platform.
/// Control characters are rejected separately.
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn is_invalid(c: char) -> bool {
    c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c)
}

/// Replace every character that cannot appear in a file name with `-`
pub fn file_system_safe(name: &str) -> String {
    name.chars()
        .map(|c| if is_invalid(c) { '-' } else { c })
        .collect()
}

/// Escape `name`, then keep at most `max_chars` characters
pub fn shortened_entity_name(name: &str, max_chars: usize) -> String {
    file_system_safe(name).chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
