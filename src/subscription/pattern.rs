// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription patterns and event name matching.
//!
//! A pattern containing `*` or `?` is a glob matched against the whole event
//! name: `*` matches any sequence of characters (dots included) and `?`
//! matches exactly one character. Any other pattern is compared with the
//! event name for case-insensitive equality.

use std::fmt;
use std::str::FromStr;

use crate::error::SubscriptionError;

/// A validated subscription pattern.
///
/// # Examples
///
/// ```
/// use sensibo_lib::subscription::EventPattern;
///
/// let all = EventPattern::parse("Bedroom.*").unwrap();
/// assert!(all.matches("Bedroom.power"));
/// assert!(all.matches("Bedroom.cool.temp"));
/// assert!(!all.matches("Office.power"));
///
/// let exact = EventPattern::parse("bedroom.POWER").unwrap();
/// assert!(exact.matches("Bedroom.power"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventPattern {
    raw: String,
    folded: String,
    glob: bool,
}

impl EventPattern {
    /// Parses and validates a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::InvalidPattern`] if the pattern is empty,
    /// has leading or trailing whitespace, contains control characters, or
    /// has an empty dot-separated segment.
    pub fn parse(pattern: &str) -> Result<Self, SubscriptionError> {
        let invalid = |reason| SubscriptionError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if pattern.trim() != pattern {
            return Err(invalid("leading or trailing whitespace"));
        }
        if pattern.chars().any(char::is_control) {
            return Err(invalid("control character"));
        }
        if pattern.split('.').any(str::is_empty) {
            return Err(invalid("empty segment"));
        }

        Ok(Self {
            raw: pattern.to_string(),
            folded: pattern.to_lowercase(),
            glob: pattern.contains(['*', '?']),
        })
    }

    /// Returns the pattern as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the pattern uses wildcards.
    #[must_use]
    pub fn is_glob(&self) -> bool {
        self.glob
    }

    /// Tests an event name against this pattern.
    #[must_use]
    pub fn matches(&self, event_name: &str) -> bool {
        if self.glob {
            glob_match(&self.raw, event_name)
        } else {
            self.folded == event_name.to_lowercase()
        }
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for EventPattern {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Matches `text` against a glob where `*` is any run and `?` any character.
///
/// Backtracks to the most recent `*` on mismatch, so the cost is linear in
/// the common case and quadratic at worst.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` seen and the text index it is anchored to.
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p).copied() {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some(c) if c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
