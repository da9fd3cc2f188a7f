//! Free-text person names split into first/middle/last name and initials.
//!
//! Bylines on bookseller sites mix Cyrillic and Latin names, with and
//! without initials, in either "Last First" or "First Last" order. The
//! parser classifies each token and resolves the order with a per-site
//! invert hint that lowercase particles ("де", "van", ...) flip.

use serde::{Deserialize, Serialize};

/// A structured person name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub initials: String,
}

impl Person {
    /// Parses a whitespace-separated name.
    ///
    /// `invert` is the starting assumption about word order: `false` means
    /// "Last First [Middle]", `true` means "First [Middle] Last". Every
    /// lowercase continuation token glued onto a preceding name-word flips it.
    pub fn parse(text: &str, invert: bool) -> Self {
        let mut person = Person::default();
        let mut invert = invert;
        let mut words: Vec<String> = Vec::new();
        let mut deferred = String::new();

        for token in text.split(' ').map(str::trim).filter(|t| !t.is_empty()) {
            let starts_upper = token.chars().next().is_some_and(char::is_uppercase);

            if starts_upper {
                if is_initials(token) {
                    person.initials.push_str(token);
                } else {
                    words.push(token.to_string());
                }
            } else if let Some(last) = words.last_mut() {
                last.push(' ');
                last.push_str(token);
                invert = !invert;
            } else {
                deferred = token.to_string();
            }
        }

        if !deferred.is_empty()
            && let Some(last) = words.last_mut()
        {
            last.push(' ');
            last.push_str(&deferred);
        }

        match words.len() {
            0 => {}
            1 => person.last_name = words.swap_remove(0),
            2 => {
                let (a, b) = (words[0].clone(), words[1].clone());
                if invert {
                    person.first_name = a;
                    person.last_name = b;
                } else {
                    person.last_name = a;
                    person.first_name = b;
                }
            }
            3 => {
                if invert {
                    person.first_name = words[0].clone();
                    person.middle_name = words[1].clone();
                    person.last_name = words[2].clone();
                } else {
                    person.last_name = words[0].clone();
                    person.first_name = words[1].clone();
                    person.middle_name = words[2].clone();
                }
            }
            n => {
                tracing::debug!(name = text, words = n, "long name, keeping extra words as middle name");
                if invert {
                    person.first_name = words[0].clone();
                    person.middle_name = words[1..n - 1].join(" ");
                    person.last_name = words[n - 1].clone();
                } else {
                    person.last_name = words[0].clone();
                    person.first_name = words[1].clone();
                    person.middle_name = words[2..].join(" ");
                }
            }
        }

        person
    }

    /// Human-readable rendering: `"Last Initials"` when only initials are
    /// known, `"Last, First"` otherwise.
    pub fn printable_name(&self) -> String {
        if self.first_name.is_empty() && !self.initials.is_empty() {
            format!("{} {}", self.last_name, self.initials)
        } else {
            format!("{}, {}", self.last_name, self.first_name)
        }
    }

    /// Returns true if no component was recognised.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty()
            && self.middle_name.is_empty()
            && self.last_name.is_empty()
            && self.initials.is_empty()
    }
}

/// `"A"`, `"A."` or `"A.B."` (counted in characters, not bytes).
fn is_initials(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    match chars.len() {
        1 => true,
        2 => chars[1] == '.',
        4 => chars[1] == '.' && chars[3] == '.',
        _ => false,
    }
}
