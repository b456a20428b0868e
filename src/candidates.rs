//! Dictionary of password candidates.

use std::collections::HashSet;

/// Upper bound on the number of candidates tried per document.
pub const MAX_CANDIDATES: usize = 200;

/// Suffixes appended to every non-empty base password.
pub const SUFFIXES: &[&str] = &["!", "@", "#", "$", "123", "456", "789"];

/// Common passwords the dictionary is built from.
pub const BASE_PASSWORDS: &[&str] = &[
    "", "123456", "password", "12345678", "qwerty", "123456789", "12345", "1234", "111111",
    "1234567", "dragon", "123123", "admin", "welcome", "monkey", "letmein", "password1", "abc123",
    "123", "login", // most common worldwide
    "passw0rd", "master", "hello", "test", "demo", "admin123", "letmein123", "welcome123",
    "password123", "123qwe", "1q2w3e4r", "qazwsx", "password@123", // variations
    "2020", "2021", "2022", "2023", "2024", "2025", "2019", "2018", "2017", // years
    "sunshine", "iloveyou", "trustno1", "superman", "mustang", "football", "baseball",
    "starwars", "computer", "corona2020", "covid19", // words
    "company", "business", "work", "office", "home", "user", "client", "customer", "member",
    "guest", "employee", "staff", "manager", "director", "owner", // office
    "changeme", "default", "temp", "temp123", "pass", "access", "secret", "private", "god",
    "love", // defaults
];

/// Ordered, deduplicated and capped list of passwords to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    entries: Vec<String>,
}

impl CandidateList {
    /// Build the list from `base`.
    ///
    /// The empty password comes first, then every base password as-is, then
    /// the uppercased forms, then each suffix applied across the whole base.
    /// Duplicates keep their first position and the list stops growing at
    /// [`MAX_CANDIDATES`].
    pub fn from_base(base: &[&str]) -> Self {
        let words: Vec<&str> = base.iter().copied().filter(|w| !w.is_empty()).collect();
        let mut builder = Builder::default();

        builder.push(String::new());
        for word in &words {
            builder.push((*word).to_string());
        }
        for word in &words {
            builder.push(word.to_uppercase());
        }
        for suffix in SUFFIXES {
            for word in &words {
                builder.push(format!("{word}{suffix}"));
            }
        }

        Self {
            entries: builder.entries,
        }
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no candidates at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates in trial order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The candidate tried at zero-based `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Position of `password` in trial order.
    pub fn position(&self, password: &str) -> Option<usize> {
        self.entries.iter().position(|c| c == password)
    }

    pub fn contains(&self, password: &str) -> bool {
        self.position(password).is_some()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        let as_str: fn(&'a String) -> &'a str = String::as_str;
        self.entries.iter().map(as_str)
    }
}

#[derive(Default)]
struct Builder {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl Builder {
    fn push(&mut self, candidate: String) {
        if self.entries.len() >= MAX_CANDIDATES || self.seen.contains(&candidate) {
            return;
        }
        self.seen.insert(candidate.clone());
        self.entries.push(candidate);
    }
}

/// The built-in dictionary derived from [`BASE_PASSWORDS`].
pub fn generate_candidates() -> CandidateList {
    CandidateList::from_base(BASE_PASSWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_password_is_tried_first() {
        let list = generate_candidates();
        assert_eq!(list.get(0), Some(""));
    }

    #[test]
    fn built_in_list_is_capped_and_unique() {
        let list = generate_candidates();
        assert_eq!(list.len(), MAX_CANDIDATES);
        let unique: HashSet<&str> = list.iter().collect();
        assert_eq!(unique.len(), list.len());
    }

    #[test]
    fn every_base_password_survives_the_cap() {
        let list = generate_candidates();
        for word in BASE_PASSWORDS {
            assert!(list.contains(word), "missing base password {word:?}");
        }
    }

    #[test]
    fn plain_words_precede_their_mutations() {
        let list = generate_candidates();
        let plain = list.position("dragon").unwrap();
        let upper = list.position("DRAGON").unwrap();
        let bang = list.position("dragon!").unwrap();
        assert!(plain < upper && upper < bang);
    }

    #[test]
    fn numeric_uppercase_is_not_duplicated() {
        let list = CandidateList::from_base(&["1234"]);
        let expected: Vec<&str> = vec![
            "", "1234", "1234!", "1234@", "1234#", "1234$", "1234123", "1234456", "1234789",
        ];
        assert_eq!(list.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate_candidates(), generate_candidates());
    }

    #[test]
    fn known_password_index() {
        let list = generate_candidates();
        assert_eq!(list.position("1234"), Some(7));
        assert!(!list.contains("Zx9#Qw"));
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_base(base in prop::collection::vec("[ -~]{0,12}", 0..80)) {
            let refs: Vec<&str> = base.iter().map(String::as_str).collect();
            let list = CandidateList::from_base(&refs);

            prop_assert!(list.len() <= MAX_CANDIDATES);
            prop_assert_eq!(list.get(0), Some(""));

            let unique: HashSet<&str> = list.iter().collect();
            prop_assert_eq!(unique.len(), list.len());

            for candidate in &list {
                prop_assert!(candidate.chars().all(|c| c.is_ascii_graphic() || c == ' '));
            }

            prop_assert_eq!(CandidateList::from_base(&refs), list);
        }
    }
}
