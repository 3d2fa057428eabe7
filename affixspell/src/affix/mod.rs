//! Affix rules: prefix and suffix entries, their groups and indexes.
//!
//! The two polarities share structure through the [`AffixEntry`] trait; the
//! anchor side (which end of the key buckets the entry, and which end of a
//! word the key is tested against) is the only thing that differs.

use smol_str::SmolStr;

use crate::condition::CharacterConditionGroup;
use crate::flags::{FlagSet, FlagValue};

mod collection;

pub use collection::{Affix, AffixCollection, PrefixCollection, SuffixCollection};

/// Cross-product option of an affix group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AffixEntryOptions {
    /// Entries of this group may combine with the opposite polarity.
    pub cross_product: bool,
}

impl AffixEntryOptions {
    pub fn cross_product() -> AffixEntryOptions {
        AffixEntryOptions {
            cross_product: true,
        }
    }
}

/// Shared shape of prefix and suffix rules.
pub trait AffixEntry: Clone {
    /// Affix text anchor tested against the word; `.` in a key matches any
    /// single character.
    fn key(&self) -> &str;
    /// Text removed from the stem before the append was attached.
    fn strip(&self) -> &str;
    /// Text the affix attaches to the stem.
    fn append(&self) -> &str;
    /// Condition tested against the remaining stem.
    fn condition(&self) -> &CharacterConditionGroup;
    /// Flags the derived form may still combine with.
    fn cont_class(&self) -> &FlagSet;
    /// Morphological tags, if any.
    fn morphs(&self) -> &[SmolStr];

    /// Bucket character of a key, `None` for empty keys.
    fn anchor_char(key: &str) -> Option<char>;
    /// Bucket character of a candidate word, `None` for empty words.
    fn word_anchor(word: &str) -> Option<char>;
    /// Anchored, wildcard-aware test of the key against a word.
    fn key_matches(key: &str, word: &str) -> bool;

    /// Removes this affix from `word` and restores the strip text, returning
    /// the candidate stem. `None` when the key does not match.
    fn strip_from(&self, word: &str) -> Option<String>;
    /// Anchored condition test against a candidate stem.
    fn condition_matches(&self, stem: &str) -> bool;
}

/// A rule removing `strip` from the start of a root and attaching `append`.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixEntry {
    key: SmolStr,
    strip: SmolStr,
    append: SmolStr,
    condition: CharacterConditionGroup,
    cont_class: FlagSet,
    morphs: Vec<SmolStr>,
}

/// A rule removing `strip` from the end of a root and attaching `append`.
#[derive(Clone, Debug, PartialEq)]
pub struct SuffixEntry {
    key: SmolStr,
    strip: SmolStr,
    append: SmolStr,
    condition: CharacterConditionGroup,
    cont_class: FlagSet,
    morphs: Vec<SmolStr>,
}

macro_rules! entry_constructors {
    ($name:ident) => {
        impl $name {
            pub fn new(
                strip: &str,
                append: &str,
                condition: CharacterConditionGroup,
                cont_class: FlagSet,
            ) -> $name {
                $name {
                    key: SmolStr::new(append),
                    strip: SmolStr::new(strip),
                    append: SmolStr::new(append),
                    condition,
                    cont_class,
                    morphs: Vec::new(),
                }
            }

            pub fn with_morphs(mut self, morphs: Vec<SmolStr>) -> $name {
                self.morphs = morphs;
                self
            }
        }
    };
}

entry_constructors!(PrefixEntry);
entry_constructors!(SuffixEntry);

impl AffixEntry for PrefixEntry {
    fn key(&self) -> &str {
        &self.key
    }

    fn strip(&self) -> &str {
        &self.strip
    }

    fn append(&self) -> &str {
        &self.append
    }

    fn condition(&self) -> &CharacterConditionGroup {
        &self.condition
    }

    fn cont_class(&self) -> &FlagSet {
        &self.cont_class
    }

    fn morphs(&self) -> &[SmolStr] {
        &self.morphs
    }

    fn anchor_char(key: &str) -> Option<char> {
        key.chars().next()
    }

    fn word_anchor(word: &str) -> Option<char> {
        word.chars().next()
    }

    fn key_matches(key: &str, word: &str) -> bool {
        leading_subset(key, word)
    }

    fn strip_from(&self, word: &str) -> Option<String> {
        if !leading_subset(&self.key, word) {
            return None;
        }
        let key_chars = self.key.chars().count();
        let cut = word
            .char_indices()
            .nth(key_chars)
            .map(|(i, _)| i)
            .unwrap_or(word.len());

        let mut stem = String::with_capacity(self.strip.len() + word.len() - cut);
        stem.push_str(&self.strip);
        stem.push_str(&word[cut..]);
        Some(stem)
    }

    fn condition_matches(&self, stem: &str) -> bool {
        self.condition.is_starting_match(stem)
    }
}

impl AffixEntry for SuffixEntry {
    fn key(&self) -> &str {
        &self.key
    }

    fn strip(&self) -> &str {
        &self.strip
    }

    fn append(&self) -> &str {
        &self.append
    }

    fn condition(&self) -> &CharacterConditionGroup {
        &self.condition
    }

    fn cont_class(&self) -> &FlagSet {
        &self.cont_class
    }

    fn morphs(&self) -> &[SmolStr] {
        &self.morphs
    }

    fn anchor_char(key: &str) -> Option<char> {
        key.chars().next_back()
    }

    fn word_anchor(word: &str) -> Option<char> {
        word.chars().next_back()
    }

    fn key_matches(key: &str, word: &str) -> bool {
        trailing_subset(key, word)
    }

    fn strip_from(&self, word: &str) -> Option<String> {
        if !trailing_subset(&self.key, word) {
            return None;
        }
        let key_chars = self.key.chars().count();
        let word_chars = word.chars().count();
        let cut = word
            .char_indices()
            .nth(word_chars - key_chars)
            .map(|(i, _)| i)
            .unwrap_or(word.len());

        let mut stem = String::with_capacity(cut + self.strip.len());
        stem.push_str(&word[..cut]);
        stem.push_str(&self.strip);
        Some(stem)
    }

    fn condition_matches(&self, stem: &str) -> bool {
        self.condition.is_ending_match(stem)
    }
}

/// True when `word` starts with `key`, treating `.` in the key as a
/// single-character wildcard.
fn leading_subset(key: &str, word: &str) -> bool {
    let mut word_chars = word.chars();
    for k in key.chars() {
        match word_chars.next() {
            Some(w) if k == '.' || k == w => {}
            _ => return false,
        }
    }
    true
}

/// True when `word` ends with `key`, treating `.` in the key as a
/// single-character wildcard.
fn trailing_subset(key: &str, word: &str) -> bool {
    let mut word_chars = word.chars().rev();
    for k in key.chars().rev() {
        match word_chars.next() {
            Some(w) if k == '.' || k == w => {}
            _ => return false,
        }
    }
    true
}

/// Entries sharing one governing flag and one set of options.
#[derive(Clone, Debug)]
pub struct AffixEntryGroup<E> {
    /// The flag a root must carry (directly or through a continuation class)
    /// for entries of this group to apply.
    pub a_flag: FlagValue,
    pub options: AffixEntryOptions,
    pub entries: Vec<E>,
}

impl<E> AffixEntryGroup<E> {
    pub fn new(a_flag: FlagValue, options: AffixEntryOptions, entries: Vec<E>) -> Self {
        AffixEntryGroup {
            a_flag,
            options,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_any() -> CharacterConditionGroup {
        CharacterConditionGroup::allow_any_single()
    }

    #[test]
    fn suffix_strip_from_restores_strip_text() {
        let entry = SuffixEntry::new("y", "ies", allow_any(), FlagSet::empty());
        assert_eq!(entry.strip_from("bodies").as_deref(), Some("body"));
        assert_eq!(entry.strip_from("body"), None);
    }

    #[test]
    fn prefix_strip_from() {
        let entry = PrefixEntry::new("", "un", allow_any(), FlagSet::empty());
        assert_eq!(entry.strip_from("unclear").as_deref(), Some("clear"));
        assert_eq!(entry.strip_from("clear"), None);
    }

    #[test]
    fn dotted_keys_match_any_character() {
        assert!(trailing_subset("e.", "set"));
        assert!(!trailing_subset("e.", "sat"));
        assert!(leading_subset(".n", "unclear"));
        assert!(!leading_subset(".n", "clear"));
    }

    #[test]
    fn empty_key_matches_everything() {
        assert!(leading_subset("", "word"));
        assert!(trailing_subset("", "word"));
        assert!(leading_subset("", ""));
    }

    #[test]
    fn key_longer_than_word_never_matches() {
        assert!(!leading_subset("abc", "ab"));
        assert!(!trailing_subset("abc", "bc"));
    }

    #[test]
    fn condition_is_anchored_per_polarity() {
        let suffix = SuffixEntry::new(
            "",
            "s",
            CharacterConditionGroup::parse("[^s]"),
            FlagSet::empty(),
        );
        assert!(suffix.condition_matches("cat"));
        assert!(!suffix.condition_matches("glass"));

        let prefix = PrefixEntry::new(
            "",
            "re",
            CharacterConditionGroup::parse("[^e]"),
            FlagSet::empty(),
        );
        assert!(prefix.condition_matches("do"));
        assert!(!prefix.condition_matches("echo"));
    }
}
