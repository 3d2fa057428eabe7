//! The root-word store: homonym details, the dictionary and its builder.

use std::sync::Arc;

use hashbrown::HashMap;
use smol_str::SmolStr;

use crate::checker::{CheckResult, Checker};
use crate::config::AffixConfig;
use crate::constants::MAX_WORD_LEN;
use crate::flags::{FlagSet, FlagValue};
use crate::trie::StringTrie;

/// Flags and morphological tags of one homonym of a root.
///
/// Cheap to clone; both members are shared slices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordEntryDetail {
    flags: FlagSet,
    morphs: Arc<[SmolStr]>,
}

impl WordEntryDetail {
    pub fn new(flags: FlagSet, morphs: Vec<SmolStr>) -> WordEntryDetail {
        WordEntryDetail {
            flags,
            morphs: Arc::from(morphs),
        }
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn morphs(&self) -> &[SmolStr] {
        &self.morphs
    }

    #[inline(always)]
    pub fn has_flags(&self) -> bool {
        self.flags.has_items()
    }

    #[inline(always)]
    pub fn contains_flag(&self, flag: FlagValue) -> bool {
        self.flags.contains(flag)
    }
}

impl From<FlagSet> for WordEntryDetail {
    fn from(flags: FlagSet) -> Self {
        WordEntryDetail {
            flags,
            morphs: Arc::from(Vec::new()),
        }
    }
}

/// A matched root together with the homonym detail that matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub root: SmolStr,
    pub detail: WordEntryDetail,
}

impl WordEntry {
    pub fn new(root: impl Into<SmolStr>, detail: WordEntryDetail) -> WordEntry {
        WordEntry {
            root: root.into(),
            detail,
        }
    }
}

/// Immutable dictionary: configuration plus the double-indexed root store.
///
/// Roots live both in a hash map for the exact lookups of the hot check path
/// and in a trie for bounded-depth enumeration by suggestion collaborators.
/// Safe to share across threads once built.
#[derive(Clone, Debug)]
pub struct Dictionary {
    config: AffixConfig,
    entries: HashMap<SmolStr, Arc<[WordEntryDetail]>>,
    trie: StringTrie<Arc<[WordEntryDetail]>>,
}

impl Dictionary {
    pub fn config(&self) -> &AffixConfig {
        &self.config
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.entries.len()
    }

    /// All homonym details of a root, empty for unknown roots.
    pub fn entry_details(&self, root: &str) -> &[WordEntryDetail] {
        self.entries.get(root).map(|d| &d[..]).unwrap_or(&[])
    }

    pub fn contains_root(&self, root: &str) -> bool {
        self.entries.contains_key(root)
    }

    /// Breadth-first enumeration of roots of at most `max_depth` characters.
    pub fn roots_within_depth(
        &self,
        max_depth: usize,
    ) -> impl Iterator<Item = (SmolStr, &[WordEntryDetail])> + '_ {
        self.trie
            .iter_within_depth(max_depth)
            .map(|(root, details)| (root, &details[..]))
    }

    /// Whether `word` is spelled correctly.
    pub fn check(&self, word: &str) -> bool {
        self.check_details(word).correct
    }

    /// Full checking verdict for `word`.
    pub fn check_details(&self, word: &str) -> CheckResult {
        Checker::new(self).check_details(word)
    }
}

/// Accumulates roots and homonym details, then freezes them into a
/// [`Dictionary`].
#[derive(Debug)]
pub struct DictionaryBuilder {
    config: AffixConfig,
    entries: HashMap<SmolStr, Vec<WordEntryDetail>>,
}

impl DictionaryBuilder {
    pub fn new(config: AffixConfig) -> DictionaryBuilder {
        DictionaryBuilder {
            config,
            entries: HashMap::new(),
        }
    }

    /// Adds one homonym detail for `word`. Unusable words (empty, or longer
    /// than the engine limit) are skipped with a warning rather than
    /// poisoning the whole load.
    pub fn add(&mut self, word: &str, detail: WordEntryDetail) -> bool {
        if word.is_empty() {
            log::warn!("skipping empty dictionary entry");
            return false;
        }
        if word.chars().count() > MAX_WORD_LEN {
            log::warn!("skipping overlong dictionary entry: {:.24}…", word);
            return false;
        }

        let details = self.entries.entry(SmolStr::new(word)).or_default();
        if !details.contains(&detail) {
            details.push(detail);
        }
        true
    }

    /// Adds a flagless root.
    pub fn add_root(&mut self, word: &str) -> bool {
        self.add(word, WordEntryDetail::default())
    }

    pub fn add_with_flags(&mut self, word: &str, flags: FlagSet) -> bool {
        self.add(word, WordEntryDetail::from(flags))
    }

    /// Adds a root whose flags are a 1-based reference into the alias table.
    /// An out-of-range reference skips the entry with a warning.
    pub fn add_with_alias(&mut self, word: &str, alias_index: usize) -> bool {
        match self.config.flag_alias(alias_index) {
            Some(flags) => self.add(word, WordEntryDetail::from(flags.clone())),
            None => {
                log::warn!(
                    "skipping entry {:?}: flag alias index {} is out of range",
                    word,
                    alias_index
                );
                false
            }
        }
    }

    pub fn build(self) -> Dictionary {
        let mut entries = HashMap::with_capacity(self.entries.len());
        let mut trie = StringTrie::new();

        for (root, details) in self.entries {
            let details: Arc<[WordEntryDetail]> = Arc::from(details);
            trie.insert(&root, Arc::clone(&details));
            entries.insert(root, details);
        }

        Dictionary {
            config: self.config,
            entries,
            trie,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagValue;

    fn flags(values: &[u16]) -> FlagSet {
        FlagSet::new(values.iter().map(|v| FlagValue(*v)).collect())
    }

    #[test]
    fn homonyms_accumulate_without_duplicates() {
        let mut builder = DictionaryBuilder::new(AffixConfig::default());
        assert!(builder.add_with_flags("bat", flags(&[1])));
        assert!(builder.add_with_flags("bat", flags(&[2])));
        assert!(builder.add_with_flags("bat", flags(&[1])));

        let dict = builder.build();
        assert_eq!(dict.root_count(), 1);
        assert_eq!(dict.entry_details("bat").len(), 2);
        assert!(dict.contains_root("bat"));
        assert!(!dict.contains_root("bats"));
        assert!(dict.entry_details("cat").is_empty());
    }

    #[test]
    fn unusable_words_are_skipped() {
        let mut builder = DictionaryBuilder::new(AffixConfig::default());
        assert!(!builder.add_root(""));
        let long: String = std::iter::repeat('a').take(MAX_WORD_LEN + 1).collect();
        assert!(!builder.add_root(&long));
        assert!(builder.add_root("ok"));

        let dict = builder.build();
        assert_eq!(dict.root_count(), 1);
    }

    #[test]
    fn alias_references_resolve_one_based() {
        let config = AffixConfig {
            flag_aliases: vec![flags(&[10]), flags(&[20, 21])],
            ..AffixConfig::default()
        };
        let mut builder = DictionaryBuilder::new(config);
        assert!(builder.add_with_alias("one", 1));
        assert!(builder.add_with_alias("two", 2));
        assert!(!builder.add_with_alias("bad", 3));
        assert!(!builder.add_with_alias("worse", 0));

        let dict = builder.build();
        assert!(dict.entry_details("one")[0].contains_flag(FlagValue(10)));
        assert!(dict.entry_details("two")[0].contains_flag(FlagValue(21)));
        assert!(dict.entry_details("bad").is_empty());
    }

    #[test]
    fn bounded_root_enumeration() {
        let mut builder = DictionaryBuilder::new(AffixConfig::default());
        for root in ["a", "ab", "abc", "abcd"] {
            builder.add_root(root);
        }
        let dict = builder.build();

        let mut roots: Vec<String> = dict
            .roots_within_depth(3)
            .map(|(root, _)| root.to_string())
            .collect();
        roots.sort();
        assert_eq!(roots, vec!["a", "ab", "abc"]);
    }
}
