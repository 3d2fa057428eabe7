//! Per-polarity indexed collections of affix rules.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::affix::{AffixEntry, AffixEntryGroup, AffixEntryOptions, PrefixEntry, SuffixEntry};
use crate::flags::{FlagSet, FlagValue};

/// One candidate rule paired with its group's governing flag and options.
#[derive(Clone, Copy, Debug)]
pub struct Affix<'a, E> {
    pub entry: &'a E,
    pub flag: FlagValue,
    pub options: AffixEntryOptions,
}

/// Indexed collection over all groups of one polarity.
///
/// Entries with a bucketable key live under their anchor character; entries
/// with empty or dotted keys cannot be bucketed and sit in two fallback lists
/// scanned by predicate and merged into every result.
#[derive(Clone, Debug)]
pub struct AffixCollection<E> {
    by_flag: HashMap<FlagValue, AffixEntryGroup<E>>,
    by_anchor: HashMap<char, Vec<AffixEntryGroup<E>>>,
    with_dots: Vec<AffixEntryGroup<E>>,
    with_empty_keys: Vec<AffixEntryGroup<E>>,
    cont_classes: FlagSet,
}

/// Prefix rules indexed by the first character of their key.
pub type PrefixCollection = AffixCollection<PrefixEntry>;

/// Suffix rules indexed by the last character of their key.
pub type SuffixCollection = AffixCollection<SuffixEntry>;

impl<E: AffixEntry> AffixCollection<E> {
    /// An index with no rules; every lookup yields nothing.
    pub fn empty() -> Self {
        AffixCollection {
            by_flag: HashMap::new(),
            by_anchor: HashMap::new(),
            with_dots: Vec::new(),
            with_empty_keys: Vec::new(),
            cont_classes: FlagSet::empty(),
        }
    }

    /// Builds the index from affix groups; called once during load.
    pub fn build(groups: Vec<AffixEntryGroup<E>>) -> Self {
        let mut by_flag = HashMap::with_capacity(groups.len());
        let mut with_dots = Vec::new();
        let mut with_empty_keys = Vec::new();
        let mut cont_classes = FlagSet::empty();
        let mut anchored = Vec::new();

        for group in &groups {
            let mut dotted = Vec::new();
            let mut empty_keys = Vec::new();

            for entry in &group.entries {
                cont_classes = cont_classes.union(entry.cont_class());

                let key = entry.key();
                if key.is_empty() {
                    empty_keys.push(entry.clone());
                } else if key.contains('.') {
                    dotted.push(entry.clone());
                } else if let Some(anchor) = E::anchor_char(key) {
                    anchored.push((anchor, (group.a_flag, group.options, entry.clone())));
                }
            }

            if !empty_keys.is_empty() {
                with_empty_keys.push(AffixEntryGroup::new(
                    group.a_flag,
                    group.options,
                    empty_keys,
                ));
            }
            if !dotted.is_empty() {
                with_dots.push(AffixEntryGroup::new(group.a_flag, group.options, dotted));
            }
        }

        let by_anchor = anchored
            .into_iter()
            .into_group_map()
            .into_iter()
            .map(|(anchor, entries)| {
                let mut groups: Vec<AffixEntryGroup<E>> = Vec::new();
                for (a_flag, options, entry) in entries {
                    match groups.iter_mut().find(|g| g.a_flag == a_flag) {
                        Some(group) => group.entries.push(entry),
                        None => groups.push(AffixEntryGroup::new(a_flag, options, vec![entry])),
                    }
                }
                (anchor, groups)
            })
            .collect();

        for group in groups {
            by_flag.insert(group.a_flag, group);
        }

        AffixCollection {
            by_flag,
            by_anchor,
            with_dots,
            with_empty_keys,
            cont_classes,
        }
    }

    pub fn has_affixes(&self) -> bool {
        !self.by_flag.is_empty()
    }

    /// Union of every entry's continuation class, used for early pruning.
    pub fn cont_classes(&self) -> &FlagSet {
        &self.cont_classes
    }

    pub fn get_by_flag(&self, flag: FlagValue) -> Option<&AffixEntryGroup<E>> {
        self.by_flag.get(&flag)
    }

    /// Allocation-light iteration over the groups governed by any of the
    /// given flags, used to confirm a stripped root carries a required
    /// continuation flag.
    pub fn get_by_flags<'a>(
        &'a self,
        flags: &'a FlagSet,
    ) -> impl Iterator<Item = &'a AffixEntryGroup<E>> + 'a {
        flags.iter().filter_map(move |flag| self.by_flag.get(&flag))
    }

    /// Candidates from the empty-key fallback groups governed by any of the
    /// given flags.
    pub fn affixes_with_empty_keys_and_flag<'a>(
        &'a self,
        flags: &'a FlagSet,
    ) -> impl Iterator<Item = Affix<'a, E>> + 'a {
        self.with_empty_keys
            .iter()
            .filter(move |group| flags.contains(group.a_flag))
            .flat_map(|group| {
                group.entries.iter().map(move |entry| Affix {
                    entry,
                    flag: group.a_flag,
                    options: group.options,
                })
            })
    }

    /// Enumerates every candidate whose anchor and key could apply to `word`.
    ///
    /// The caller still has to test the remaining-stem condition; no match is
    /// an empty result, never an error.
    pub fn get_matching<'a>(&'a self, word: &str) -> Vec<Affix<'a, E>> {
        let mut results = Vec::new();
        if word.is_empty() {
            return results;
        }

        if let Some(groups) = E::word_anchor(word).and_then(|c| self.by_anchor.get(&c)) {
            for group in groups {
                for entry in &group.entries {
                    if E::key_matches(entry.key(), word) {
                        results.push(Affix {
                            entry,
                            flag: group.a_flag,
                            options: group.options,
                        });
                    }
                }
            }
        }

        for group in self.with_dots.iter().chain(self.with_empty_keys.iter()) {
            for entry in &group.entries {
                if E::key_matches(entry.key(), word) {
                    results.push(Affix {
                        entry,
                        flag: group.a_flag,
                        options: group.options,
                    });
                }
            }
        }

        results
    }
}

impl<E: AffixEntry> Default for AffixCollection<E> {
    fn default() -> Self {
        AffixCollection::empty()
    }
}
