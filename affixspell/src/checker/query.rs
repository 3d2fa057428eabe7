//! The word-form recognition primitive behind the checker: direct root
//! lookup, single-layer affix stripping and compound decomposition.

use crate::affix::{Affix, AffixEntry, PrefixEntry};
use crate::compound::PartSequence;
use crate::config::AffixConfig;
use crate::constants::MAX_COMPOUND_PARTS;
use crate::dictionary::{Dictionary, WordEntry, WordEntryDetail};

/// Position of a part within a compound candidate.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CompoundPosition {
    Begin,
    Middle,
    End,
}

/// One recognition pass over a single candidate string.
pub(crate) struct Query<'a> {
    dict: &'a Dictionary,
}

impl<'a> Query<'a> {
    pub fn new(dict: &'a Dictionary) -> Query<'a> {
        Query { dict }
    }

    fn config(&self) -> &AffixConfig {
        self.dict.config()
    }

    /// Recognizes `word` as a listed root, an affixed form or a compound.
    ///
    /// A direct match on a forbidden root rejects the word outright and
    /// reports it through `forbidden`; no affix or compound interpretation
    /// is attempted for it.
    pub fn check_word(&self, word: &str, forbidden: &mut bool) -> Option<WordEntry> {
        if word.is_empty() {
            return None;
        }

        let details = self.dict.entry_details(word);
        if !details.is_empty() {
            let forbidden_flag = self.config().forbidden_word;
            if details.iter().any(|d| d.contains_flag(forbidden_flag)) {
                log::trace!("direct match on forbidden root: {:?}", word);
                *forbidden = true;
                return None;
            }
            return Some(WordEntry::new(word, details[0].clone()));
        }

        if let Some(entry) = self.affix_check(word) {
            return Some(entry);
        }

        if self.config().has_compound() {
            return self.compound_check(word);
        }

        None
    }

    fn affix_check(&self, word: &str) -> Option<WordEntry> {
        self.prefix_check(word)
            .or_else(|| self.suffix_check(word, None))
    }

    /// Strips one prefix; with cross-product permission also one suffix from
    /// the remaining stem.
    fn prefix_check(&self, word: &str) -> Option<WordEntry> {
        let config = self.config();

        for affix in config.prefixes.get_matching(word) {
            let stem = match affix.entry.strip_from(word) {
                Some(stem) if !stem.is_empty() => stem,
                _ => continue,
            };
            if !affix.entry.condition_matches(&stem) {
                continue;
            }

            // A circumfix-marked prefix only applies together with a
            // circumfix-marked suffix.
            let needs_suffix = affix.entry.cont_class().contains(config.circumfix);

            if !needs_suffix {
                for detail in self.dict.entry_details(&stem) {
                    if detail.contains_flag(affix.flag)
                        && !detail.contains_flag(config.forbidden_word)
                    {
                        return Some(WordEntry::new(stem.as_str(), detail.clone()));
                    }
                }
            }

            if affix.options.cross_product {
                if let Some(entry) = self.suffix_check(&stem, Some(&affix)) {
                    return Some(entry);
                }
            }
        }

        None
    }

    /// Strips one suffix, optionally on behalf of an already stripped prefix.
    fn suffix_check(
        &self,
        word: &str,
        prefix: Option<&Affix<'_, PrefixEntry>>,
    ) -> Option<WordEntry> {
        let config = self.config();
        let prefix_circumfixed = prefix
            .map(|p| p.entry.cont_class().contains(config.circumfix))
            .unwrap_or(false);

        for affix in config.suffixes.get_matching(word) {
            if let Some(prefix) = prefix {
                // Cross product must be permitted on both sides.
                if !affix.options.cross_product || !prefix.options.cross_product {
                    continue;
                }
            }

            // Circumfix marks must pair up across the two sides.
            let suffix_circumfixed = affix.entry.cont_class().contains(config.circumfix);
            if suffix_circumfixed != prefix_circumfixed {
                continue;
            }

            let stem = match affix.entry.strip_from(word) {
                Some(stem) if !stem.is_empty() => stem,
                _ => continue,
            };
            if !affix.entry.condition_matches(&stem) {
                continue;
            }

            for detail in self.dict.entry_details(&stem) {
                if detail.contains_flag(config.forbidden_word) {
                    continue;
                }

                // The suffix flag may come from the root or be contributed
                // by the prefix's continuation class; the prefix flag in
                // turn may be contributed by the suffix.
                let suffix_flag_ok = detail.contains_flag(affix.flag)
                    || prefix
                        .map(|p| p.entry.cont_class().contains(affix.flag))
                        .unwrap_or(false);
                if !suffix_flag_ok {
                    continue;
                }

                if let Some(prefix) = prefix {
                    let prefix_flag_ok = detail.contains_flag(prefix.flag)
                        || affix.entry.cont_class().contains(prefix.flag);
                    if !prefix_flag_ok {
                        continue;
                    }
                }

                return Some(WordEntry::new(stem.as_str(), detail.clone()));
            }
        }

        None
    }

    /// Decomposes `word` into two or more listed parts under the configured
    /// compounding policy.
    fn compound_check(&self, word: &str) -> Option<WordEntry> {
        let config = self.config();
        let min = config.compound_min_length();
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < min * 2 {
            return None;
        }

        let mut parts = PartSequence::new();
        self.try_compound(&chars, 0, 0, &mut parts, None)
    }

    fn part_eligible(&self, detail: &WordEntryDetail, position: CompoundPosition) -> bool {
        let config = self.config();
        if !config.compound_rules.is_empty() {
            return config.compound_rules.entry_contains_rule_flags(detail);
        }

        if detail.contains_flag(config.compound_flag)
            || detail.contains_flag(config.compound_root)
        {
            return true;
        }
        let positional = match position {
            CompoundPosition::Begin => config.compound_begin,
            CompoundPosition::Middle => config.compound_middle,
            CompoundPosition::End => config.compound_end,
        };
        detail.contains_flag(positional)
    }

    fn try_compound(
        &self,
        chars: &[char],
        start: usize,
        part_index: usize,
        parts: &mut PartSequence,
        head: Option<&str>,
    ) -> Option<WordEntry> {
        if part_index >= MAX_COMPOUND_PARTS {
            return None;
        }

        let config = self.config();
        let min = config.compound_min_length();
        let rules = &config.compound_rules;
        let use_rules = !rules.is_empty();

        for end in (start + min)..=chars.len() {
            let remaining = chars.len() - end;
            let is_last = remaining == 0;
            if !is_last && remaining < min {
                continue;
            }

            let part: String = chars[start..end].iter().collect();
            let position = if start == 0 {
                CompoundPosition::Begin
            } else if is_last {
                CompoundPosition::End
            } else {
                CompoundPosition::Middle
            };
            let head_root = head.unwrap_or(&part);

            let mut candidates: Vec<WordEntryDetail> = self.dict.entry_details(&part).to_vec();
            candidates.extend(self.compound_affixed_details(&part, position));

            for detail in &candidates {
                if detail.contains_flag(config.forbidden_word)
                    || detail.contains_flag(config.compound_forbid)
                {
                    continue;
                }
                if !self.part_eligible(detail, position) {
                    continue;
                }

                parts.set(part_index, detail.clone());

                // Viability prune: the parts so far must still be a prefix
                // of some rule before the split is explored further.
                if use_rules && !rules.compound_check(parts, part_index, false) {
                    parts.clear(part_index);
                    continue;
                }

                if is_last {
                    if part_index >= 1
                        && (!use_rules || rules.compound_check(parts, part_index, true))
                    {
                        return Some(WordEntry::new(head_root, detail.clone()));
                    }
                } else if let Some(entry) =
                    self.try_compound(chars, end, part_index + 1, parts, Some(head_root))
                {
                    return Some(entry);
                }

                parts.clear(part_index);
            }
        }

        None
    }

    /// Affixed forms of `part` usable inside a compound: a suffixed form at
    /// the end, a prefixed form at the beginning, or anywhere when the affix
    /// carries the compound-permit flag. Each returned detail unions the
    /// root flags with the affix continuation class.
    fn compound_affixed_details(
        &self,
        part: &str,
        position: CompoundPosition,
    ) -> Vec<WordEntryDetail> {
        let config = self.config();
        let mut found = Vec::new();

        for affix in config.suffixes.get_matching(part) {
            if (position == CompoundPosition::End
                || affix.entry.cont_class().contains(config.compound_permit))
                && !affix.entry.cont_class().contains(config.compound_forbid)
            {
                self.affixed_part_details(part, &affix, &mut found);
            }
        }
        for affix in config.prefixes.get_matching(part) {
            if (position == CompoundPosition::Begin
                || affix.entry.cont_class().contains(config.compound_permit))
                && !affix.entry.cont_class().contains(config.compound_forbid)
            {
                self.affixed_part_details(part, &affix, &mut found);
            }
        }

        found
    }

    fn affixed_part_details<E: AffixEntry>(
        &self,
        part: &str,
        affix: &Affix<'_, E>,
        found: &mut Vec<WordEntryDetail>,
    ) {
        let config = self.config();
        let stem = match affix.entry.strip_from(part) {
            Some(stem) if !stem.is_empty() => stem,
            _ => return,
        };
        if !affix.entry.condition_matches(&stem) {
            return;
        }
        for detail in self.dict.entry_details(&stem) {
            if detail.contains_flag(affix.flag) && !detail.contains_flag(config.forbidden_word) {
                found.push(WordEntryDetail::new(
                    detail.flags().union(affix.entry.cont_class()),
                    Vec::new(),
                ));
            }
        }
    }
}
