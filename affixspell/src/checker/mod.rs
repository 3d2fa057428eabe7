//! The capitalization-aware check orchestrator.
//!
//! `check_details` runs the full pipeline: input conversion, cleaning,
//! capitalization dispatch over the recognition primitive in [`query`], and
//! finally the break-point search. Checking never fails; an unusable input is
//! simply not correct.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::config::AffixConfig;
use crate::constants::{
    DEFAULT_XML_TOKEN, MAX_BREAK_DEPTH, MAX_BREAK_OCCURRENCES, MAX_SHARPS, MAX_WORD_LEN,
};
use crate::dictionary::{Dictionary, WordEntry};

pub mod case_handling;
mod query;

pub use case_handling::Capitalization;

use case_handling::{classify, lower_case, make_init_cap, make_init_small};
use query::Query;

/// Verdict of a single check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the word is spelled correctly.
    pub correct: bool,
    /// The matched root, after output conversion.
    pub root: Option<SmolStr>,
    /// The matched root is rare and probably a mistake.
    pub warn: bool,
    /// The word is explicitly forbidden.
    pub forbidden: bool,
    /// Capitalization shape of the input.
    pub capitalization: Capitalization,
    /// The match was found through a recapitalized candidate rather than
    /// the input spelling itself.
    pub init_cap: bool,
}

impl CheckResult {
    fn incorrect() -> CheckResult {
        CheckResult {
            correct: false,
            root: None,
            warn: false,
            forbidden: false,
            capitalization: Capitalization::None,
            init_cap: false,
        }
    }

    fn accepted() -> CheckResult {
        CheckResult {
            correct: true,
            ..CheckResult::incorrect()
        }
    }
}

#[derive(Default)]
struct CheckState {
    forbidden: bool,
    case_variant: bool,
}

/// Checks words against one dictionary.
#[derive(Clone, Copy, Debug)]
pub struct Checker<'a> {
    dict: &'a Dictionary,
}

impl<'a> Checker<'a> {
    pub fn new(dict: &'a Dictionary) -> Checker<'a> {
        Checker { dict }
    }

    fn config(&self) -> &AffixConfig {
        self.dict.config()
    }

    /// Whether `word` is spelled correctly.
    pub fn check(&self, word: &str) -> bool {
        self.check_details(word).correct
    }

    /// Full verdict for `word`.
    pub fn check_details(&self, word: &str) -> CheckResult {
        self.check_details_at(word, 0)
    }

    fn check_details_at(&self, word: &str, depth: usize) -> CheckResult {
        let mut result = CheckResult::incorrect();
        if word.is_empty()
            || word.chars().count() > MAX_WORD_LEN
            || !self.dict.has_entries()
        {
            return result;
        }
        if word == DEFAULT_XML_TOKEN {
            return CheckResult::accepted();
        }

        let config = self.config();
        let converted = config.input_conversions.try_convert(word);
        let word = converted.as_deref().unwrap_or(word);

        let (cleaned, abbreviation_dots) = self.clean_word(word);
        if cleaned.is_empty() {
            return result;
        }

        result.capitalization = classify(&cleaned);
        if is_numeric_word(&cleaned) {
            result.correct = true;
            return result;
        }

        let mut state = CheckState::default();
        let entry = self.check_by_capitalization(
            &cleaned,
            abbreviation_dots,
            result.capitalization,
            &mut state,
        );

        if let Some(entry) = entry {
            result.correct = true;
            result.init_cap = state.case_variant;
            if entry.detail.contains_flag(config.warn) {
                result.warn = true;
                if config.forbid_warn {
                    result.correct = false;
                }
            }
            result.root = Some(
                config
                    .output_conversions
                    .try_convert(&entry.root)
                    .map(SmolStr::new)
                    .unwrap_or(entry.root),
            );
            return result;
        }

        if state.forbidden {
            result.forbidden = true;
            return result;
        }

        // A word containing a pathological number of break points is
        // refused rather than searched.
        if depth < MAX_BREAK_DEPTH
            && config.breaks.has_items()
            && config.breaks.occurrence_count(&cleaned) < MAX_BREAK_OCCURRENCES
            && self.try_breaks(&cleaned, depth)
        {
            result.correct = true;
        }
        result
    }

    fn check_by_capitalization(
        &self,
        word: &str,
        abbv: usize,
        capitalization: Capitalization,
        state: &mut CheckState,
    ) -> Option<WordEntry> {
        match capitalization {
            Capitalization::None | Capitalization::Huh => self.word_with_abbv(word, abbv, state),
            Capitalization::HuhInit => {
                self.word_with_abbv(word, abbv, state).or_else(|| {
                    if state.forbidden {
                        return None;
                    }
                    // TheSmallCaps -> theSmallCaps
                    let small = make_init_small(word, &self.config().case_convention);
                    let entry = self.word_with_abbv(&small, abbv, state);
                    if entry.is_some() {
                        state.case_variant = true;
                    }
                    entry
                })
            }
            Capitalization::Init => self.check_init_cap(word, abbv, false, state),
            Capitalization::All => self.check_all_cap(word, abbv, state).or_else(|| {
                if state.forbidden {
                    return None;
                }
                self.check_init_cap(word, abbv, true, state)
            }),
        }
    }

    /// One recognition attempt, retried with a single restored trailing dot
    /// when the input looked like an abbreviation.
    fn word_with_abbv(&self, word: &str, abbv: usize, state: &mut CheckState) -> Option<WordEntry> {
        let query = Query::new(self.dict);
        match query.check_word(word, &mut state.forbidden) {
            Some(entry) => Some(entry),
            None if abbv > 0 && !state.forbidden => {
                let mut dotted = String::with_capacity(word.len() + 1);
                dotted.push_str(word);
                dotted.push('.');
                query.check_word(&dotted, &mut state.forbidden)
            }
            None => None,
        }
    }

    /// Init-cap handling, shared by the `Init` branch and the all-caps
    /// fallback. Tries the capitalized form, then the fully lowered form,
    /// honoring keep-case and the Turkic dotted-I guard.
    fn check_init_cap(
        &self,
        word: &str,
        abbv: usize,
        from_all_cap: bool,
        state: &mut CheckState,
    ) -> Option<WordEntry> {
        let config = self.config();
        let convention = &config.case_convention;

        let lower = lower_case(word, convention);
        let cap = if from_all_cap {
            make_init_cap(&lower, convention)
        } else {
            word.to_string()
        };

        if let Some(entry) = self.word_with_abbv(&cap, abbv, state) {
            // A keep-case root is not valid in a recapitalized form.
            if !(from_all_cap && entry.detail.contains_flag(config.keep_case)) {
                state.case_variant |= cap != word;
                return Some(entry);
            }
        }
        if state.forbidden {
            return None;
        }

        // Without dotted-I casing a leading İ has no lowercase counterpart
        // the dictionary could contain.
        if !convention.dotted_i && word.starts_with('İ') {
            return None;
        }

        if let Some(entry) = self.word_with_abbv(&lower, abbv, state) {
            if entry.detail.contains_flag(config.keep_case) {
                // Keep-case roots with ß stay valid in capitalized forms
                // when sharp-s checking is on.
                let sharps_exception = config.check_sharps && lower.contains('ß');
                if from_all_cap || !sharps_exception {
                    return None;
                }
            }
            state.case_variant = true;
            return Some(entry);
        }

        None
    }

    /// The all-caps specific attempts: the literal word, the apostrophe
    /// heuristic and sharp-s expansion.
    fn check_all_cap(&self, word: &str, abbv: usize, state: &mut CheckState) -> Option<WordEntry> {
        let config = self.config();
        let convention = &config.case_convention;

        if let Some(entry) = self.word_with_abbv(word, abbv, state) {
            return Some(entry);
        }
        if state.forbidden {
            return None;
        }

        // SANT'ELIA -> sant'Elia, then Sant'Elia.
        let lowered = lower_case(word, convention);
        if let Some(pos) = lowered.find('\'') {
            let tail = &lowered[pos + 1..];
            if !tail.is_empty() {
                let mut candidate = String::with_capacity(lowered.len());
                candidate.push_str(&lowered[..pos + 1]);
                candidate.push_str(&make_init_cap(tail, convention));
                let whole = make_init_cap(&candidate, convention);
                for candidate in [candidate, whole] {
                    if let Some(entry) = self.word_with_abbv(&candidate, abbv, state) {
                        state.case_variant = true;
                        return Some(entry);
                    }
                    if state.forbidden {
                        return None;
                    }
                }
            }
        }

        if config.check_sharps && word.contains("SS") {
            let lower = lowered;
            let init = make_init_cap(&lower, convention);
            let mut candidates = vec![lower.clone(), init.clone()];
            if abbv > 0 {
                candidates.push(format!("{}.", lower));
                candidates.push(format!("{}.", init));
            }
            for candidate in candidates {
                let mut base = candidate;
                if let Some(entry) = self.spell_sharps(&mut base, 0, 0, 0, state) {
                    state.case_variant = true;
                    return Some(entry);
                }
                if state.forbidden {
                    return None;
                }
            }
        }

        None
    }

    /// Recursively substitutes `ß` for occurrences of `ss`, checking every
    /// combination with at least one substitution.
    fn spell_sharps(
        &self,
        base: &mut String,
        position: usize,
        depth: usize,
        replacements: usize,
        state: &mut CheckState,
    ) -> Option<WordEntry> {
        let found = base[position..].find("ss").map(|i| i + position);
        match found {
            Some(at) if depth < MAX_SHARPS => {
                // "ß" and "ss" are both two bytes in UTF-8, so the splice
                // keeps positions stable.
                base.replace_range(at..at + 2, "ß");
                if let Some(entry) =
                    self.spell_sharps(base, at + 2, depth + 1, replacements + 1, state)
                {
                    return Some(entry);
                }
                base.replace_range(at..at + 2, "ss");
                self.spell_sharps(base, at + 2, depth + 1, replacements, state)
            }
            _ if replacements > 0 => Query::new(self.dict).check_word(base, &mut state.forbidden),
            _ => None,
        }
    }

    /// Splits the word at configured break points and re-checks the parts.
    fn try_breaks(&self, word: &str, depth: usize) -> bool {
        let config = self.config();

        // Boundary-anchored patterns strip one end of the word.
        for pattern in config.breaks.iter() {
            if let Some(rest) = pattern.strip_prefix('^') {
                if !rest.is_empty()
                    && word.len() > rest.len()
                    && word.starts_with(rest)
                    && self.check_details_at(&word[rest.len()..], depth + 1).correct
                {
                    return true;
                }
            } else if let Some(rest) = pattern.strip_suffix('$') {
                if !rest.is_empty()
                    && word.len() > rest.len()
                    && word.ends_with(rest)
                    && self
                        .check_details_at(&word[..word.len() - rest.len()], depth + 1)
                        .correct
                {
                    return true;
                }
            }
        }

        // Interior patterns, preferring the second occurrence so that roots
        // that themselves contain the break text stay intact as the first
        // part.
        for pattern in config.breaks.iter() {
            if pattern.starts_with('^') || pattern.ends_with('$') {
                continue;
            }

            let found = match word.find(pattern) {
                Some(found) if found > 0 && found + pattern.len() < word.len() => found,
                _ => continue,
            };

            let mut at = found;
            let resume = found + pattern.len();
            if let Some(found2) = word[resume..].find(pattern).map(|i| i + resume) {
                if found2 + pattern.len() < word.len() {
                    at = found2;
                }
            }

            if self.try_break_at(word, at, pattern, depth) {
                return true;
            }
        }

        // Retry at the first occurrence for splits the second-occurrence
        // pass rejected.
        for pattern in config.breaks.iter() {
            if pattern.starts_with('^') || pattern.ends_with('$') {
                continue;
            }

            let found = match word.find(pattern) {
                Some(found) if found > 0 && found + pattern.len() < word.len() => found,
                _ => continue,
            };

            if self.try_break_at(word, found, pattern, depth) {
                return true;
            }
        }

        false
    }

    /// One interior split: both sides must check, with the Hungarian dash
    /// exception keeping the dash on the first part.
    fn try_break_at(&self, word: &str, at: usize, pattern: &str, depth: usize) -> bool {
        if !self.check_details_at(&word[at + pattern.len()..], depth + 1).correct {
            return false;
        }
        if self.check_details_at(&word[..at], depth + 1).correct {
            return true;
        }
        self.config().case_convention.hungarian_dash
            && pattern == "-"
            && self.check_details_at(&word[..at + 1], depth + 1).correct
    }

    /// Strips ignored characters, then counts and removes trailing dots.
    fn clean_word(&self, word: &str) -> (String, usize) {
        let ignored = &self.config().ignored_chars;
        let filtered: String = if ignored.is_empty() {
            word.to_string()
        } else {
            word.chars().filter(|c| !ignored.contains(*c)).collect()
        };

        let trimmed = filtered.trim_end_matches('.');
        let dots = filtered.len() - trimmed.len();
        (trimmed.to_string(), dots)
    }
}

/// At least one digit; `.`, `,` and `-` only singly between digits.
fn is_numeric_word(word: &str) -> bool {
    let mut saw_digit = false;
    let mut previous_was_digit = false;

    for c in word.chars() {
        if c.is_ascii_digit() {
            saw_digit = true;
            previous_was_digit = true;
        } else if matches!(c, '.' | ',' | '-') {
            if !previous_was_digit {
                return false;
            }
            previous_was_digit = false;
        } else {
            return false;
        }
    }

    saw_digit && previous_was_digit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::{AffixEntryGroup, AffixEntryOptions, SuffixCollection, SuffixEntry};
    use crate::condition::CharacterConditionGroup;
    use crate::config::{BreakSet, ReplacementEntry, ReplacementTable};
    use crate::dictionary::DictionaryBuilder;
    use crate::flags::{FlagSet, FlagValue};

    const FORBID: FlagValue = FlagValue(b'F' as u16);
    const KEEP: FlagValue = FlagValue(b'K' as u16);
    const WARN: FlagValue = FlagValue(b'W' as u16);
    const SFX: FlagValue = FlagValue(b'S' as u16);

    fn base_config() -> AffixConfig {
        AffixConfig {
            forbidden_word: FORBID,
            keep_case: KEEP,
            warn: WARN,
            ..AffixConfig::default()
        }
    }

    fn dict(words: &[(&str, &[FlagValue])]) -> Dictionary {
        dict_with(base_config(), words)
    }

    fn dict_with(config: AffixConfig, words: &[(&str, &[FlagValue])]) -> Dictionary {
        let mut builder = DictionaryBuilder::new(config);
        for (word, flags) in words {
            builder.add_with_flags(word, FlagSet::new(flags.to_vec()));
        }
        builder.build()
    }

    #[test]
    fn empty_dictionary_accepts_nothing() {
        let dict = dict(&[]);
        assert!(!dict.check("bat"));
        assert!(!dict.check(""));
        // Except the escape token, which short-circuits everything.
        assert!(!dict.check(DEFAULT_XML_TOKEN));
    }

    #[test]
    fn direct_and_capitalized_lookups() {
        let dict = dict(&[("bat", &[])]);
        assert!(dict.check("bat"));
        assert!(dict.check("Bat"));
        assert!(dict.check("BAT"));
        assert!(!dict.check("cat"));
        // A capitalized root does not validate the lowercase form.
        let upper = self::dict(&[("Bat", &[])]);
        assert!(upper.check("Bat"));
        assert!(!upper.check("bat"));
    }

    #[test]
    fn check_details_reports_root_and_capitalization() {
        let dict = dict(&[("bat", &[])]);
        let result = dict.check_details("Bat");
        assert!(result.correct);
        assert_eq!(result.root.as_deref(), Some("bat"));
        assert_eq!(result.capitalization, Capitalization::Init);
        assert!(result.init_cap);

        let direct = dict.check_details("bat");
        assert!(!direct.init_cap);
        assert_eq!(direct.capitalization, Capitalization::None);
    }

    #[test]
    fn forbidden_roots_reject_and_report() {
        let dict = dict(&[("bat", &[FORBID]), ("cat", &[])]);
        let result = dict.check_details("bat");
        assert!(!result.correct);
        assert!(result.forbidden);
        assert!(dict.check("cat"));
    }

    #[test]
    fn suffix_rule_through_full_pipeline() {
        let suffixes = SuffixCollection::build(vec![AffixEntryGroup::new(
            SFX,
            AffixEntryOptions::cross_product(),
            vec![SuffixEntry::new(
                "",
                "s",
                CharacterConditionGroup::allow_any_single(),
                FlagSet::empty(),
            )],
        )]);
        let config = AffixConfig {
            suffixes,
            ..base_config()
        };
        let dict = dict_with(config, &[("cat", &[SFX])]);

        assert!(dict.check("cats"));
        assert!(dict.check("Cats"));
        assert_eq!(dict.check_details("cats").root.as_deref(), Some("cat"));
        assert!(!dict.check("dogs"));
    }

    #[test]
    fn numeric_words() {
        let dict = dict(&[("bat", &[])]);
        assert!(dict.check("12,345.67"));
        assert!(dict.check("7"));
        assert!(dict.check("1-2"));
        assert!(!dict.check("12..3"));
        assert!(!dict.check(",1"));
        assert!(!dict.check("1,"));
        assert!(!dict.check("1a2"));
    }

    #[test]
    fn overlong_input_is_rejected_outright() {
        let dict = dict(&[("bat", &[])]);
        let long: String = std::iter::repeat('a').take(MAX_WORD_LEN + 1).collect();
        assert!(!dict.check(&long));
    }

    #[test]
    fn keep_case_pins_capitalization() {
        let dict = dict(&[("bat", &[KEEP]), ("Cat", &[KEEP])]);
        assert!(dict.check("bat"));
        assert!(!dict.check("Bat"));
        assert!(!dict.check("BAT"));
        assert!(dict.check("Cat"));
    }

    #[test]
    fn warn_flag_and_forbid_warn() {
        let dict = dict(&[("bat", &[WARN])]);
        let result = dict.check_details("bat");
        assert!(result.correct);
        assert!(result.warn);

        let strict = dict_with(
            AffixConfig {
                forbid_warn: true,
                ..base_config()
            },
            &[("bat", &[WARN])],
        );
        let result = strict.check_details("bat");
        assert!(!result.correct);
        assert!(result.warn);
    }

    #[test]
    fn break_points_split_words() {
        let config = AffixConfig {
            breaks: BreakSet::from(["-"]),
            ..base_config()
        };
        let dict = dict_with(
            config,
            &[("ice", &[]), ("cream", &[]), ("bar", &[]), ("ice-cream", &[])],
        );

        assert!(dict.check("ice-cream"));
        assert!(dict.check("ice-cream-ice"));
        assert!(!dict.check("ice-crumb"));
        // Preferring the second occurrence keeps the dash-containing root
        // "ice-cream" intact as the first part.
        assert!(dict.check("ice-cream-bar"));
    }

    #[test]
    fn break_search_falls_back_to_first_occurrence() {
        let config = AffixConfig {
            breaks: BreakSet::from(["-"]),
            ..base_config()
        };
        let dict = dict_with(config, &[("x", &[]), ("ab-c", &[])]);
        // Splitting at the second dash leaves the unknown part "c"; the
        // retry at the first dash finds "x" + "ab-c".
        assert!(dict.check("x-ab-c"));
        assert!(!dict.check("x-ab-d"));
    }

    #[test]
    fn boundary_break_patterns() {
        let config = AffixConfig {
            breaks: BreakSet::from(["^-", "-$"]),
            ..base_config()
        };
        let dict = dict_with(config, &[("ice", &[])]);
        assert!(dict.check("-ice"));
        assert!(dict.check("ice-"));
        assert!(!dict.check("-cream"));
    }

    #[test]
    fn abbreviation_dot_retry() {
        let dict = dict(&[("etc.", &[]), ("ice", &[])]);
        assert!(dict.check("etc."));
        assert!(dict.check("etc.."));
        assert!(dict.check("ice."));
        assert!(!dict.check("etd."));
    }

    #[test]
    fn ignored_characters_are_stripped() {
        let config = AffixConfig {
            ignored_chars: crate::condition::CharacterSet::from("\u{ad}"),
            ..base_config()
        };
        let dict = dict_with(config, &[("ice", &[])]);
        assert!(dict.check("i\u{ad}ce"));
    }

    #[test]
    fn input_conversion_applies_before_checking() {
        let config = AffixConfig {
            input_conversions: ReplacementTable::new(vec![
                ReplacementEntry::new("’").with_med("'")
            ]),
            ..base_config()
        };
        let dict = dict_with(config, &[("don't", &[])]);
        assert!(dict.check("don’t"));
    }

    #[test]
    fn all_caps_apostrophe_variants() {
        let dict = dict(&[("Sant'Elia", &[]), ("sant'Angelo", &[])]);
        // Lower the word, capitalize after the apostrophe, then also
        // capitalize the whole word.
        assert!(dict.check("SANT'ELIA"));
        assert!(dict.check("SANT'ANGELO"));
        assert!(!dict.check("SANT'URBANO"));
    }

    #[test]
    fn sharp_s_expansion_for_all_caps() {
        let config = AffixConfig {
            check_sharps: true,
            ..base_config()
        };
        let dict = dict_with(config, &[("straße", &[])]);
        assert!(dict.check("STRASSE"));
        assert!(dict.check("straße"));
        // Without CHECKSHARPS the expansion is off.
        let plain = self::dict(&[("straße", &[])]);
        assert!(!plain.check("STRASSE"));
    }

    #[test]
    fn mixed_case_inputs() {
        let dict = dict(&[("openOffice", &[]), ("iPod", &[])]);
        assert!(dict.check("openOffice"));
        // OpenOffice -> openOffice through the init-small retry.
        assert!(dict.check("OpenOffice"));
        assert!(dict.check("iPod"));
        assert!(!dict.check("IPoD"));
    }

    #[test]
    fn numeric_grammar_details() {
        assert!(is_numeric_word("0"));
        assert!(is_numeric_word("10-20"));
        assert!(!is_numeric_word(""));
        assert!(!is_numeric_word("-1"));
        assert!(!is_numeric_word("1.-2"));
        assert!(!is_numeric_word("..."));
    }
}
