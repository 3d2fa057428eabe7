//! Checking-relevant affix configuration: compound policy flags, break
//! points, input/output conversion tables and the casing convention.

use hashbrown::HashMap;
use smol_str::SmolStr;

use crate::affix::{PrefixCollection, SuffixCollection};
use crate::compound::CompoundRuleSet;
use crate::condition::CharacterSet;
use crate::flags::{FlagMode, FlagSet, FlagValue};

/// One conversion pattern with optional position-specific replacements.
///
/// A variant missing for the position the pattern occurs in falls back on the
/// next more general variant; a pattern with no applicable variant converts
/// nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplacementEntry {
    pub pattern: SmolStr,
    /// Replacement anywhere in a word.
    pub med: Option<SmolStr>,
    /// Replacement at the start of a word.
    pub ini: Option<SmolStr>,
    /// Replacement at the end of a word.
    pub fin: Option<SmolStr>,
    /// Replacement for a pattern spanning the whole word.
    pub isol: Option<SmolStr>,
}

impl ReplacementEntry {
    pub fn new(pattern: &str) -> ReplacementEntry {
        ReplacementEntry {
            pattern: SmolStr::new(pattern),
            ..ReplacementEntry::default()
        }
    }

    pub fn with_med(mut self, text: &str) -> ReplacementEntry {
        self.med = Some(SmolStr::new(text));
        self
    }

    pub fn with_ini(mut self, text: &str) -> ReplacementEntry {
        self.ini = Some(SmolStr::new(text));
        self
    }

    pub fn with_fin(mut self, text: &str) -> ReplacementEntry {
        self.fin = Some(SmolStr::new(text));
        self
    }

    pub fn with_isol(mut self, text: &str) -> ReplacementEntry {
        self.isol = Some(SmolStr::new(text));
        self
    }

    /// Picks the replacement for an occurrence at the given word position,
    /// most specific variant first.
    pub fn replacement_for(&self, at_start: bool, at_end: bool) -> Option<&SmolStr> {
        match (at_start, at_end) {
            (true, true) => self
                .isol
                .as_ref()
                .or(self.fin.as_ref())
                .or(self.ini.as_ref())
                .or(self.med.as_ref()),
            (true, false) => self.ini.as_ref().or(self.med.as_ref()),
            (false, true) => self.fin.as_ref().or(self.med.as_ref()),
            (false, false) => self.med.as_ref(),
        }
    }
}

/// Longest-match conversion table applied before or after checking.
#[derive(Clone, Debug, Default)]
pub struct ReplacementTable {
    entries: HashMap<SmolStr, ReplacementEntry>,
    /// Pattern lengths in characters, tracked so the scan knows which
    /// window sizes are worth probing.
    min_pattern_chars: usize,
    max_pattern_chars: usize,
}

impl ReplacementTable {
    pub fn empty() -> ReplacementTable {
        ReplacementTable::default()
    }

    pub fn new(entries: Vec<ReplacementEntry>) -> ReplacementTable {
        let mut table = ReplacementTable::default();
        for entry in entries {
            let chars = entry.pattern.chars().count();
            if chars == 0 {
                continue;
            }
            if table.entries.is_empty() {
                table.min_pattern_chars = chars;
                table.max_pattern_chars = chars;
            } else {
                table.min_pattern_chars = table.min_pattern_chars.min(chars);
                table.max_pattern_chars = table.max_pattern_chars.max(chars);
            }
            table.entries.insert(entry.pattern.clone(), entry);
        }
        table
    }

    pub fn has_replacements(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Left-to-right scan converting the longest matching pattern at each
    /// position. Returns `None` when no pattern applied.
    pub fn try_convert(&self, text: &str) -> Option<String> {
        if self.entries.is_empty() || text.is_empty() {
            return None;
        }

        let chars: Vec<char> = text.chars().collect();
        let mut converted = String::with_capacity(text.len());
        let mut changed = false;
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_pattern_chars.min(chars.len() - i);
            let mut applied = None;

            for window in (self.min_pattern_chars..=longest).rev() {
                let candidate: String = chars[i..i + window].iter().collect();
                if let Some(entry) = self.entries.get(candidate.as_str()) {
                    let at_start = i == 0;
                    let at_end = i + window == chars.len();
                    if let Some(replacement) = entry.replacement_for(at_start, at_end) {
                        applied = Some((window, replacement));
                        break;
                    }
                }
            }

            match applied {
                Some((window, replacement)) => {
                    converted.push_str(replacement);
                    i += window;
                    changed = true;
                }
                None => {
                    converted.push(chars[i]);
                    i += 1;
                }
            }
        }

        changed.then(|| converted)
    }
}

/// The break-point patterns of a configuration.
///
/// `^` at the start and `$` at the end of a pattern anchor it to a word
/// boundary; the markers are kept verbatim and interpreted by the checker.
#[derive(Clone, Debug, Default)]
pub struct BreakSet {
    items: Vec<SmolStr>,
}

impl BreakSet {
    pub fn empty() -> BreakSet {
        BreakSet::default()
    }

    pub fn new(items: Vec<SmolStr>) -> BreakSet {
        BreakSet {
            items: items.into_iter().filter(|item| !item.is_empty()).collect(),
        }
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.as_str())
    }

    /// Total number of break-pattern occurrences in `word`, used to refuse
    /// pathological inputs before the recursive break search starts.
    pub fn occurrence_count(&self, word: &str) -> usize {
        self.items
            .iter()
            .map(|pattern| word.matches(pattern.as_str()).count())
            .sum()
    }
}

impl<const N: usize> From<[&str; N]> for BreakSet {
    fn from(items: [&str; N]) -> Self {
        BreakSet::new(items.iter().map(|item| SmolStr::new(item)).collect())
    }
}

/// Language casing peculiarities the checker has to honor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseConvention {
    /// Turkic dotted-I casing: `İ` lowers to `i` and `I` lowers to `ı`.
    pub dotted_i: bool,
    /// Hungarian hyphen rule: a trailing `-` after a valid stem is accepted
    /// during the break search.
    pub hungarian_dash: bool,
}

/// The checking-relevant boundary of a loaded affix configuration.
///
/// Zero flag values mean the option is unset; `FlagValue::ZERO` never matches
/// any entry, so unset options fall out of the flag tests naturally.
#[derive(Clone, Debug)]
pub struct AffixConfig {
    pub flag_mode: FlagMode,

    /// Generic any-position compounding permission.
    pub compound_flag: FlagValue,
    /// Positional compounding permissions.
    pub compound_begin: FlagValue,
    pub compound_middle: FlagValue,
    pub compound_end: FlagValue,
    /// Marks roots that themselves are compounds.
    pub compound_root: FlagValue,
    /// Affix may occur inside a compound part.
    pub compound_permit: FlagValue,
    /// Word may never occur inside a compound.
    pub compound_forbid: FlagValue,
    /// Minimum length in characters of a compound part.
    pub compound_min: usize,
    pub compound_rules: CompoundRuleSet,

    /// Affixes marked with this flag only apply in prefix+suffix pairs.
    pub circumfix: FlagValue,
    /// Roots carrying this flag are spelled wrong even though listed.
    pub forbidden_word: FlagValue,
    /// Root is only correct in its listed capitalization.
    pub keep_case: FlagValue,
    /// Root is correct but rare; flagged in results.
    pub warn: FlagValue,
    /// Root is hidden from suggestions; irrelevant to checking but kept for
    /// the suggestion collaborator.
    pub no_suggest: FlagValue,
    /// Escalates `warn` to an outright rejection.
    pub forbid_warn: bool,
    /// German sharp-s handling: `ß` may be written `SS` in all-caps words.
    pub check_sharps: bool,

    pub breaks: BreakSet,
    pub input_conversions: ReplacementTable,
    pub output_conversions: ReplacementTable,

    /// Characters stripped from input before checking.
    pub ignored_chars: CharacterSet,
    /// Extra characters that may occur inside words; kept for tokenizing
    /// callers.
    pub word_chars: CharacterSet,
    /// Flag alias table; dictionary entries may reference a 1-based index
    /// into it instead of spelling out flags.
    pub flag_aliases: Vec<FlagSet>,

    pub prefixes: PrefixCollection,
    pub suffixes: SuffixCollection,

    pub case_convention: CaseConvention,
}

impl Default for AffixConfig {
    fn default() -> Self {
        AffixConfig {
            flag_mode: FlagMode::Char,
            compound_flag: FlagValue::ZERO,
            compound_begin: FlagValue::ZERO,
            compound_middle: FlagValue::ZERO,
            compound_end: FlagValue::ZERO,
            compound_root: FlagValue::ZERO,
            compound_permit: FlagValue::ZERO,
            compound_forbid: FlagValue::ZERO,
            compound_min: 3,
            compound_rules: CompoundRuleSet::empty(),
            circumfix: FlagValue::ZERO,
            forbidden_word: FlagValue::ZERO,
            keep_case: FlagValue::ZERO,
            warn: FlagValue::ZERO,
            no_suggest: FlagValue::ZERO,
            forbid_warn: false,
            check_sharps: false,
            breaks: BreakSet::empty(),
            input_conversions: ReplacementTable::empty(),
            output_conversions: ReplacementTable::empty(),
            ignored_chars: CharacterSet::empty(),
            word_chars: CharacterSet::empty(),
            flag_aliases: Vec::new(),
            prefixes: PrefixCollection::empty(),
            suffixes: SuffixCollection::empty(),
            case_convention: CaseConvention::default(),
        }
    }
}

impl AffixConfig {
    /// True when any compounding mechanism is configured.
    pub fn has_compound(&self) -> bool {
        self.compound_flag.has_value()
            || self.compound_begin.has_value()
            || !self.compound_rules.is_empty()
    }

    /// Effective minimum compound part length; never below one character.
    pub fn compound_min_length(&self) -> usize {
        self.compound_min.max(1)
    }

    /// Resolves a 1-based alias reference from a dictionary entry.
    pub fn flag_alias(&self, index: usize) -> Option<&FlagSet> {
        index
            .checked_sub(1)
            .and_then(|index| self.flag_aliases.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacement_position_precedence() {
        let entry = ReplacementEntry::new("a")
            .with_med("m")
            .with_ini("i")
            .with_fin("f")
            .with_isol("o");
        assert_eq!(entry.replacement_for(true, true).unwrap(), "o");
        assert_eq!(entry.replacement_for(true, false).unwrap(), "i");
        assert_eq!(entry.replacement_for(false, true).unwrap(), "f");
        assert_eq!(entry.replacement_for(false, false).unwrap(), "m");

        let med_only = ReplacementEntry::new("a").with_med("m");
        assert_eq!(med_only.replacement_for(true, true).unwrap(), "m");
        assert_eq!(med_only.replacement_for(true, false).unwrap(), "m");

        let ini_only = ReplacementEntry::new("a").with_ini("i");
        assert_eq!(ini_only.replacement_for(false, false), None);
    }

    #[test]
    fn try_convert_prefers_longest_pattern() {
        let table = ReplacementTable::new(vec![
            ReplacementEntry::new("a").with_med("1"),
            ReplacementEntry::new("ab").with_med("2"),
        ]);
        assert_eq!(table.try_convert("xabay").as_deref(), Some("x21y"));
    }

    #[test]
    fn try_convert_none_without_match() {
        let table = ReplacementTable::new(vec![ReplacementEntry::new("q").with_med("k")]);
        assert_eq!(table.try_convert("word"), None);
        assert_eq!(ReplacementTable::empty().try_convert("word"), None);
        assert_eq!(table.try_convert(""), None);
    }

    #[test]
    fn try_convert_positional_variants() {
        let table = ReplacementTable::new(vec![ReplacementEntry::new("s")
            .with_ini("S")
            .with_fin("z")]);
        assert_eq!(table.try_convert("sos").as_deref(), Some("Soz"));
        // Interior occurrence has no applicable variant.
        assert_eq!(table.try_convert("asa"), None);
    }

    #[test]
    fn break_occurrence_count() {
        let breaks = BreakSet::from(["-", "--"]);
        assert!(breaks.has_items());
        assert_eq!(breaks.occurrence_count("one-two-three"), 2);
        assert_eq!(breaks.occurrence_count("a--b"), 2 + 1);
        assert_eq!(breaks.occurrence_count("plain"), 0);
    }

    #[test]
    fn zero_flags_configure_nothing() {
        let config = AffixConfig::default();
        assert!(!config.has_compound());
        assert_eq!(config.compound_min_length(), 3);
        assert_eq!(config.flag_alias(0), None);
        assert_eq!(config.flag_alias(1), None);
    }
}
