//! Ordered flag-pattern rules for compound words and their backtracking
//! matcher.
//!
//! A rule is a token sequence where a wildcard token (`*` zero-or-more, `?`
//! zero-or-one) applies to the flag token immediately preceding it. Wildcards
//! are their own token kind rather than in-band flag codes, so numeric flag
//! mode cannot collide with the wildcard characters.

use crate::dictionary::WordEntryDetail;
use crate::flags::FlagValue;

/// One token of a compound rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompoundRuleToken {
    /// The word part at this position must carry the flag.
    Flag(FlagValue),
    /// Zero or more repetitions of the preceding flag token.
    ZeroOrMore,
    /// Zero or one repetition of the preceding flag token.
    ZeroOrOne,
}

impl CompoundRuleToken {
    #[inline(always)]
    pub fn is_wildcard(self) -> bool {
        matches!(
            self,
            CompoundRuleToken::ZeroOrMore | CompoundRuleToken::ZeroOrOne
        )
    }
}

/// One ordered flag pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundRule {
    tokens: Box<[CompoundRuleToken]>,
}

impl CompoundRule {
    pub fn new(tokens: Vec<CompoundRuleToken>) -> CompoundRule {
        CompoundRule {
            tokens: tokens.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn wildcard_at(&self, index: i64) -> bool {
        index >= 0
            && (index as usize) < self.tokens.len()
            && self.tokens[index as usize].is_wildcard()
    }

    fn is_zero_or_one_at(&self, index: i64) -> bool {
        index >= 0
            && (index as usize) < self.tokens.len()
            && self.tokens[index as usize] == CompoundRuleToken::ZeroOrOne
    }

    fn flag_at(&self, index: i64) -> FlagValue {
        if index < 0 || index as usize >= self.tokens.len() {
            return FlagValue::ZERO;
        }
        match self.tokens[index as usize] {
            CompoundRuleToken::Flag(flag) => flag,
            _ => FlagValue::ZERO,
        }
    }

    /// True when the part carries any of the rule's non-wildcard flags.
    pub fn contains_rule_flag_for(&self, detail: &WordEntryDetail) -> bool {
        self.tokens.iter().any(|token| match token {
            CompoundRuleToken::Flag(flag) => detail.contains_flag(*flag),
            _ => false,
        })
    }
}

impl FromIterator<CompoundRuleToken> for CompoundRule {
    fn from_iter<T: IntoIterator<Item = CompoundRuleToken>>(iter: T) -> Self {
        CompoundRule::new(iter.into_iter().collect())
    }
}

/// Incrementally built ordered list of candidate compound part details.
#[derive(Clone, Debug, Default)]
pub struct PartSequence {
    words: Vec<Option<WordEntryDetail>>,
}

impl PartSequence {
    pub fn new() -> PartSequence {
        PartSequence::default()
    }

    /// Stores the candidate detail for part `index`.
    pub fn set(&mut self, index: usize, detail: WordEntryDetail) {
        if index < self.words.len() {
            self.words[index] = Some(detail);
        } else {
            self.words.resize(index, None);
            self.words.push(Some(detail));
        }
    }

    pub fn clear(&mut self, index: usize) {
        if index < self.words.len() {
            self.words[index] = None;
        }
    }

    pub fn contains_flag_at(&self, index: usize, flag: FlagValue) -> bool {
        match self.words.get(index) {
            Some(Some(detail)) => detail.contains_flag(flag),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Backtrack {
    /// Pattern position after the wildcard pair.
    pattern_pos: i64,
    /// Word position before the wildcard consumed anything.
    word_pos: i64,
    /// Number of words the wildcard consumed; decremented on backtrack.
    consumed: i64,
}

/// Ordered list of compound rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundRuleSet {
    rules: Box<[CompoundRule]>,
}

impl CompoundRuleSet {
    pub fn new(rules: Vec<CompoundRule>) -> CompoundRuleSet {
        CompoundRuleSet {
            rules: rules.into_boxed_slice(),
        }
    }

    pub fn empty() -> CompoundRuleSet {
        CompoundRuleSet::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Pre-filter: a part carrying none of the non-wildcard flags of any rule
    /// can never participate, so the automaton is not worth invoking.
    pub fn entry_contains_rule_flags(&self, detail: &WordEntryDetail) -> bool {
        detail.has_flags()
            && self
                .rules
                .iter()
                .any(|rule| rule.contains_rule_flag_for(detail))
    }

    /// Matches the first `word_count + 1` parts of `words` against the rules.
    ///
    /// With `all` set, a rule only succeeds when every supplied part was
    /// consumed; otherwise a viable partial consumption is enough, which is
    /// how incremental decompositions are pruned early.
    pub fn compound_check(&self, words: &PartSequence, word_count: usize, all: bool) -> bool {
        let wnum = word_count as i64;

        for rule in self.rules.iter() {
            let count = rule.len() as i64;
            let mut backtracks: Vec<Backtrack> = vec![Backtrack::default()];
            let mut bt: usize = 0;
            let mut pp: i64 = 0;
            let mut wp: i64 = 0;
            let mut ok = true;
            let mut ok2 = true;

            loop {
                while pp < count && wp <= wnum {
                    if rule.wildcard_at(pp + 1) {
                        let wend = if rule.is_zero_or_one_at(pp + 1) { wp } else { wnum };
                        ok2 = true;
                        pp += 2;

                        let record_pp = pp;
                        let record_wp = wp;
                        while wp <= wend {
                            if wp < 0 || !words.contains_flag_at(wp as usize, rule.flag_at(pp - 2))
                            {
                                ok2 = false;
                                break;
                            }
                            wp += 1;
                        }
                        if wp <= wnum {
                            ok2 = false;
                        }

                        let consumed = wp - record_wp;
                        backtracks[bt] = Backtrack {
                            pattern_pos: record_pp,
                            word_pos: record_wp,
                            consumed,
                        };
                        if consumed > 0 {
                            bt += 1;
                            backtracks.push(Backtrack::default());
                        }
                        if ok2 {
                            break;
                        }
                    } else {
                        ok2 = true;
                        if wp < 0 || !words.contains_flag_at(wp as usize, rule.flag_at(pp)) {
                            ok = false;
                            break;
                        }
                        pp += 1;
                        wp += 1;
                        if count <= pp && wp <= wnum {
                            ok = false;
                        }
                    }
                }

                if ok && ok2 {
                    let mut r = pp;
                    while rule.wildcard_at(r + 1) {
                        r += 2;
                    }
                    if count <= r {
                        return true;
                    }
                }

                if bt == 0 {
                    break;
                }

                // backtrack: give back one consumed word from the most recent
                // wildcard, dropping exhausted records
                ok = true;
                let mut index = bt - 1;
                loop {
                    backtracks[index].consumed -= 1;
                    if backtracks[index].consumed >= 0 {
                        break;
                    }
                    if bt == 1 {
                        bt = 0;
                        break;
                    }
                    bt -= 1;
                    index = bt - 1;
                }
                pp = backtracks[index].pattern_pos;
                wp = backtracks[index].word_pos + backtracks[index].consumed;

                if bt == 0 {
                    break;
                }
            }

            if ok && ok2 {
                if !all || count <= pp {
                    return true;
                }

                let mut r = pp;
                while rule.wildcard_at(r + 1) {
                    r += 2;
                }
                if count <= r {
                    return true;
                }
            }
        }

        false
    }
}

impl FromIterator<CompoundRule> for CompoundRuleSet {
    fn from_iter<T: IntoIterator<Item = CompoundRule>>(iter: T) -> Self {
        CompoundRuleSet::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagSet;

    const A: FlagValue = FlagValue(b'A' as u16);
    const B: FlagValue = FlagValue(b'B' as u16);
    const C: FlagValue = FlagValue(b'C' as u16);

    fn flag(f: FlagValue) -> CompoundRuleToken {
        CompoundRuleToken::Flag(f)
    }

    fn detail(flags: &[FlagValue]) -> WordEntryDetail {
        WordEntryDetail::new(FlagSet::new(flags.to_vec()), Vec::new())
    }

    fn sequence(parts: &[&[FlagValue]]) -> PartSequence {
        let mut words = PartSequence::new();
        for (i, part) in parts.iter().enumerate() {
            words.set(i, detail(part));
        }
        words
    }

    fn rules(tokens: Vec<CompoundRuleToken>) -> CompoundRuleSet {
        CompoundRuleSet::new(vec![CompoundRule::new(tokens)])
    }

    #[test]
    fn star_consumes_repeats() {
        let set = rules(vec![flag(A), CompoundRuleToken::ZeroOrMore, flag(B)]);
        let words = sequence(&[&[A], &[A], &[B]]);
        assert!(set.compound_check(&words, 2, true));
    }

    #[test]
    fn order_matters() {
        let set = rules(vec![flag(A), CompoundRuleToken::ZeroOrMore, flag(B)]);
        let words = sequence(&[&[A], &[B], &[A]]);
        assert!(!set.compound_check(&words, 2, true));
    }

    #[test]
    fn question_mark_consumes_at_most_one() {
        let set = rules(vec![flag(A), CompoundRuleToken::ZeroOrOne, flag(B)]);
        assert!(set.compound_check(&sequence(&[&[A], &[B]]), 1, true));
        assert!(set.compound_check(&sequence(&[&[B]]), 0, true));
        assert!(!set.compound_check(&sequence(&[&[A], &[A], &[B]]), 2, true));
    }

    #[test]
    fn star_matches_zero_occurrences() {
        let set = rules(vec![flag(A), CompoundRuleToken::ZeroOrMore, flag(B)]);
        assert!(set.compound_check(&sequence(&[&[B]]), 0, true));
    }

    #[test]
    fn trailing_wildcard_may_consume_zero() {
        let set = rules(vec![flag(A), flag(B), CompoundRuleToken::ZeroOrMore]);
        assert!(set.compound_check(&sequence(&[&[A]]), 0, true));
        assert!(set.compound_check(&sequence(&[&[A], &[B], &[B]]), 2, true));
    }

    #[test]
    fn empty_rule_set_never_matches() {
        let set = CompoundRuleSet::empty();
        assert!(!set.compound_check(&sequence(&[&[A], &[B]]), 1, true));
    }

    #[test]
    fn all_mode_requires_every_word_consumed() {
        let set = rules(vec![flag(A), flag(B), flag(C)]);
        let words = sequence(&[&[A], &[B]]);
        // Two parts are a viable prefix of the rule but not a full match.
        assert!(set.compound_check(&words, 1, false));
        assert!(!set.compound_check(&words, 1, true));
    }

    #[test]
    fn backtracking_releases_greedy_consumption() {
        // A* followed by A B: the star must give one A back.
        let set = rules(vec![
            flag(A),
            CompoundRuleToken::ZeroOrMore,
            flag(A),
            flag(B),
        ]);
        let words = sequence(&[&[A], &[A], &[A], &[B]]);
        assert!(set.compound_check(&words, 3, true));
    }

    #[test]
    fn second_rule_is_tried_after_first_fails() {
        let set = CompoundRuleSet::new(vec![
            CompoundRule::new(vec![flag(A), flag(A)]),
            CompoundRule::new(vec![flag(A), flag(B)]),
        ]);
        assert!(set.compound_check(&sequence(&[&[A], &[B]]), 1, true));
    }

    #[test]
    fn entry_rule_flag_prefilter() {
        let set = rules(vec![flag(A), CompoundRuleToken::ZeroOrMore, flag(B)]);
        assert!(set.entry_contains_rule_flags(&detail(&[A])));
        assert!(set.entry_contains_rule_flags(&detail(&[B, C])));
        assert!(!set.entry_contains_rule_flags(&detail(&[C])));
        assert!(!set.entry_contains_rule_flags(&detail(&[])));
    }
}
