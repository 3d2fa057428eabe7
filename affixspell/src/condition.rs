//! Character sets and the anchored character-class condition matcher.
//!
//! Conditions are compiled from the affix-file mini grammar: `.` allows any
//! character, a bare literal allows exactly that character, and `[...]` is a
//! bracket expression whose leading `^` negates the set. An unterminated
//! bracket fails closed: the resulting group matches nothing, disabling only
//! the rule that carried it.

use std::sync::Arc;

/// Immutable ascending set of characters with a bitmask membership pre-check.
#[derive(Clone, Debug)]
pub struct CharacterSet {
    items: Arc<[char]>,
    mask: u32,
}

impl CharacterSet {
    /// Creates a set from arbitrary characters, sorting and deduplicating.
    pub fn new(values: impl IntoIterator<Item = char>) -> CharacterSet {
        let mut values: Vec<char> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();

        let mut mask = 0u32;
        for value in &values {
            mask |= *value as u32;
        }
        CharacterSet {
            items: Arc::from(values),
            mask,
        }
    }

    /// The empty set.
    pub fn empty() -> CharacterSet {
        CharacterSet::default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.items
    }

    /// Membership test: bitmask pre-check, then range check, then binary search.
    pub fn contains(&self, value: char) -> bool {
        if self.items.is_empty() {
            return false;
        }
        if self.items.len() == 1 {
            return self.items[0] == value;
        }

        let bits = value as u32;
        (bits & self.mask) == bits
            && value >= self.items[0]
            && value <= self.items[self.items.len() - 1]
            && self.items.binary_search(&value).is_ok()
    }
}

impl Default for CharacterSet {
    fn default() -> Self {
        CharacterSet {
            items: Arc::from(Vec::new()),
            mask: 0,
        }
    }
}

impl PartialEq for CharacterSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for CharacterSet {}

impl<'a> From<&'a str> for CharacterSet {
    fn from(text: &'a str) -> Self {
        CharacterSet::new(text.chars())
    }
}

/// One matched position: an allowed set, optionally negated.
///
/// `is_match` is membership XOR negation, so an empty restricted condition
/// allows any character and an empty permitted condition allows none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterCondition {
    characters: CharacterSet,
    restricted: bool,
}

impl CharacterCondition {
    /// Matches any character.
    pub fn allow_any() -> CharacterCondition {
        CharacterCondition {
            characters: CharacterSet::empty(),
            restricted: true,
        }
    }

    /// Matches no character.
    pub fn allow_none() -> CharacterCondition {
        CharacterCondition {
            characters: CharacterSet::empty(),
            restricted: false,
        }
    }

    /// Matches exactly the given characters, or their complement when restricted.
    pub fn new(characters: CharacterSet, restricted: bool) -> CharacterCondition {
        CharacterCondition {
            characters,
            restricted,
        }
    }

    fn single(c: char) -> CharacterCondition {
        CharacterCondition::new(CharacterSet::new([c]), false)
    }

    #[inline(always)]
    pub fn is_match(&self, c: char) -> bool {
        self.characters.contains(c) ^ self.restricted
    }

    pub fn allows_any(&self) -> bool {
        self.restricted && self.characters.is_empty()
    }

    pub fn permits_single_character(&self) -> bool {
        !self.restricted && self.characters.len() == 1
    }

    fn single_character(&self) -> Option<char> {
        if self.permits_single_character() {
            Some(self.characters.as_slice()[0])
        } else {
            None
        }
    }
}

/// Ordered per-position conditions with anchored start and end tests.
///
/// The empty group matches nothing; it is the fail-closed result of a parse
/// error as well as of parsing empty text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterConditionGroup {
    items: Arc<[CharacterCondition]>,
}

impl CharacterConditionGroup {
    /// The match-nothing group.
    pub fn empty() -> CharacterConditionGroup {
        CharacterConditionGroup::default()
    }

    /// A single allow-any position, the "no condition" of affix rules.
    pub fn allow_any_single() -> CharacterConditionGroup {
        CharacterConditionGroup::new(vec![CharacterCondition::allow_any()])
    }

    pub fn new(conditions: Vec<CharacterCondition>) -> CharacterConditionGroup {
        CharacterConditionGroup {
            items: Arc::from(conditions),
        }
    }

    /// Compiles condition text. Any malformed bracket expression yields the
    /// empty group rather than an error.
    pub fn parse(text: &str) -> CharacterConditionGroup {
        if text.is_empty() {
            return CharacterConditionGroup::empty();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut conditions = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c != '[' {
                conditions.push(if c == '.' {
                    CharacterCondition::allow_any()
                } else {
                    CharacterCondition::single(c)
                });
                i += 1;
                continue;
            }

            match chars[i + 1..].iter().position(|&c| c == ']') {
                Some(offset) => {
                    conditions.push(Self::parse_class(&chars[i + 1..i + 1 + offset]));
                    i += offset + 2;
                }
                None => return CharacterConditionGroup::empty(),
            }
        }

        CharacterConditionGroup::new(conditions)
    }

    fn parse_class(inner: &[char]) -> CharacterCondition {
        if inner.is_empty() {
            return CharacterCondition::allow_none();
        }

        let restricted = inner[0] == '^';
        if inner.len() == 1 {
            return if restricted {
                CharacterCondition::allow_any()
            } else {
                CharacterCondition::single(inner[0])
            };
        }

        let characters = if restricted { &inner[1..] } else { inner };
        CharacterCondition::new(CharacterSet::new(characters.iter().copied()), restricted)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True for the single allow-any group.
    pub fn allows_any_single_character(&self) -> bool {
        self.items.len() == 1 && self.items[0].allows_any()
    }

    /// Anchored test of the first positions of `text`.
    pub fn is_starting_match(&self, text: &str) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let mut chars = text.chars();
        for condition in self.items.iter() {
            match chars.next() {
                Some(c) if condition.is_match(c) => {}
                _ => return false,
            }
        }
        true
    }

    /// Anchored test of the last positions of `text`.
    pub fn is_ending_match(&self, text: &str) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let mut chars = text.chars().rev();
        for condition in self.items.iter().rev() {
            match chars.next() {
                Some(c) if condition.is_match(c) => {}
                _ => return false,
            }
        }
        true
    }

    /// True when `text` is the one and only string this group can match,
    /// used as the fast path for single-candidate conditions.
    pub fn is_only_possible_match(&self, text: &str) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let mut chars = text.chars();
        for condition in self.items.iter() {
            match (condition.single_character(), chars.next()) {
                (Some(only), Some(c)) if only == c => {}
                _ => return false,
            }
        }
        chars.next().is_none()
    }
}
