//! Flag values, flag-encoding modes and the sorted flag set.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single grammatical or compounding role symbol.
///
/// The zero value is reserved and means "no flag"; it is never a member of
/// any [`FlagSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct FlagValue(pub u16);

impl FlagValue {
    /// The reserved "no flag" sentinel.
    pub const ZERO: FlagValue = FlagValue(0);

    /// Returns true when this is the reserved zero sentinel.
    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true when this is a real flag.
    #[inline(always)]
    pub fn has_value(self) -> bool {
        self.0 != 0
    }

    /// Decodes a flag sequence under the given encoding mode.
    ///
    /// This is the loader-facing decoder used for both the affix
    /// configuration and the dictionary, which must share one mode.
    pub fn parse_flags(text: &str, mode: FlagMode) -> Result<Vec<FlagValue>, FlagParseError> {
        match mode {
            FlagMode::Char | FlagMode::Uni => text.chars().map(Self::try_from_char).collect(),
            FlagMode::Long => {
                let mut chars = text.chars();
                let mut flags = Vec::with_capacity(text.len() / 2);
                while let Some(a) = chars.next() {
                    let b = chars.next().ok_or(FlagParseError::UnpairedLongFlag(a))?;
                    if a as u32 > 0xff || b as u32 > 0xff {
                        return Err(FlagParseError::InvalidLongPair(a, b));
                    }
                    flags.push(FlagValue(((a as u16) << 8) | b as u16));
                }
                Ok(flags)
            }
            FlagMode::Num => text
                .split(',')
                .map(|part| {
                    part.trim()
                        .parse::<u16>()
                        .map(FlagValue)
                        .map_err(|_| FlagParseError::InvalidNumber(part.to_string()))
                })
                .collect(),
        }
    }

    fn try_from_char(c: char) -> Result<FlagValue, FlagParseError> {
        u16::try_from(c as u32)
            .map(FlagValue)
            .map_err(|_| FlagParseError::NonBmpChar(c))
    }
}

impl From<u16> for FlagValue {
    fn from(value: u16) -> Self {
        FlagValue(value)
    }
}

/// Flag-encoding mode shared by the configuration and the dictionary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagMode {
    /// One flag per character.
    Char,
    /// One flag per pair of (extended ASCII) characters.
    Long,
    /// Comma separated decimal flag numbers.
    Num,
    /// One flag per Unicode character within the basic multilingual plane.
    Uni,
}

/// Failure to decode a flag sequence.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlagParseError {
    /// A character flag beyond the basic multilingual plane cannot be encoded.
    #[error("flag character {0:?} is outside the basic multilingual plane")]
    NonBmpChar(char),
    /// A long-mode flag sequence had an odd number of characters.
    #[error("unpaired character {0:?} in long flag sequence")]
    UnpairedLongFlag(char),
    /// A long-mode pair used characters outside the extended ASCII range.
    #[error("long flag pair {0:?}{1:?} uses characters above 0xff")]
    InvalidLongPair(char, char),
    /// A numeric flag was not a decimal number within the supported range.
    #[error("invalid numeric flag {0:?}")]
    InvalidNumber(String),
}

/// Immutable ascending set of flags with a bitmask membership pre-check.
#[derive(Clone, Debug)]
pub struct FlagSet {
    items: Arc<[FlagValue]>,
    mask: u16,
}

impl FlagSet {
    /// Creates a set from arbitrary values, sorting and deduplicating them.
    pub fn new(mut values: Vec<FlagValue>) -> FlagSet {
        values.sort_unstable();
        values.dedup();
        Self::from_sorted(values)
    }

    fn from_sorted(values: Vec<FlagValue>) -> FlagSet {
        let mut mask = 0u16;
        for value in &values {
            mask |= value.0;
        }
        FlagSet {
            items: Arc::from(values),
            mask,
        }
    }

    /// The empty set.
    pub fn empty() -> FlagSet {
        FlagSet::default()
    }

    /// Creates a single-member set, or the empty set for the zero sentinel.
    pub fn from_value(value: FlagValue) -> FlagSet {
        if value.is_zero() {
            FlagSet::default()
        } else {
            Self::from_sorted(vec![value])
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline(always)]
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[FlagValue] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = FlagValue> + '_ {
        self.items.iter().copied()
    }

    /// Membership test: bitmask pre-check, then range check, then binary search.
    pub fn contains(&self, value: FlagValue) -> bool {
        if value.is_zero() || self.items.is_empty() {
            return false;
        }
        if self.items.len() == 1 {
            return self.items[0] == value;
        }

        (value.0 & self.mask) != 0
            && value >= self.items[0]
            && value <= self.items[self.items.len() - 1]
            && self.items.binary_search(&value).is_ok()
    }

    /// True when the two sets share at least one member.
    pub fn contains_any(&self, other: &FlagSet) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.len() == 1 {
            return other.contains(self.items[0]);
        }
        if other.len() == 1 {
            return self.contains(other.items[0]);
        }

        let (probe, target) = if self.len() > other.len() {
            (other, self)
        } else {
            (self, other)
        };
        let low = target.items[0];
        let high = target.items[target.items.len() - 1];

        for item in probe.iter() {
            if item >= low {
                if item > high {
                    break;
                }
                if target.contains(item) {
                    return true;
                }
            }
        }

        false
    }

    /// True when any of the given values is a member.
    pub fn contains_any_of(&self, values: &[FlagValue]) -> bool {
        self.has_items() && values.iter().any(|v| self.contains(*v))
    }

    /// Linear merge of two sorted sets, sharing an input when the other is empty.
    pub fn union(&self, other: &FlagSet) -> FlagSet {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut merged = Vec::with_capacity(self.len() + other.len());
        let mut a = self.iter().peekable();
        let mut b = other.iter().peekable();

        loop {
            match (a.peek(), b.peek()) {
                (Some(&x), Some(&y)) => {
                    if x < y {
                        merged.push(x);
                        a.next();
                    } else if y < x {
                        merged.push(y);
                        b.next();
                    } else {
                        merged.push(x);
                        a.next();
                        b.next();
                    }
                }
                (Some(&x), None) => {
                    merged.push(x);
                    a.next();
                }
                (None, Some(&y)) => {
                    merged.push(y);
                    b.next();
                }
                (None, None) => break,
            }
        }

        Self::from_sorted(merged)
    }

    /// Returns a set additionally containing `value`, sharing storage when
    /// `value` is already a member.
    pub fn union_value(&self, value: FlagValue) -> FlagSet {
        if value.is_zero() {
            return self.clone();
        }
        match self.items.binary_search(&value) {
            Ok(_) => self.clone(),
            Err(insert_at) => {
                let mut items = Vec::with_capacity(self.len() + 1);
                items.extend_from_slice(&self.items[..insert_at]);
                items.push(value);
                items.extend_from_slice(&self.items[insert_at..]);
                Self::from_sorted(items)
            }
        }
    }
}

impl Default for FlagSet {
    fn default() -> Self {
        FlagSet {
            items: Arc::from(Vec::new()),
            mask: 0,
        }
    }
}

impl PartialEq for FlagSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for FlagSet {}

impl FromIterator<FlagValue> for FlagSet {
    fn from_iter<T: IntoIterator<Item = FlagValue>>(iter: T) -> Self {
        FlagSet::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[u16]) -> FlagSet {
        FlagSet::new(values.iter().map(|v| FlagValue(*v)).collect())
    }

    #[test]
    fn new_sorts_and_dedups() {
        let s = set(&[9, 3, 3, 7, 1, 9]);
        assert_eq!(
            s.as_slice(),
            &[FlagValue(1), FlagValue(3), FlagValue(7), FlagValue(9)]
        );
    }

    #[test]
    fn contains_agrees_with_linear_scan() {
        let values = [2u16, 5, 9, 13, 200, 513, 9999];
        let s = set(&values);
        for probe in 0u16..11000 {
            let expected = values.contains(&probe) && probe != 0;
            assert_eq!(s.contains(FlagValue(probe)), expected, "probe {}", probe);
        }
    }

    #[test]
    fn zero_is_never_a_member() {
        let s = set(&[0, 1, 2]);
        assert!(!s.contains(FlagValue::ZERO));
        assert!(s.contains(FlagValue(1)));
    }

    #[test]
    fn union_is_commutative_and_idempotent() {
        let a = set(&[1, 5, 9]);
        let b = set(&[2, 5, 10]);
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&a), a);

        let u = a.union(&b);
        for probe in 0u16..16 {
            let f = FlagValue(probe);
            assert_eq!(u.contains(f), a.contains(f) || b.contains(f));
        }
    }

    #[test]
    fn union_with_empty_shares_input() {
        let a = set(&[4, 8]);
        let u = a.union(&FlagSet::empty());
        assert_eq!(u, a);
        assert_eq!(FlagSet::empty().union(&a), a);
    }

    #[test]
    fn union_value_inserts_in_order() {
        let a = set(&[2, 8]);
        assert_eq!(
            a.union_value(FlagValue(5)).as_slice(),
            &[FlagValue(2), FlagValue(5), FlagValue(8)]
        );
        assert_eq!(a.union_value(FlagValue(8)), a);
    }

    #[test]
    fn contains_any_fast_paths() {
        let single = set(&[7]);
        let many = set(&[1, 7, 30]);
        assert!(single.contains_any(&many));
        assert!(many.contains_any(&single));
        assert!(!set(&[2, 4]).contains_any(&set(&[1, 3, 5])));
        assert!(!FlagSet::empty().contains_any(&many));
    }

    #[test]
    fn parse_char_mode() {
        let flags = FlagValue::parse_flags("Abz", FlagMode::Char).unwrap();
        assert_eq!(
            flags,
            vec![FlagValue('A' as u16), FlagValue('b' as u16), FlagValue('z' as u16)]
        );
    }

    #[test]
    fn parse_long_mode() {
        let flags = FlagValue::parse_flags("aabb", FlagMode::Long).unwrap();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0], FlagValue((('a' as u16) << 8) | 'a' as u16));
        assert_eq!(
            FlagValue::parse_flags("aab", FlagMode::Long),
            Err(FlagParseError::UnpairedLongFlag('b'))
        );
    }

    #[test]
    fn parse_num_mode() {
        let flags = FlagValue::parse_flags("12,345", FlagMode::Num).unwrap();
        assert_eq!(flags, vec![FlagValue(12), FlagValue(345)]);
        assert!(FlagValue::parse_flags("12,y", FlagMode::Num).is_err());
    }

    #[test]
    fn parse_uni_mode_rejects_non_bmp() {
        assert!(FlagValue::parse_flags("é", FlagMode::Uni).is_ok());
        assert_eq!(
            FlagValue::parse_flags("😀", FlagMode::Uni),
            Err(FlagParseError::NonBmpChar('😀'))
        );
    }
}
