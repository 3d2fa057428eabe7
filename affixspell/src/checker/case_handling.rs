//! Capitalization classification and convention-aware case mapping.

use serde::{Deserialize, Serialize};

use crate::config::CaseConvention;

/// Capitalization shape of an input word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capitalization {
    /// No uppercase characters.
    None,
    /// Only the first character is uppercase.
    Init,
    /// Every cased character is uppercase.
    All,
    /// Mixed case not starting with an uppercase character.
    Huh,
    /// Mixed case starting with an uppercase character.
    HuhInit,
}

/// Classifies the capitalization shape of `word`.
pub fn classify(word: &str) -> Capitalization {
    let mut length = 0usize;
    let mut capitalized = 0usize;
    let mut neutral = 0usize;
    let mut first_capitalized = false;

    for (i, c) in word.chars().enumerate() {
        length += 1;
        if c.is_uppercase() {
            capitalized += 1;
            if i == 0 {
                first_capitalized = true;
            }
        } else if !c.is_lowercase() {
            neutral += 1;
        }
    }

    if capitalized == 0 {
        Capitalization::None
    } else if capitalized == 1 && first_capitalized {
        Capitalization::Init
    } else if capitalized == length || capitalized + neutral == length {
        Capitalization::All
    } else if first_capitalized {
        Capitalization::HuhInit
    } else {
        Capitalization::Huh
    }
}

fn lower_char(c: char, convention: &CaseConvention, out: &mut String) {
    if convention.dotted_i {
        match c {
            'İ' => {
                out.push('i');
                return;
            }
            'I' => {
                out.push('ı');
                return;
            }
            _ => {}
        }
    }
    out.extend(c.to_lowercase());
}

fn upper_char(c: char, convention: &CaseConvention, out: &mut String) {
    if convention.dotted_i && c == 'i' {
        out.push('İ');
        return;
    }
    out.extend(c.to_uppercase());
}

/// Lowercases a word under the convention.
pub fn lower_case(word: &str, convention: &CaseConvention) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        lower_char(c, convention, &mut out);
    }
    out
}

/// Uppercases a word under the convention.
pub fn upper_case(word: &str, convention: &CaseConvention) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        upper_char(c, convention, &mut out);
    }
    out
}

/// Uppercases the first character, leaving the rest untouched.
pub fn make_init_cap(word: &str, convention: &CaseConvention) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            upper_char(first, convention, &mut out);
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Lowercases the first character, leaving the rest untouched.
pub fn make_init_small(word: &str, convention: &CaseConvention) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            lower_char(first, convention, &mut out);
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}
