//! Hunspell-compatible morphological checking engine.
//!
//! A [`Dictionary`] couples an [`AffixConfig`] with a root-word store and
//! answers [`Dictionary::check`] / [`Dictionary::check_details`] queries:
//! direct lookup, single-layer affix stripping, compound decomposition,
//! capitalization variants and break-point splitting. Loading of affix and
//! dictionary text files is out of scope; callers assemble configurations and
//! dictionaries through the builder types.

pub mod affix;
pub mod checker;
pub mod compound;
pub mod condition;
pub mod config;
pub mod dictionary;
pub mod flags;
pub mod trie;

pub(crate) mod constants;

pub use checker::{Capitalization, CheckResult, Checker};
pub use config::AffixConfig;
pub use dictionary::{Dictionary, DictionaryBuilder, WordEntry, WordEntryDetail};
pub use flags::{FlagMode, FlagSet, FlagValue};
