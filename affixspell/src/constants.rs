/// Words beyond this length are rejected without further processing.
pub const MAX_WORD_LEN: usize = 100;

/// Maximum number of "ss"/sharp-s substitutions tried for one all-caps word.
pub const MAX_SHARPS: usize = 5;

/// Maximum number of parts a compound decomposition may produce.
pub const MAX_COMPOUND_PARTS: usize = 10;

/// Break-point occurrences at or beyond this count refuse the break search.
pub const MAX_BREAK_OCCURRENCES: usize = 10;

/// Maximum recursion depth for break-point splitting.
pub const MAX_BREAK_DEPTH: usize = 10;

/// Escape token of the simplified XML input API; always accepted.
pub const DEFAULT_XML_TOKEN: &str = "<?xml?>";
