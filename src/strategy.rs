use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// The collision-resolution policy a [`HashTable`](crate::HashTable) is built
/// with.
///
/// The strategy is fixed for the lifetime of a table. [`Strategy::Chaining`]
/// stores keys in per-bucket chains; the three probing strategies store at most
/// one key per slot and differ only in the probe sequence they walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Separate chaining: each bucket holds a chain of keys.
    #[default]
    Chaining,
    /// Open addressing with the sequence `h + i`.
    LinearProbing,
    /// Open addressing with the sequence `h + i + i²`.
    QuadraticProbing,
    /// Open addressing with the sequence `h + i·h2`, where `h2` is the
    /// secondary hash of the key.
    DoubleHashing,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Chaining,
        Strategy::LinearProbing,
        Strategy::QuadraticProbing,
        Strategy::DoubleHashing,
    ];

    /// The canonical upper-case name used in snapshots, e.g. `"LINEAR_PROBING"`.
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Chaining => "CHAINING",
            Strategy::LinearProbing => "LINEAR_PROBING",
            Strategy::QuadraticProbing => "QUADRATIC_PROBING",
            Strategy::DoubleHashing => "DOUBLE_HASHING",
        }
    }

    /// Returns `true` for the three strategies that store keys directly in the
    /// slot array.
    pub const fn is_open_addressing(self) -> bool {
        !matches!(self, Strategy::Chaining)
    }
}

/// Maps a strategy identifier to a [`Strategy`], ignoring ASCII case.
///
/// Recognizes the canonical names and their short forms: `CHAINING`,
/// `LINEAR`/`LINEAR_PROBING`, `QUADRATIC`/`QUADRATIC_PROBING` and
/// `DOUBLE`/`DOUBLE_HASHING`. Anything else falls back to
/// [`Strategy::Chaining`].
///
/// # Examples
///
/// ```rust
/// use probe_hash::Strategy;
/// use probe_hash::parse_strategy;
///
/// assert_eq!(parse_strategy("linear"), Strategy::LinearProbing);
/// assert_eq!(parse_strategy("Double_Hashing"), Strategy::DoubleHashing);
/// assert_eq!(parse_strategy("cuckoo"), Strategy::Chaining);
/// ```
pub fn parse_strategy(text: &str) -> Strategy {
    const ALIASES: [(&str, Strategy); 7] = [
        ("CHAINING", Strategy::Chaining),
        ("LINEAR", Strategy::LinearProbing),
        ("LINEAR_PROBING", Strategy::LinearProbing),
        ("QUADRATIC", Strategy::QuadraticProbing),
        ("QUADRATIC_PROBING", Strategy::QuadraticProbing),
        ("DOUBLE", Strategy::DoubleHashing),
        ("DOUBLE_HASHING", Strategy::DoubleHashing),
    ];

    let text = text.trim();
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(text))
        .map(|&(_, strategy)| strategy)
        .unwrap_or_else(|| {
            log::debug!("unrecognized strategy {text:?}, falling back to CHAINING");
            Strategy::Chaining
        })
}

impl FromStr for Strategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_strategy(s))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Deserialization goes through the same permissive mapping as the string
// parser, so config files and snapshots accept the short forms too.
impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(parse_strategy(&text))
    }
}
