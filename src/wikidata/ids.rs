//! Validated identifiers for Wikidata items and properties, plus the fixed
//! vocabulary the relation heuristics are built on.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MediaGraphError, Result};

const ITEM_PREFIX_FOR_HUMAN: &str = "https://www.wikidata.org/wiki/";
const ITEM_PREFIX_CANONICAL_URI: &str = "http://www.wikidata.org/entity/";
const PROPERTY_PREFIX_FOR_HUMAN: &str = "https://www.wikidata.org/wiki/Property:";

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Z])([0-9]+)$").expect("Invalid regex pattern"))
}

/// Parse an identifier of the form `<letter><digits>`, optionally preceded by
/// one of the accepted URL prefixes.
fn parse_id(value: &str, prefixes: &[&str], letter: char) -> Result<u64> {
    let bare = prefixes
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value);
    let captures = id_pattern().captures(bare).ok_or_else(|| {
        MediaGraphError::Validation(format!(
            "identifier {value:?} is not in a recognized form (expected {letter}123, \
             optionally with a known URL prefix)"
        ))
    })?;
    if captures[1].chars().next() != Some(letter) {
        return Err(MediaGraphError::Validation(format!(
            "identifier {value:?} does not start with {letter:?}"
        )));
    }
    captures[2].parse::<u64>().map_err(|_| {
        MediaGraphError::Validation(format!("identifier {value:?} has an out-of-range number"))
    })
}

/// Reference to an item (a node) in the knowledge graph, e.g. `Q3107329`.
///
/// Stored as the numeric part of the id; cheap to copy and usable as an
/// ordered map/set key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemRef(u64);

impl ItemRef {
    /// Build a reference directly from the numeric part of an item id.
    pub const fn from_numeric(value: u64) -> Self {
        Self(value)
    }

    /// Parse from a bare id (`Q123`), the human wiki URL, or the canonical
    /// entity URI.
    pub fn parse(value: &str) -> Result<Self> {
        parse_id(
            value,
            &[ITEM_PREFIX_FOR_HUMAN, ITEM_PREFIX_CANONICAL_URI],
            'Q',
        )
        .map(Self)
    }

    /// The canonical URI of the item.
    ///
    /// This is the URI used to identify the item in query results, not the
    /// URL for reading data about it.
    pub fn uri(&self) -> String {
        format!("{ITEM_PREFIX_CANONICAL_URI}{}", self)
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl FromStr for ItemRef {
    type Err = MediaGraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Reference to a property (an edge type) in the knowledge graph, e.g. `P31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyRef(u64);

impl PropertyRef {
    /// Build a reference directly from the numeric part of a property id.
    pub const fn from_numeric(value: u64) -> Self {
        Self(value)
    }

    /// Parse from a bare id (`P123`) or the human property URL.
    pub fn parse(value: &str) -> Result<Self> {
        parse_id(value, &[PROPERTY_PREFIX_FOR_HUMAN], 'P').map(Self)
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl FromStr for PropertyRef {
    type Err = MediaGraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Properties consumed by the engine.
pub const P_INSTANCE_OF: PropertyRef = PropertyRef(31);
pub const P_SUBCLASS_OF: PropertyRef = PropertyRef(279);
pub const P_FOLLOWS: PropertyRef = PropertyRef(155);
pub const P_FOLLOWED_BY: PropertyRef = PropertyRef(156);
pub const P_PART_OF_THE_SERIES: PropertyRef = PropertyRef(179);
pub const P_PART_OF: PropertyRef = PropertyRef(361);
pub const P_HAS_PARTS: PropertyRef = PropertyRef(527);
pub const P_BASED_ON: PropertyRef = PropertyRef(144);
pub const P_PUBLICATION_DATE: PropertyRef = PropertyRef(577);
pub const P_TAKES_PLACE_IN_FICTIONAL_UNIVERSE: PropertyRef = PropertyRef(1434);
pub const P_SERIES_ORDINAL: PropertyRef = PropertyRef(1545);
pub const P_DERIVATIVE_WORK: PropertyRef = PropertyRef(4969);
pub const P_MODIFIED_VERSION_OF: PropertyRef = PropertyRef(5059);
pub const P_FORM_OF_CREATIVE_WORK: PropertyRef = PropertyRef(7937);
pub const P_MEDIA_FRANCHISE: PropertyRef = PropertyRef(8345);

// Calendar models accepted in time values.
pub const Q_GREGORIAN_CALENDAR: ItemRef = ItemRef(12138);
pub const Q_PROLEPTIC_GREGORIAN_CALENDAR: ItemRef = ItemRef(1985727);

// Classes used by the classification heuristics.
pub const Q_ANTHOLOGY: ItemRef = ItemRef(105420);
pub const Q_AUDIOVISUAL_WORK: ItemRef = ItemRef(2431196);
pub const Q_FICTIONAL_ENTITY: ItemRef = ItemRef(14897293);
pub const Q_FICTIONAL_UNIVERSE: ItemRef = ItemRef(559618);
pub const Q_LITERARY_WORK: ItemRef = ItemRef(7725634);
pub const Q_MUSICAL_WORK: ItemRef = ItemRef(2188189);
pub const Q_PART_OF_TELEVISION_SEASON: ItemRef = ItemRef(93992677);
pub const Q_PLACEHOLDER_NAME: ItemRef = ItemRef(1151870);
pub const Q_RELEASE_GROUP: ItemRef = ItemRef(108346082);
pub const Q_TELEVISION_PILOT: ItemRef = ItemRef(653916);
pub const Q_TELEVISION_SERIES: ItemRef = ItemRef(5398426);
pub const Q_TELEVISION_SERIES_EPISODE: ItemRef = ItemRef(21191270);
pub const Q_TELEVISION_SERIES_SEASON: ItemRef = ItemRef(3464665);
pub const Q_TELEVISION_SPECIAL: ItemRef = ItemRef(1261214);
pub const Q_WIKIMEDIA_LIST_ARTICLE: ItemRef = ItemRef(13406463);

// Universe nodes whose fan-out connects effectively everything; traversal
// never enters them.
pub const Q_MARVEL_UNIVERSE: ItemRef = ItemRef(931597);
pub const Q_DC_UNIVERSE: ItemRef = ItemRef(1152150);
