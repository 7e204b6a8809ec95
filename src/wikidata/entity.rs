//! Typed entity records decoded from the raw entity-data JSON.
//!
//! Decoding is eager: every statement value is turned into a tagged variant
//! at the store boundary, and any shape outside the recognized ones is a
//! hard validation error. Raw dynamic JSON never flows past this module.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::error::{MediaGraphError, Result};
use crate::wikidata::ids::{
    ItemRef, PropertyRef, Q_GREGORIAN_CALENDAR, Q_PROLEPTIC_GREGORIAN_CALENDAR,
};

/// Statement rank. Anything other than the three known ranks is rejected at
/// decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Preferred,
    Normal,
    Deprecated,
}

impl Rank {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "preferred" => Ok(Rank::Preferred),
            "normal" => Ok(Rank::Normal),
            "deprecated" => Ok(Rank::Deprecated),
            other => Err(MediaGraphError::Validation(format!(
                "unrecognized statement rank {other:?}"
            ))),
        }
    }
}

/// Inclusive (earliest, latest) UTC bound pair decoded from an asserted date
/// plus its stated precision and before/after uncertainty counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

/// Main value of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Item(ItemRef),
    Text(String),
    Time(TimeRange),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Item(_) => "item",
            Value::Text(_) => "string",
            Value::Time(_) => "time",
        }
    }
}

/// One property assertion on an entity.
///
/// `value` is `None` for explicit unknown-value and no-value assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub rank: Rank,
    pub value: Option<Value>,
}

/// Immutable record for one graph node: multilingual labels and
/// descriptions, and the ordered statement lists per property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    labels: BTreeMap<String, String>,
    descriptions: BTreeMap<String, String>,
    statements: HashMap<PropertyRef, Vec<Statement>>,
}

impl Entity {
    /// Decode the raw entity-data JSON for one node.
    pub fn decode(data: serde_json::Value) -> Result<Self> {
        let raw: RawEntity = serde_json::from_value(data)
            .map_err(|e| MediaGraphError::Validation(format!("malformed entity record: {e}")))?;
        let mut statements = HashMap::new();
        for (property, raw_statements) in raw.claims {
            let property = PropertyRef::parse(&property)?;
            let decoded = raw_statements
                .into_iter()
                .map(Statement::from_raw)
                .collect::<Result<Vec<_>>>()?;
            statements.insert(property, decoded);
        }
        Ok(Self {
            labels: raw.labels.into_iter().map(|(k, t)| (k, t.value)).collect(),
            descriptions: raw
                .descriptions
                .into_iter()
                .map(|(k, t)| (k, t.value))
                .collect(),
            statements,
        })
    }

    /// Truthy statements for a property: the preferred-rank ones if any
    /// exist, else the normal-rank ones. Deprecated-rank is always excluded.
    pub fn truthy_statements(&self, property: PropertyRef) -> Vec<&Statement> {
        let all = match self.statements.get(&property) {
            Some(statements) => statements,
            None => return Vec::new(),
        };
        let preferred: Vec<&Statement> = all
            .iter()
            .filter(|s| s.rank == Rank::Preferred)
            .collect();
        if !preferred.is_empty() {
            return preferred;
        }
        all.iter().filter(|s| s.rank == Rank::Normal).collect()
    }

    /// Item targets of the truthy statements for a property.
    ///
    /// Unknown-value assertions carry no target and are skipped; any other
    /// value kind where an item is expected is a validation error.
    pub fn truthy_item_values(&self, property: PropertyRef) -> Result<Vec<ItemRef>> {
        let mut items = Vec::new();
        for statement in self.truthy_statements(property) {
            match &statement.value {
                Some(Value::Item(item)) => items.push(*item),
                Some(other) => {
                    return Err(MediaGraphError::Validation(format!(
                        "expected an item value for {property}, got a {} value",
                        other.kind()
                    )))
                }
                None => {}
            }
        }
        Ok(items)
    }

    /// String values of the truthy statements for a property.
    pub fn truthy_text_values(&self, property: PropertyRef) -> Result<Vec<&str>> {
        let mut texts = Vec::new();
        for statement in self.truthy_statements(property) {
            match &statement.value {
                Some(Value::Text(text)) => texts.push(text.as_str()),
                Some(other) => {
                    return Err(MediaGraphError::Validation(format!(
                        "expected a string value for {property}, got a {} value",
                        other.kind()
                    )))
                }
                None => {}
            }
        }
        Ok(texts)
    }

    /// Label in the first matching configured language, falling back to any
    /// available language sharing the same primary-language prefix.
    pub fn label(&self, languages: &[String]) -> Option<&str> {
        lookup_term(&self.labels, languages)
    }

    /// Description in the first matching configured language, with the same
    /// fallback as [`Entity::label`].
    pub fn description(&self, languages: &[String]) -> Option<&str> {
        lookup_term(&self.descriptions, languages)
    }
}

fn primary_language(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

fn lookup_term<'a>(terms: &'a BTreeMap<String, String>, languages: &[String]) -> Option<&'a str> {
    for language in languages {
        if let Some(value) = terms.get(language) {
            return Some(value);
        }
        let primary = primary_language(language);
        for (tag, value) in terms {
            if primary_language(tag) == primary {
                return Some(value);
            }
        }
    }
    None
}

impl Statement {
    fn from_raw(raw: RawStatement) -> Result<Self> {
        let rank = Rank::parse(&raw.rank)?;
        let value = match raw.mainsnak.snaktype.as_str() {
            "value" => {
                let datavalue = raw.mainsnak.datavalue.ok_or_else(|| {
                    MediaGraphError::Validation(
                        "value statement is missing its data value".to_string(),
                    )
                })?;
                Some(Value::from_raw(datavalue)?)
            }
            "somevalue" | "novalue" => None,
            other => {
                return Err(MediaGraphError::Validation(format!(
                    "unrecognized snak type {other:?}"
                )))
            }
        };
        Ok(Self { rank, value })
    }
}

impl Value {
    fn from_raw(raw: RawDataValue) -> Result<Self> {
        match raw {
            RawDataValue::EntityId(entity_id) => {
                if entity_id.entity_type != "item" {
                    return Err(MediaGraphError::Validation(format!(
                        "expected an item reference, got entity type {:?}",
                        entity_id.entity_type
                    )));
                }
                Ok(Value::Item(ItemRef::parse(&entity_id.id)?))
            }
            RawDataValue::String(text) => Ok(Value::Text(text)),
            RawDataValue::Time(time) => Ok(Value::Time(TimeRange::decode(&time)?)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(default)]
    labels: BTreeMap<String, RawTerm>,
    #[serde(default)]
    descriptions: BTreeMap<String, RawTerm>,
    #[serde(default)]
    claims: BTreeMap<String, Vec<RawStatement>>,
}

#[derive(Debug, Deserialize)]
struct RawTerm {
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawStatement {
    mainsnak: RawSnak,
    rank: String,
}

#[derive(Debug, Deserialize)]
struct RawSnak {
    snaktype: String,
    #[serde(default)]
    datavalue: Option<RawDataValue>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "value")]
enum RawDataValue {
    #[serde(rename = "wikibase-entityid")]
    EntityId(RawEntityId),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "time")]
    Time(RawTimeValue),
}

#[derive(Debug, Deserialize)]
struct RawEntityId {
    #[serde(rename = "entity-type")]
    entity_type: String,
    id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTimeValue {
    time: String,
    timezone: i64,
    before: i64,
    after: i64,
    precision: u32,
    calendarmodel: String,
}

fn time_pattern() -> &'static regex::Regex {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^([+-])([0-9]{1,16})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2})Z$")
            .expect("Invalid regex pattern")
    })
}

fn out_of_range(raw: &RawTimeValue) -> MediaGraphError {
    MediaGraphError::Validation(format!(
        "time value {:?} is outside the supported date range",
        raw.time
    ))
}

/// First day of the month identified by a count of months since year 0.
fn month_start(total_months: i64, raw: &RawTimeValue) -> Result<NaiveDate> {
    let year = i32::try_from(total_months.div_euclid(12)).map_err(|_| out_of_range(raw))?;
    let month = total_months.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| out_of_range(raw))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive range covering the span-aligned year blocks from `before` blocks
/// below the asserted one through `after` blocks above it.
fn year_block_range(
    year: i64,
    span: i64,
    before: i64,
    after: i64,
    raw: &RawTimeValue,
) -> Result<TimeRange> {
    let base = year
        .checked_sub(year.rem_euclid(span))
        .ok_or_else(|| out_of_range(raw))?;
    let start_year = base
        .checked_sub(before.checked_mul(span).ok_or_else(|| out_of_range(raw))?)
        .ok_or_else(|| out_of_range(raw))?;
    let end_start_year = base
        .checked_add(
            after
                .checked_add(1)
                .and_then(|n| n.checked_mul(span))
                .ok_or_else(|| out_of_range(raw))?,
        )
        .ok_or_else(|| out_of_range(raw))?;
    let earliest = month_start(start_year.checked_mul(12).ok_or_else(|| out_of_range(raw))?, raw)?;
    let end_start = month_start(
        end_start_year.checked_mul(12).ok_or_else(|| out_of_range(raw))?,
        raw,
    )?;
    Ok(TimeRange {
        earliest: day_start(earliest),
        latest: day_start(end_start) - chrono::Duration::seconds(1),
    })
}

impl TimeRange {
    pub(crate) fn decode(raw: &RawTimeValue) -> Result<Self> {
        if raw.timezone != 0 {
            return Err(MediaGraphError::Validation(format!(
                "unsupported timezone offset {} in time value (only UTC is supported)",
                raw.timezone
            )));
        }
        let calendar = ItemRef::parse(&raw.calendarmodel)?;
        if calendar != Q_GREGORIAN_CALENDAR && calendar != Q_PROLEPTIC_GREGORIAN_CALENDAR {
            return Err(MediaGraphError::Validation(format!(
                "unsupported calendar model {calendar} in time value"
            )));
        }
        if raw.before < 0 || raw.after < 0 {
            return Err(MediaGraphError::Validation(
                "negative before/after count in time value".to_string(),
            ));
        }
        let captures = time_pattern().captures(&raw.time).ok_or_else(|| {
            MediaGraphError::Validation(format!("malformed time string {:?}", raw.time))
        })?;
        let mut year: i64 = captures[2]
            .parse()
            .map_err(|_| out_of_range(raw))?;
        if &captures[1] == "-" {
            year = -year;
        }
        let month: u32 = captures[3].parse().map_err(|_| out_of_range(raw))?;
        let day: u32 = captures[4].parse().map_err(|_| out_of_range(raw))?;
        if &captures[5] != "00" || &captures[6] != "00" || &captures[7] != "00" {
            return Err(MediaGraphError::Validation(format!(
                "sub-day time components are not supported, got {:?}",
                raw.time
            )));
        }

        match raw.precision {
            // Day: the range covers whole days around the asserted one.
            11 => {
                let year = i32::try_from(year).map_err(|_| out_of_range(raw))?;
                let date =
                    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| out_of_range(raw))?;
                let earliest = date
                    .checked_sub_days(Days::new(raw.before as u64))
                    .ok_or_else(|| out_of_range(raw))?;
                let end_start = date
                    .checked_add_days(Days::new(raw.after as u64 + 1))
                    .ok_or_else(|| out_of_range(raw))?;
                Ok(TimeRange {
                    earliest: day_start(earliest),
                    latest: day_start(end_start) - chrono::Duration::seconds(1),
                })
            }
            // Month: whole months; the day component is meaningless here.
            10 => {
                if !(1..=12).contains(&month) {
                    return Err(out_of_range(raw));
                }
                let total = year
                    .checked_mul(12)
                    .and_then(|y| y.checked_add(i64::from(month) - 1))
                    .ok_or_else(|| out_of_range(raw))?;
                let earliest = month_start(
                    total.checked_sub(raw.before).ok_or_else(|| out_of_range(raw))?,
                    raw,
                )?;
                let end_start = month_start(
                    total
                        .checked_add(raw.after)
                        .and_then(|t| t.checked_add(1))
                        .ok_or_else(|| out_of_range(raw))?,
                    raw,
                )?;
                Ok(TimeRange {
                    earliest: day_start(earliest),
                    latest: day_start(end_start) - chrono::Duration::seconds(1),
                })
            }
            9 => year_block_range(year, 1, raw.before, raw.after, raw),
            8 => year_block_range(year, 10, raw.before, raw.after, raw),
            7 => year_block_range(year, 100, raw.before, raw.after, raw),
            other => Err(MediaGraphError::Validation(format!(
                "unsupported time precision {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikidata::ids::{P_INSTANCE_OF, P_PUBLICATION_DATE, P_SERIES_ORDINAL};
    use chrono::TimeZone;
    use serde_json::json;

    fn q(n: u64) -> ItemRef {
        ItemRef::from_numeric(n)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn time_value(
        time: &str,
        precision: u32,
        before: i64,
        after: i64,
        calendarmodel: &str,
    ) -> RawTimeValue {
        RawTimeValue {
            time: time.to_string(),
            timezone: 0,
            before,
            after,
            precision,
            calendarmodel: calendarmodel.to_string(),
        }
    }

    const GREGORIAN: &str = "http://www.wikidata.org/entity/Q1985727";

    #[test]
    fn test_time_day_precision() {
        let range =
            TimeRange::decode(&time_value("+2023-05-10T00:00:00Z", 11, 0, 0, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(2023, 5, 10, 0, 0, 0));
        assert_eq!(range.latest, utc(2023, 5, 10, 23, 59, 59));
    }

    #[test]
    fn test_time_day_precision_with_uncertainty() {
        let range =
            TimeRange::decode(&time_value("+2023-05-10T00:00:00Z", 11, 1, 2, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(2023, 5, 9, 0, 0, 0));
        assert_eq!(range.latest, utc(2023, 5, 12, 23, 59, 59));
    }

    #[test]
    fn test_time_month_precision() {
        let range =
            TimeRange::decode(&time_value("+2023-01-00T00:00:00Z", 10, 0, 1, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(2023, 1, 1, 0, 0, 0));
        assert_eq!(range.latest, utc(2023, 2, 28, 23, 59, 59));
    }

    #[test]
    fn test_time_month_precision_year_boundary() {
        let range =
            TimeRange::decode(&time_value("+2023-12-00T00:00:00Z", 10, 1, 1, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(2023, 11, 1, 0, 0, 0));
        assert_eq!(range.latest, utc(2024, 1, 31, 23, 59, 59));
    }

    #[test]
    fn test_time_year_precision() {
        let range =
            TimeRange::decode(&time_value("+1999-00-00T00:00:00Z", 9, 0, 0, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(1999, 1, 1, 0, 0, 0));
        assert_eq!(range.latest, utc(1999, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_time_year_precision_with_uncertainty() {
        let range =
            TimeRange::decode(&time_value("+1999-00-00T00:00:00Z", 9, 2, 1, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(1997, 1, 1, 0, 0, 0));
        assert_eq!(range.latest, utc(2000, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_time_decade_precision() {
        let range =
            TimeRange::decode(&time_value("+1994-00-00T00:00:00Z", 8, 0, 0, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(1990, 1, 1, 0, 0, 0));
        assert_eq!(range.latest, utc(1999, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_time_century_precision() {
        let range =
            TimeRange::decode(&time_value("+1923-00-00T00:00:00Z", 7, 0, 0, GREGORIAN)).unwrap();
        assert_eq!(range.earliest, utc(1900, 1, 1, 0, 0, 0));
        assert_eq!(range.latest, utc(1999, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_time_plain_gregorian_accepted() {
        let range = TimeRange::decode(&time_value(
            "+2001-09-11T00:00:00Z",
            11,
            0,
            0,
            "http://www.wikidata.org/entity/Q12138",
        ))
        .unwrap();
        assert_eq!(range.earliest, utc(2001, 9, 11, 0, 0, 0));
    }

    #[test]
    fn test_time_rejects_julian_calendar() {
        let err = TimeRange::decode(&time_value(
            "+1500-01-01T00:00:00Z",
            11,
            0,
            0,
            "http://www.wikidata.org/entity/Q1985786",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("calendar"));
    }

    #[test]
    fn test_time_rejects_nonzero_timezone() {
        let mut raw = time_value("+2023-05-10T00:00:00Z", 11, 0, 0, GREGORIAN);
        raw.timezone = 60;
        let err = TimeRange::decode(&raw).unwrap_err();
        assert!(err.to_string().contains("timezone"));
    }

    #[test]
    fn test_time_rejects_unsupported_precision() {
        let err = TimeRange::decode(&time_value("+2000-00-00T00:00:00Z", 6, 0, 0, GREGORIAN))
            .unwrap_err();
        assert!(err.to_string().contains("precision"));
    }

    #[test]
    fn test_time_rejects_sub_day_components() {
        assert!(
            TimeRange::decode(&time_value("+2023-05-10T12:00:00Z", 11, 0, 0, GREGORIAN)).is_err()
        );
    }

    #[test]
    fn test_time_rejects_malformed_string() {
        assert!(TimeRange::decode(&time_value("2023-05-10", 11, 0, 0, GREGORIAN)).is_err());
    }

    fn sample_entity() -> Entity {
        Entity::decode(json!({
            "labels": {
                "en": {"language": "en", "value": "Example Show"},
                "de": {"language": "de", "value": "Beispielserie"},
            },
            "descriptions": {
                "en-gb": {"language": "en-gb", "value": "a show about examples"},
            },
            "claims": {
                "P31": [
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P31",
                            "datavalue": {
                                "type": "wikibase-entityid",
                                "value": {"entity-type": "item", "id": "Q5398426"},
                            },
                        },
                        "rank": "normal",
                    },
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P31",
                            "datavalue": {
                                "type": "wikibase-entityid",
                                "value": {"entity-type": "item", "id": "Q105420"},
                            },
                        },
                        "rank": "deprecated",
                    },
                ],
                "P1545": [
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P1545",
                            "datavalue": {"type": "string", "value": "1"},
                        },
                        "rank": "normal",
                    },
                ],
                "P577": [
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P577",
                            "datavalue": {
                                "type": "time",
                                "value": {
                                    "time": "+2020-03-00T00:00:00Z",
                                    "timezone": 0,
                                    "before": 0,
                                    "after": 0,
                                    "precision": 10,
                                    "calendarmodel": "http://www.wikidata.org/entity/Q1985727",
                                },
                            },
                        },
                        "rank": "normal",
                    },
                ],
            },
        }))
        .unwrap()
    }

    #[test]
    fn test_entity_decode_and_truthy_items() {
        let entity = sample_entity();
        // Deprecated statements never count as truthy.
        assert_eq!(
            entity.truthy_item_values(P_INSTANCE_OF).unwrap(),
            vec![q(5398426)]
        );
    }

    #[test]
    fn test_entity_preferred_shadows_normal() {
        let entity = Entity::decode(json!({
            "claims": {
                "P31": [
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P31",
                            "datavalue": {
                                "type": "wikibase-entityid",
                                "value": {"entity-type": "item", "id": "Q1"},
                            },
                        },
                        "rank": "normal",
                    },
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P31",
                            "datavalue": {
                                "type": "wikibase-entityid",
                                "value": {"entity-type": "item", "id": "Q2"},
                            },
                        },
                        "rank": "preferred",
                    },
                ],
            },
        }))
        .unwrap();
        assert_eq!(entity.truthy_item_values(P_INSTANCE_OF).unwrap(), vec![q(2)]);
    }

    #[test]
    fn test_entity_unknown_value_skipped() {
        let entity = Entity::decode(json!({
            "claims": {
                "P31": [
                    {"mainsnak": {"snaktype": "somevalue", "property": "P31"}, "rank": "normal"},
                ],
            },
        }))
        .unwrap();
        assert!(entity.truthy_item_values(P_INSTANCE_OF).unwrap().is_empty());
    }

    #[test]
    fn test_entity_truthy_text_values() {
        let entity = sample_entity();
        assert_eq!(
            entity.truthy_text_values(P_SERIES_ORDINAL).unwrap(),
            vec!["1"]
        );
    }

    #[test]
    fn test_entity_wrong_value_kind_rejected() {
        let entity = sample_entity();
        assert!(entity.truthy_item_values(P_SERIES_ORDINAL).is_err());
        assert!(entity.truthy_text_values(P_INSTANCE_OF).is_err());
        assert!(entity.truthy_text_values(P_PUBLICATION_DATE).is_err());
    }

    #[test]
    fn test_entity_rejects_unknown_rank() {
        let result = Entity::decode(json!({
            "claims": {
                "P31": [
                    {"mainsnak": {"snaktype": "novalue", "property": "P31"}, "rank": "best"},
                ],
            },
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_rejects_unknown_value_shape() {
        let result = Entity::decode(json!({
            "claims": {
                "P2047": [
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P2047",
                            "datavalue": {"type": "quantity", "value": {"amount": "+45"}},
                        },
                        "rank": "normal",
                    },
                ],
            },
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_rejects_property_where_item_expected() {
        let result = Entity::decode(json!({
            "claims": {
                "P31": [
                    {
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P31",
                            "datavalue": {
                                "type": "wikibase-entityid",
                                "value": {"entity-type": "property", "id": "P279"},
                            },
                        },
                        "rank": "normal",
                    },
                ],
            },
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_label_exact_language() {
        let entity = sample_entity();
        assert_eq!(entity.label(&["de".to_string()]), Some("Beispielserie"));
    }

    #[test]
    fn test_label_primary_language_fallback() {
        let entity = sample_entity();
        // "en" description only exists as "en-gb"; the primary prefix matches.
        assert_eq!(
            entity.description(&["en".to_string()]),
            Some("a show about examples")
        );
    }

    #[test]
    fn test_label_preference_order() {
        let entity = sample_entity();
        assert_eq!(
            entity.label(&["fr".to_string(), "de".to_string(), "en".to_string()]),
            Some("Beispielserie")
        );
    }

    #[test]
    fn test_label_missing() {
        let entity = sample_entity();
        assert_eq!(entity.label(&["ja".to_string()]), None);
    }
}
