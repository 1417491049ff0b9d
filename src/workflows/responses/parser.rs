use super::normalizer::normalize_code;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) code: String,
    pub(crate) rating: RawRating,
    pub(crate) line: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawRating {
    Missing,
    Value(i64),
    Unparseable(String),
}

impl RawRating {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(text) => text
                .parse::<i64>()
                .map(Self::Value)
                .unwrap_or_else(|_| Self::Unparseable(text.to_string())),
        }
    }
}

/// Reads `item_code,rating` rows; any further columns are ignored.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RawResponse>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|position| position.line());
        let row: ResponseRow = record.deserialize(Some(&headers))?;

        records.push(RawResponse {
            code: normalize_code(&row.item_code),
            rating: RawRating::parse(row.rating.as_deref()),
            line,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    #[serde(alias = "\u{feff}item_code")]
    item_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
