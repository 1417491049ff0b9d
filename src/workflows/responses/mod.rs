//! Loading questionnaire answers into a [`ResponseSet`].
//!
//! Input is either a CSV export (`item_code,rating`) or already-decoded pairs. Every
//! deviation from a clean 88-row answer sheet is reported as an [`ImportIssue`]; in
//! strict mode any issue rejects the whole set.

mod normalizer;
mod parser;

use crate::workflows::profile::domain::{Likert, ResponseSet};
use crate::workflows::profile::registry::ItemRegistry;
use parser::{RawRating, RawResponse};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ResponseImportError {
    #[error("failed to read response file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid response CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("response set rejected with {} issue(s): {}", .issues.len(), summarize(.issues))]
    Rejected { issues: Vec<ImportIssue> },
}

fn summarize(issues: &[ImportIssue]) -> String {
    const SHOWN: usize = 3;
    let mut parts: Vec<String> = issues.iter().take(SHOWN).map(ToString::to_string).collect();
    if issues.len() > SHOWN {
        parts.push(format!("and {} more", issues.len() - SHOWN));
    }
    parts.join("; ")
}

/// A flagged row or gap in the answer sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportIssue {
    UnknownItem {
        code: String,
        line: Option<u64>,
    },
    DuplicateItem {
        code: String,
        line: Option<u64>,
    },
    InvalidRating {
        code: String,
        value: String,
        line: Option<u64>,
    },
    OutOfRange {
        code: String,
        value: i64,
        line: Option<u64>,
    },
    MissingItem {
        code: String,
    },
}

impl ImportIssue {
    pub fn code(&self) -> &str {
        match self {
            Self::UnknownItem { code, .. }
            | Self::DuplicateItem { code, .. }
            | Self::InvalidRating { code, .. }
            | Self::OutOfRange { code, .. }
            | Self::MissingItem { code } => code,
        }
    }
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = |line: &Option<u64>| match line {
            Some(line) => format!(" (line {line})"),
            None => String::new(),
        };
        match self {
            Self::UnknownItem { code, line } => write!(f, "unknown item {code}{}", at(line)),
            Self::DuplicateItem { code, line } => {
                write!(f, "duplicate item {code} ignored{}", at(line))
            }
            Self::InvalidRating { code, value, line } => {
                write!(f, "item {code} has non-integer rating '{value}'{}", at(line))
            }
            Self::OutOfRange { code, value, line } => {
                write!(f, "item {code} rating {value} outside 1-5{}", at(line))
            }
            Self::MissingItem { code } => write!(f, "item {code} not answered"),
        }
    }
}

/// Validated answers plus everything that had to be dropped or was absent.
#[derive(Debug, Clone, Default)]
pub struct ResponseImport {
    pub responses: ResponseSet,
    pub issues: Vec<ImportIssue>,
}

impl ResponseImport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct ResponseImporter<'r> {
    registry: &'r ItemRegistry,
    strict: bool,
}

impl<'r> ResponseImporter<'r> {
    pub fn new(registry: &'r ItemRegistry) -> Self {
        Self {
            registry,
            strict: false,
        }
    }

    /// Reject the set on any issue instead of scoring what is usable.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<ResponseImport, ResponseImportError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading response csv");
        let file = std::fs::File::open(path)?;
        self.import_reader(file)
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<ResponseImport, ResponseImportError> {
        let records = parser::parse_records(reader)?;
        self.finish(records)
    }

    /// Imports already-decoded `(code, rating)` pairs, e.g. from a JSON body.
    pub fn import_pairs<I, K>(&self, pairs: I) -> Result<ResponseImport, ResponseImportError>
    where
        I: IntoIterator<Item = (K, Option<i64>)>,
        K: AsRef<str>,
    {
        let records = pairs
            .into_iter()
            .map(|(code, rating)| RawResponse {
                code: normalizer::normalize_code(code.as_ref()),
                rating: rating.map(RawRating::Value).unwrap_or(RawRating::Missing),
                line: None,
            })
            .collect();
        self.finish(records)
    }

    fn finish(&self, records: Vec<RawResponse>) -> Result<ResponseImport, ResponseImportError> {
        let mut responses = ResponseSet::new();
        let mut issues = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for RawResponse { code, rating, line } in records {
            if self.registry.lookup(&code).is_none() {
                issues.push(ImportIssue::UnknownItem { code, line });
                continue;
            }
            if !seen.insert(code.clone()) {
                issues.push(ImportIssue::DuplicateItem { code, line });
                continue;
            }

            match rating {
                RawRating::Value(value) => match Likert::new(value) {
                    Ok(rating) => responses.record(code, rating),
                    Err(_) => {
                        responses.mark_missing(code.clone());
                        issues.push(ImportIssue::OutOfRange { code, value, line });
                    }
                },
                RawRating::Unparseable(value) => {
                    responses.mark_missing(code.clone());
                    issues.push(ImportIssue::InvalidRating { code, value, line });
                }
                RawRating::Missing => responses.mark_missing(code),
            }
        }

        for item in self.registry.items() {
            if responses.rating(item.code).is_none() {
                let flagged = issues.iter().any(|issue| {
                    issue.code() == item.code && !matches!(issue, ImportIssue::DuplicateItem { .. })
                });
                if !flagged {
                    issues.push(ImportIssue::MissingItem {
                        code: item.code.to_string(),
                    });
                }
            }
        }

        if !issues.is_empty() {
            warn!(issues = issues.len(), strict = self.strict, "response set has import issues");
        }

        if self.strict && !issues.is_empty() {
            return Err(ResponseImportError::Rejected { issues });
        }

        Ok(ResponseImport { responses, issues })
    }
}
