//! Study page data

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Record;

/// Suffix carried by study page names in URLs.
pub const PAGE_SUFFIX: &str = ".html";

/// Curated study number as it appears in a study page URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuratedStudyNumber(String);

impl CuratedStudyNumber {
    /// Wrap a curated study number. Empty values are rejected.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Parse a page name such as `CS001.html`.
    ///
    /// Returns `None` when the `.html` suffix is absent or nothing precedes it.
    pub fn from_page_name(page: &str) -> Option<Self> {
        page.strip_suffix(PAGE_SUFFIX).and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CuratedStudyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CuratedStudyNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything shown on one study page.
///
/// Child record sets are scoped by the study's internal `study_number`.
/// Field names are the names the page template receives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyDetail {
    pub study: Record,
    /// Ordered by `treatment_day` ascending.
    pub treatments: Vec<Record>,
    /// Ordered by `measurement_day` ascending.
    pub measurements: Vec<Record>,
    pub animals: Vec<Record>,
    /// Groups left-joined with colors on `drug`; `color` is null when absent.
    pub group_labels: Vec<Record>,
}
