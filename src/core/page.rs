//! Page data model — content payloads, title table, and section index.
//!
//! The core never interprets page content; these types exist so sources
//! can decode it and the UI can format it.

use serde::Deserialize;

/// Page numbers are signed: cursors may legitimately run to zero or below.
pub type PageNumber = i64;

// ───────────────────────────────────────── content ───────────

/// One line record of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    /// Columns of text fragments, left to right.
    pub text: Vec<Vec<String>>,
    /// Verse labels covered by this line.
    #[serde(default)]
    pub verses: Vec<String>,
    /// Section (aliyah) labels covered by this line.
    #[serde(default)]
    pub aliyot: Vec<String>,
    /// Line opens a new paragraph (section break).
    #[serde(default)]
    pub is_petucha: bool,
}

/// Opaque page payload: ordered line records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PageContent {
    pub lines: Vec<LineRecord>,
}

impl PageContent {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A successfully fetched, non-empty page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub key: PageNumber,
    pub content: PageContent,
}

// ───────────────────────────────────────── titles ────────────

/// One entry of the title table: a single name or several names that
/// share the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TitleEntry {
    Single(String),
    Many(Vec<String>),
}

impl TitleEntry {
    /// Display string for the title bar.
    pub fn format(&self) -> String {
        match self {
            TitleEntry::Single(name) => name.clone(),
            TitleEntry::Many(names) => names.join(" · "),
        }
    }
}

/// Title lookup table indexed by `page - 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TitleTable {
    entries: Vec<TitleEntry>,
}

impl TitleTable {
    #[cfg(test)]
    pub fn new(entries: Vec<TitleEntry>) -> Self {
        Self { entries }
    }

    /// Formatted title for `page`, or `None` when the page is out of range.
    pub fn title_for(&self, page: PageNumber) -> Option<String> {
        let index = usize::try_from(page.checked_sub(1)?).ok()?;
        self.entries.get(index).map(TitleEntry::format)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ───────────────────────────────────────── sections ──────────

/// A named section and the page it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    #[serde(alias = "he")]
    pub name: String,
    pub page: PageNumber,
}

/// First section starting strictly after `page`.
pub fn section_after(sections: &[Section], page: PageNumber) -> Option<&Section> {
    sections
        .iter()
        .filter(|s| s.page > page)
        .min_by_key(|s| s.page)
}

/// Last section starting strictly before `page`.
pub fn section_before(sections: &[Section], page: PageNumber) -> Option<&Section> {
    sections
        .iter()
        .filter(|s| s.page < page)
        .max_by_key(|s| s.page)
}
