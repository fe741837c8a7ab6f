//! Table types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// An extracted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Identifier, see [`region_id`](super::region_id)
    pub id: String,

    /// Region bounds on the page
    pub bbox: BBox,

    /// Body rows of cell strings (header row excluded)
    pub data: Vec<Vec<String>>,

    /// Column headers (may be empty)
    pub headers: Vec<String>,

    /// Pre-rendered HTML `<table>`
    pub html: String,

    /// Pre-rendered Markdown table
    pub markdown: String,

    /// Extraction confidence in [0, 1]
    pub confidence: f32,

    /// Page number (1-indexed)
    pub page_number: u32,
}

impl Table {
    /// Get the number of body rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns (headers, else widest row).
    pub fn column_count(&self) -> usize {
        self.data
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Check if the table has neither headers nor rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.headers.is_empty()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        std::iter::once(&self.headers)
            .filter(|h| !h.is_empty())
            .chain(self.data.iter())
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
