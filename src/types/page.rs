use serde::Serialize;

use crate::types::Row;

/// One window of records together with pagination metadata.
///
/// When the window is empty only `data`, `total_count` and `total_pages` are
/// populated; the position fields stay `None` and are left out when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub data: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_num: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_num: Option<u64>,
    pub total_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curr_page: Option<u64>,
    pub total_pages: u64,
}

impl Page {
    /// Builds the page for `records` fetched with `limit`/`offset` out of
    /// `total_count` matching rows. `limit` must be non-zero.
    ///
    /// `total_count` comes from a second query, so a concurrent writer can make
    /// `to_num` disagree with it. That gap is accepted.
    pub(crate) fn assemble(
        records: Vec<Row>,
        page: u64,
        limit: u64,
        offset: u64,
        total_count: u64,
    ) -> Self {
        let total_pages = total_count.div_ceil(limit);
        if records.is_empty() {
            return Self {
                data: Vec::new(),
                from_num: None,
                to_num: None,
                total_count,
                curr_page: None,
                total_pages,
            };
        }

        let fetched = records.len() as u64;
        Self {
            data: records,
            from_num: Some(offset.saturating_add(1)),
            to_num: Some(offset.saturating_add(fetched.min(limit))),
            total_count,
            curr_page: Some(page),
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
