use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::item::RowKey;
use crate::UploadItem;

/// Stable identity of a row across refresh cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct StoreRow {
    pub row_id: RowId,
    pub item: Arc<UploadItem>,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub retained: usize,
    pub changed: usize,
    pub added: usize,
    pub removed: usize,
    pub reordered: bool,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        self.changed == 0 && self.added == 0 && self.removed == 0 && !self.reordered
    }
}

/// Holds the visible upload list with stable row identity.
///
/// Rows are keyed by `(route, segment, filename, id)`. A row whose item is
/// structurally equal to the incoming one keeps both its `RowId` and its
/// `Arc`; a row whose item changed keeps its `RowId` only. Row order always
/// follows the incoming list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciledStore {
    rows: Vec<StoreRow>,
    next_row_id: u64,
    revision: u64,
}

impl ReconciledStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[StoreRow] {
        &self.rows
    }

    pub fn items(&self) -> impl Iterator<Item = &UploadItem> {
        self.rows.iter().map(|row| row.item.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of updates that changed the visible rows.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update(&mut self, items: Vec<UploadItem>) -> ReconcileReport {
        let previous_order: Vec<RowId> = self.rows.iter().map(|row| row.row_id).collect();

        let mut previous: HashMap<RowKey, VecDeque<StoreRow>> = HashMap::new();
        for row in self.rows.drain(..) {
            previous.entry(row.item.row_key()).or_default().push_back(row);
        }

        let mut report = ReconcileReport::default();
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let matched = previous
                .get_mut(&item.row_key())
                .and_then(VecDeque::pop_front);
            match matched {
                Some(row) if *row.item == item => {
                    report.retained += 1;
                    rows.push(row);
                }
                Some(row) => {
                    report.changed += 1;
                    rows.push(StoreRow {
                        row_id: row.row_id,
                        item: Arc::new(item),
                    });
                }
                None => {
                    report.added += 1;
                    let row_id = self.allocate_row_id();
                    rows.push(StoreRow {
                        row_id,
                        item: Arc::new(item),
                    });
                }
            }
        }
        report.removed = previous.values().map(VecDeque::len).sum();
        report.reordered = report.added == 0
            && report.removed == 0
            && rows
                .iter()
                .map(|row| row.row_id)
                .ne(previous_order.iter().copied());

        self.rows = rows;
        if !report.is_unchanged() {
            self.revision += 1;
        }
        report
    }

    fn allocate_row_id(&mut self) -> RowId {
        self.next_row_id += 1;
        RowId(self.next_row_id)
    }
}
