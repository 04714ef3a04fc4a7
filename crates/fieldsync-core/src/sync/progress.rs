//! Aggregate sync progress

#![allow(clippy::cast_precision_loss)] // ETA math works in f64 ratios

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{ItemStatus, SyncItem};

/// Summary counts derived from the ledger. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncProgress {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub conflicts: usize,
    /// Sum of `size_bytes` over completed items only
    pub bytes_transferred: u64,
    /// Sum of `size_bytes` over all items
    pub total_bytes: u64,
}

/// Compute progress for a set of items.
///
/// Bytes are counted per whole item: a syncing item at 90% contributes
/// nothing to `bytes_transferred` until it completes.
#[must_use]
pub fn compute(items: &[SyncItem]) -> SyncProgress {
    items.iter().fold(SyncProgress::default(), |mut progress, item| {
        let size = item.size_bytes.unwrap_or(0);
        progress.total += 1;
        progress.total_bytes = progress.total_bytes.saturating_add(size);
        match item.status {
            ItemStatus::Pending => progress.pending += 1,
            ItemStatus::Syncing { .. } => progress.in_progress += 1,
            ItemStatus::Completed => {
                progress.completed += 1;
                progress.bytes_transferred = progress.bytes_transferred.saturating_add(size);
            }
            ItemStatus::Failed { .. } => progress.failed += 1,
            ItemStatus::Conflict => progress.conflicts += 1,
        }
        progress
    })
}

impl SyncProgress {
    /// True when nothing is pending, syncing or waiting on a conflict
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.pending == 0 && self.in_progress == 0 && self.conflicts == 0
    }

    /// Settled items as a percentage of all items (100 when empty)
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let settled = self.completed + self.failed;
        u8::try_from(settled * 100 / self.total).unwrap_or(100)
    }

    /// Linear estimate of the time left, given the time spent so far.
    ///
    /// Uses byte throughput when sizes are known, item throughput otherwise.
    /// Returns `None` until something has completed.
    #[must_use]
    pub fn estimate_remaining(&self, elapsed: Duration) -> Option<Duration> {
        let (done, remaining) = if self.total_bytes > 0 && self.bytes_transferred > 0 {
            (
                self.bytes_transferred as f64,
                self.total_bytes.saturating_sub(self.bytes_transferred) as f64,
            )
        } else {
            let open = self.total.saturating_sub(self.completed + self.failed);
            (self.completed as f64, open as f64)
        };

        if done <= 0.0 {
            return None;
        }
        Some(elapsed.mul_f64(remaining / done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;
    use pretty_assertions::assert_eq;

    fn item(id: &str, status: ItemStatus, size: u64) -> SyncItem {
        SyncItem::new(ItemId::new(id), "document", id)
            .with_status(status)
            .with_size(size)
    }

    #[test]
    fn test_compute_counts_each_status() {
        let items = vec![
            item("1", ItemStatus::Pending, 10),
            item("2", ItemStatus::Syncing { progress: 90 }, 20),
            item("3", ItemStatus::Completed, 30),
            item(
                "4",
                ItemStatus::Failed {
                    error: "timeout".to_string(),
                },
                40,
            ),
            item("5", ItemStatus::Conflict, 50),
        ];

        assert_eq!(
            compute(&items),
            SyncProgress {
                total: 5,
                completed: 1,
                failed: 1,
                in_progress: 1,
                pending: 1,
                conflicts: 1,
                bytes_transferred: 30,
                total_bytes: 150,
            }
        );
    }

    #[test]
    fn test_compute_empty() {
        let progress = compute(&[]);
        assert_eq!(progress, SyncProgress::default());
        assert!(progress.is_settled());
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_percent_counts_settled_items() {
        let items = vec![
            item("1", ItemStatus::Completed, 0),
            item(
                "2",
                ItemStatus::Failed {
                    error: "x".to_string(),
                },
                0,
            ),
            item("3", ItemStatus::Pending, 0),
            item("4", ItemStatus::Pending, 0),
        ];
        assert_eq!(compute(&items).percent(), 50);
    }

    #[test]
    fn test_estimate_remaining_by_bytes() {
        let items = vec![
            item("1", ItemStatus::Completed, 100),
            item("2", ItemStatus::Pending, 300),
        ];
        let eta = compute(&items).estimate_remaining(Duration::from_secs(10));
        assert_eq!(eta, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_estimate_remaining_by_items_without_sizes() {
        let items = vec![
            SyncItem::new(ItemId::new("1"), "customer", "a").with_status(ItemStatus::Completed),
            SyncItem::new(ItemId::new("2"), "customer", "b"),
        ];
        let eta = compute(&items).estimate_remaining(Duration::from_secs(4));
        assert_eq!(eta, Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_estimate_remaining_unknown_before_first_completion() {
        let items = vec![item("1", ItemStatus::Syncing { progress: 50 }, 100)];
        assert_eq!(
            compute(&items).estimate_remaining(Duration::from_secs(5)),
            None
        );
    }
}
