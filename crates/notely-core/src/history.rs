//! Bounded, expandable view over a note's AI history.

use chrono::{DateTime, Utc};

use crate::defaults::{HISTORY_PREVIEW_LIMIT, TIMESTAMP_DISPLAY_FORMAT};
use crate::models::HistoryEntry;

/// Render a history timestamp as `YYYY-MM-DD HH:MM` (UTC), or `-` when absent.
pub fn format_timestamp(ts: Option<&DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format(TIMESTAMP_DISPLAY_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// View state for one note card's history.
///
/// Shows the earliest [`HISTORY_PREVIEW_LIMIT`] entries until expanded. The
/// visible slice is always a prefix of the full history, in store order.
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    entries: &'a [HistoryEntry],
    limit: usize,
    expanded: bool,
}

impl<'a> HistoryView<'a> {
    pub fn new(entries: &'a [HistoryEntry]) -> Self {
        Self {
            entries,
            limit: HISTORY_PREVIEW_LIMIT,
            expanded: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn visible(&self) -> &'a [HistoryEntry] {
        if self.expanded {
            self.entries
        } else {
            &self.entries[..self.entries.len().min(self.limit)]
        }
    }

    /// Whether entries are hidden behind "show more".
    pub fn has_more(&self) -> bool {
        !self.expanded && self.entries.len() > self.limit
    }

    pub fn hidden_count(&self) -> usize {
        self.entries.len() - self.visible().len()
    }

    /// Index of the newest visible entry, the auto-scroll target.
    pub fn scroll_anchor(&self) -> Option<usize> {
        self.visible().len().checked_sub(1)
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entries(n: usize) -> Vec<HistoryEntry> {
        (0..n)
            .map(|i| {
                let ts = Utc.with_ymd_and_hms(2025, 1, 1, 12, i as u32, 0).unwrap();
                if i % 2 == 0 {
                    HistoryEntry::user(format!("u{}", i), ts)
                } else {
                    HistoryEntry::ai(format!("a{}", i), ts)
                }
            })
            .collect()
    }

    #[test]
    fn test_preview_is_prefix_of_full() {
        let all = entries(5);
        let view = HistoryView::new(&all);
        assert_eq!(view.visible().len(), 3);
        assert_eq!(view.visible(), &all[..3]);
        assert!(view.has_more());
        assert_eq!(view.hidden_count(), 2);
    }

    #[test]
    fn test_expand_shows_all_in_order() {
        let all = entries(5);
        let mut view = HistoryView::new(&all);
        view.expand();
        assert_eq!(view.visible(), all.as_slice());
        assert!(!view.has_more());
        assert_eq!(view.scroll_anchor(), Some(4));
        view.collapse();
        assert_eq!(view.scroll_anchor(), Some(2));
    }

    #[test]
    fn test_short_history_has_no_more() {
        let all = entries(2);
        let view = HistoryView::new(&all);
        assert_eq!(view.visible().len(), 2);
        assert!(!view.has_more());
    }

    #[test]
    fn test_empty_history() {
        let view = HistoryView::new(&[]);
        assert!(view.visible().is_empty());
        assert_eq!(view.scroll_anchor(), None);
        assert_eq!(view.total(), 0);
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 4, 9, 5, 59).unwrap();
        assert_eq!(format_timestamp(Some(&ts)), "2025-02-04 09:05");
        assert_eq!(format_timestamp(None), "-");
    }
}
