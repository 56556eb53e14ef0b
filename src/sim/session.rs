//! Currently revealed winners and the actions the results surface offers

use super::pool::{Entry, EntryPool};

/// The winner set on display
#[derive(Debug, Clone, Default)]
pub struct WinnerSession {
    winners: Vec<Entry>,
}

impl WinnerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a freshly settled winner set
    pub fn reveal(&mut self, winners: Vec<Entry>) {
        self.winners = winners;
    }

    /// Hide the winners, leaving pool and history alone
    pub fn dismiss(&mut self) {
        self.winners.clear();
    }

    /// Take every winner out of the pool, then hide them
    ///
    /// Winners already gone from the pool are skipped. Returns how many
    /// entries were actually removed.
    pub fn remove_from_pool(&mut self, pool: &mut EntryPool) -> usize {
        let removed = self
            .winners
            .iter()
            .filter(|w| pool.remove(&w.id).is_some())
            .count();
        self.winners.clear();
        removed
    }

    pub fn winners(&self) -> &[Entry] {
        &self.winners
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dismiss_keeps_pool() {
        let pool = EntryPool::from_labels(0, ["A", "B"]);
        let mut session = WinnerSession::new();
        session.reveal(vec![pool.entries()[0].clone()]);
        session.dismiss();
        assert!(session.is_empty());
        assert_eq!(pool.len(), 2);
        // Second dismiss is indistinguishable from the first
        session.dismiss();
        assert!(session.is_empty());
    }

    #[test]
    fn test_remove_from_pool_by_id() {
        let mut pool = EntryPool::from_labels(0, ["A", "B", "C", "D"]);
        let b = pool.entries()[1].clone();
        let d = pool.entries()[3].clone();
        let mut session = WinnerSession::new();
        session.reveal(vec![b, d]);

        assert_eq!(session.remove_from_pool(&mut pool), 2);
        let left: Vec<&str> = pool.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(left, ["A", "C"]);
        assert!(session.is_empty());
    }

    #[test]
    fn test_remove_skips_missing() {
        let mut pool = EntryPool::from_labels(0, ["A", "B"]);
        let a = pool.entries()[0].clone();
        pool.remove(&a.id);
        let mut session = WinnerSession::new();
        session.reveal(vec![a]);
        assert_eq!(session.remove_from_pool(&mut pool), 0);
        assert_eq!(pool.len(), 1);
        assert!(session.is_empty());
    }
}
