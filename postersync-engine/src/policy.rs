//! User policy over candidate sets: who is excluded, who is preferred.

use postersync_core::{CandidateSet, Settings};

/// Filtering and ordering rules applied to a candidate list.
///
/// Usernames compare case-insensitively. Exclusion always wins, even
/// over a priority listing of the same user.
#[derive(Debug, Clone, Default)]
pub struct SyncPolicy {
    exclude: Vec<String>,
    priority: Vec<String>,
    only_priority: bool,
}

impl SyncPolicy {
    pub fn new(
        exclude: impl IntoIterator<Item = String>,
        priority: impl IntoIterator<Item = String>,
        only_priority: bool,
    ) -> Self {
        Self {
            exclude: exclude.into_iter().map(|s| s.to_lowercase()).collect(),
            priority: priority.into_iter().map(|s| s.to_lowercase()).collect(),
            only_priority,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.exclude_usernames.iter().cloned(),
            settings.priority_usernames.iter().cloned(),
            settings.only_priority_usernames,
        )
    }

    pub fn is_excluded(&self, username: &str) -> bool {
        let username = username.to_lowercase();
        self.exclude.contains(&username)
    }

    /// Rank in the priority list, best first. None for non-priority users.
    pub fn priority_rank(&self, username: &str) -> Option<usize> {
        let username = username.to_lowercase();
        self.priority.iter().position(|p| *p == username)
    }

    /// Whether a set may be used at all.
    pub fn is_eligible(&self, set: &CandidateSet) -> bool {
        if self.is_excluded(&set.username) {
            return false;
        }
        if self.only_priority {
            return self.priority_rank(&set.username).is_some();
        }
        true
    }

    /// Filter and order a candidate list: priority users first in list
    /// rank order, then everyone else in the original publish order.
    pub fn select(&self, sets: Vec<CandidateSet>) -> Vec<CandidateSet> {
        let mut eligible: Vec<CandidateSet> =
            sets.into_iter().filter(|s| self.is_eligible(s)).collect();
        // stable sort keeps publish order within equal ranks
        eligible.sort_by_key(|s| self.priority_rank(&s.username).unwrap_or(usize::MAX));
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postersync_core::{MediaKind, TmdbId};

    fn set(id: u64, username: &str) -> CandidateSet {
        CandidateSet {
            id,
            title: format!("Set {id}"),
            username: username.to_owned(),
            media_kind: MediaKind::Show,
            tmdb_id: TmdbId(1),
            updated: None,
            entries: Vec::new(),
        }
    }

    #[test]
    fn exclusion_is_case_insensitive() {
        let policy = SyncPolicy::new(vec!["BadActor".into()], vec![], false);
        assert!(policy.is_excluded("badactor"));
        assert!(policy.is_excluded("BADACTOR"));
        assert!(!policy.is_excluded("goodactor"));
    }

    #[test]
    fn exclusion_beats_priority() {
        let policy = SyncPolicy::new(vec!["alice".into()], vec!["alice".into()], false);
        assert!(!policy.is_eligible(&set(1, "Alice")));
    }

    #[test]
    fn priority_users_come_first_in_rank_order() {
        // published order: bob, carol, alice; priority: alice then carol
        let policy = SyncPolicy::new(vec![], vec!["alice".into(), "carol".into()], false);
        let ordered = policy.select(vec![set(1, "bob"), set(2, "carol"), set(3, "alice")]);
        let users: Vec<&str> = ordered.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(users, vec!["alice", "carol", "bob"]);
    }

    #[test]
    fn non_priority_sets_keep_publish_order() {
        let policy = SyncPolicy::new(vec![], vec!["zed".into()], false);
        let ordered = policy.select(vec![set(1, "bob"), set(2, "amy"), set(3, "zed")]);
        let ids: Vec<u64> = ordered.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn only_priority_drops_everyone_else() {
        let policy = SyncPolicy::new(vec![], vec!["alice".into()], true);
        let ordered = policy.select(vec![set(1, "bob"), set(2, "alice")]);
        let users: Vec<&str> = ordered.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(users, vec!["alice"]);
    }

    #[test]
    fn only_priority_with_empty_list_rejects_all() {
        let policy = SyncPolicy::new(vec![], vec![], true);
        assert!(policy.select(vec![set(1, "bob"), set(2, "alice")]).is_empty());
    }
}
