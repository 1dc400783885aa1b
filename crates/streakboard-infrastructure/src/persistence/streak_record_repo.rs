use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

use streakboard_domain::streak::{RecordMutation, StreakRecordRepository, UserStreakRecord};
use streakboard_domain::{DomainError, UserId};

/// Record store guarded by one reader/writer lock.
///
/// Reads share the lock; every mutation holds it exclusively for the whole
/// read-modify-write, so two updates of one user can never interleave.
#[derive(Default)]
pub struct InMemoryStreakRecordRepository {
    records: RwLock<HashMap<UserId, UserStreakRecord>>,
}

impl InMemoryStreakRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records directly, replacing any existing entry per user
    pub async fn insert_all(&self, records: impl IntoIterator<Item = UserStreakRecord>) {
        let mut guard = self.records.write().await;
        for record in records {
            guard.insert(record.user_id().clone(), record);
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StreakRecordRepository for InMemoryStreakRecordRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStreakRecord>, DomainError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<UserStreakRecord>, DomainError> {
        let guard = self.records.read().await;
        let mut records: Vec<UserStreakRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.user_id().cmp(b.user_id()));
        Ok(records)
    }

    async fn list_frozen(&self) -> Result<Vec<UserStreakRecord>, DomainError> {
        let guard = self.records.read().await;
        let mut records: Vec<UserStreakRecord> = guard
            .values()
            .filter(|record| record.is_frozen())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.user_id().cmp(b.user_id()));
        Ok(records)
    }

    async fn snapshot(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, UserStreakRecord>, DomainError> {
        let guard = self.records.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| guard.get(id).map(|record| (id.clone(), record.clone())))
            .collect())
    }

    async fn modify(
        &self,
        user_id: &UserId,
        mutation: RecordMutation<'_>,
    ) -> Result<Option<UserStreakRecord>, DomainError> {
        let mut guard = self.records.write().await;
        let mut slot = guard.get(user_id).cloned();

        mutation(&mut slot)?;

        match slot {
            Some(record) => {
                if record.user_id() != user_id {
                    return Err(DomainError::InvalidState(format!(
                        "Mutation for user {} produced a record for {}",
                        user_id,
                        record.user_id()
                    )));
                }
                debug!("[store] record saved user_id={}", user_id);
                guard.insert(user_id.clone(), record.clone());
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn uid(s: &str) -> UserId {
        UserId::from_string(s)
    }

    #[tokio::test]
    async fn test_modify_creates_record() {
        let repo = InMemoryStreakRecordRepository::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let saved = repo
            .modify(&uid("a"), &mut |slot| {
                slot.get_or_insert_with(|| UserStreakRecord::new(uid("a"), now));
                Ok(())
            })
            .await
            .unwrap();

        assert!(saved.is_some());
        assert_eq!(repo.len().await, 1);
        assert!(repo.find_by_user_id(&uid("a")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_mutation_discards_changes() {
        let repo = InMemoryStreakRecordRepository::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let result = repo
            .modify(&uid("a"), &mut |slot| {
                slot.get_or_insert_with(|| UserStreakRecord::new(uid("a"), now));
                Err(DomainError::Validation("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_untouched_missing_slot_stays_missing() {
        let repo = InMemoryStreakRecordRepository::new();

        let saved = repo.modify(&uid("ghost"), &mut |_| Ok(())).await.unwrap();

        assert!(saved.is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_returns_only_known_users() {
        let repo = InMemoryStreakRecordRepository::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        repo.insert_all(vec![
            UserStreakRecord::new(uid("a"), now),
            UserStreakRecord::new(uid("b"), now),
        ])
        .await;

        let snapshot = repo.snapshot(&[uid("a"), uid("zzz")]).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key(&uid("a")));
    }
}
