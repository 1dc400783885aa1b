use async_trait::async_trait;
use std::collections::HashMap;

use super::UserStreakRecord;
use crate::shared::{DomainError, UserId};

/// Read-modify-write step applied inside the store's exclusive section.
///
/// The slot is `None` when no record exists yet; leaving it `Some` after an
/// `Ok` persists it. An `Err` discards every change made to the slot.
pub type RecordMutation<'a> =
    &'a mut (dyn FnMut(&mut Option<UserStreakRecord>) -> Result<(), DomainError> + Send);

#[async_trait]
pub trait StreakRecordRepository: Send + Sync {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStreakRecord>, DomainError>;

    async fn list_all(&self) -> Result<Vec<UserStreakRecord>, DomainError>;

    async fn list_frozen(&self) -> Result<Vec<UserStreakRecord>, DomainError>;

    /// Consistent copy of the requested records taken under one read lock
    async fn snapshot(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, UserStreakRecord>, DomainError>;

    /// Run `mutation` against the user's slot as one critical section and
    /// return the stored record afterwards.
    async fn modify(
        &self,
        user_id: &UserId,
        mutation: RecordMutation<'_>,
    ) -> Result<Option<UserStreakRecord>, DomainError>;
}
