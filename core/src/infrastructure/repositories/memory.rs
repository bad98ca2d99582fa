// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! In-memory repository implementations for development and testing.
//!
//! "Latest activity" matches the production ordering: greatest
//! `created_at`, ties broken by insertion order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::activity::{Activity, CurrentData, UserId};
use crate::domain::repository::{
    ActivityRepository, CurrentDataRepository, RepositoryError, UpsertOutcome,
};

pub struct InMemoryActivityRepository {
    items: Mutex<Vec<Activity>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self { items: Mutex::new(Vec::new()) }
    }

    fn latest_index(items: &[Activity], user: &UserId) -> Option<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, a)| &a.user_id == user)
            .max_by_key(|(idx, a)| (a.created_at, *idx))
            .map(|(idx, _)| idx)
    }
}

impl Default for InMemoryActivityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn record_upload(&self, activity: &Activity) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().unwrap();
        items.push(activity.clone());
        Ok(())
    }

    async fn find_latest_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<Activity>, RepositoryError> {
        let items = self.items.lock().unwrap();
        Ok(Self::latest_index(&items, user).map(|idx| items[idx].clone()))
    }

    async fn append_reasons(&self, user: &UserId, reasons: &str) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let idx = Self::latest_index(&items, user)
            .ok_or_else(|| RepositoryError::NoActivity(user.to_string()))?;
        items[idx].reasons = Some(reasons.to_string());
        items[idx].updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn append_qnas(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let idx = Self::latest_index(&items, user)
            .ok_or_else(|| RepositoryError::NoActivity(user.to_string()))?;
        items[idx].questions = Some(questions.to_string());
        items[idx].answers = Some(answers.to_string());
        items[idx].updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn append_notice(&self, user: &UserId, notice: &str) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let idx = Self::latest_index(&items, user)
            .ok_or_else(|| RepositoryError::NoActivity(user.to_string()))?;
        items[idx].notice_response = Some(notice.to_string());
        items[idx].updated_at = chrono::Utc::now();
        Ok(())
    }
}

pub struct InMemoryCurrentDataRepository {
    items: Mutex<HashMap<String, CurrentData>>,
}

impl InMemoryCurrentDataRepository {
    pub fn new() -> Self {
        Self { items: Mutex::new(HashMap::new()) }
    }
}

impl Default for InMemoryCurrentDataRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CurrentDataRepository for InMemoryCurrentDataRepository {
    async fn upsert_notice(
        &self,
        user: &UserId,
        notice: &str,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let key = CurrentData::data_id_for(user);
        match items.get_mut(&key) {
            Some(snapshot) => {
                snapshot.current_notice = notice.to_string();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let mut snapshot = CurrentData::empty(user.clone());
                snapshot.current_notice = notice.to_string();
                items.insert(key, snapshot);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn upsert_extraction(
        &self,
        user: &UserId,
        reasons: &str,
        questions: &str,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let key = CurrentData::data_id_for(user);
        match items.get_mut(&key) {
            Some(snapshot) => {
                snapshot.current_reason = reasons.to_string();
                snapshot.current_question = questions.to_string();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let mut snapshot = CurrentData::empty(user.clone());
                snapshot.current_reason = reasons.to_string();
                snapshot.current_question = questions.to_string();
                items.insert(key, snapshot);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn find_for_user(&self, user: &UserId) -> Result<Option<CurrentData>, RepositoryError> {
        let items = self.items.lock().unwrap();
        Ok(items.get(&CurrentData::data_id_for(user)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latest_activity_is_most_recent() {
        let repo = InMemoryActivityRepository::new();
        let user = UserId::new("u-1");

        let first = Activity::new(user.clone(), "http://s/u-1/a.pdf", "a.pdf");
        repo.record_upload(&first).await.unwrap();

        let mut second = Activity::new(user.clone(), "http://s/u-1/b.pdf", "b.pdf");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        repo.record_upload(&second).await.unwrap();

        let latest = repo.find_latest_for_user(&user).await.unwrap().unwrap();
        assert_eq!(latest.pdf_name, "b.pdf");
    }

    #[tokio::test]
    async fn test_append_updates_latest_only() {
        let repo = InMemoryActivityRepository::new();
        let user = UserId::new("u-1");

        let first = Activity::new(user.clone(), "http://s/u-1/a.pdf", "a.pdf");
        repo.record_upload(&first).await.unwrap();
        let mut second = Activity::new(user.clone(), "http://s/u-1/b.pdf", "b.pdf");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        repo.record_upload(&second).await.unwrap();

        repo.append_reasons(&user, "late fee dispute").await.unwrap();

        let latest = repo.find_latest_for_user(&user).await.unwrap().unwrap();
        assert_eq!(latest.reasons.as_deref(), Some("late fee dispute"));
    }

    #[tokio::test]
    async fn test_append_without_activity_is_typed() {
        let repo = InMemoryActivityRepository::new();
        let user = UserId::new("nobody");
        let err = repo.append_notice(&user, "text").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NoActivity(_)));
    }

    #[tokio::test]
    async fn test_snapshot_overwrite_not_append() {
        let repo = InMemoryCurrentDataRepository::new();
        let user = UserId::new("u-1");

        assert_eq!(
            repo.upsert_notice(&user, "one").await.unwrap(),
            UpsertOutcome::Created
        );
        assert_eq!(
            repo.upsert_notice(&user, "two").await.unwrap(),
            UpsertOutcome::Updated
        );

        let snapshot = repo.find_for_user(&user).await.unwrap().unwrap();
        assert_eq!(snapshot.current_notice, "two");
        assert_eq!(snapshot.data_id, "CDu-1");
    }

    #[tokio::test]
    async fn test_extraction_preserves_notice() {
        let repo = InMemoryCurrentDataRepository::new();
        let user = UserId::new("u-1");

        repo.upsert_notice(&user, "kept").await.unwrap();
        repo.upsert_extraction(&user, "A.,B", "Q1.,Q2").await.unwrap();

        let snapshot = repo.find_for_user(&user).await.unwrap().unwrap();
        assert_eq!(snapshot.current_notice, "kept");
        assert_eq!(snapshot.current_reason, "A.,B");
        assert_eq!(snapshot.current_question, "Q1.,Q2");
    }
}
