use std::sync::Arc;

use tracing::info;

use crate::database::models::{RegisterOutcome, User};
use crate::database::UserStore;
use crate::services::error::ServiceError;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Idempotent first-contact registration for a verified subject.
    pub async fn register_or_get(
        &self,
        subject_id: &str,
        email: Option<&str>,
    ) -> Result<(User, RegisterOutcome), ServiceError> {
        if subject_id.trim().is_empty() {
            return Err(ServiceError::validation("user id cannot be empty"));
        }

        let (user, outcome) = self.store.register_user(subject_id, email).await?;
        if outcome == RegisterOutcome::Created {
            info!("Registered user {}", user.id);
        }
        Ok((user, outcome))
    }

    pub async fn find(&self, subject_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.store.find_user(subject_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use futures::future::join_all;

    #[tokio::test]
    async fn second_registration_reports_existing_user() {
        let service = UserService::new(Arc::new(MemoryStore::new()));

        let (user, outcome) = service.register_or_get("uid-1", Some("a@example.com")).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::Created);
        assert_eq!(user.email.as_deref(), Some("a@example.com"));

        // A later login with a different email does not rewrite the record.
        let (again, outcome) = service.register_or_get("uid-1", Some("b@example.com")).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::Existed);
        assert_eq!(again, user);
    }

    #[tokio::test]
    async fn concurrent_registration_creates_exactly_once() {
        let service = UserService::new(Arc::new(MemoryStore::new()));

        let attempts = (0..16).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.register_or_get("uid-race", None).await })
        });
        let outcomes: Vec<RegisterOutcome> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap().1)
            .collect();

        let created = outcomes.iter().filter(|o| **o == RegisterOutcome::Created).count();
        assert_eq!(created, 1);
        assert_eq!(outcomes.len(), 16);
        assert!(service.find("uid-race").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn blank_subject_is_rejected() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        let err = service.register_or_get("  ", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
