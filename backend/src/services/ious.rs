//! IOU record service
//!
//! Adds the existence guards around the store: absent ids become
//! `AppError::NotFound`, colliding create ids become `AppError::AlreadyExists`.
//! Everything else is delegated unchanged.

use crate::error::AppError;
use crate::models::{Iou, IouId, IouPayload, ListQuery};
use crate::store::{IouStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// IOU business operations
#[derive(Clone)]
pub struct IouService {
    store: Arc<dyn IouStore>,
}

impl IouService {
    /// Create a service over the given store
    pub fn new(store: Arc<dyn IouStore>) -> Self {
        Self { store }
    }

    /// List records according to the resolved query shape
    pub async fn list(&self, query: ListQuery) -> Result<Vec<Iou>, AppError> {
        match query {
            ListQuery::All => self.list_all().await,
            ListQuery::ByBorrower(name) => self.list_by_borrower(&name).await,
        }
    }

    /// Every record
    pub async fn list_all(&self) -> Result<Vec<Iou>, AppError> {
        Ok(self.store.find_all().await?)
    }

    /// Records owed by exactly this borrower
    pub async fn list_by_borrower(&self, borrower: &str) -> Result<Vec<Iou>, AppError> {
        Ok(self.store.find_by_borrower(borrower).await?)
    }

    /// Records whose amount is strictly above the current mean
    pub async fn list_high_value(&self) -> Result<Vec<Iou>, AppError> {
        Ok(self.store.find_above_average_amount().await?)
    }

    /// Records whose amount is at or below the current mean
    pub async fn list_low_value(&self) -> Result<Vec<Iou>, AppError> {
        Ok(self.store.find_at_or_below_average_amount().await?)
    }

    /// Fetch one record
    ///
    /// # Returns
    /// * `Ok(Iou)` - The stored record
    /// * `Err(AppError::NotFound)` - No record has this id
    pub async fn get(&self, id: IouId) -> Result<Iou, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound(id))
    }

    /// Create a record; the store assigns its id
    ///
    /// A payload id is only checked for collisions and is never persisted.
    ///
    /// # Returns
    /// * `Ok(Iou)` - The stored record with its assigned id
    /// * `Err(AppError::MalformedRequest)` - Payload failed validation
    /// * `Err(AppError::AlreadyExists)` - Payload id belongs to an existing record
    pub async fn create(&self, payload: IouPayload) -> Result<Iou, AppError> {
        payload.validate().map_err(AppError::MalformedRequest)?;

        if let Some(requested) = payload.id {
            if self.store.exists(requested).await? {
                debug!("Rejected create for existing IOU: {}", requested);
                return Err(AppError::AlreadyExists(requested));
            }
        }

        let iou = self.store.insert(payload.into_iou(Uuid::nil())).await?;
        info!(
            iou_id = %iou.id,
            borrower = %iou.borrower,
            lender = %iou.lender,
            "Created IOU"
        );
        Ok(iou)
    }

    /// Replace every field of an existing record except its id
    ///
    /// # Returns
    /// * `Ok(Iou)` - The record as now stored
    /// * `Err(AppError::MalformedRequest)` - Payload failed validation
    /// * `Err(AppError::NotFound)` - No record has this id
    pub async fn update(&self, id: IouId, payload: IouPayload) -> Result<Iou, AppError> {
        payload.validate().map_err(AppError::MalformedRequest)?;

        if !self.store.exists(id).await? {
            debug!("Rejected update for missing IOU: {}", id);
            return Err(AppError::NotFound(id));
        }

        let iou = self
            .store
            .replace(id, payload.into_iou(id))
            .await
            .map_err(|e| match e {
                // Deleted between the existence check and the write
                StoreError::Missing(missing) => AppError::NotFound(missing),
                other => AppError::StoreUnavailable(other),
            })?;

        info!(iou_id = %id, "Updated IOU");
        Ok(iou)
    }

    /// Delete an existing record
    ///
    /// # Returns
    /// * `Ok(())` - The record was removed
    /// * `Err(AppError::NotFound)` - No record has this id
    pub async fn delete(&self, id: IouId) -> Result<(), AppError> {
        if !self.store.exists(id).await? {
            debug!("Rejected delete for missing IOU: {}", id);
            return Err(AppError::NotFound(id));
        }

        // Removed between the existence check and the write
        if !self.store.delete(id).await? {
            debug!("IOU vanished before delete: {}", id);
            return Err(AppError::NotFound(id));
        }

        info!(iou_id = %id, "Deleted IOU");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIouStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn create_test_service() -> IouService {
        IouService::new(Arc::new(MemoryIouStore::new()))
    }

    /// Store whose existence check always says yes, as if a concurrent
    /// delete landed right after it
    struct StaleExistsStore(MemoryIouStore);

    #[async_trait]
    impl IouStore for StaleExistsStore {
        async fn insert(&self, iou: Iou) -> Result<Iou, StoreError> {
            self.0.insert(iou).await
        }

        async fn find_by_id(&self, id: IouId) -> Result<Option<Iou>, StoreError> {
            self.0.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<Iou>, StoreError> {
            self.0.find_all().await
        }

        async fn find_by_borrower(&self, borrower: &str) -> Result<Vec<Iou>, StoreError> {
            self.0.find_by_borrower(borrower).await
        }

        async fn find_above_average_amount(&self) -> Result<Vec<Iou>, StoreError> {
            self.0.find_above_average_amount().await
        }

        async fn find_at_or_below_average_amount(&self) -> Result<Vec<Iou>, StoreError> {
            self.0.find_at_or_below_average_amount().await
        }

        async fn exists(&self, _id: IouId) -> Result<bool, StoreError> {
            Ok(true)
        }

        async fn delete(&self, id: IouId) -> Result<bool, StoreError> {
            self.0.delete(id).await
        }

        async fn replace(&self, id: IouId, iou: Iou) -> Result<Iou, StoreError> {
            self.0.replace(id, iou).await
        }
    }

    fn payload(borrower: &str, lender: &str, amount: &str) -> IouPayload {
        IouPayload {
            id: None,
            borrower: borrower.to_string(),
            lender: lender.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            date_time: Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_equal_record() {
        let service = create_test_service();
        let created = service
            .create(payload("John", "Alice", "100.00"))
            .await
            .unwrap();

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.borrower, "John");
        assert_eq!(fetched.lender, "Alice");
        assert_eq!(fetched.amount, Decimal::from_str("100.00").unwrap());
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let service = create_test_service();
        let result = service.get(Uuid::new_v4()).await;
        match result.unwrap_err() {
            AppError::NotFound(_) => {
                // Expected error
            }
            other => {
                panic!("Expected NotFound error, got: {:?}", other);
            }
        }
    }

    #[tokio::test]
    async fn test_create_with_existing_id_is_rejected() {
        let service = create_test_service();
        let first = service
            .create(payload("John", "Alice", "100.00"))
            .await
            .unwrap();

        let mut duplicate = payload("Mallory", "Alice", "1.00");
        duplicate.id = Some(first.id);
        let result = service.create(duplicate).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(id)) if id == first.id));
        assert_eq!(service.list_all().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_create_with_unknown_id_gets_fresh_id() {
        let service = create_test_service();
        let requested = Uuid::new_v4();
        let mut with_id = payload("John", "Alice", "5");
        with_id.id = Some(requested);

        let created = service.create(with_id).await.unwrap();
        assert_ne!(created.id, requested);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_borrower() {
        let service = create_test_service();
        let result = service.create(payload(" ", "Alice", "5")).await;
        assert!(matches!(result, Err(AppError::MalformedRequest(_))));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields_but_id() {
        let service = create_test_service();
        let created = service
            .create(payload("John", "Alice", "100.00"))
            .await
            .unwrap();

        let mut replacement = payload("Bob", "Eve", "42.42");
        replacement.id = Some(Uuid::new_v4());
        replacement.date_time = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let updated = service.update(created.id, replacement).await.unwrap();

        assert_eq!(updated.id, created.id);
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(fetched.borrower, "Bob");
        assert_eq!(fetched.lender, "Eve");
        assert_eq!(fetched.amount, Decimal::from_str("42.42").unwrap());
        assert_eq!(
            fetched.date_time,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_missing_creates_nothing() {
        let service = create_test_service();
        let result = service
            .update(Uuid::new_v4(), payload("Bob", "Eve", "1"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let service = create_test_service();
        let created = service
            .create(payload("John", "Alice", "100.00"))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_record_gone_after_existence_check_is_not_found() {
        let service = IouService::new(Arc::new(StaleExistsStore(MemoryIouStore::new())));
        let id = Uuid::new_v4();

        let deleted = service.delete(id).await;
        assert!(matches!(deleted, Err(AppError::NotFound(missing)) if missing == id));

        let updated = service.update(id, payload("Bob", "Eve", "1")).await;
        assert!(matches!(updated, Err(AppError::NotFound(missing)) if missing == id));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_borrower_and_high_value() {
        let service = create_test_service();
        service
            .create(payload("John", "Alice", "100.00"))
            .await
            .unwrap();
        service
            .create(payload("Bob", "Eve", "50.00"))
            .await
            .unwrap();
        let charlie = service
            .create(payload("Charlie", "Grace", "200.00"))
            .await
            .unwrap();

        let bobs = service
            .list(ListQuery::ByBorrower("Bob".to_string()))
            .await
            .unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].lender, "Eve");
        assert_eq!(service.list(ListQuery::All).await.unwrap().len(), 3);

        assert_eq!(service.list_high_value().await.unwrap(), vec![charlie]);
        assert_eq!(service.list_low_value().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_high_value_empty_store() {
        let service = create_test_service();
        assert!(service.list_high_value().await.unwrap().is_empty());
        assert!(service.list_low_value().await.unwrap().is_empty());
    }
}
