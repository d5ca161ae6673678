//! In-memory IOU store
//!
//! Keeps records in a vector so listing order is insertion order.

use super::{IouStore, StoreError};
use crate::models::{select_by_average, AmountBand, Iou, IouId};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Volatile store backed by a `Vec`
#[derive(Debug, Default)]
pub struct MemoryIouStore {
    ious: RwLock<Vec<Iou>>,
}

impl MemoryIouStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IouStore for MemoryIouStore {
    async fn insert(&self, mut iou: Iou) -> Result<Iou, StoreError> {
        iou.id = Uuid::new_v4();
        self.ious.write().await.push(iou.clone());
        Ok(iou)
    }

    async fn find_by_id(&self, id: IouId) -> Result<Option<Iou>, StoreError> {
        let ious = self.ious.read().await;
        Ok(ious.iter().find(|iou| iou.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Iou>, StoreError> {
        Ok(self.ious.read().await.clone())
    }

    async fn find_by_borrower(&self, borrower: &str) -> Result<Vec<Iou>, StoreError> {
        let ious = self.ious.read().await;
        Ok(ious
            .iter()
            .filter(|iou| iou.borrower == borrower)
            .cloned()
            .collect())
    }

    async fn find_above_average_amount(&self) -> Result<Vec<Iou>, StoreError> {
        let ious = self.find_all().await?;
        Ok(select_by_average(ious, AmountBand::Above))
    }

    async fn find_at_or_below_average_amount(&self) -> Result<Vec<Iou>, StoreError> {
        let ious = self.find_all().await?;
        Ok(select_by_average(ious, AmountBand::AtOrBelow))
    }

    async fn exists(&self, id: IouId) -> Result<bool, StoreError> {
        Ok(self.ious.read().await.iter().any(|iou| iou.id == id))
    }

    async fn delete(&self, id: IouId) -> Result<bool, StoreError> {
        let mut ious = self.ious.write().await;
        let before = ious.len();
        ious.retain(|iou| iou.id != id);
        Ok(ious.len() != before)
    }

    async fn replace(&self, id: IouId, mut iou: Iou) -> Result<Iou, StoreError> {
        let mut ious = self.ious.write().await;
        let slot = ious
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or(StoreError::Missing(id))?;

        iou.id = id;
        *slot = iou.clone();
        Ok(iou)
    }
}
