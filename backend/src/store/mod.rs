//! IOU persistence
//!
//! `IouStore` is the storage seam. The service only ever talks to this trait,
//! so backends can be swapped at startup.

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemoryIouStore;
pub use sqlite::SqliteIouStore;

use crate::models::{Iou, IouId};
use async_trait::async_trait;

/// Capability set every IOU backend provides
#[async_trait]
pub trait IouStore: Send + Sync {
    /// Persist a new record under a freshly generated id
    ///
    /// Any id carried by `iou` is discarded.
    async fn insert(&self, iou: Iou) -> Result<Iou, StoreError>;

    /// Look up a record by id
    async fn find_by_id(&self, id: IouId) -> Result<Option<Iou>, StoreError>;

    /// Every record, in insertion order
    async fn find_all(&self) -> Result<Vec<Iou>, StoreError>;

    /// Records whose borrower matches `borrower` exactly
    async fn find_by_borrower(&self, borrower: &str) -> Result<Vec<Iou>, StoreError>;

    /// Records whose amount is strictly above the mean of all live amounts
    async fn find_above_average_amount(&self) -> Result<Vec<Iou>, StoreError>;

    /// Records whose amount is at or below the mean of all live amounts
    async fn find_at_or_below_average_amount(&self) -> Result<Vec<Iou>, StoreError>;

    /// Whether a record with this id exists
    async fn exists(&self, id: IouId) -> Result<bool, StoreError>;

    /// Remove a record; absent ids are a no-op
    ///
    /// Returns whether a record was removed.
    async fn delete(&self, id: IouId) -> Result<bool, StoreError>;

    /// Overwrite the record at `id`, keeping `id`
    async fn replace(&self, id: IouId, iou: Iou) -> Result<Iou, StoreError>;
}
