//! Domain models
//!
//! The IOU record, its request payload, and the pure selection helpers
//! shared by every store backend.

pub mod iou;

pub use iou::{select_by_average, AmountBand, Iou, IouId, IouPayload, ListParams, ListQuery};
