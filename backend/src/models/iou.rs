//! IOU record and helpers
//!
//! An IOU states that a borrower owes a lender an amount at a point in time.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an IOU
pub type IouId = Uuid;

/// A stored IOU record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iou {
    /// Identifier assigned by the store
    pub id: IouId,
    /// Party owing the amount
    pub borrower: String,
    /// Party owed the amount
    pub lender: String,
    /// Amount owed, exact decimal
    pub amount: Decimal,
    /// When the debt was recorded (UTC instant)
    pub date_time: DateTime<Utc>,
}

/// Request body for creating or replacing an IOU
///
/// `id` is optional. On create it is only used to detect a collision with an
/// existing record; on update the path id always wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IouPayload {
    /// Caller-supplied identifier, never persisted as-is
    #[serde(default)]
    pub id: Option<IouId>,
    /// Party owing the amount
    pub borrower: String,
    /// Party owed the amount
    pub lender: String,
    /// Amount owed
    pub amount: Decimal,
    /// When the debt was recorded
    pub date_time: DateTime<Utc>,
}

impl IouPayload {
    /// Validate the payload
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.borrower.trim().is_empty() {
            return Err("borrower cannot be empty".to_string());
        }
        if self.lender.trim().is_empty() {
            return Err("lender cannot be empty".to_string());
        }
        Ok(())
    }

    /// Build a record carrying the given id
    pub fn into_iou(self, id: IouId) -> Iou {
        Iou {
            id,
            borrower: self.borrower,
            lender: self.lender,
            amount: self.amount,
            date_time: self.date_time,
        }
    }
}

/// Query-string parameters accepted by `GET /ious`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Exact, case-sensitive borrower filter
    pub borrower: Option<String>,
}

/// Shape of a list request, resolved once at the HTTP boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// Every record
    All,
    /// Records whose borrower equals the given name exactly
    ByBorrower(String),
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        match params.borrower {
            Some(name) => ListQuery::ByBorrower(name),
            None => ListQuery::All,
        }
    }
}

/// Which side of the mean amount to select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBand {
    /// Strictly greater than the mean
    Above,
    /// Less than or equal to the mean
    AtOrBelow,
}

impl AmountBand {
    /// Whether `amount` falls in this band given `count` records summing to `total`
    ///
    /// Compares `amount * count` against `total` so the mean is never rounded.
    fn contains(self, amount: &BigDecimal, count: &BigDecimal, total: &BigDecimal) -> bool {
        let scaled = amount * count;
        match self {
            AmountBand::Above => &scaled > total,
            AmountBand::AtOrBelow => &scaled <= total,
        }
    }
}

/// Lossless unbounded-precision copy of an amount
fn widen(amount: Decimal) -> BigDecimal {
    BigDecimal::new(BigInt::from(amount.mantissa()), i64::from(amount.scale()))
}

/// Keep the records on the requested side of the mean, preserving order
///
/// Sums are taken in `BigDecimal`, so any set of valid amounts is handled
/// without overflow or rounding.
pub fn select_by_average(ious: Vec<Iou>, band: AmountBand) -> Vec<Iou> {
    if ious.is_empty() {
        return Vec::new();
    }

    let count = BigDecimal::from(ious.len() as u64);
    let total: BigDecimal = ious.iter().map(|iou| widen(iou.amount)).sum();

    ious.into_iter()
        .filter(|iou| band.contains(&widen(iou.amount), &count, &total))
        .collect()
}
