//! # Slot dispositions.

use crate::error::EmitError;

/// Observable state of one slot.
///
/// A slot starts [`SlotStatus::Pending`] and moves to exactly one of the
/// terminal states. It never changes again afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// Not settled yet.
    Pending,
    /// Settled by `activate`.
    Activated,
    /// Settled by `deactivate` (or a merged source failure).
    Deactivated,
    /// Settled by `cancel`.
    Cancelled,
}

impl SlotStatus {
    /// Classifies a settlement outcome.
    pub fn of<T>(outcome: &Result<T, EmitError>) -> Self {
        match outcome {
            Ok(_) => SlotStatus::Activated,
            Err(err) if err.is_cancelled() => SlotStatus::Cancelled,
            Err(_) => SlotStatus::Deactivated,
        }
    }

    /// Returns `true` for every state except [`SlotStatus::Pending`].
    #[inline]
    pub fn is_settled(&self) -> bool {
        !matches!(self, SlotStatus::Pending)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "pending",
            SlotStatus::Activated => "activated",
            SlotStatus::Deactivated => "deactivated",
            SlotStatus::Cancelled => "cancelled",
        }
    }
}
