use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment lifecycle as reported by the payment processor.
///
/// Wire strings are kebab-case (`reservation-paid`, `session-refunded`),
/// matching what the booking store already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    Unpaid,
    ReservationPending,
    ReservationPaid,
    ReservationFailed,
    ReservationRefunded,
    SessionPaid,
    SessionRefunded,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::ReservationPending => "reservation-pending",
            PaymentStatus::ReservationPaid => "reservation-paid",
            PaymentStatus::ReservationFailed => "reservation-failed",
            PaymentStatus::ReservationRefunded => "reservation-refunded",
            PaymentStatus::SessionPaid => "session-paid",
            PaymentStatus::SessionRefunded => "session-refunded",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Any status under which money has been collected and kept.
    pub fn is_paid_variant(&self) -> bool {
        matches!(
            self,
            PaymentStatus::ReservationPaid | PaymentStatus::SessionPaid | PaymentStatus::Paid
        )
    }

    /// Any status under which collected money has been returned.
    pub fn is_refund_variant(&self) -> bool {
        matches!(
            self,
            PaymentStatus::ReservationRefunded
                | PaymentStatus::SessionRefunded
                | PaymentStatus::Refunded
        )
    }

    /// Money movement has concluded, in either direction.
    pub fn is_settled(&self) -> bool {
        self.is_paid_variant() || self.is_refund_variant()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "reservation-pending" => Ok(PaymentStatus::ReservationPending),
            "reservation-paid" => Ok(PaymentStatus::ReservationPaid),
            "reservation-failed" => Ok(PaymentStatus::ReservationFailed),
            "reservation-refunded" => Ok(PaymentStatus::ReservationRefunded),
            "session-paid" => Ok(PaymentStatus::SessionPaid),
            "session-refunded" => Ok(PaymentStatus::SessionRefunded),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(StatusParseError::Payment(other.to_string())),
        }
    }
}

/// Attendance lifecycle tracked by staff.
///
/// `Manual` is an administrative override entered outside the normal
/// pipeline; the resolver reconciles it back to one of the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Pending,
    Confirmed,
    Completed,
    NoShow,
    Cancelled,
    Manual,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Confirmed => "confirmed",
            AttendanceStatus::Completed => "completed",
            AttendanceStatus::NoShow => "no-show",
            AttendanceStatus::Cancelled => "cancelled",
            AttendanceStatus::Manual => "manual",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AttendanceStatus::Pending),
            "confirmed" => Ok(AttendanceStatus::Confirmed),
            "completed" => Ok(AttendanceStatus::Completed),
            "no-show" => Ok(AttendanceStatus::NoShow),
            "cancelled" => Ok(AttendanceStatus::Cancelled),
            "manual" => Ok(AttendanceStatus::Manual),
            other => Err(StatusParseError::Attendance(other.to_string())),
        }
    }
}

/// Derived booking lifecycle label.
///
/// Always a pure function of (PaymentStatus, AttendanceStatus); never
/// stored as an independent source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingCategory {
    Failed,
    Cancelled,
    Completed,
    Confirmed,
    Paid,
    Pending,
}

impl BookingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingCategory::Failed => "failed",
            BookingCategory::Cancelled => "cancelled",
            BookingCategory::Completed => "completed",
            BookingCategory::Confirmed => "confirmed",
            BookingCategory::Paid => "paid",
            BookingCategory::Pending => "pending",
        }
    }

    /// Terminal bookings reject any further status mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingCategory::Completed | BookingCategory::Cancelled | BookingCategory::Failed
        )
    }
}

impl fmt::Display for BookingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusParseError {
    #[error("unknown payment status: {0}")]
    Payment(String),

    #[error("unknown attendance status: {0}")]
    Attendance(String),
}
