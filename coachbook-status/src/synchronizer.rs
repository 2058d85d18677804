use crate::resolver::resolve;
use coachbook_core::error::BookingError;
use coachbook_domain::status::{AttendanceStatus, BookingCategory, PaymentStatus};
use serde::{Deserialize, Serialize};

/// The two independently updated status fields of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPair {
    pub payment: PaymentStatus,
    pub attendance: AttendanceStatus,
}

impl StatusPair {
    pub fn new(payment: PaymentStatus, attendance: AttendanceStatus) -> Self {
        Self {
            payment,
            attendance,
        }
    }

    pub fn category(&self) -> BookingCategory {
        resolve(self.payment, self.attendance)
    }
}

/// A proposed change to exactly one status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Payment(PaymentStatus),
    Attendance(AttendanceStatus),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Explicit caller instruction that money for the session has been
    /// collected out of band. Without it, financial state is never
    /// auto-mutated.
    pub assume_paid: bool,
}

/// Result of validating a proposed change without applying corrections.
#[derive(Debug, Clone, Serialize)]
pub struct Proposal {
    pub next: StatusPair,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Proposal {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of a synchronized (corrected) change.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub payment: PaymentStatus,
    pub attendance: AttendanceStatus,
    pub category: BookingCategory,
    pub warnings: Vec<String>,
}

/// Validates the combination that would result from `change`, without
/// mutating the sibling field. Inconsistencies come back as errors,
/// suspicious-but-legal states as warnings.
pub fn propose(current: StatusPair, change: StatusChange) -> Proposal {
    let mut errors = Vec::new();

    if current.category().is_terminal() {
        errors.push(format!(
            "booking is {} and can no longer be modified",
            current.category()
        ));
    }

    let next = apply_change(current, change);

    if unpaid_completion(next) {
        errors.push(
            "attendance cannot be completed while payment is unpaid; \
             record the payment or pass assume_paid"
                .to_string(),
        );
    }

    Proposal {
        next,
        warnings: combination_warnings(next),
        errors,
    }
}

/// Applies `change` plus the minimal forward-compatible sibling
/// correction. Attendance may be corrected from payment signals; payment
/// is only ever upgraded when `options.assume_paid` says so.
pub fn synchronize(
    current: StatusPair,
    change: StatusChange,
    options: SyncOptions,
) -> Result<SyncOutcome, BookingError> {
    let category = current.category();
    if category.is_terminal() {
        return Err(BookingError::TerminalState(category));
    }

    let mut next = apply_change(current, change);

    match change {
        StatusChange::Attendance(AttendanceStatus::Completed)
        | StatusChange::Attendance(AttendanceStatus::NoShow) => {
            if unpaid_completion(next) {
                if options.assume_paid {
                    next.payment = PaymentStatus::SessionPaid;
                } else {
                    return Err(BookingError::Validation(
                        "attendance cannot be completed while payment is unpaid; \
                         record the payment or pass assume_paid"
                            .to_string(),
                    ));
                }
            }
        }
        StatusChange::Payment(PaymentStatus::ReservationPaid) => {
            // A paid reservation confirms a still-pending attendance.
            if next.attendance == AttendanceStatus::Pending {
                next.attendance = AttendanceStatus::Confirmed;
            }
        }
        StatusChange::Payment(PaymentStatus::ReservationPending)
        | StatusChange::Payment(PaymentStatus::ReservationFailed) => {
            // Payment fell back before settling; undo the confirmation.
            if next.attendance == AttendanceStatus::Confirmed {
                next.attendance = AttendanceStatus::Pending;
            }
        }
        _ => {}
    }

    Ok(SyncOutcome {
        payment: next.payment,
        attendance: next.attendance,
        category: next.category(),
        warnings: combination_warnings(next),
    })
}

/// Non-fatal flags for suspicious-but-legal combinations. Shared by
/// `propose`, `synchronize`, and status display.
pub fn combination_warnings(pair: StatusPair) -> Vec<String> {
    let mut warnings = Vec::new();

    let cancelled =
        pair.attendance == AttendanceStatus::Cancelled || pair.payment.is_refund_variant();
    if pair.attendance == AttendanceStatus::Cancelled && pair.payment.is_paid_variant() {
        warnings.push("booking is cancelled but payment was collected; refund likely owed".into());
    }

    if pair.payment.is_refund_variant() && pair.attendance == AttendanceStatus::Completed {
        warnings.push("refund recorded for a completed session".into());
    }

    if !cancelled
        && pair.payment == PaymentStatus::SessionPaid
        && matches!(
            pair.attendance,
            AttendanceStatus::Pending | AttendanceStatus::Manual
        )
    {
        warnings.push("full session paid but attendance is not confirmed".into());
    }

    warnings
}

fn apply_change(current: StatusPair, change: StatusChange) -> StatusPair {
    let mut next = current;
    match change {
        StatusChange::Payment(payment) => next.payment = payment,
        StatusChange::Attendance(attendance) => next.attendance = attendance,
    }
    next
}

fn unpaid_completion(pair: StatusPair) -> bool {
    matches!(
        pair.attendance,
        AttendanceStatus::Completed | AttendanceStatus::NoShow
    ) && matches!(
        pair.payment,
        PaymentStatus::Unpaid | PaymentStatus::ReservationPending
    )
}
