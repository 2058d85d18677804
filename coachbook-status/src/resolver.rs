use coachbook_domain::status::{AttendanceStatus, BookingCategory, PaymentStatus};

/// Derives the booking lifecycle category from payment and attendance.
///
/// Deterministic and total: every pair maps to exactly one category, and
/// unmapped combinations fall back to `Pending` rather than erroring so
/// callers always have something renderable. First match wins.
pub fn resolve(payment: PaymentStatus, attendance: AttendanceStatus) -> BookingCategory {
    // Reservation failures trump everything.
    if payment == PaymentStatus::ReservationFailed {
        return BookingCategory::Failed;
    }

    // Refunds and cancellations, in either field.
    if payment.is_refund_variant() || attendance == AttendanceStatus::Cancelled {
        return BookingCategory::Cancelled;
    }

    if attendance == AttendanceStatus::Completed {
        return BookingCategory::Completed;
    }

    // No-shows are archived as completed, not tracked separately.
    if attendance == AttendanceStatus::NoShow {
        return BookingCategory::Completed;
    }

    if attendance == AttendanceStatus::Confirmed {
        return BookingCategory::Confirmed;
    }

    if matches!(
        payment,
        PaymentStatus::ReservationPaid | PaymentStatus::SessionPaid
    ) {
        return BookingCategory::Paid;
    }

    // Manual entries reconcile on payment state.
    if attendance == AttendanceStatus::Manual {
        return if payment.is_paid_variant() {
            BookingCategory::Confirmed
        } else {
            BookingCategory::Pending
        };
    }

    BookingCategory::Pending
}

/// Whether a category permits no further status mutation.
pub fn is_terminal(category: BookingCategory) -> bool {
    category.is_terminal()
}

/// Human-readable summary for audit trails and status screens.
pub fn describe(
    category: BookingCategory,
    payment: PaymentStatus,
    attendance: AttendanceStatus,
) -> String {
    format!(
        "{} ({}; {})",
        category_description(category),
        payment_description(payment),
        attendance_description(attendance)
    )
}

fn category_description(category: BookingCategory) -> &'static str {
    match category {
        BookingCategory::Pending => "Awaiting confirmation",
        BookingCategory::Paid => "Payment received",
        BookingCategory::Confirmed => "Confirmed and scheduled",
        BookingCategory::Completed => "Session completed",
        BookingCategory::Failed => "Booking failed",
        BookingCategory::Cancelled => "Booking cancelled",
    }
}

fn payment_description(payment: PaymentStatus) -> &'static str {
    match payment {
        PaymentStatus::Unpaid => "no payment received",
        PaymentStatus::ReservationPending => "payment processing",
        PaymentStatus::ReservationPaid => "reservation fee paid",
        PaymentStatus::ReservationFailed => "payment failed",
        PaymentStatus::ReservationRefunded => "reservation refunded",
        PaymentStatus::SessionPaid => "full session paid",
        PaymentStatus::SessionRefunded => "session refunded",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Failed => "payment failed",
        PaymentStatus::Refunded => "refunded",
    }
}

fn attendance_description(attendance: AttendanceStatus) -> &'static str {
    match attendance {
        AttendanceStatus::Pending => "not yet attended",
        AttendanceStatus::Confirmed => "confirmed to attend",
        AttendanceStatus::Completed => "successfully attended",
        AttendanceStatus::Cancelled => "cancelled attendance",
        AttendanceStatus::NoShow => "did not show up",
        AttendanceStatus::Manual => "manually managed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PAYMENT: [PaymentStatus; 10] = [
        PaymentStatus::Unpaid,
        PaymentStatus::ReservationPending,
        PaymentStatus::ReservationPaid,
        PaymentStatus::ReservationFailed,
        PaymentStatus::ReservationRefunded,
        PaymentStatus::SessionPaid,
        PaymentStatus::SessionRefunded,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    const ALL_ATTENDANCE: [AttendanceStatus; 6] = [
        AttendanceStatus::Pending,
        AttendanceStatus::Confirmed,
        AttendanceStatus::Completed,
        AttendanceStatus::NoShow,
        AttendanceStatus::Cancelled,
        AttendanceStatus::Manual,
    ];

    #[test]
    fn test_resolution_examples() {
        assert_eq!(
            resolve(PaymentStatus::Unpaid, AttendanceStatus::Pending),
            BookingCategory::Pending
        );
        assert_eq!(
            resolve(PaymentStatus::ReservationPaid, AttendanceStatus::Confirmed),
            BookingCategory::Confirmed
        );
        // Refund outranks completion.
        assert_eq!(
            resolve(PaymentStatus::SessionRefunded, AttendanceStatus::Completed),
            BookingCategory::Cancelled
        );
        assert_eq!(
            resolve(PaymentStatus::ReservationFailed, AttendanceStatus::Confirmed),
            BookingCategory::Failed
        );
        assert_eq!(
            resolve(PaymentStatus::SessionPaid, AttendanceStatus::Pending),
            BookingCategory::Paid
        );
    }

    #[test]
    fn test_no_show_archives_as_completed() {
        assert_eq!(
            resolve(PaymentStatus::ReservationPaid, AttendanceStatus::NoShow),
            BookingCategory::Completed
        );
    }

    #[test]
    fn test_refund_is_always_terminal() {
        for payment in [
            PaymentStatus::ReservationRefunded,
            PaymentStatus::SessionRefunded,
            PaymentStatus::Refunded,
        ] {
            for attendance in ALL_ATTENDANCE {
                let category = resolve(payment, attendance);
                assert!(
                    category.is_terminal(),
                    "{payment}/{attendance} resolved to non-terminal {category}"
                );
            }
        }
    }

    #[test]
    fn test_manual_reconciles_on_payment() {
        assert_eq!(
            resolve(PaymentStatus::ReservationPaid, AttendanceStatus::Manual),
            BookingCategory::Confirmed
        );
        assert_eq!(
            resolve(PaymentStatus::Paid, AttendanceStatus::Manual),
            BookingCategory::Confirmed
        );
        assert_eq!(
            resolve(PaymentStatus::Unpaid, AttendanceStatus::Manual),
            BookingCategory::Pending
        );
    }

    #[test]
    fn test_total_and_deterministic() {
        for payment in ALL_PAYMENT {
            for attendance in ALL_ATTENDANCE {
                let first = resolve(payment, attendance);
                let second = resolve(payment, attendance);
                assert_eq!(first, second, "{payment}/{attendance} not deterministic");
                // Every pair has a description too.
                assert!(!describe(first, payment, attendance).is_empty());
            }
        }
    }
}
