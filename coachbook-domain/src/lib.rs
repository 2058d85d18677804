pub mod booking;
pub mod events;
pub mod lock;
pub mod status;

pub use booking::{Booking, BookingDraft};
pub use events::PaymentEvent;
pub use lock::{LockHandle, SlotKey, SlotLock};
pub use status::{AttendanceStatus, BookingCategory, PaymentStatus, StatusParseError};
