pub mod clock;
pub mod error;
pub mod memory;
pub mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::BookingError;
pub use memory::MemoryBookingStore;
pub use repository::BookingStore;
