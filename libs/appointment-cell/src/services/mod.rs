pub mod booking;
pub mod conflict;
pub mod locks;

pub use booking::BookingService;
pub use conflict::ConflictDetectionService;
pub use locks::DoctorScheduleLocks;
