pub mod enums;
pub mod error;
pub mod reservation;

// Re-export the core types to provide a clean public API.
pub use enums::ReservationStatus;
pub use error::CoreError;
pub use reservation::{BookingWindow, NewReservation, Reservation, VehicleType};
