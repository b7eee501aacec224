use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::ReservationStatus;

/// A category of rentable vehicle, e.g. "suv" or "van".
///
/// The resolver never interprets the value: any non-empty string is a valid
/// type, and two types are the same fleet only if the strings are exactly
/// equal (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct VehicleType(String);

impl VehicleType {
    pub fn new(value: impl Into<String>) -> Self {
        VehicleType(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleType {
    fn from(value: &str) -> Self {
        VehicleType(value.to_string())
    }
}

/// The rental period of a reservation: every calendar day from pickup
/// through return, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

impl BookingWindow {
    pub fn new(pickup_date: NaiveDate, return_date: NaiveDate) -> Self {
        BookingWindow {
            pickup_date,
            return_date,
        }
    }

    /// Returns true when the two windows share at least one calendar day.
    ///
    /// Boundaries are inclusive: a window returning on June 15 overlaps a
    /// window picking up on June 15. The business rule is that a vehicle is
    /// unavailable on its return day, so same-day handover is a conflict.
    ///
    /// This is the only overlap test in the codebase; every conflict check
    /// goes through it.
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.pickup_date <= other.return_date && self.return_date >= other.pickup_date
    }
}

/// A stored booking of one vehicle type for a window of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: String,
    pub vehicle_type: VehicleType,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn window(&self) -> BookingWindow {
        BookingWindow::new(self.pickup_date, self.return_date)
    }
}

/// A reservation that has passed validation but is not persisted yet.
/// The store assigns `id` and `created_at` at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub user_id: String,
    pub vehicle_type: VehicleType,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub status: ReservationStatus,
}

impl NewReservation {
    pub fn window(&self) -> BookingWindow {
        BookingWindow::new(self.pickup_date, self.return_date)
    }
}
