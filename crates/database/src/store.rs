use async_trait::async_trait;
use core_types::{NewReservation, Reservation, VehicleType};

use crate::error::StoreError;

/// One atomic booking attempt against a single vehicle type.
///
/// A unit is opened with [`ReservationStore::begin_unit`] and carries
/// whatever the backend needs to make the read-check-insert sequence
/// atomic: a database transaction holding a per-type advisory lock, or an
/// in-process mutex guard. Dropping a unit without calling `commit`
/// abandons the attempt and releases the lock; nothing staged becomes
/// visible.
#[async_trait]
pub trait ReservationUnit: Send {
    /// Every reservation currently stored for the unit's vehicle type.
    async fn existing_reservations(&mut self) -> Result<Vec<Reservation>, StoreError>;

    /// Stages a reservation for insertion, assigning its id and creation
    /// timestamp. The row is not visible to other units until `commit`.
    async fn insert(&mut self, reservation: NewReservation) -> Result<Reservation, StoreError>;

    /// Publishes the staged insert and releases the unit's lock.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Persistence backend for reservations.
///
/// Units for the same vehicle type serialize against each other, which is
/// what makes the caller's check-then-insert race-free. Units for different
/// vehicle types must be able to proceed in parallel.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Opens an atomic unit scoped to one vehicle type. Blocks while
    /// another unit for the same type is open.
    async fn begin_unit(
        &self,
        vehicle_type: &VehicleType,
    ) -> Result<Box<dyn ReservationUnit>, StoreError>;

    /// Every reservation made by one user, newest first.
    async fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, StoreError>;
}
