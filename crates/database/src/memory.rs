use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use core_types::{NewReservation, Reservation, VehicleType};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{ReservationStore, ReservationUnit};

/// In-memory reservation store, used by tests and local demos.
///
/// Each vehicle type gets its own mutex, so booking attempts for the same
/// type take turns while attempts for other types proceed untouched. This
/// mirrors the per-type isolation the Postgres store gets from its advisory
/// lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    fleets: Arc<Mutex<HashMap<VehicleType, Arc<Mutex<Vec<Reservation>>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fleet(&self, vehicle_type: &VehicleType) -> Arc<Mutex<Vec<Reservation>>> {
        let mut fleets = self.fleets.lock().await;
        fleets.entry(vehicle_type.clone()).or_default().clone()
    }
}

/// Holds the per-type lock from `begin_unit` until the unit is committed or
/// dropped, which is what serializes concurrent bookings of one type.
struct MemoryUnit {
    fleet: OwnedMutexGuard<Vec<Reservation>>,
    staged: Vec<Reservation>,
}

#[async_trait]
impl ReservationUnit for MemoryUnit {
    async fn existing_reservations(&mut self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.fleet.iter().chain(self.staged.iter()).cloned().collect())
    }

    async fn insert(&mut self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: reservation.user_id,
            vehicle_type: reservation.vehicle_type,
            pickup_date: reservation.pickup_date,
            return_date: reservation.return_date,
            price: reservation.price,
            notes: reservation.notes,
            status: reservation.status,
            created_at: Utc::now(),
        };
        self.staged.push(reservation.clone());
        Ok(reservation)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnit { mut fleet, staged } = *self;
        fleet.extend(staged);
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn begin_unit(
        &self,
        vehicle_type: &VehicleType,
    ) -> Result<Box<dyn ReservationUnit>, StoreError> {
        let fleet = self.fleet(vehicle_type).await;
        let guard = fleet.lock_owned().await;
        Ok(Box::new(MemoryUnit {
            fleet: guard,
            staged: Vec::new(),
        }))
    }

    async fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, StoreError> {
        // Snapshot the per-type handles first so the outer map lock is not
        // held while individual fleets are read.
        let fleets: Vec<Arc<Mutex<Vec<Reservation>>>> =
            self.fleets.lock().await.values().cloned().collect();

        let mut reservations = Vec::new();
        for fleet in fleets {
            let rows = fleet.lock().await;
            reservations.extend(rows.iter().filter(|r| r.user_id == user_id).cloned());
        }
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reservations)
    }
}
