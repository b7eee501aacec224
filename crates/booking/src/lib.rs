//! Conflict-checked reservation booking.
//!
//! The [`Resolver`] is the one place bookings are decided. It validates a
//! request, opens an atomic storage unit for the vehicle type, tests the
//! requested window against every stored reservation of that type, and
//! inserts only if no window overlaps.

use std::sync::Arc;

use chrono::NaiveDate;
use core_types::{BookingWindow, NewReservation, Reservation, ReservationStatus, VehicleType};
use database::ReservationStore;
use rust_decimal::Decimal;

use crate::error::BookingError;

pub mod error;

/// A booking request as it arrives from a binding (HTTP handler or CLI),
/// with the requester already authenticated by that binding.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub requester_id: String,
    pub vehicle_type: VehicleType,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Decides whether a requested window can coexist with every stored
/// reservation of the same vehicle type, and persists it if so.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ReservationStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Books the requested window, or reports why it cannot be booked.
    ///
    /// The overlap check and the insert run inside a single storage unit,
    /// so two concurrent requests for the same vehicle type can never both
    /// pass the check. Requests for different vehicle types never wait on
    /// each other.
    pub async fn reserve(&self, request: BookingRequest) -> Result<Reservation, BookingError> {
        if request.requester_id.is_empty() {
            return Err(BookingError::Validation(
                "requesterId must not be empty".to_string(),
            ));
        }
        if request.vehicle_type.is_empty() {
            return Err(BookingError::Validation(
                "vehicleType must not be empty".to_string(),
            ));
        }

        let window = BookingWindow::new(request.pickup_date, request.return_date);

        let mut unit = self.store.begin_unit(&request.vehicle_type).await?;
        let existing = unit.existing_reservations().await?;
        if let Some(taken) = existing.iter().find(|r| r.window().overlaps(&window)) {
            tracing::debug!(
                vehicle_type = %request.vehicle_type,
                conflicting_id = %taken.id,
                "requested window is already booked"
            );
            return Err(BookingError::Conflict);
        }

        let reservation = unit
            .insert(NewReservation {
                user_id: request.requester_id,
                vehicle_type: request.vehicle_type,
                pickup_date: request.pickup_date,
                return_date: request.return_date,
                price: request.price,
                notes: request.notes,
                status: ReservationStatus::Confirmed,
            })
            .await?;
        unit.commit().await?;

        tracing::info!(
            id = %reservation.id,
            vehicle_type = %reservation.vehicle_type,
            pickup = %reservation.pickup_date,
            ret = %reservation.return_date,
            "reservation confirmed"
        );
        Ok(reservation)
    }

    /// Every reservation made by one user, newest first.
    pub async fn reservations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.store.reservations_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::MemoryStore;
    use rust_decimal_macros::dec;
    use tokio::sync::Barrier;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(MemoryStore::new()))
    }

    fn request(user: &str, vehicle_type: &str, pickup: &str, ret: &str) -> BookingRequest {
        BookingRequest {
            requester_id: user.to_string(),
            vehicle_type: VehicleType::from(vehicle_type),
            pickup_date: pickup.parse().unwrap(),
            return_date: ret.parse().unwrap(),
            price: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn a_free_window_is_booked_and_confirmed() {
        let resolver = resolver();
        let mut req = request("alice", "suv", "2025-06-10", "2025-06-15");
        req.price = Some(dec!(120.50));
        req.notes = Some("child seat".to_string());

        let reservation = resolver.reserve(req).await.unwrap();
        assert_eq!(reservation.user_id, "alice");
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.price, Some(dec!(120.50)));
        assert_eq!(reservation.notes.as_deref(), Some("child seat"));
    }

    #[tokio::test]
    async fn overlapping_windows_are_rejected() {
        let resolver = resolver();
        resolver
            .reserve(request("alice", "suv", "2025-06-10", "2025-06-15"))
            .await
            .unwrap();

        let result = resolver
            .reserve(request("bob", "suv", "2025-06-12", "2025-06-18"))
            .await;
        assert!(matches!(result, Err(BookingError::Conflict)));
    }

    #[tokio::test]
    async fn same_day_handover_is_rejected_but_next_day_is_free() {
        let resolver = resolver();
        resolver
            .reserve(request("alice", "suv", "2025-06-10", "2025-06-15"))
            .await
            .unwrap();

        // Picking up on the previous renter's return day conflicts.
        let handover = resolver
            .reserve(request("bob", "suv", "2025-06-15", "2025-06-20"))
            .await;
        assert!(matches!(handover, Err(BookingError::Conflict)));

        // One day later the vehicle type is free again.
        resolver
            .reserve(request("bob", "suv", "2025-06-16", "2025-06-20"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn vehicle_types_are_independent_fleets() {
        let resolver = resolver();
        resolver
            .reserve(request("alice", "suv", "2025-06-10", "2025-06-15"))
            .await
            .unwrap();
        // Same window, different type: no conflict.
        resolver
            .reserve(request("bob", "van", "2025-06-10", "2025-06-15"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn a_booked_suv_blocks_overlaps_but_not_later_windows_or_other_types() {
        let resolver = resolver();
        resolver
            .reserve(request("alice", "suv", "2025-06-01", "2025-06-05"))
            .await
            .unwrap();

        let overlapping = resolver
            .reserve(request("bob", "suv", "2025-06-04", "2025-06-10"))
            .await;
        assert!(matches!(overlapping, Err(BookingError::Conflict)));

        resolver
            .reserve(request("bob", "suv", "2025-06-06", "2025-06-10"))
            .await
            .unwrap();
        resolver
            .reserve(request("carol", "sedan", "2025-06-01", "2025-06-05"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_fields_fail_validation() {
        let resolver = resolver();

        let result = resolver.reserve(request("alice", "", "2025-06-10", "2025-06-15")).await;
        assert!(matches!(result, Err(BookingError::Validation(_))));

        let result = resolver.reserve(request("", "suv", "2025-06-10", "2025-06-15")).await;
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[tokio::test]
    async fn concurrent_requests_for_one_window_book_exactly_once() {
        let resolver = resolver();
        let barrier = Arc::new(Barrier::new(8));

        let mut handles = Vec::new();
        for i in 0..8 {
            let resolver = resolver.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                resolver
                    .reserve(request(&format!("user-{i}"), "suv", "2025-06-10", "2025-06-15"))
                    .await
            }));
        }

        let mut confirmed = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(BookingError::Conflict) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(confirmed, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn concurrent_requests_for_different_types_all_succeed() {
        let resolver = resolver();
        let types = ["suv", "van", "compact", "luxury"];
        let barrier = Arc::new(Barrier::new(types.len()));

        let mut handles = Vec::new();
        for vehicle_type in types {
            let resolver = resolver.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                resolver
                    .reserve(request("alice", vehicle_type, "2025-06-10", "2025-06-15"))
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_user_and_newest_first() {
        let resolver = resolver();
        resolver
            .reserve(request("alice", "suv", "2025-06-01", "2025-06-03"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        resolver
            .reserve(request("alice", "van", "2025-07-01", "2025-07-03"))
            .await
            .unwrap();
        resolver
            .reserve(request("bob", "suv", "2025-08-01", "2025-08-03"))
            .await
            .unwrap();

        let mine = resolver.reservations_for_user("alice").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].vehicle_type, VehicleType::from("van"));
        assert!(mine.iter().all(|r| r.user_id == "alice"));
    }
}
