use crate::auth::AuthenticatedUser;
use crate::{error::AppError, AppState};
use axum::{extract::State, http::StatusCode, Extension, Json};
use booking::BookingRequest;
use chrono::NaiveDate;
use core_types::{Reservation, VehicleType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Body of `POST /api/reservations`. Presence is checked by hand so a
/// missing field comes back as a proper invalid-argument error instead of a
/// deserializer rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReservationBody {
    pub vehicle_type: Option<String>,
    pub pickup_date: Option<String>,
    pub return_date: Option<String>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReservationCreated {
    pub id: Uuid,
}

/// # POST /api/reservations
/// Books a window of days for the authenticated user. Returns 201 with the
/// new reservation id, or 409 when the window is already taken.
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateReservationBody>,
) -> Result<(StatusCode, Json<ReservationCreated>), AppError> {
    let vehicle_type = require_field(body.vehicle_type, "vehicle_type")?;
    let pickup_date = parse_date(require_field(body.pickup_date, "pickup_date")?, "pickup_date")?;
    let return_date = parse_date(require_field(body.return_date, "return_date")?, "return_date")?;

    let reservation = state
        .resolver
        .reserve(BookingRequest {
            requester_id: user.user_id,
            vehicle_type: VehicleType::new(vehicle_type),
            pickup_date,
            return_date,
            price: body.price,
            notes: body.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreated { id: reservation.id }),
    ))
}

/// # GET /api/reservations
/// Lists the authenticated user's reservations, newest first.
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let reservations = state.resolver.reservations_for_user(&user.user_id).await?;
    Ok(Json(reservations))
}

/// # GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

fn require_field(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::invalid_argument(format!("{name} is required"))),
    }
}

fn parse_date(value: String, name: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|_| AppError::invalid_argument(format!("{name} must be a YYYY-MM-DD date")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtVerifier;
    use booking::Resolver;
    use database::MemoryStore;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            resolver: Resolver::new(Arc::new(MemoryStore::new())),
            verifier: JwtVerifier::new("test-secret"),
        })
    }

    fn as_user(user_id: &str) -> Extension<AuthenticatedUser> {
        Extension(AuthenticatedUser {
            user_id: user_id.to_string(),
        })
    }

    fn body(vehicle_type: &str, pickup: &str, ret: &str) -> CreateReservationBody {
        CreateReservationBody {
            vehicle_type: Some(vehicle_type.to_string()),
            pickup_date: Some(pickup.to_string()),
            return_date: Some(ret.to_string()),
            price: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn booking_returns_201_and_shows_up_in_the_listing() {
        let state = state();

        let (status, Json(created)) = create_reservation(
            State(state.clone()),
            as_user("alice"),
            Json(body("suv", "2025-06-10", "2025-06-15")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(mine) = list_reservations(State(state), as_user("alice"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, created.id);
        assert_eq!(mine[0].user_id, "alice");
    }

    #[tokio::test]
    async fn conflicting_bookings_come_back_as_already_exists() {
        let state = state();
        create_reservation(
            State(state.clone()),
            as_user("alice"),
            Json(body("suv", "2025-06-10", "2025-06-15")),
        )
        .await
        .unwrap();

        let err = create_reservation(
            State(state),
            as_user("bob"),
            Json(body("suv", "2025-06-15", "2025-06-20")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "already-exists");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_fields_come_back_as_invalid_argument() {
        let state = state();
        let mut incomplete = body("suv", "2025-06-10", "2025-06-15");
        incomplete.return_date = None;

        let err = create_reservation(State(state), as_user("alice"), Json(incomplete))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid-argument");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_dates_come_back_as_invalid_argument() {
        let state = state();
        let err = create_reservation(
            State(state),
            as_user("alice"),
            Json(body("suv", "June 10th", "2025-06-15")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "invalid-argument");
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_caller() {
        let state = state();
        create_reservation(
            State(state.clone()),
            as_user("alice"),
            Json(body("van", "2025-07-01", "2025-07-03")),
        )
        .await
        .unwrap();

        let Json(bobs) = list_reservations(State(state), as_user("bob")).await.unwrap();
        assert!(bobs.is_empty());
    }
}
