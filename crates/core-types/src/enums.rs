use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a reservation. New bookings that pass the conflict
/// check are written as `Confirmed`; `Pending` is the column default and may
/// still appear on rows created outside the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
}

impl ReservationStatus {
    /// The exact string persisted in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            other => Err(CoreError::InvalidInput(
                "status".to_string(),
                other.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_the_stored_column_values() {
        assert_eq!(ReservationStatus::Confirmed.as_str(), "confirmed");
        assert_eq!(
            "pending".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Pending
        );
        assert!("cancelled".parse::<ReservationStatus>().is_err());
    }
}
