//! Review domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::DomainError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A renter's rating of a completed booking. Immutable once stored.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        booking_id: Uuid,
        user_id: Uuid,
        vehicle_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Self, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(DomainError::Validation(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            booking_id,
            user_id,
            vehicle_id,
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        let ids = || (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for rating in [0, 6, -1] {
            let (b, u, v) = ids();
            assert!(Review::new(b, u, v, rating, None).is_err());
        }
        let (b, u, v) = ids();
        assert!(Review::new(b, u, v, 5, Some("great".into())).is_ok());
    }

    #[test]
    fn blank_comment_dropped() {
        let r = Review::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 4, Some("  ".into()))
            .unwrap();
        assert!(r.comment.is_none());
    }
}
