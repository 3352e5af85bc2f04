//! Modelo de Feedback
//!
//! Calificación (1-5) que deja el cliente una vez pagada la solicitud.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::deserialize_timestamp;
use crate::utils::validation::validate_rating;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default)]
    pub id: Option<i64>,
    pub request_id: i64,
    #[serde(default)]
    pub mechanic_id: Option<i64>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Cuerpo de `POST /feedback`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub request_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<i64>,

    #[validate(custom = "validate_rating")]
    pub rating: u8,

    #[validate(length(max = 500))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Resumen de calificaciones de un mecánico (vista admin)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicRatingSummary {
    pub mechanic_id: i64,
    pub count: usize,
    pub average: Option<f64>,
}

impl MechanicRatingSummary {
    pub fn from_feedback(mechanic_id: i64, feedback: &[Feedback]) -> Self {
        let count = feedback.len();
        let average = if count == 0 {
            None
        } else {
            let total: u32 = feedback.iter().map(|f| u32::from(f.rating)).sum();
            Some(f64::from(total) / count as f64)
        };
        Self {
            mechanic_id,
            count,
            average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(rating: u8) -> Feedback {
        Feedback {
            id: None,
            request_id: 1,
            mechanic_id: Some(5),
            rating,
            comment: None,
            created_at: None,
        }
    }

    #[test]
    fn test_rating_summary_average() {
        let summary = MechanicRatingSummary::from_feedback(5, &[feedback(4), feedback(5), feedback(3)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(4.0));

        let empty = MechanicRatingSummary::from_feedback(5, &[]);
        assert_eq!(empty.average, None);
    }

    #[test]
    fn test_feedback_request_rating_out_of_range() {
        let request = FeedbackRequest {
            request_id: 1,
            mechanic_id: None,
            rating: 6,
            comment: None,
        };
        assert!(request.validate().is_err());
    }
}
