use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Cancelled,
}

/// Booking linking a user to a doctor. Queried by either foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(alias = "_id")]
    pub id: String,
    pub doctor: String,
    pub user: String,
    #[serde(default)]
    pub ticket_price: Option<String>,
    #[serde(default)]
    pub appointment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    pub doctor: String,
    pub user: String,
    pub review_text: String,
    #[serde(deserialize_with = "rating_in_range")]
    pub rating: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ratings are any number from 0 to `MAX_RATING`, fractions included.
fn rating_in_range<'de, D>(deserializer: D) -> Result<f64, D::Error>
where D: Deserializer<'de> {
    let rating = f64::deserialize(deserializer)?;
    if (0.0..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(de::Error::custom(format!("rating {} is outside 0..={}", rating, MAX_RATING)))
    }
}
