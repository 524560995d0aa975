use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::records::{Appointment, Review};

pub const MAX_BIO_LENGTH: usize = 100;

/// Gate for public visibility of a doctor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualification {
    #[serde(default)]
    pub starting_date: String,
    #[serde(default)]
    pub ending_date: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub university: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub starting_date: String,
    #[serde(default)]
    pub ending_date: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub hospital: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub starting_time: String,
    #[serde(default)]
    pub ending_time: String,
}

impl TimeSlot {
    /// `HH:MM` times with the slot ending after it starts. Blank rows are
    /// left to the editor and accepted here.
    pub fn validate(&self) -> Result<(), String> {
        if self.starting_time.is_empty() && self.ending_time.is_empty() {
            return Ok(());
        }
        let start = parse_clock(&self.starting_time)
            .ok_or_else(|| format!("Invalid starting time '{}'", self.starting_time))?;
        let end = parse_clock(&self.ending_time)
            .ok_or_else(|| format!("Invalid ending time '{}'", self.ending_time))?;
        if end <= start {
            return Err(format!("Time slot on '{}' must end after it starts", self.day));
        }
        Ok(())
    }
}

fn parse_clock(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Doctor document as exposed to clients. The stored record may carry a
/// password hash; it has no field here and is dropped on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub ticket_price: Option<f64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_rating: u32,
    #[serde(default)]
    pub is_approved: ApprovalStatus,
    /// Ids of appointments booked with this doctor, as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<String>>,
}

impl Doctor {
    pub fn is_publicly_visible(&self) -> bool {
        self.is_approved == ApprovalStatus::Approved
    }

    /// Case-insensitive containment on name or specialization.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .specialization
                .as_deref()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// Doctor bound to the caller, with every appointment referencing them.
/// The full records replace the doctor's stored id list under `appointments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub appointments: Vec<Appointment>,
}

impl DoctorProfile {
    pub fn new(mut doctor: Doctor, appointments: Vec<Appointment>) -> Self {
        doctor.appointments = None;
        Self { doctor, appointments }
    }
}

/// Partial update: only fields present in the body are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<Vec<Qualification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<Vec<TimeSlot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<ApprovalStatus>,
}

impl UpdateDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DoctorError::Validation("Name cannot be empty".to_string()));
            }
        }
        if let Some(price) = self.ticket_price {
            if !price.is_finite() || price < 0.0 {
                return Err(DoctorError::Validation("Ticket price must be a non-negative number".to_string()));
            }
        }
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(DoctorError::Validation(format!("Bio must be at most {} characters", MAX_BIO_LENGTH)));
            }
        }
        if let Some(slots) = &self.time_slots {
            for slot in slots {
                slot.validate().map_err(DoctorError::Validation)?;
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        matches!(serde_json::to_value(self), Ok(serde_json::Value::Object(map)) if map.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub is_approved: ApprovalStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Store failure: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(err: anyhow::Error) -> Self {
        DoctorError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for DoctorError {
    fn from(err: serde_json::Error) -> Self {
        DoctorError::Internal(format!("Malformed doctor record: {}", err))
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::Validation(msg) => AppError::Validation(msg),
            DoctorError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_never_survives_deserialization() {
        let doctor: Doctor = serde_json::from_value(json!({
            "_id": "d1",
            "name": "Dr. Rao",
            "email": "rao@clinic.test",
            "password": "secret-hash",
            "isApproved": "approved"
        }))
        .unwrap();

        let out = serde_json::to_value(&doctor).unwrap();
        assert!(out.get("password").is_none());
        assert_eq!(out["id"], "d1");
        assert_eq!(out["isApproved"], "approved");
        assert!(out.get("appointments").is_none());
    }

    #[test]
    fn stored_appointment_ids_are_kept() {
        let doctor: Doctor = serde_json::from_value(json!({
            "_id": "d1",
            "name": "Dr. Rao",
            "email": "rao@clinic.test",
            "password": "secret-hash",
            "appointments": ["a1", "a2"]
        }))
        .unwrap();

        let out = serde_json::to_value(&doctor).unwrap();
        assert_eq!(out["appointments"], json!(["a1", "a2"]));
        assert!(out.get("password").is_none());
    }

    #[test]
    fn profile_appointments_take_precedence_over_id_list() {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": "d1",
            "name": "Dr. Rao",
            "email": "rao@clinic.test",
            "appointments": ["a1"]
        }))
        .unwrap();
        let appointment: Appointment = serde_json::from_value(json!({
            "id": "a1",
            "doctor": "d1",
            "user": "u1"
        }))
        .unwrap();

        let profile = DoctorProfile::new(doctor, vec![appointment]);
        let out = serde_json::to_value(&profile).unwrap();
        assert_eq!(out["appointments"][0]["id"], "a1");
        assert_eq!(out["appointments"][0]["user"], "u1");

        let back: DoctorProfile = serde_json::from_value(out).unwrap();
        assert_eq!(back.appointments.len(), 1);
        assert!(back.doctor.appointments.is_none());
    }

    #[test]
    fn query_matching_is_case_insensitive() {
        let doctor = Doctor {
            name: "Alice Smith".to_string(),
            specialization: Some("Cardiology".to_string()),
            ..Default::default()
        };
        assert!(doctor.matches_query("cardio"));
        assert!(doctor.matches_query("SMITH"));
        assert!(!doctor.matches_query("neuro"));
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let request = UpdateDoctorRequest {
            bio: Some("Short bio".to_string()),
            is_approved: Some(ApprovalStatus::Approved),
            ..Default::default()
        };
        let patch = serde_json::to_value(&request).unwrap();
        assert_eq!(patch, json!({"bio": "Short bio", "isApproved": "approved"}));
        assert!(UpdateDoctorRequest::default().is_empty());
    }

    #[test]
    fn update_validation() {
        let negative = UpdateDoctorRequest { ticket_price: Some(-1.0), ..Default::default() };
        assert!(matches!(negative.validate(), Err(DoctorError::Validation(_))));

        let long_bio = UpdateDoctorRequest { bio: Some("x".repeat(101)), ..Default::default() };
        assert!(long_bio.validate().is_err());

        let backwards = UpdateDoctorRequest {
            time_slots: Some(vec![TimeSlot {
                day: "monday".to_string(),
                starting_time: "12:00".to_string(),
                ending_time: "09:00".to_string(),
            }]),
            ..Default::default()
        };
        assert!(backwards.validate().is_err());

        let blank_row = UpdateDoctorRequest { time_slots: Some(vec![TimeSlot::default()]), ..Default::default() };
        assert!(blank_row.validate().is_ok());
    }

    #[test]
    fn unknown_approval_marker_is_rejected() {
        let parsed: Result<ApprovalRequest, _> = serde_json::from_value(json!({"isApproved": "maybe"}));
        assert!(parsed.is_err());
    }
}
