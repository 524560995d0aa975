use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::records::Appointment;

use crate::models::{
    ApprovalStatus, Doctor, DoctorError, DoctorProfile, UpdateDoctorRequest,
};

pub const DOCTORS_TABLE: &str = "doctors";
pub const APPOINTMENTS_TABLE: &str = "appointments";

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Merge the provided fields into the doctor document.
    pub async fn update_doctor(
        &self,
        doctor_id: &str,
        request: UpdateDoctorRequest,
        auth_token: Option<&str>,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);
        let filter = id_filter(doctor_id)?;
        request.validate()?;

        if request.is_empty() {
            return self.get_single_doctor(doctor_id, auth_token).await;
        }

        let patch = serde_json::to_value(&request)?;
        let result = self.supabase
            .update_returning(DOCTORS_TABLE, &filter, patch, auth_token)
            .await?;

        first_doctor(result)
    }

    pub async fn delete_doctor(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Doctor, DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);
        let filter = id_filter(doctor_id)?;

        let result = self.supabase
            .delete_returning(DOCTORS_TABLE, &filter, auth_token)
            .await?;

        first_doctor(result)
    }

    /// One doctor with its reviews expanded.
    pub async fn get_single_doctor(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);
        let filter = id_filter(doctor_id)?;
        let query = format!("select=*,reviews(*)&{}", filter);

        let result = self.supabase
            .select(DOCTORS_TABLE, &query, auth_token)
            .await?;

        first_doctor(result)
    }

    /// Approved doctors, optionally narrowed to those whose name or
    /// specialization contains `query`.
    pub async fn get_all_doctors(
        &self,
        query: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        debug!("Listing approved doctors, query: {:?}", query);

        let mut filter = format!("isApproved=eq.{}", ApprovalStatus::Approved.as_str());
        if let Some(text) = query {
            let term = urlencoding::encode(&sanitize_term(text)).into_owned();
            filter.push_str(&format!(
                "&or=(name.ilike.*{term}*,specialization.ilike.*{term}*)"
            ));
        }

        let result = self.supabase
            .select(DOCTORS_TABLE, &filter, auth_token)
            .await?;

        let doctors = parse_doctors(result)?
            .into_iter()
            .filter(Doctor::is_publicly_visible)
            .filter(|doctor| query.map_or(true, |q| doctor.matches_query(q)))
            .collect();

        Ok(doctors)
    }

    /// Doctor bound to the caller with the appointments referencing them.
    pub async fn get_doctor_profile(
        &self,
        caller_id: &str,
        auth_token: Option<&str>,
    ) -> Result<DoctorProfile, DoctorError> {
        debug!("Fetching doctor profile for caller: {}", caller_id);
        let filter = id_filter(caller_id)?;

        let result = self.supabase
            .select(DOCTORS_TABLE, &filter, auth_token)
            .await?;
        let doctor = first_doctor(result)?;

        let appointment_filter = format!("doctor=eq.{}", urlencoding::encode(caller_id));
        let rows = self.supabase
            .select(APPOINTMENTS_TABLE, &appointment_filter, auth_token)
            .await?;
        let appointments = rows
            .into_iter()
            .map(serde_json::from_value::<Appointment>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DoctorProfile::new(doctor, appointments))
    }

    pub async fn set_approval_status(
        &self,
        doctor_id: &str,
        status: ApprovalStatus,
        auth_token: Option<&str>,
    ) -> Result<Doctor, DoctorError> {
        debug!("Setting approval of doctor {} to {}", doctor_id, status.as_str());
        let filter = id_filter(doctor_id)?;

        let result = self.supabase
            .update_returning(DOCTORS_TABLE, &filter, json!({ "isApproved": status }), auth_token)
            .await?;

        first_doctor(result)
    }
}

fn id_filter(id: &str) -> Result<String, DoctorError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(DoctorError::Validation("Doctor id is required".to_string()));
    }
    Ok(format!("id=eq.{}", urlencoding::encode(id)))
}

// PostgREST reserves these inside `or=(...)`.
fn sanitize_term(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"' | '\\'))
        .collect()
}

fn parse_doctors(rows: Vec<Value>) -> Result<Vec<Doctor>, DoctorError> {
    rows.into_iter()
        .map(|row| serde_json::from_value::<Doctor>(row).map_err(DoctorError::from))
        .collect()
}

fn first_doctor(rows: Vec<Value>) -> Result<Doctor, DoctorError> {
    parse_doctors(rows)?
        .into_iter()
        .next()
        .ok_or(DoctorError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_a_validation_fault() {
        assert!(matches!(id_filter("  "), Err(DoctorError::Validation(_))));
        assert_eq!(id_filter("d1").unwrap(), "id=eq.d1");
    }

    #[test]
    fn search_term_drops_reserved_characters() {
        assert_eq!(sanitize_term("car(dio),*"), "cardio");
    }
}
