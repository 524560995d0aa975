use serde_json::Value;
use tracing::debug;

use doctor_cell::models::Doctor;
use doctor_cell::services::doctor::{APPOINTMENTS_TABLE, DOCTORS_TABLE};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::records::Appointment;

use crate::models::{UpdateUserRequest, User, UserError};

pub const USERS_TABLE: &str = "users";

pub struct UserService {
    supabase: SupabaseClient,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        request: UpdateUserRequest,
        auth_token: Option<&str>,
    ) -> Result<User, UserError> {
        debug!("Updating user: {}", user_id);
        let filter = id_filter(user_id)?;
        request.validate()?;

        if request.is_empty() {
            return self.get_single_user(user_id, auth_token).await;
        }

        let patch = serde_json::to_value(&request)?;
        let result = self.supabase
            .update_returning(USERS_TABLE, &filter, patch, auth_token)
            .await?;

        first_user(result)
    }

    pub async fn delete_user(&self, user_id: &str, auth_token: Option<&str>) -> Result<User, UserError> {
        debug!("Deleting user: {}", user_id);
        let filter = id_filter(user_id)?;

        let result = self.supabase
            .delete_returning(USERS_TABLE, &filter, auth_token)
            .await?;

        first_user(result)
    }

    pub async fn get_single_user(&self, user_id: &str, auth_token: Option<&str>) -> Result<User, UserError> {
        debug!("Fetching user: {}", user_id);
        let filter = id_filter(user_id)?;

        let result = self.supabase
            .select(USERS_TABLE, &filter, auth_token)
            .await?;

        first_user(result)
    }

    pub async fn get_all_users(&self, auth_token: Option<&str>) -> Result<Vec<User>, UserError> {
        debug!("Listing all users");

        let result = self.supabase
            .select(USERS_TABLE, "", auth_token)
            .await?;

        parse_rows(result)
    }

    pub async fn get_user_profile(&self, caller_id: &str, auth_token: Option<&str>) -> Result<User, UserError> {
        self.get_single_user(caller_id, auth_token).await
    }

    /// Doctors the caller has appointments with, labelled "appointments"
    /// by the HTTP layer.
    pub async fn get_my_appointments(
        &self,
        caller_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Doctor>, UserError> {
        debug!("Fetching appointments for user: {}", caller_id);
        let appointment_filter = format!("user=eq.{}", urlencoding::encode(caller_id));

        let rows = self.supabase
            .select(APPOINTMENTS_TABLE, &appointment_filter, auth_token)
            .await?;
        let appointments: Vec<Appointment> = parse_rows(rows)?;

        let doctor_ids = distinct_doctor_ids(&appointments);
        if doctor_ids.is_empty() {
            return Ok(Vec::new());
        }

        let encoded: Vec<String> = doctor_ids
            .iter()
            .map(|id| urlencoding::encode(id).into_owned())
            .collect();
        let doctor_filter = format!("id=in.({})", encoded.join(","));

        let rows = self.supabase
            .select(DOCTORS_TABLE, &doctor_filter, auth_token)
            .await?;

        parse_rows(rows)
    }
}

fn distinct_doctor_ids(appointments: &[Appointment]) -> Vec<&str> {
    let mut ids: Vec<&str> = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        if !ids.contains(&appointment.doctor.as_str()) {
            ids.push(&appointment.doctor);
        }
    }
    ids
}

fn id_filter(id: &str) -> Result<String, UserError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(UserError::Validation("User id is required".to_string()));
    }
    Ok(format!("id=eq.{}", urlencoding::encode(id)))
}

fn parse_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, UserError> {
    rows.into_iter()
        .map(|row| serde_json::from_value::<T>(row).map_err(UserError::from))
        .collect()
}

fn first_user(rows: Vec<Value>) -> Result<User, UserError> {
    parse_rows::<User>(rows)?
        .into_iter()
        .next()
        .ok_or(UserError::NotFound)
}
