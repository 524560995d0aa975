use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Patient account as exposed to clients; the stored password has no field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "bloodtype")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "bloodtype")]
    pub blood_type: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), UserError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(UserError::Validation("Name cannot be empty".to_string()));
            }
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(UserError::Validation(format!("Invalid email '{}'", email)));
            }
        }
        if let Some(blood_type) = &self.blood_type {
            if !BLOOD_TYPES.contains(&blood_type.as_str()) {
                return Err(UserError::Validation(format!("Unknown blood type '{}'", blood_type)));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        matches!(serde_json::to_value(self), Ok(serde_json::Value::Object(map)) if map.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Store failure: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        UserError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for UserError {
    fn from(err: serde_json::Error) -> Self {
        UserError::Internal(format!("Malformed record: {}", err))
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::Validation(msg) => AppError::Validation(msg),
            UserError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
