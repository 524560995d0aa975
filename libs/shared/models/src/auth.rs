use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub caller_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub issued_at: Option<DateTime<Utc>>,
    /// Raw bearer token, forwarded to the store for row-level policies.
    #[serde(skip)]
    pub token: String,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The caller is the owner of `resource_id`, or an admin.
    pub fn owns_or_admin(&self, resource_id: &str) -> bool {
        self.is_admin() || self.caller_id == resource_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(id: &str, role: Role) -> AuthContext {
        AuthContext {
            caller_id: id.to_string(),
            email: None,
            role,
            issued_at: None,
            token: String::new(),
        }
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(Role::parse("Doctor"), Some(Role::Doctor));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("nurse"), None);
    }

    #[test]
    fn ownership_check() {
        assert!(context("u1", Role::Patient).owns_or_admin("u1"));
        assert!(!context("u1", Role::Patient).owns_or_admin("u2"));
        assert!(context("a1", Role::Admin).owns_or_admin("u2"));
    }
}
