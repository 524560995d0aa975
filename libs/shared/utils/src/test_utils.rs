use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthContext, Role};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_store(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            server_port: 3000,
            cloudinary_base_url: "http://localhost:9999".to_string(),
            cloudinary_cloud_name: "test-cloud".to_string(),
            cloudinary_upload_preset: "test-preset".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_context(&self) -> AuthContext {
        AuthContext {
            caller_id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Role::parse(&self.role).unwrap_or(Role::Patient),
            issued_at: Some(Utc::now()),
            token: "test-token".to_string(),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Store rows as the persistence layer returns them, password included.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_record(id: &str, name: &str, specialization: &str, approval: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": format!("{}@clinic.test", id),
            "password": "$2a$10$hashedpasswordvalue",
            "phone": "0123456789",
            "photo": null,
            "ticketPrice": 100,
            "role": "doctor",
            "specialization": specialization,
            "qualifications": [{
                "startingDate": "2010-09-01",
                "endingDate": "2016-06-30",
                "degree": "MBBS",
                "university": "City Medical College"
            }],
            "experiences": [],
            "bio": "Experienced physician",
            "about": "",
            "gender": "female",
            "timeSlots": [{
                "day": "monday",
                "startingTime": "09:00",
                "endingTime": "12:00"
            }],
            "averageRating": 4.5,
            "totalRating": 2,
            "isApproved": approval
        })
    }

    pub fn user_record(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": format!("{}@mail.test", id),
            "password": "$2a$10$hashedpasswordvalue",
            "phone": "0987654321",
            "photo": "https://img.test/avatar.png",
            "role": "patient",
            "gender": "male",
            "bloodType": "O+"
        })
    }

    pub fn appointment_record(id: &str, user_id: &str, doctor_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor": doctor_id,
            "user": user_id,
            "ticketPrice": "100",
            "appointmentDate": "2024-12-25T10:00:00Z",
            "status": "pending",
            "isPaid": true
        })
    }

    pub fn review_record(id: &str, doctor_id: &str, user_id: &str, rating: u8) -> serde_json::Value {
        json!({
            "id": id,
            "doctor": doctor_id,
            "user": user_id,
            "reviewText": "Very attentive",
            "rating": rating,
            "createdAt": "2024-01-01T00:00:00Z"
        })
    }
}
