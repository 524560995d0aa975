use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::{AuthContext, Role};
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let context = validate_token(token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Rejects callers whose role is not in `allowed`.
pub fn require_role(context: &AuthContext, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&context.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You're not authorized".to_string()))
    }
}

/// Rejects callers acting on someone else's record unless they are an admin.
pub fn require_owner_or_admin(context: &AuthContext, resource_id: &str) -> Result<(), AppError> {
    if context.owns_or_admin(resource_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You can only act on your own account".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestUser;
    use assert_matches::assert_matches;

    #[test]
    fn role_gate() {
        let context = TestUser::patient("p@example.com").to_context();
        assert!(require_role(&context, &[Role::Patient]).is_ok());
        assert_matches!(require_role(&context, &[Role::Doctor, Role::Admin]), Err(AppError::Forbidden(_)));
    }

    #[test]
    fn owner_gate() {
        let patient = TestUser::patient("p@example.com");
        let context = patient.to_context();
        assert!(require_owner_or_admin(&context, &patient.id).is_ok());
        assert_matches!(require_owner_or_admin(&context, "someone-else"), Err(AppError::Forbidden(_)));

        let admin = TestUser::admin("a@example.com").to_context();
        assert!(require_owner_or_admin(&admin, "someone-else").is_ok());
    }
}
