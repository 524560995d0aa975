use std::sync::Arc;
use axum::{
    extract::{Path, State, Extension},
    Json,
};

use doctor_cell::models::Doctor;
use shared_config::AppConfig;
use shared_models::auth::{AuthContext, Role};
use shared_models::error::AppError;
use shared_models::response::ApiResponse;
use shared_utils::extractor::{require_owner_or_admin, require_role};

use crate::models::{UpdateUserRequest, User};
use crate::services::UserService;

#[axum::debug_handler]
pub async fn update_user(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_owner_or_admin(&context, &user_id)?;

    let service = UserService::new(&config);
    let user = service.update_user(&user_id, request, Some(&context.token)).await?;

    Ok(ApiResponse::ok("User updated successfully", user))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_owner_or_admin(&context, &user_id)?;

    let service = UserService::new(&config);
    let user = service.delete_user(&user_id, Some(&context.token)).await?;

    Ok(ApiResponse::ok("User deleted successfully", user))
}

#[axum::debug_handler]
pub async fn get_single_user(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_owner_or_admin(&context, &user_id)?;

    let service = UserService::new(&config);
    let user = service.get_single_user(&user_id, Some(&context.token)).await?;

    Ok(ApiResponse::ok("User found", user))
}

#[axum::debug_handler]
pub async fn get_all_users(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    require_role(&context, &[Role::Admin])?;

    let service = UserService::new(&config);
    let users = service.get_all_users(Some(&context.token)).await?;

    Ok(ApiResponse::ok("Users found", users))
}

#[axum::debug_handler]
pub async fn get_user_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_role(&context, &[Role::Patient])?;

    let service = UserService::new(&config);
    let user = service.get_user_profile(&context.caller_id, Some(&context.token)).await?;

    Ok(ApiResponse::ok("Profile info found", user))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<Doctor>>>, AppError> {
    require_role(&context, &[Role::Patient])?;

    let service = UserService::new(&config);
    let doctors = service.get_my_appointments(&context.caller_id, Some(&context.token)).await?;

    Ok(ApiResponse::ok("Appointments found", doctors))
}
