use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthContext, Role};
use shared_models::error::AppError;
use shared_models::response::ApiResponse;
use shared_utils::extractor::{require_owner_or_admin, require_role};

use crate::models::{
    ApprovalRequest, Doctor, DoctorProfile, DoctorSearchQuery, UpdateDoctorRequest,
};
use crate::services::DoctorService;

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_all_doctors(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Doctor>>>, AppError> {
    let service = DoctorService::new(&config);

    let doctors = service.get_all_doctors(query.query.as_deref(), None).await?;

    Ok(ApiResponse::ok("Doctors found", doctors))
}

#[axum::debug_handler]
pub async fn get_single_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service.get_single_doctor(&doctor_id, None).await?;

    Ok(ApiResponse::ok("Doctor found", doctor))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    require_role(&context, &[Role::Doctor, Role::Admin])?;
    require_owner_or_admin(&context, &doctor_id)?;
    if request.is_approved.is_some() && !context.is_admin() {
        return Err(AppError::Forbidden("Only administrators can change approval status".to_string()));
    }

    let service = DoctorService::new(&config);
    let doctor = service.update_doctor(&doctor_id, request, Some(&context.token)).await?;

    Ok(ApiResponse::ok("Doctor updated successfully", doctor))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
    Path(doctor_id): Path<String>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    require_role(&context, &[Role::Doctor, Role::Admin])?;
    require_owner_or_admin(&context, &doctor_id)?;

    let service = DoctorService::new(&config);
    let doctor = service.delete_doctor(&doctor_id, Some(&context.token)).await?;

    Ok(ApiResponse::ok("Doctor deleted successfully", doctor))
}

#[axum::debug_handler]
pub async fn get_doctor_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<ApiResponse<DoctorProfile>>, AppError> {
    require_role(&context, &[Role::Doctor])?;

    let service = DoctorService::new(&config);
    let profile = service.get_doctor_profile(&context.caller_id, Some(&context.token)).await?;

    Ok(ApiResponse::ok("Doctor profile info found", profile))
}

#[axum::debug_handler]
pub async fn set_approval_status(
    State(config): State<Arc<AppConfig>>,
    Extension(context): Extension<AuthContext>,
    Path(doctor_id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    require_role(&context, &[Role::Admin])?;

    let service = DoctorService::new(&config);
    let doctor = service
        .set_approval_status(&doctor_id, request.is_approved, Some(&context.token))
        .await?;

    Ok(ApiResponse::ok("Doctor approval updated", doctor))
}
