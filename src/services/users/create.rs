use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::UserService;
use crate::errors::PortalError;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::utils::password::hash_password;
use crate::utils::validate::account_errors;
use crate::services::{SharedState, internal_error};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_lowercase();
    user_data.display_name = user_data
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let errors = account_errors(&user_data.username, &user_data.email, &user_data.password);
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ValidationFailed,
            errors,
            "Account validation failed",
        )));
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Password hashing failed: {}", e);
            return Ok(internal_error("Account creation failed"));
        }
    };

    let storage = service.get_storage(request)?;

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("Account {} created with role {}", user.username, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse { user },
                "Account created successfully",
            )))
        }
        Err(PortalError::IntegrityConflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "Username or email already exists",
            ),
        )),
        Err(e) => {
            error!("Account creation failed: {}", e);
            Ok(internal_error("Account creation failed"))
        }
    }
}
