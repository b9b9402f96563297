use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::UserService;
use crate::models::{ApiResponse, users::requests::UserListParams};
use crate::services::{SharedState, internal_error};

pub async fn list_users(
    service: &UserService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_users_with_pagination(query.into()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Account list retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to retrieve account list: {}", e);
            Ok(internal_error("Failed to retrieve account list"))
        }
    }
}
