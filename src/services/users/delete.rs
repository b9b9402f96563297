use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::UserService;
use crate::{
    middlewares::{RequireJWT, require_jwt::cached_user_key},
    models::{ApiResponse, ErrorCode},
};
use crate::services::{SharedState, internal_error};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 禁止删除当前登录的账号
    if RequireJWT::current_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "You cannot delete your own account",
        )));
    }

    match storage.delete_user(user_id).await {
        Ok(true) => {
            // 已签发的令牌不再命中缓存，下次请求会因用户不存在而被拒绝
            if let Some(cache) = service.get_cache(request) {
                cache.remove(&cached_user_key(user_id)).await;
            }
            info!("Account {} deleted", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Account deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => {
            error!("Account deletion failed for {}: {}", user_id, e);
            Ok(internal_error("Account deletion failed"))
        }
    }
}
