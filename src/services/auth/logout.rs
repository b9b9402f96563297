use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::middlewares::RequireJWT;
use crate::middlewares::require_jwt::revoked_token_key;
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

use super::AuthService;
use crate::services::SharedState;

/// 处理用户登出
/// 当前 access token 在剩余有效期内记入注销列表，同时清除 refresh cookie
pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(token) = RequireJWT::bearer_token(request)
        && let Ok(claims) = JwtUtils::verify_access_token(&token)
    {
        match service.get_cache(request) {
            Some(cache) => {
                // 至少保留 1 秒，0 会被视为默认过期时间
                let ttl = claims.remaining_secs().max(1);
                cache.insert(revoked_token_key(&token), &true, ttl).await;
                info!("User {} logged out", claims.sub);
            }
            None => warn!("Object cache unavailable, token for {} not revoked", claims.sub),
        }
    }

    // max_age=0 会让浏览器删除该 cookie
    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::success_empty("You have been logged out.")))
}
