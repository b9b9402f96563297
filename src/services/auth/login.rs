use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
    users::entities::UserStatus,
};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;
use crate::config::AppConfig;
use crate::services::{SharedState, internal_error};

const LOGIN_FAILED: &str = "Username or password is incorrect";

fn login_failed() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(ErrorCode::AuthFailed, LOGIN_FAILED))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = AppConfig::get();

    // 1. 根据用户名或邮箱获取用户
    let user = match storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(login_failed()),
        Err(e) => {
            error!("Failed to load user during login: {}", e);
            return Ok(internal_error("Login failed, please try again later"));
        }
    };

    // 2. 验证密码与状态
    if !verify_password(&login_request.password, &user.password_hash) {
        info!("Failed login attempt for {}", user.username);
        return Ok(login_failed());
    }
    if user.status != UserStatus::Active {
        info!("Login rejected for non-active user {}", user.username);
        return Ok(login_failed());
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login for {}: {}", user.username, e);
    }

    // 4. 生成令牌对
    match JwtUtils::generate_token_pair(&user, login_request.remember_me) {
        Ok(token_pair) => {
            info!("User {} logged in successfully", user.username);

            let refresh_cookie = JwtUtils::create_refresh_token_cookie(&token_pair);
            let message = format!("Welcome back, {}!", user.name_for_greeting());
            let response = LoginResponse {
                access_token: token_pair.access_token,
                expires_in: config.jwt.access_token_expiry * 60,
                user,
                created_at: chrono::Utc::now(),
            };

            Ok(HttpResponse::Ok()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, message)))
        }
        Err(e) => {
            error!("Failed to generate JWT token: {}", e);
            Ok(internal_error("Login failed, unable to generate token"))
        }
    }
}
