pub mod rate_limit;
pub mod require_jwt;

pub use rate_limit::RateLimit;
pub use require_jwt::RequireJWT;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

use crate::models::{ApiResponse, ErrorCode};

// 中间件拒绝请求时的统一响应体
pub(crate) fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()>::error_empty(code, message))
}
