pub mod auth;
pub mod common;
pub mod student_records;
pub mod users;

pub use common::{ApiResponse, FormResponse, PaginationInfo};

use serde::Serialize;

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    Success = 0,

    // 请求错误
    BadRequest = 1000,
    ValidationFailed = 1001,

    // 认证与授权
    Unauthorized = 2000,
    AuthFailed = 2001,
    Forbidden = 2003,

    // 资源不存在
    NotFound = 3000,
    UserNotFound = 3002,

    // 冲突
    UserAlreadyExists = 4001,
    CanNotDeleteCurrentUser = 4002,
    RateLimitExceeded = 4029,

    // 服务器错误
    InternalServerError = 5000,
}
