pub mod auth;
pub mod student_records;
pub mod users;

pub use auth::AuthService;
pub use student_records::StudentRecordService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::ErrorInternalServerError, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

fn app_data<T: ?Sized + 'static>(request: &HttpRequest) -> Option<Arc<T>> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
}

/// 处理程序经由服务对象取得 `App::app_data` 中注册的共享组件
pub(crate) trait SharedState {
    /// 未注册存储属于部署错误，返回 500
    fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        app_data::<dyn Storage>(request).ok_or_else(|| ErrorInternalServerError("Storage is not configured"))
    }

    /// 缓存缺失时调用方降级处理
    fn get_cache(&self, request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
        app_data::<dyn ObjectCache>(request)
    }
}

/// 500 响应只带概要信息，具体原因由调用方写入日志
pub(crate) fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(ErrorCode::InternalServerError, message))
}

pub(crate) fn login_required() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized access, please login",
    ))
}

impl SharedState for AuthService {}
impl SharedState for UserService {}
impl SharedState for StudentRecordService {}
