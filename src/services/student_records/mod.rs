pub mod delete;
pub mod get;
pub mod list;
pub mod submit;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::error;

use crate::errors::PortalError;
use crate::middlewares::RequireJWT;
use crate::models::{
    FormResponse,
    student_records::requests::{
        AdminRecordParams, DashboardParams, MarksUpdateForm, StudentRecordForm,
    },
};
use crate::services::login_required;

pub const RECORD_NOT_FOUND: &str = "Student record not found.";

/// 成绩记录服务；所有教师操作都以当前登录用户的 ID 作为作用域
pub struct StudentRecordService;

impl StudentRecordService {
    // 教师面板
    pub async fn dashboard(
        &self,
        request: &HttpRequest,
        params: DashboardParams,
    ) -> ActixResult<HttpResponse> {
        list::dashboard(self, request, params).await
    }

    // 新增或累加成绩
    pub async fn submit(
        &self,
        request: &HttpRequest,
        form: StudentRecordForm,
    ) -> ActixResult<HttpResponse> {
        submit::submit_record(self, request, form).await
    }

    // 单条记录（编辑前加载）
    pub async fn get(&self, request: &HttpRequest, record_id: i64) -> ActixResult<HttpResponse> {
        get::get_record(self, request, record_id).await
    }

    // 覆盖分数
    pub async fn update_marks(
        &self,
        request: &HttpRequest,
        record_id: i64,
        form: MarksUpdateForm,
    ) -> ActixResult<HttpResponse> {
        update::update_marks(self, request, record_id, form).await
    }

    // 删除记录
    pub async fn delete(&self, request: &HttpRequest, record_id: i64) -> ActixResult<HttpResponse> {
        delete::delete_record(self, request, record_id).await
    }

    // 管理员查看全部记录
    pub async fn list_all(
        &self,
        request: &HttpRequest,
        params: AdminRecordParams,
    ) -> ActixResult<HttpResponse> {
        list::list_all(self, request, params).await
    }
}

/// 当前教师 ID；RequireJWT 未生效时返回 401 响应
pub(crate) fn current_teacher(request: &HttpRequest) -> Result<i64, HttpResponse> {
    RequireJWT::current_user_id(request).ok_or_else(login_required)
}

/// 存储错误转为表单响应：不存在 404，其余 500 且不暴露内部细节
/// 字段校验在调用存储之前由 `clean()` 完成并直接返回 400
pub(crate) fn form_error_response(err: PortalError, fallback: &str) -> HttpResponse {
    match err {
        PortalError::NotFound(msg) => {
            tracing::debug!("{}", msg);
            HttpResponse::NotFound().json(FormResponse::failed_one(RECORD_NOT_FOUND))
        }
        other => {
            error!("{}: {}", fallback, other);
            HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                .json(FormResponse::failed_one(fallback))
        }
    }
}
