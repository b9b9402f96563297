use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{StudentRecordService, current_teacher};
use crate::models::{
    ApiResponse,
    student_records::requests::{
        AdminRecordParams, AdminRecordQuery, DashboardParams, normalize_search,
    },
};
use crate::services::{SharedState, internal_error};

pub async fn dashboard(
    service: &StudentRecordService,
    request: &HttpRequest,
    params: DashboardParams,
) -> ActixResult<HttpResponse> {
    let teacher_id = match current_teacher(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request)?;
    match storage
        .list_student_records(teacher_id, normalize_search(params.search), params.page)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Student records retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list records for teacher {}: {}", teacher_id, e);
            Ok(internal_error("Failed to retrieve student records"))
        }
    }
}

pub async fn list_all(
    service: &StudentRecordService,
    request: &HttpRequest,
    params: AdminRecordParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let query = AdminRecordQuery {
        page: params.page,
        size: params.size,
        search: normalize_search(params.search),
        subject: normalize_search(params.subject),
        teacher_id: params.teacher_id,
    };

    match storage.list_all_student_records(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Student records retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list all records: {}", e);
            Ok(internal_error("Failed to retrieve student records"))
        }
    }
}
