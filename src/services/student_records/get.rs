use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{RECORD_NOT_FOUND, StudentRecordService, current_teacher};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{SharedState, internal_error};

pub async fn get_record(
    service: &StudentRecordService,
    request: &HttpRequest,
    record_id: i64,
) -> ActixResult<HttpResponse> {
    let teacher_id = match current_teacher(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request)?;
    match storage.get_student_record(teacher_id, record_id).await {
        Ok(Some(record)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            record,
            "Student record retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, RECORD_NOT_FOUND))),
        Err(e) => {
            error!("Failed to load record {} for teacher {}: {}", record_id, teacher_id, e);
            Ok(internal_error("Failed to retrieve student record"))
        }
    }
}
