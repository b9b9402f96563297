use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StudentRecordService, current_teacher, form_error_response};
use crate::models::FormResponse;
use crate::services::SharedState;

const DELETE_FAILED: &str = "Failed to delete student.";

pub async fn delete_record(
    service: &StudentRecordService,
    request: &HttpRequest,
    record_id: i64,
) -> ActixResult<HttpResponse> {
    let teacher_id = match current_teacher(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request)?;
    match storage.delete_student_record(teacher_id, record_id).await {
        Ok(deleted) => {
            let message = format!("Deleted {} ({}).", deleted.name, deleted.subject);
            info!("Teacher {}: {}", teacher_id, message);
            Ok(HttpResponse::Ok().json(FormResponse::ok(deleted, message)))
        }
        Err(e) => Ok(form_error_response(e, DELETE_FAILED)),
    }
}
