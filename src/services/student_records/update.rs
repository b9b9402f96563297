use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StudentRecordService, current_teacher, form_error_response};
use crate::models::{FormResponse, student_records::requests::MarksUpdateForm};
use crate::services::SharedState;

const UPDATE_FAILED: &str = "Failed to update student.";

pub async fn update_marks(
    service: &StudentRecordService,
    request: &HttpRequest,
    record_id: i64,
    form: MarksUpdateForm,
) -> ActixResult<HttpResponse> {
    let teacher_id = match current_teacher(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let marks = match form.clean() {
        Ok(marks) => marks,
        Err(errors) => return Ok(HttpResponse::BadRequest().json(FormResponse::failed(errors))),
    };

    let storage = service.get_storage(request)?;
    match storage
        .update_student_marks(teacher_id, record_id, marks)
        .await
    {
        Ok(change) => {
            let message = format!(
                "Updated {} in {} from {} to {} marks.",
                change.record.name, change.record.subject, change.old_marks, change.new_marks
            );
            info!("Teacher {}: {}", teacher_id, message);
            Ok(HttpResponse::Ok().json(FormResponse::ok(change, message)))
        }
        Err(e) => Ok(form_error_response(e, UPDATE_FAILED)),
    }
}
