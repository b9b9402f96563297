use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StudentRecordService, current_teacher, form_error_response};
use crate::models::{FormResponse, student_records::requests::StudentRecordForm};
use crate::services::SharedState;

const SUBMIT_FAILED: &str = "An unexpected error occurred.";

pub async fn submit_record(
    service: &StudentRecordService,
    request: &HttpRequest,
    form: StudentRecordForm,
) -> ActixResult<HttpResponse> {
    let teacher_id = match current_teacher(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let record = match form.clean() {
        Ok(record) => record,
        Err(errors) => return Ok(HttpResponse::BadRequest().json(FormResponse::failed(errors))),
    };

    let storage = service.get_storage(request)?;
    match storage.submit_student_record(teacher_id, record).await {
        Ok(outcome) => {
            let message = outcome.summary();
            info!("Teacher {}: {}", teacher_id, message);
            Ok(HttpResponse::Ok().json(FormResponse::ok(outcome, message)))
        }
        Err(e) => Ok(form_error_response(e, SUBMIT_FAILED)),
    }
}
