use actix_web::{Either, HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares;
use crate::models::student_records::requests::{
    AdminRecordParams, DashboardParams, MarksUpdateForm, StudentRecordForm,
};
use crate::services::StudentRecordService;
use crate::utils::SafeIDI64;

static RECORD_SERVICE: StudentRecordService = StudentRecordService;

/// 表单接口同时接受 JSON 与 urlencoded
type FormBody<T> = Either<web::Json<T>, web::Form<T>>;

fn form_body<T>(body: FormBody<T>) -> T {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

pub async fn dashboard(
    req: HttpRequest,
    query: web::Query<DashboardParams>,
) -> ActixResult<HttpResponse> {
    RECORD_SERVICE.dashboard(&req, query.into_inner()).await
}

pub async fn add_student(
    req: HttpRequest,
    body: FormBody<StudentRecordForm>,
) -> ActixResult<HttpResponse> {
    RECORD_SERVICE.submit(&req, form_body(body)).await
}

pub async fn get_student(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    RECORD_SERVICE.get(&req, path.0).await
}

pub async fn update_student(
    req: HttpRequest,
    path: SafeIDI64,
    body: FormBody<MarksUpdateForm>,
) -> ActixResult<HttpResponse> {
    RECORD_SERVICE
        .update_marks(&req, path.0, form_body(body))
        .await
}

pub async fn delete_student(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    RECORD_SERVICE.delete(&req, path.0).await
}

pub async fn list_all_records(
    req: HttpRequest,
    query: web::Query<AdminRecordParams>,
) -> ActixResult<HttpResponse> {
    RECORD_SERVICE.list_all(&req, query.into_inner()).await
}

// 配置路由：成绩接口限教师（含管理员），全量视图限管理员
pub fn configure_student_record_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/dashboard")
            .wrap(middlewares::RequireJWT::teacher())
            .route(web::get().to(dashboard)),
    )
    .service(
        web::scope("/api/v1/student")
            .wrap(middlewares::RequireJWT::teacher())
            .route("/add", web::post().to(add_student))
            .route("/{id}", web::get().to(get_student))
            .route("/{id}/update", web::post().to(update_student))
            .route("/{id}/delete", web::post().to(delete_student)),
    )
    .service(
        web::scope("/api/v1/admin/records")
            .wrap(middlewares::RequireJWT::admin())
            .route("", web::get().to(list_all_records)),
    );
}
