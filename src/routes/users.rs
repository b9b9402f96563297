use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares;
use crate::models::users::requests::{CreateUserRequest, UserListParams};
use crate::services::UserService;
use crate::utils::SafeIDI64;

static USER_SERVICE: UserService = UserService;

pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_teacher(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn delete_teacher(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(user_id.0, &req).await
}

// 配置路由：教师账号仅管理员可维护
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin/teachers")
            .wrap(middlewares::RequireJWT::admin())
            .route("", web::get().to(list_teachers))
            .route("", web::post().to(create_teacher))
            .route("/{id}", web::delete().to(delete_teacher)),
    );
}
