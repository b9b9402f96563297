/*!
 * 登录与角色校验中间件
 *
 * 校验 `Authorization: Bearer <token>` 中的 access token，确认账号仍然存在且处于
 * 活跃状态，再按路由要求检查角色。通过后把 `User` 放入请求扩展，
 * 处理程序用 [`RequireJWT::current_user_id`] 取得教师 ID 作为数据作用域。
 *
 * ```rust,ignore
 * web::scope("/api/v1/student")
 *     .wrap(RequireJWT::teacher())
 *     .route("/add", web::post().to(add_student));
 *
 * web::scope("/api/v1/admin/teachers")
 *     .wrap(RequireJWT::admin())
 *     .route("", web::get().to(list_teachers));
 * ```
 *
 * 校验顺序：签名与令牌类型 → 注销标记 `revoked:<token>` → 用户缓存 `user:<id>`
 * （未命中则查库并回填）→ 账号状态 → 角色。前四步失败返回 401，角色不符返回 403。
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserRole, UserStatus};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header::AUTHORIZATION},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::error_response;

const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this resource.";

/// 路由的访问门槛：登录即可，或限定角色
#[derive(Clone, Copy)]
pub struct RequireJWT {
    roles: Option<&'static [&'static UserRole]>,
}

impl RequireJWT {
    /// 任意活跃账号
    pub fn authenticated() -> Self {
        Self { roles: None }
    }

    /// 成绩录入与教师面板；管理员同样可用
    pub fn teacher() -> Self {
        Self {
            roles: Some(UserRole::teacher_roles()),
        }
    }

    /// 教师账号管理与全量成绩视图
    pub fn admin() -> Self {
        Self {
            roles: Some(UserRole::admin_roles()),
        }
    }

    /// 当前登录用户
    pub fn current_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 当前登录用户 ID，即教师数据的作用域
    pub fn current_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    /// 原始 Bearer token，注销时写入注销列表
    pub fn bearer_token(req: &HttpRequest) -> Option<String> {
        bearer_token(req.headers()).map(str::to_string)
    }
}

/// 已注销令牌的缓存键
pub fn revoked_token_key(token: &str) -> String {
    format!("revoked:{token}")
}

/// 用户信息的缓存键；删除账号时需一并移除
pub fn cached_user_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

fn bearer_token(headers: &actix_web::http::header::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn shared<T: ?Sized + 'static>(req: &ServiceRequest) -> Option<Arc<T>> {
    req.app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
}

/// 解析令牌并加载活跃用户；错误信息只写日志，不返回给客户端
async fn authenticate(req: &ServiceRequest) -> Result<User, String> {
    let token = bearer_token(req.headers()).ok_or("missing bearer token")?;
    let claims =
        JwtUtils::verify_access_token(token).map_err(|e| format!("invalid access token: {e}"))?;
    let user_id = claims.user_id().ok_or("malformed subject claim")?;

    let cache = shared::<dyn ObjectCache>(req).ok_or("object cache not configured")?;
    if let CacheResult::Found(true) = cache.get::<bool>(&revoked_token_key(token)).await {
        return Err(format!("token of user {user_id} has been revoked"));
    }
    if let CacheResult::Found(user) = cache.get::<User>(&cached_user_key(user_id)).await {
        return Ok(user);
    }

    debug!("User {} not cached, loading from storage", user_id);
    let storage = shared::<dyn Storage>(req).ok_or("storage not configured")?;
    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| format!("failed to load user {user_id}: {e}"))?
        .ok_or_else(|| format!("user {user_id} no longer exists"))?;

    if user.status != UserStatus::Active {
        return Err(format!("user {user_id} is {}", user.status));
    }

    // ttl 为 0 时使用缓存默认过期时间
    cache.insert(cached_user_key(user_id), &user, 0).await;
    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
            roles: self.roles,
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
    roles: Option<&'static [&'static UserRole]>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let roles = self.roles;

        Box::pin(async move {
            // CORS 预检不带令牌
            if req.method() == Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            let user = match authenticate(&req).await {
                Ok(user) => user,
                Err(reason) => {
                    info!("Rejected {} {}: {}", req.method(), req.path(), reason);
                    let resp = error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Unauthorized access, please login",
                    );
                    return Ok(req.into_response(resp.map_into_right_body()));
                }
            };

            if let Some(roles) = roles
                && !roles.contains(&&user.role)
            {
                info!("User {} ({}) denied access to {}", user.id, user.role, req.path());
                let resp = error_response(StatusCode::FORBIDDEN, ErrorCode::Forbidden, FORBIDDEN_MESSAGE);
                return Ok(req.into_response(resp.map_into_right_body()));
            }

            req.extensions_mut().insert(user);
            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MokaObjectCache;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::in_memory_storage;
    use actix_web::{App, test as actix_test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireJWT::current_user(&req) {
            Some(user) => HttpResponse::Ok().body(user.username),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_role_gate_and_revocation() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaObjectCache::new(100, 60));

        let mut tokens = Vec::new();
        for (username, role) in [("teacher_a", UserRole::Teacher), ("admin_a", UserRole::Admin)] {
            let user = storage
                .create_user(CreateUserRequest {
                    username: username.to_string(),
                    email: format!("{username}@school.test"),
                    password: "-".to_string(),
                    role,
                    display_name: None,
                })
                .await
                .unwrap();
            tokens.push(JwtUtils::generate_access_token(user.id, &role.to_string()).unwrap());
        }

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache.clone()))
                .service(
                    web::resource("/teacher")
                        .wrap(RequireJWT::teacher())
                        .to(whoami),
                )
                .service(web::resource("/admin").wrap(RequireJWT::admin()).to(whoami)),
        )
        .await;

        let call = |path: &str, token: Option<&str>| {
            let mut req = actix_test::TestRequest::get().uri(path);
            if let Some(token) = token {
                req = req.insert_header((AUTHORIZATION, format!("Bearer {token}")));
            }
            req.to_request()
        };

        let resp = actix_test::call_service(&app, call("/teacher", None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = actix_test::call_service(&app, call("/teacher", Some(&tokens[0]))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(resp).await, "teacher_a");

        let resp = actix_test::call_service(&app, call("/admin", Some(&tokens[0]))).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = actix_test::call_service(&app, call("/teacher", Some(&tokens[1]))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        cache
            .insert(revoked_token_key(&tokens[1]), &true, 60)
            .await;
        let resp = actix_test::call_service(&app, call("/admin", Some(&tokens[1]))).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
