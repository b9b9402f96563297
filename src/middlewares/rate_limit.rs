/*!
 * 登录限流
 *
 * 按客户端 IP 的固定窗口计数：窗口内第 `max_requests + 1` 次起返回 429，
 * `Retry-After` 为窗口剩余秒数。计数在 moka 的 `and_compute_with` 中原子更新，
 * 同一 IP 的并发请求不会漏计。
 *
 * ```rust,ignore
 * web::resource("/api/v1/auth/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 *
 * 客户端 IP 取自 `ConnectionInfo::realip_remote_addr`，部署在反向代理后时由代理负责
 * 改写 `Forwarded` / `X-Forwarded-For`。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::RETRY_AFTER,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::{
    Entry, Expiry,
    future::Cache,
    ops::compute::{CompResult, Op},
};
use once_cell::sync::Lazy;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::ErrorCode;

use super::error_response;

/// 一个限流窗口
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    opened_at: Instant,
    length: Duration,
}

impl Window {
    fn open(length: Duration) -> Self {
        Self {
            count: 1,
            opened_at: Instant::now(),
            length,
        }
    }

    /// 距窗口关闭的秒数，向上取整且至少为 1
    fn retry_after(&self) -> u64 {
        let left = self.length.saturating_sub(self.opened_at.elapsed());
        (left.as_secs() + u64::from(left.subsec_nanos() > 0)).max(1)
    }
}

/// 窗口自打开起计时，计数增加不延长窗口
struct WindowExpiry;

impl Expiry<String, Window> for WindowExpiry {
    fn expire_after_create(&self, _key: &String, value: &Window, _created_at: Instant) -> Option<Duration> {
        Some(value.length)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        _value: &Window,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        duration_until_expiry
    }
}

// 键: 前缀:客户端 IP
static WINDOWS: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .expire_after(WindowExpiry)
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    scope: &'static str,
}

impl RateLimit {
    pub fn new(scope: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs.max(1)),
            scope,
        }
    }

    /// 登录端点，次数与窗口来自配置
    pub fn login() -> Self {
        let config = &AppConfig::get().rate_limit;
        Self::new("login", config.login_max_requests, config.login_window_secs)
    }
}

/// 客户端 IP，去掉端口；无法解析时所有此类请求共用一个计数
fn client_ip(req: &ServiceRequest) -> String {
    let info = req.connection_info();
    let Some(addr) = info.realip_remote_addr() else {
        return "unknown".to_string();
    };
    addr.parse::<SocketAddr>()
        .map(|socket| socket.ip())
        .or_else(|_| addr.parse::<IpAddr>())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// 计一次请求；超出上限时返回需要等待的秒数
async fn hit(key: String, max_requests: u32, length: Duration) -> Option<u64> {
    let result = WINDOWS
        .entry(key)
        .and_compute_with(|current| {
            let op = match current.map(Entry::into_value) {
                Some(window) if window.count >= max_requests => Op::Nop,
                Some(window) => Op::Put(Window {
                    count: window.count + 1,
                    ..window
                }),
                None => Op::Put(Window::open(length)),
            };
            ready(op)
        })
        .await;

    match result {
        CompResult::Unchanged(entry) => Some(entry.value().retry_after()),
        _ => None,
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = format!("{}:{}", limit.scope, client_ip(&req));

            if let Some(retry_after) = hit(key.clone(), limit.max_requests, limit.window).await {
                warn!("Rate limit exceeded for {} ({} per {:?})", key, limit.max_requests, limit.window);
                let mut resp = error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    ErrorCode::RateLimitExceeded,
                    "Too many requests, please try again later.",
                );
                resp.headers_mut().insert(RETRY_AFTER, retry_after.into());
                return Ok(req.into_response(resp.map_into_right_body()));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test, web};

    #[test]
    fn test_login_preset_uses_config() {
        let login = RateLimit::login();
        let config = &AppConfig::get().rate_limit;
        assert_eq!(login.max_requests, config.login_max_requests);
        assert_eq!(login.window, Duration::from_secs(config.login_window_secs));
        assert_eq!(login.scope, "login");
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let window = Window {
            count: 3,
            opened_at: Instant::now(),
            length: Duration::from_secs(60),
        };
        assert_eq!(window.retry_after(), 60);

        let closed = Window {
            length: Duration::ZERO,
            ..window
        };
        assert_eq!(closed.retry_after(), 1);
    }

    #[actix_web::test]
    async fn test_requests_over_limit_get_429_per_ip() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RateLimit::new("test_over_limit", 2, 60))
                .route("/", web::post().to(HttpResponse::Ok)),
        )
        .await;

        let from = |addr: &str| {
            actix_test::TestRequest::post()
                .uri("/")
                .peer_addr(addr.parse().unwrap())
                .to_request()
        };

        // 同一 IP 不同端口共用计数
        for port in [4000, 4001] {
            let resp = actix_test::call_service(&app, from(&format!("10.0.0.1:{port}"))).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = actix_test::call_service(&app, from("10.0.0.1:4002")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            resp.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("60")
        );

        let resp = actix_test::call_service(&app, from("10.0.0.2:4000")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_hits_are_all_counted() {
        let handles: Vec<_> = (0..20)
            .map(|_| tokio::spawn(hit("test_concurrent:10.0.0.9".to_string(), 5, Duration::from_secs(60))))
            .collect();

        let mut rejected = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                rejected += 1;
            }
        }
        assert_eq!(rejected, 15);
    }
}
