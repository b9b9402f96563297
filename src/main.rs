use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;

use student_marks_portal::config::AppConfig;
use student_marks_portal::routes;
use student_marks_portal::runtime::lifetime;
use student_marks_portal::utils::{form_error_handler, json_error_handler, query_error_handler};

/// 开发环境输出带源码位置的文本日志，其余环境输出 JSON；返回的 guard 需存活到进程结束
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(writer)
        .with_ansi(config.is_development());

    if config.is_development() {
        builder.with_file(true).with_line_number(true).init();
    } else {
        builder.json().init();
    }
    guard
}

/// 未配置来源时允许任意来源
fn build_cors(config: &AppConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(config.cors.allowed_methods.iter().map(String::as_str))
        .allowed_headers(config.cors.allowed_headers.iter().map(String::as_str))
        .supports_credentials()
        .max_age(config.cors.max_age);

    if config.cors.allowed_origins.is_empty() {
        cors.allow_any_origin()
    } else {
        config
            .cors
            .allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();
    let started = Instant::now();

    AppConfig::init().map_err(|e| std::io::Error::other(format!("Failed to load configuration: {e}")))?;
    let config = AppConfig::get();
    let _log_guard = init_tracing(config);

    warn!(
        "{} {} v{} starting ({} environment, {} workers)",
        config.app.system_name,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.environment,
        config.server.workers
    );

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| std::io::Error::other(format!("Startup failed: {e}")))?;
    let storage = startup.storage;
    let cache = startup.cache;
    debug!("Startup completed in {} ms", started.elapsed().as_millis());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(config))
            .wrap(Compress::default())
            // 成绩数据不允许被中间代理或浏览器缓存
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::FormConfig::default().error_handler(form_error_handler))
            .app_data(web::PayloadConfig::new(config.server.max_payload_size))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(cache.clone()))
            .configure(routes::configure_auth_routes)
            .configure(routes::configure_user_routes)
            .configure(routes::configure_student_record_routes)
    })
    .keep_alive(Duration::from_secs(config.server.keep_alive_secs))
    .client_request_timeout(Duration::from_millis(config.server.client_request_timeout_ms))
    .client_disconnect_timeout(Duration::from_millis(config.server.client_disconnect_timeout_ms))
    .workers(config.server.workers);

    // 配置了 Unix 套接字时优先监听套接字
    #[cfg(unix)]
    let server = match config.unix_socket_path() {
        Some(socket_path) => {
            warn!("Listening on Unix socket {}", socket_path);
            if std::path::Path::new(socket_path).exists() {
                std::fs::remove_file(socket_path)?;
            }
            server.bind_uds(socket_path)?
        }
        None => {
            warn!("Listening on http://{}", config.server_bind_address());
            server.bind(config.server_bind_address())?
        }
    };
    #[cfg(not(unix))]
    let server = {
        warn!("Listening on http://{}", config.server_bind_address());
        server.bind(config.server_bind_address())?
    };

    tokio::select! {
        res = server.run() => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => warn!("Shutting down"),
    }

    Ok(())
}
