use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 常用环境变量到配置键的映射，优先级最高
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
];

impl AppConfig {
    /// 按 `config.toml` → `config.{APP_ENV}.toml` → `PORTAL_*` → 常用环境变量 的顺序叠加
    ///
    /// `PORTAL_` 之后用双下划线分隔层级，例如 `PORTAL_RATE_LIMIT__LOGIN_MAX_REQUESTS=10`
    pub fn load() -> Result<Self, ConfigError> {
        let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{env_name}")).required(false))
            .add_source(
                Environment::with_prefix("PORTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let builder = ENV_OVERRIDES
            .iter()
            .try_fold(builder, |builder, (var, key)| {
                builder.set_override_option(*key, std::env::var(var).ok())
            })?;

        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut config: AppConfig = builder.build()?.try_deserialize()?;

        if config.server.workers == 0 {
            config.server.workers = num_cpus::get().min(config.server.max_workers).max(1);
        }
        if config.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }

        Ok(config)
    }

    /// 全局配置；未调用 `init` 时按需加载，加载失败直接退出
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 启动时加载，错误交给调用方处理
    pub fn init() -> Result<(), ConfigError> {
        APP_CONFIG
            .set(Self::load()?)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|path| !path.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_without_any_source() {
        let config = AppConfig::build(Config::builder()).unwrap();
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
        assert_eq!(config.rate_limit.login_max_requests, 5);
        assert_eq!(config.rate_limit.login_window_secs, 60);
        assert_eq!(config.jwt.access_token_expiry, 15);
        assert!(config.server.workers >= 1);
        assert!(config.server.workers <= config.server.max_workers);
        assert!(config.is_development());
    }

    #[test]
    fn test_partial_section_keeps_remaining_defaults() {
        let config = from_toml(
            r#"
            [rate_limit]
            login_max_requests = 10

            [server]
            workers = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.rate_limit.login_max_requests, 10);
        assert_eq!(config.rate_limit.login_window_secs, 60);
        assert_eq!(config.server.workers, 3);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_empty_jwt_secret_is_rejected() {
        assert!(from_toml("[jwt]\nsecret = \"\"").is_err());
    }
}
