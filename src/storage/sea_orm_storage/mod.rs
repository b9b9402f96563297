//! SeaORM 存储实现
//!
//! SQLite 为默认后端；`database.url` 为 postgres/mysql 地址时使用对应的连接池。
//! 启动时运行 `migration` 中的全部迁移。

mod student_records;
mod users;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// 数据库错误附带操作说明
pub(super) fn db_error(action: &'static str) -> impl FnOnce(DbErr) -> PortalError {
    move |e| PortalError::database_operation(format!("{action}: {e}"))
}

#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// 由 `database.url` 推断的后端
#[derive(Debug, PartialEq, Eq)]
enum Backend {
    Sqlite(String),
    Server(String),
}

impl Backend {
    /// 裸文件路径（`.db` / `.sqlite`）按 SQLite 处理，不存在时创建
    fn from_url(url: &str) -> Result<Self> {
        const SERVER_SCHEMES: [&str; 4] = ["postgres://", "postgresql://", "mysql://", "mariadb://"];

        if url.starts_with("sqlite:") {
            Ok(Self::Sqlite(url.to_string()))
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(Self::Sqlite(format!("sqlite://{url}?mode=rwc")))
        } else if SERVER_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            Ok(Self::Server(url.to_string()))
        } else {
            Err(PortalError::database_config(format!(
                "Unsupported database url {url}; expected sqlite://, postgres://, mysql:// or a .db/.sqlite path"
            )))
        }
    }
}

impl SeaOrmStorage {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let db = match Backend::from_url(&config.database.url)? {
            Backend::Sqlite(url) => Self::connect_sqlite(&url, &config.database).await?,
            Backend::Server(url) => Self::connect_server(&url, &config.database).await?,
        };
        let storage = Self::from_connection(db).await?;
        info!("Database ready ({:?})", storage.db.get_database_backend());
        Ok(storage)
    }

    /// 在已有连接上运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// WAL 模式下读写互不阻塞；写锁冲突时最多等待 `database.timeout` 秒
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(config.timeout));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect_with(options)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    async fn connect_server(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(config.pool_size)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .sqlx_logging(false);

        Database::connect(options)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }
}

// Storage trait 实现
use crate::models::{
    student_records::{
        entities::{DeletedRecord, MarksChange, NewStudentRecord, StudentRecord, SubmitOutcome},
        requests::AdminRecordQuery,
        responses::{AdminRecordListResponse, StudentRecordListResponse},
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 成绩记录模块
    async fn submit_student_record(
        &self,
        teacher_id: i64,
        record: NewStudentRecord,
    ) -> Result<SubmitOutcome> {
        self.submit_student_record_impl(teacher_id, record).await
    }

    async fn get_student_record(
        &self,
        teacher_id: i64,
        record_id: i64,
    ) -> Result<Option<StudentRecord>> {
        self.get_student_record_impl(teacher_id, record_id).await
    }

    async fn update_student_marks(
        &self,
        teacher_id: i64,
        record_id: i64,
        marks: f64,
    ) -> Result<MarksChange> {
        self.update_student_marks_impl(teacher_id, record_id, marks)
            .await
    }

    async fn delete_student_record(
        &self,
        teacher_id: i64,
        record_id: i64,
    ) -> Result<DeletedRecord> {
        self.delete_student_record_impl(teacher_id, record_id).await
    }

    async fn list_student_records(
        &self,
        teacher_id: i64,
        search: Option<String>,
        page: i64,
    ) -> Result<StudentRecordListResponse> {
        self.list_student_records_impl(teacher_id, search, page)
            .await
    }

    async fn list_all_student_records(
        &self,
        query: AdminRecordQuery,
    ) -> Result<AdminRecordListResponse> {
        self.list_all_student_records_impl(query).await
    }
}

/// 测试用内存数据库（单连接，保证所有查询落在同一个库上）
#[cfg(test)]
pub(crate) async fn in_memory_storage() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory sqlite");
    SeaOrmStorage::from_connection(db)
        .await
        .expect("Failed to run migrations")
}

/// 测试用文件数据库：与生产相同的 SQLite 连接参数（WAL、连接池），返回库文件所在目录
#[cfg(test)]
pub(crate) async fn file_backed_storage(prefix: &str) -> (SeaOrmStorage, std::path::PathBuf) {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");

    let url = format!("sqlite://{}?mode=rwc", dir.join("portal.db").display());
    let db = SeaOrmStorage::connect_sqlite(&url, &AppConfig::get().database)
        .await
        .expect("Failed to open file-backed sqlite");
    let storage = SeaOrmStorage::from_connection(db)
        .await
        .expect("Failed to run migrations");
    (storage, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_inferred_from_url() {
        assert_eq!(
            Backend::from_url("portal.db").unwrap(),
            Backend::Sqlite("sqlite://portal.db?mode=rwc".to_string())
        );
        assert_eq!(
            Backend::from_url("sqlite::memory:").unwrap(),
            Backend::Sqlite("sqlite::memory:".to_string())
        );
        assert_eq!(
            Backend::from_url("postgres://u:p@localhost/marks").unwrap(),
            Backend::Server("postgres://u:p@localhost/marks".to_string())
        );
        assert!(Backend::from_url("ftp://nowhere").is_err());
    }
}
