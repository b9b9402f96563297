use crate::cache::{MokaObjectCache, ObjectCache};
use crate::errors::Result;
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::{generate_password, hash_password};
use std::sync::Arc;
use tracing::{debug, info, warn};

const ADMIN_USERNAME: &str = "admin";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 用户表为空时创建默认管理员；未提供密码时随机生成并在日志中打印一次
async fn create_default_admin(storage: &dyn Storage, password: Option<String>) -> Result<Option<User>> {
    let existing = storage.count_users().await?;
    if existing > 0 {
        debug!("{existing} account(s) present, default admin not needed");
        return Ok(None);
    }

    let password = match password.filter(|p| !p.is_empty()) {
        Some(password) => password,
        None => {
            let generated = generate_password(16);
            warn!("ADMIN_PASSWORD is not set, generated admin password: {generated}");
            warn!("Store it now, it will not be shown again");
            generated
        }
    };
    let password = hash_password(&password)?;

    let admin = storage
        .create_user(CreateUserRequest {
            username: ADMIN_USERNAME.to_string(),
            email: "admin@localhost".to_string(),
            password,
            role: UserRole::Admin,
            display_name: Some("Administrator".to_string()),
        })
        .await?;
    Ok(Some(admin))
}

/// 种子账号失败不阻止启动
pub(crate) async fn seed_admin(storage: &Arc<dyn Storage>, password: Option<String>) {
    match create_default_admin(storage.as_ref(), password).await {
        Ok(Some(admin)) => info!("Default admin account created (id {})", admin.id),
        Ok(None) => {}
        Err(e) => warn!("Skipping default admin account: {e}"),
    }
}

/// 准备服务器启动的上下文：存储（含迁移）、管理员种子账号、对象缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage, std::env::var("ADMIN_PASSWORD").ok()).await;

    let cache: Arc<dyn ObjectCache> = Arc::new(MokaObjectCache::from_config());
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
