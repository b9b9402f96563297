use super::entities::{UserRole, UserStatus};
use crate::models::common::pagination::{first_page, lenient_page};
use serde::Deserialize;

// 教师账号查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(default = "first_page", deserialize_with = "lenient_page")]
    pub page: i64,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

impl From<UserListParams> for UserListQuery {
    fn from(params: UserListParams) -> Self {
        Self {
            page: Some(params.page),
            size: params.size,
            role: params.role,
            status: params.status,
            search: params.search,
        }
    }
}

// 账号创建请求
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
    pub display_name: Option<String>,
}

fn default_role() -> UserRole {
    UserRole::Teacher
}

// 账号列表查询参数（用于存储层）
#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}
