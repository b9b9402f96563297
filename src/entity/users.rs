//! 用户实体

use sea_orm::entity::prelude::*;

use super::utc;
use crate::models::users::entities::{User, UserRole, UserStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub display_name: Option<String>,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student_records::Entity")]
    StudentRecords,
}

impl Related<super::student_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 库中的未知角色降为教师，未知状态视为停用
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            role: self.role.parse().unwrap_or(UserRole::Teacher),
            status: self.status.parse().unwrap_or(UserStatus::Inactive),
            last_login: self.last_login.map(utc),
            created_at: utc(self.created_at),
            updated_at: utc(self.updated_at),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            display_name: self.display_name,
        }
    }
}
