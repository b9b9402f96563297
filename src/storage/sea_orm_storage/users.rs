//! 教师与管理员账号

use super::{SeaOrmStorage, db_error};
use crate::entity::users::{ActiveModel, Column, Entity as Users, Model};
use crate::errors::{PortalError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::clamp_page,
    users::{
        entities::{User, UserStatus},
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::contains_ignore_case;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

impl SeaOrmStorage {
    /// `req.password` 必须已是哈希值；用户名或邮箱重复时返回 `IntegrityConflict`
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();
        let account = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(req.display_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        account
            .insert(&self.db)
            .await
            .map(Model::into_user)
            .map_err(|e| match PortalError::from(e) {
                conflict @ PortalError::IntegrityConflict(_) => conflict,
                other => PortalError::database_operation(format!("创建用户失败: {other}")),
            })
    }

    async fn find_user(&self, condition: Condition) -> Result<Option<User>> {
        Users::find()
            .filter(condition)
            .one(&self.db)
            .await
            .map(|found| found.map(Model::into_user))
            .map_err(db_error("查询用户失败"))
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Id.eq(id))).await
    }

    /// 登录时用户名与邮箱均可
    pub async fn get_user_by_username_or_email_impl(&self, identifier: &str) -> Result<Option<User>> {
        self.find_user(
            Condition::any()
                .add(Column::Username.eq(identifier))
                .add(Column::Email.eq(identifier)),
        )
        .await
    }

    /// 按创建时间倒序；关键字匹配用户名、邮箱或展示名
    pub async fn list_users_with_pagination_impl(&self, query: UserListQuery) -> Result<UserListResponse> {
        let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as u64;

        let keyword = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(|term| {
            Condition::any()
                .add(contains_ignore_case((Users, Column::Username), term))
                .add(contains_ignore_case((Users, Column::Email), term))
                .add(contains_ignore_case((Users, Column::DisplayName), term))
        });
        let filter = Condition::all()
            .add_option(keyword)
            .add_option(query.role.map(|role| Column::Role.eq(role.to_string())))
            .add_option(query.status.map(|status| Column::Status.eq(status.to_string())));

        let paginator = Users::find()
            .filter(filter)
            .order_by_desc(Column::CreatedAt)
            .paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(db_error("查询用户总数失败"))?;
        let page = clamp_page(query.page.unwrap_or(1), total, size);
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_error("查询用户列表失败"))?;

        Ok(UserListResponse {
            items: users.into_iter().map(Model::into_user).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_error("更新最后登录时间失败"))?;
        Ok(result.rows_affected > 0)
    }

    /// 外键级联删除该教师名下的成绩记录
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error("删除用户失败"))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(db_error("统计用户数量失败"))
    }
}

#[cfg(test)]
mod tests {
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::{CreateUserRequest, UserListQuery};
    use crate::storage::sea_orm_storage::in_memory_storage;
    use crate::errors::PortalError;

    fn account(username: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password: "-".to_string(),
            role,
            display_name: None,
        }
    }

    fn query(search: Option<&str>, role: Option<UserRole>, page: i64) -> UserListQuery {
        UserListQuery {
            page: Some(page),
            size: Some(2),
            role,
            status: None,
            search: search.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let storage = in_memory_storage().await;
        storage.create_user_impl(account("teacher_a", UserRole::Teacher)).await.unwrap();

        let mut duplicate = account("teacher_a", UserRole::Teacher);
        duplicate.email = "other@school.test".to_string();
        let err = storage.create_user_impl(duplicate).await.unwrap_err();
        assert!(matches!(err, PortalError::IntegrityConflict(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_username_or_email() {
        let storage = in_memory_storage().await;
        let created = storage.create_user_impl(account("teacher_a", UserRole::Teacher)).await.unwrap();

        let by_name = storage.get_user_by_username_or_email_impl("teacher_a").await.unwrap();
        let by_email = storage
            .get_user_by_username_or_email_impl("teacher_a@school.test")
            .await
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(created.id));
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
        assert!(storage.get_user_by_username_or_email_impl("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_clamps_page() {
        let storage = in_memory_storage().await;
        for name in ["teacher_a", "teacher_b", "teacher_c"] {
            storage.create_user_impl(account(name, UserRole::Teacher)).await.unwrap();
        }
        storage.create_user_impl(account("admin_a", UserRole::Admin)).await.unwrap();

        let teachers = storage
            .list_users_with_pagination_impl(query(None, Some(UserRole::Teacher), 99))
            .await
            .unwrap();
        assert_eq!(teachers.pagination.total, 3);
        assert_eq!(teachers.pagination.page, 2);
        assert_eq!(teachers.items.len(), 1);

        let matched = storage
            .list_users_with_pagination_impl(query(Some(" ADMIN "), None, 1))
            .await
            .unwrap();
        assert_eq!(matched.items.len(), 1);
        assert_eq!(matched.items[0].username, "admin_a");
    }
}
