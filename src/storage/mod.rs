use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 删除用户（级联删除其成绩记录）
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 成绩记录方法，所有操作均限定在 teacher_id 范围内
    // 提交成绩：已存在则累加（封顶 100），否则新建
    async fn submit_student_record(
        &self,
        teacher_id: i64,
        record: NewStudentRecord,
    ) -> Result<SubmitOutcome>;
    // 获取单条记录
    async fn get_student_record(
        &self,
        teacher_id: i64,
        record_id: i64,
    ) -> Result<Option<StudentRecord>>;
    // 覆盖分数
    async fn update_student_marks(
        &self,
        teacher_id: i64,
        record_id: i64,
        marks: f64,
    ) -> Result<MarksChange>;
    // 删除记录
    async fn delete_student_record(&self, teacher_id: i64, record_id: i64)
    -> Result<DeletedRecord>;
    // 教师面板列表
    async fn list_student_records(
        &self,
        teacher_id: i64,
        search: Option<String>,
        page: i64,
    ) -> Result<StudentRecordListResponse>;
    // 管理员查看全部记录
    async fn list_all_student_records(
        &self,
        query: AdminRecordQuery,
    ) -> Result<AdminRecordListResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::connect(crate::config::AppConfig::get()).await?;
    Ok(Arc::new(storage))
}
