//! 学生成绩记录存储操作
//!
//! 写操作都在单个事务内完成，且事务的第一条语句必须是写入：SQLite（WAL）中
//! 先读后写的延迟事务在升级为写事务时会直接返回 SQLITE_BUSY_SNAPSHOT，
//! 不会等待 busy_timeout。唯一索引 (name, subject, teacher_id) 保证不会出现重复记录。

use super::{SeaOrmStorage, db_error};
use crate::entity::student_records::{ActiveModel, Column, Entity as StudentRecords, Model};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::clamp_page,
    student_records::{
        entities::{
            AdminRecord, DASHBOARD_PAGE_SIZE, DeletedRecord, MarksChange, NewStudentRecord,
            StudentRecord, SubmitOutcome, merge_marks,
        },
        requests::AdminRecordQuery,
        responses::{AdminRecordListResponse, StudentRecordListResponse},
    },
};
use crate::utils::contains_ignore_case;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 提交成绩：已存在则累加（封顶 100），否则新建
    ///
    /// 先以 `ON CONFLICT DO NOTHING` 插入，再在同一事务内加锁读取该行：
    /// 插入成功即为新建，否则在读到的分数上合并。
    pub async fn submit_student_record_impl(
        &self,
        teacher_id: i64,
        record: NewStudentRecord,
    ) -> Result<SubmitOutcome> {
        let txn = self.begin().await?;
        let now = chrono::Utc::now().timestamp();

        let candidate = ActiveModel {
            name: Set(record.name.clone()),
            subject: Set(record.subject.clone()),
            marks: Set(record.marks),
            teacher_id: Set(teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = StudentRecords::insert(candidate)
            .on_conflict(
                OnConflict::columns([Column::Name, Column::Subject, Column::TeacherId])
                    .do_nothing_on([Column::Id])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(db_error("写入成绩记录失败"))?;

        let model = StudentRecords::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::Name.eq(record.name.as_str()))
            .filter(Column::Subject.eq(record.subject.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_error("查询成绩记录失败"))?
            .ok_or_else(|| {
                PortalError::database_operation(format!(
                    "成绩记录 ({}, {}) 写入后不可见",
                    record.name, record.subject
                ))
            })?;

        let outcome = if inserted > 0 {
            SubmitOutcome::Created {
                record: model.into_record(),
            }
        } else {
            let previous_marks = model.marks;
            let mut active: ActiveModel = model.into();
            active.marks = Set(merge_marks(previous_marks, record.marks));
            active.updated_at = Set(now);

            let updated = active
                .update(&txn)
                .await
                .map_err(db_error("累加成绩失败"))?;

            SubmitOutcome::Merged {
                record: updated.into_record(),
                previous_marks,
                added_marks: record.marks,
            }
        };

        Self::commit(txn).await?;
        debug!(
            "Teacher {} submitted marks for record {}",
            teacher_id,
            outcome.record().id
        );
        Ok(outcome)
    }

    /// 获取教师名下的单条记录
    pub async fn get_student_record_impl(
        &self,
        teacher_id: i64,
        record_id: i64,
    ) -> Result<Option<StudentRecord>> {
        let result = StudentRecords::find_by_id(record_id)
            .filter(Column::TeacherId.eq(teacher_id))
            .one(&self.db)
            .await
            .map_err(db_error("查询成绩记录失败"))?;

        Ok(result.map(|m| m.into_record()))
    }

    /// 覆盖分数（不累加）
    pub async fn update_student_marks_impl(
        &self,
        teacher_id: i64,
        record_id: i64,
        marks: f64,
    ) -> Result<MarksChange> {
        let txn = self.begin().await?;
        let now = chrono::Utc::now().timestamp();

        let model = Self::claim_owned(&txn, teacher_id, record_id, now).await?;
        let old_marks = model.marks;

        let mut active: ActiveModel = model.into();
        active.marks = Set(marks);
        active.updated_at = Set(now);

        let updated = active
            .update(&txn)
            .await
            .map_err(db_error("更新成绩失败"))?;

        Self::commit(txn).await?;

        Ok(MarksChange {
            old_marks,
            new_marks: updated.marks,
            record: updated.into_record(),
        })
    }

    /// 删除记录
    pub async fn delete_student_record_impl(
        &self,
        teacher_id: i64,
        record_id: i64,
    ) -> Result<DeletedRecord> {
        let txn = self.begin().await?;

        let model =
            Self::claim_owned(&txn, teacher_id, record_id, chrono::Utc::now().timestamp()).await?;
        let deleted = DeletedRecord {
            id: model.id,
            name: model.name.clone(),
            subject: model.subject.clone(),
        };

        model
            .delete(&txn)
            .await
            .map_err(db_error("删除成绩记录失败"))?;

        Self::commit(txn).await?;
        Ok(deleted)
    }

    /// 教师面板：按姓名、科目排序，固定每页条数
    pub async fn list_student_records_impl(
        &self,
        teacher_id: i64,
        search: Option<String>,
        page: i64,
    ) -> Result<StudentRecordListResponse> {
        let size = DASHBOARD_PAGE_SIZE;
        let mut select = StudentRecords::find().filter(Column::TeacherId.eq(teacher_id));

        if let Some(ref term) = search {
            select = select.filter(
                Condition::any()
                    .add(contains_ignore_case((StudentRecords, Column::Name), term))
                    .add(contains_ignore_case((StudentRecords, Column::Subject), term)),
            );
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Subject)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("查询成绩记录总数失败"))?;

        let page = clamp_page(page, total, size);
        let records = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_error("查询成绩记录列表失败"))?;

        Ok(StudentRecordListResponse {
            items: records.into_iter().map(|m| m.into_record()).collect(),
            pagination: PaginationInfo::new(page, size, total),
            search_query: search,
        })
    }

    /// 管理员视图：全部记录，可按教师用户名搜索
    pub async fn list_all_student_records_impl(
        &self,
        query: AdminRecordQuery,
    ) -> Result<AdminRecordListResponse> {
        let size = query.size.unwrap_or(DASHBOARD_PAGE_SIZE as i64).clamp(1, 100) as u64;

        let mut select = StudentRecords::find().find_also_related(Users);

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let term = search.trim();
            select = select.filter(
                Condition::any()
                    .add(contains_ignore_case((StudentRecords, Column::Name), term))
                    .add(contains_ignore_case((StudentRecords, Column::Subject), term))
                    .add(contains_ignore_case((Users, UserColumn::Username), term)),
            );
        }

        if let Some(ref subject) = query.subject
            && !subject.trim().is_empty()
        {
            select = select.filter(Column::Subject.eq(subject.trim()));
        }

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Subject)
            .order_by_asc(Column::TeacherId)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("查询成绩记录总数失败"))?;

        let page = clamp_page(query.page.unwrap_or(1), total, size);
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_error("查询成绩记录列表失败"))?;

        Ok(AdminRecordListResponse {
            items: rows
                .into_iter()
                .map(|(record, teacher)| AdminRecord {
                    record: record.into_record(),
                    teacher_username: teacher.map(|t| t.username).unwrap_or_default(),
                })
                .collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 在事务内锁定教师名下的记录；不存在或不属于该教师时返回 NotFound
    ///
    /// 首条语句是一次只改 updated_at 的 UPDATE，用来在读取前拿到写锁（SQLite）或行锁。
    async fn claim_owned(
        txn: &DatabaseTransaction,
        teacher_id: i64,
        record_id: i64,
        now: i64,
    ) -> Result<Model> {
        StudentRecords::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(record_id))
            .filter(Column::TeacherId.eq(teacher_id))
            .exec(txn)
            .await
            .map_err(db_error("锁定成绩记录失败"))?;

        StudentRecords::find_by_id(record_id)
            .filter(Column::TeacherId.eq(teacher_id))
            .one(txn)
            .await
            .map_err(db_error("查询成绩记录失败"))?
            .ok_or_else(|| {
                PortalError::not_found(format!(
                    "Student record {record_id} not found for teacher {teacher_id}"
                ))
            })
    }

    async fn begin(&self) -> Result<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(db_error("开启事务失败"))
    }

    async fn commit(txn: DatabaseTransaction) -> Result<()> {
        txn.commit()
            .await
            .map_err(db_error("提交事务失败"))
    }
}
