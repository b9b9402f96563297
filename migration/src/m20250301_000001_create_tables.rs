use sea_orm_migration::prelude::*;

/// 分数：[0, 100]，至多两位小数（容忍浮点误差）
const MARKS_CHECK: &str =
    "marks >= 0 AND marks <= 100 AND ABS(marks * 100 - ROUND(marks * 100)) < 0.000001";

#[derive(DeriveMigrationName)]
pub struct Migration;

fn primary_key<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

/// Unix 秒
fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().to_owned()
}

fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(primary_key(Users::Id))
        .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
        .col(ColumnDef::new(Users::Role).string().not_null())
        .col(ColumnDef::new(Users::Status).string().not_null())
        .col(ColumnDef::new(Users::DisplayName).string().null())
        .col(ColumnDef::new(Users::LastLogin).big_integer().null())
        .col(timestamp(Users::CreatedAt))
        .col(timestamp(Users::UpdatedAt))
        .to_owned()
}

/// 删除教师时其名下记录一并删除
fn student_records_table() -> TableCreateStatement {
    Table::create()
        .table(StudentRecords::Table)
        .if_not_exists()
        .col(primary_key(StudentRecords::Id))
        .col(ColumnDef::new(StudentRecords::Name).string_len(100).not_null())
        .col(ColumnDef::new(StudentRecords::Subject).string_len(100).not_null())
        .col(
            ColumnDef::new(StudentRecords::Marks)
                .double()
                .not_null()
                .check(Expr::cust(MARKS_CHECK)),
        )
        .col(ColumnDef::new(StudentRecords::TeacherId).big_integer().not_null())
        .col(timestamp(StudentRecords::CreatedAt))
        .col(timestamp(StudentRecords::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .from(StudentRecords::Table, StudentRecords::TeacherId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_users_role")
            .table(Users::Table)
            .col(Users::Role)
            .to_owned(),
        // 同一教师名下 (姓名, 科目) 唯一，并发提交依赖此约束合并
        Index::create()
            .if_not_exists()
            .name("idx_student_records_unique")
            .table(StudentRecords::Table)
            .col(StudentRecords::Name)
            .col(StudentRecords::Subject)
            .col(StudentRecords::TeacherId)
            .unique()
            .to_owned(),
        // 教师面板按创建时间倒序分页
        Index::create()
            .if_not_exists()
            .name("idx_student_records_teacher_created")
            .table(StudentRecords::Table)
            .col(StudentRecords::TeacherId)
            .col(StudentRecords::CreatedAt)
            .to_owned(),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(users_table()).await?;
        manager.create_table(student_records_table()).await?;
        for index in indexes() {
            manager.create_index(index).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentRecords {
    #[sea_orm(iden = "student_records")]
    Table,
    Id,
    Name,
    Subject,
    Marks,
    TeacherId,
    CreatedAt,
    UpdatedAt,
}
