//! 学生成绩记录实体

use sea_orm::entity::prelude::*;

use super::utc;
use crate::models::student_records::entities::{Grade, StudentRecord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub marks: f64,
    pub teacher_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_record(self) -> StudentRecord {
        StudentRecord {
            id: self.id,
            grade: Grade::from_marks(self.marks),
            created_at: utc(self.created_at),
            updated_at: utc(self.updated_at),
            name: self.name,
            subject: self.subject,
            marks: self.marks,
            teacher_id: self.teacher_id,
        }
    }
}
