use serde::{Deserialize, Serialize};

/// 成绩上限
pub const MAX_MARKS: f64 = 100.0;
/// 成绩下限
pub const MIN_MARKS: f64 = 0.0;
/// 教师面板每页条数
pub const DASHBOARD_PAGE_SIZE: u64 = 10;

/// 等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// 根据分数计算等级
    pub fn from_marks(marks: f64) -> Self {
        if marks >= 90.0 {
            Grade::APlus
        } else if marks >= 80.0 {
            Grade::A
        } else if marks >= 70.0 {
            Grade::B
        } else if marks >= 60.0 {
            Grade::C
        } else if marks >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 保留两位小数
pub fn round_marks(marks: f64) -> f64 {
    (marks * 100.0).round() / 100.0
}

/// 合并分数：累加后封顶 100
pub fn merge_marks(existing: f64, added: f64) -> f64 {
    round_marks((existing + added).min(MAX_MARKS))
}

// 学生成绩记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub marks: f64,
    pub grade: Grade,
    pub teacher_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 清洗后的新记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudentRecord {
    pub name: String,
    pub subject: String,
    pub marks: f64,
}

/// 提交结果：新建或合并到已有记录
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Created {
        record: StudentRecord,
    },
    Merged {
        record: StudentRecord,
        previous_marks: f64,
        added_marks: f64,
    },
}

impl SubmitOutcome {
    pub fn record(&self) -> &StudentRecord {
        match self {
            SubmitOutcome::Created { record } | SubmitOutcome::Merged { record, .. } => record,
        }
    }

    /// 面向用户的提示
    pub fn summary(&self) -> String {
        match self {
            SubmitOutcome::Created { record } => format!(
                "Successfully added {} with {} marks in {}.",
                record.name, record.marks, record.subject
            ),
            SubmitOutcome::Merged {
                record,
                previous_marks,
                added_marks,
            } => format!(
                "Updated marks for {} in {}. Previous: {}, Added: {}, New Total: {}",
                record.name, record.subject, previous_marks, added_marks, record.marks
            ),
        }
    }
}

/// 显式修改分数的结果
#[derive(Debug, Clone, Serialize)]
pub struct MarksChange {
    pub record: StudentRecord,
    pub old_marks: f64,
    pub new_marks: f64,
}

/// 被删除记录的摘要
#[derive(Debug, Clone, Serialize)]
pub struct DeletedRecord {
    pub id: i64,
    pub name: String,
    pub subject: String,
}

/// 管理员视图中的记录，附带所属教师用户名
#[derive(Debug, Clone, Serialize)]
pub struct AdminRecord {
    #[serde(flatten)]
    pub record: StudentRecord,
    pub teacher_username: String,
}
