//! SeaORM 实体定义
//!
//! 时间列存 Unix 秒；`into_*` 转为 models 中的业务类型。

pub mod student_records;
pub mod users;

use chrono::{DateTime, Utc};

/// 时间戳转 UTC 时间，越界值按纪元处理
pub(crate) fn utc(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}
