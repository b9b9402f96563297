use super::entities::{AdminRecord, StudentRecord};
use crate::models::common::PaginationInfo;
use serde::Serialize;

// 教师面板响应
#[derive(Debug, Serialize)]
pub struct StudentRecordListResponse {
    pub items: Vec<StudentRecord>,
    pub pagination: PaginationInfo,
    pub search_query: Option<String>,
}

// 管理员记录列表响应
#[derive(Debug, Serialize)]
pub struct AdminRecordListResponse {
    pub items: Vec<AdminRecord>,
    pub pagination: PaginationInfo,
}
