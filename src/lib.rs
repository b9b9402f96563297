//! Student Marks Portal - 教师成绩录入服务
//!
//! 基于 Actix Web 构建：教师登录后按 (姓名, 科目) 录入成绩，重复提交会累加（封顶 100），
//! 并可搜索、分页、修改和删除自己名下的记录。
//!
//! # 架构
//! - `cache`: 对象缓存（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
