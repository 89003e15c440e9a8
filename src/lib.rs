//! Assignment Portal - 作业提交平台后端服务
//!
//! 基于 Actix Web 构建：教师创建班级与作业，学生通过加入码进班并上传作业，教师在线批改。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `file_store`: 提交文件的二进制存储（数据库/本地磁盘）
//! - `mail`: 找回密码邮件
//! - `middlewares`: 会话、角色、班级权限与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `session`: 内存会话存储
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod file_store;
pub mod mail;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_support;
