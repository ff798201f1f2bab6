//! EduSystem - 教务管理平台后端服务
//!
//! 基于 Actix Web 构建：院系、课程、选课、作业、测验、成绩与 GPA，
//! 以及借助 Gemini 生成学习计划、测验与作业。
//!
//! # 架构
//! - `ai`: AI 补全客户端、提示词与输出解析
//! - `cache`: 缓存层（Moka/Redis）
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

pub mod ai;
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
