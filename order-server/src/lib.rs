//! Order server: table sessions, order intake, payment reconciliation and
//! realtime order events for QR table ordering.
//!
//! # 模块
//!
//! - [`core`] - 配置、状态、HTTP 服务、后台任务
//! - [`db`] - SQLite 连接池、迁移与仓储
//! - [`sessions`] - 桌台会话
//! - [`orders`] - 下单与订单状态机
//! - [`payment`] - 支付网关适配
//! - [`events`] - 订单事件总线
//! - [`api`] - HTTP / WebSocket 路由

pub mod api;
pub mod core;
pub mod db;
pub mod events;
pub mod orders;
pub mod payment;
pub mod sessions;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
