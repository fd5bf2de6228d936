//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`customer`] - 扫码点餐：会话、菜单、下单、支付令牌
//! - [`admin_orders`] - 后厨/管理端订单列表与状态流转
//! - [`payment`] - 支付网关回调
//! - [`realtime`] - 订单事件 WebSocket 推送

pub mod admin_orders;
pub mod customer;
pub mod health;
pub mod payment;
pub mod realtime;
