//! HTTP 层：把 `POST /api/chat` 接到推理网关上。
//!
//! - `POST /api/chat` — 转发一条消息给模型
//! - `GET /api-docs` — Swagger UI 页面
//! - `GET /openapi.json` — OpenAPI 文档

pub mod api;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
