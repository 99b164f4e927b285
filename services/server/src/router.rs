//! 路由组装：接口、OpenAPI 文档页、CORS 和请求体上限

use crate::api::{self, ApiDoc};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

/// Swagger UI 页面
pub const DOCS_PATH: &str = "/api-docs";
/// 页面加载的 OpenAPI JSON
pub const OPENAPI_JSON_PATH: &str = "/openapi.json";

/// 允许任意来源，只开放 GET / POST
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// 构建完整的路由
///
/// * `state` - 共享状态 (网关在这里面)
/// * `max_body_bytes` - 请求体上限，超出由传输层直接返回 413
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(api::router())
        .split_for_parts();

    router
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, openapi))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors_layer())
        .with_state(state)
}
