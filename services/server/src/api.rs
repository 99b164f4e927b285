//! `/api/chat` 处理函数及其错误映射

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use relay_core::{ChatRequest, ChatResponse, ErrorResponse, RelayError};
use tracing::{debug, info};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

const CHAT_TAG: &str = "chat";

#[derive(OpenApi)]
#[openapi(info(
    title = "Ollama Chat API",
    version = "1.0.0",
    description = "API for interacting with Ollama"
))]
pub struct ApiDoc;

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(chat))
}

/// HTTP 层的错误包装
///
/// 只把固定文案写进响应体，后端细节已经在网关里记过日志。
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse::new(self.0.public_message()))).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tags = [CHAT_TAG],
    request_body(content = ChatRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Successful response", body = ChatResponse),
        (status = 400, description = "Body declared as JSON but not parseable", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse),
    ),
    summary = "Send message to Ollama",
    description = "Forwards `content` (or a default question when it is missing or empty) to the configured model and returns the complete reply",
    operation_id = "chat",
)]
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(bytes = body.len(), "Received chat request");
    // 非 JSON 的 body 不解析，等价于空请求
    let body: &[u8] = if is_json_content_type(&headers) {
        &body
    } else {
        debug!("Ignoring non-JSON chat body");
        &[]
    };
    let response = state.gateway.handle_body(body).await?;
    Ok(Json(response))
}

/// `application/json` 或 `application/*+json`；缺少 Content-Type 也不算 JSON
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
