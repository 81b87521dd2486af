use serde_json::json;

use crate::context::AppContext;
use crate::error::HandlerResult;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::store::now_timestamp;

/// `GET /health`
pub async fn health(_ctx: AppContext, _request: HttpRequest) -> HandlerResult {
    Ok(HttpResponse::ok(json!({
        "status": "ok",
        "timestamp": now_timestamp(),
    })))
}
