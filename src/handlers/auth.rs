use serde_json::json;

use crate::context::AppContext;
use crate::error::{ApiError, HandlerResult};
use crate::handlers::{body_as, require_identity};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::models::VerifyInput;

/// `POST /auth/verify`: exchange an ID token for the identity it names.
pub async fn verify_token(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let input: VerifyInput = body_as(&request)?;
    let token = input
        .id_token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("ID token is required"))?;

    match ctx.verifier.verify(&token).await {
        Ok(identity) => Ok(HttpResponse::ok(json!({
            "uid": identity.uid,
            "email": identity.email,
            "displayName": identity.name,
            "photoURL": identity.picture,
        }))),
        Err(e) => {
            tracing::debug!(reason = e.reason(), error = %e, "Token verification failed");
            Err(ApiError::Unauthorized("Invalid token".to_string()))
        }
    }
}

/// `GET /auth/me`
pub async fn me(_ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    Ok(HttpResponse::ok(json!({ "user": user })))
}
