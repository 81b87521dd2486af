//! Profile and statistics handlers.

use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::{ApiError, HandlerResult};
use crate::handlers::{body_fields, path_param, require_identity};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::models::{retain_fields, to_fields, PublicProfile, UserProfile, UserStats, EDITABLE_PROFILE_FIELDS};
use crate::store::{now_timestamp, Query, ITEMS, USERS};

async fn find_profile(ctx: &AppContext, uid: &str, failure: &'static str) -> Result<Option<UserProfile>, ApiError> {
    let document = ctx
        .store
        .get(USERS, uid)
        .await
        .map_err(|e| ApiError::internal(failure, e))?;
    document
        .map(|doc| doc.decode::<UserProfile>())
        .transpose()
        .map_err(|e| ApiError::internal(failure, e))
}

/// Create a profile from the identity unless one exists; `true` when created.
async fn ensure_profile(
    ctx: &AppContext,
    request: &HttpRequest,
    failure: &'static str,
) -> Result<(UserProfile, bool), ApiError> {
    let user = require_identity(request)?;
    if let Some(profile) = find_profile(ctx, &user.uid, failure).await? {
        return Ok((profile, false));
    }

    let profile = UserProfile::from_identity(user, &now_timestamp());
    let fields = to_fields(&profile).map_err(|e| ApiError::internal(failure, e))?;
    ctx.store
        .set(USERS, &user.uid, fields)
        .await
        .map_err(|e| ApiError::internal(failure, e))?;
    tracing::info!(uid = %user.uid, "Profile created");
    Ok((profile, true))
}

async fn count_items(ctx: &AppContext, uid: &str, available: bool) -> Result<usize, ApiError> {
    let query = Query::new().where_eq("userId", uid).where_eq("isAvailable", available);
    ctx.store
        .query(ITEMS, &query)
        .await
        .map(|documents| documents.len())
        .map_err(|e| ApiError::internal("Failed to fetch user statistics", e))
}

/// Given = no longer available; offered = still available.
async fn stats_for(ctx: &AppContext, uid: &str) -> Result<UserStats, ApiError> {
    Ok(UserStats {
        given_items_count: count_items(ctx, uid, false).await?,
        offered_items_count: count_items(ctx, uid, true).await?,
    })
}

/// `GET /users/:uid`: public fields only.
pub async fn public_profile(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let uid = path_param(&request, "uid")?;
    let profile = find_profile(&ctx, uid, "Failed to fetch user profile")
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(HttpResponse::ok(json!({ "profile": PublicProfile::from(profile) })))
}

/// `GET /users/profile`
pub async fn get_own_profile(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    let profile = find_profile(&ctx, &user.uid, "Failed to fetch user profile")
        .await?
        .ok_or_else(|| ApiError::not_found("User profile not found"))?;
    Ok(HttpResponse::ok(json!({ "profile": profile })))
}

/// `POST /users/profile`
pub async fn create_profile(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let (profile, is_new) = ensure_profile(&ctx, &request, "Failed to process user profile").await?;
    Ok(HttpResponse::ok(json!({ "profile": profile, "isNew": is_new })))
}

/// `PUT /users/profile`
pub async fn update_profile(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    const FAILURE: &str = "Failed to update user profile";
    let user = require_identity(&request)?;
    let mut fields = retain_fields(body_fields(&request)?, EDITABLE_PROFILE_FIELDS);
    ensure_profile(&ctx, &request, FAILURE).await?;

    fields.insert("updatedAt".to_string(), Value::from(now_timestamp()));
    ctx.store
        .update(USERS, &user.uid, fields)
        .await
        .map_err(|e| ApiError::internal(FAILURE, e))?;

    let profile = find_profile(&ctx, &user.uid, FAILURE)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(HttpResponse::ok(json!({ "profile": profile })))
}

/// `GET /users/stats`
pub async fn own_stats(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    let stats = stats_for(&ctx, &user.uid).await?;
    Ok(HttpResponse::ok(json!({ "stats": stats })))
}

/// `GET /users/stats/:uid`
pub async fn user_stats(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let uid = path_param(&request, "uid")?;
    let stats = stats_for(&ctx, uid).await?;
    Ok(HttpResponse::ok(json!({ "stats": stats })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::testing::{dispatcher, request, ALICE, BOB};
    use crate::http::request::Method;

    #[tokio::test]
    async fn test_create_profile_is_idempotent() {
        let (dispatcher, _) = dispatcher();

        let response = dispatcher.dispatch(request(Method::Get, "/api/users/profile", Some(ALICE))).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error_message(), Some("User profile not found"));

        let response = dispatcher.dispatch(request(Method::Post, "/api/users/profile", Some(ALICE))).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["isNew"], true);
        assert_eq!(response.body["profile"]["displayName"], "Alice");
        assert_eq!(response.body["profile"]["email"], "alice@example.com");

        let response = dispatcher.dispatch(request(Method::Post, "/api/users/profile", Some(ALICE))).await;
        assert_eq!(response.body["isNew"], false);
    }

    #[tokio::test]
    async fn test_profile_routes_require_identity() {
        let (dispatcher, _) = dispatcher();
        for method in [Method::Get, Method::Post, Method::Put] {
            let response = dispatcher.dispatch(request(method, "/api/users/profile", None)).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
            assert_eq!(response.error_message(), Some("Authentication required"));
        }
    }

    #[tokio::test]
    async fn test_update_profile_only_touches_editable_fields() {
        let (dispatcher, _) = dispatcher();
        let response = dispatcher
            .dispatch(
                request(Method::Put, "/api/users/profile", Some(BOB))
                    .with_body(json!({ "bio": "Gardener", "phone": "555-0100", "uid": "mallory", "email": "x@y" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let profile = &response.body["profile"];
        assert_eq!(profile["uid"], "bob");
        assert_eq!(profile["bio"], "Gardener");
        assert_eq!(profile["email"], "");

        let response = dispatcher.dispatch(request(Method::Get, "/api/users/profile", Some(BOB))).await;
        assert_eq!(response.body["profile"]["phone"], "555-0100");
    }

    #[tokio::test]
    async fn test_public_profile_exposes_public_fields_only() {
        let (dispatcher, _) = dispatcher();
        dispatcher
            .dispatch(request(Method::Put, "/api/users/profile", Some(BOB)).with_body(json!({ "phone": "555", "bio": "hi" })))
            .await;

        let response = dispatcher.dispatch(request(Method::Get, "/api/users/bob", None)).await;
        assert_eq!(response.status, StatusCode::OK);
        let profile = response.body["profile"].as_object().unwrap();
        assert_eq!(profile["bio"], "hi");
        assert!(!profile.contains_key("phone"));
        assert!(!profile.contains_key("email"));

        let response = dispatcher.dispatch(request(Method::Get, "/api/users/nobody", None)).await;
        assert_eq!(response.error_message(), Some("User not found"));
    }

    #[tokio::test]
    async fn test_stats_count_offered_and_given() {
        let (dispatcher, _) = dispatcher();
        for title in ["Lamp", "Bike"] {
            dispatcher
                .dispatch(request(Method::Post, "/api/items", Some(ALICE)).with_body(json!({ "title": title })))
                .await;
        }
        let response = dispatcher.dispatch(request(Method::Get, "/api/items/user", Some(ALICE))).await;
        let id = response.body["items"][0]["id"].as_str().unwrap().to_string();
        dispatcher
            .dispatch(request(Method::Post, &format!("/api/items/{}/given", id), Some(ALICE)))
            .await;

        let response = dispatcher.dispatch(request(Method::Get, "/api/users/stats/alice", None)).await;
        assert_eq!(response.body, json!({ "stats": { "givenItemsCount": 1, "offeredItemsCount": 1 } }));

        let response = dispatcher.dispatch(request(Method::Get, "/api/users/stats", Some(ALICE))).await;
        assert_eq!(response.body["stats"]["offeredItemsCount"], 1);
    }
}
