//! Item handlers: listing, CRUD and the claim / complete / given transitions.

use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::{ApiError, HandlerResult};
use crate::handlers::{body_as, body_fields, path_param, require_identity};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::models::{strip_fields, CompleteInput, Item, PROTECTED_ITEM_FIELDS};
use crate::store::{now_timestamp, Direction, Document, Fields, Query, ITEMS};

async fn fetch_item(ctx: &AppContext, id: &str, failure: &'static str) -> Result<Document, ApiError> {
    ctx.store
        .get(ITEMS, id)
        .await
        .map_err(|e| ApiError::internal(failure, e))?
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

async fn load_item(ctx: &AppContext, id: &str, failure: &'static str) -> Result<Item, ApiError> {
    fetch_item(ctx, id, failure)
        .await?
        .decode()
        .map_err(|e| ApiError::internal(failure, e))
}

async fn list(ctx: &AppContext, query: Query, failure: &'static str) -> HandlerResult {
    let documents = ctx
        .store
        .query(ITEMS, &query)
        .await
        .map_err(|e| ApiError::internal(failure, e))?;
    let items: Vec<Value> = documents.into_iter().map(|doc| doc.into_json()).collect();
    Ok(HttpResponse::ok(json!({ "items": items })))
}

/// Merge `fields` and return the stored document as clients see it.
async fn apply(ctx: &AppContext, id: &str, fields: Fields, failure: &'static str) -> Result<Value, ApiError> {
    ctx.store
        .update(ITEMS, id, fields)
        .await
        .map_err(|e| ApiError::internal(failure, e))?;
    Ok(fetch_item(ctx, id, failure).await?.into_json())
}

fn stamp(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Fields {
    pairs.into_iter().map(|(key, value)| (key.to_string(), value)).collect()
}

/// `GET /items`: available items, newest first, optionally by category.
pub async fn list_items(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let mut query = Query::new().where_eq("isAvailable", true);
    if let Some(category) = request.query_param("category") {
        query = query.where_eq("category", category);
    }
    list(&ctx, query.order_by("createdAt", Direction::Descending), "Failed to fetch items").await
}

/// `GET /items/user`
pub async fn my_items(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    let query = Query::new()
        .where_eq("userId", user.uid.as_str())
        .order_by("createdAt", Direction::Descending);
    list(&ctx, query, "Failed to fetch user items").await
}

/// `GET /items/user/:userId`
pub async fn items_by_user(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user_id = path_param(&request, "userId")?;
    let query = Query::new()
        .where_eq("userId", user_id)
        .order_by("createdAt", Direction::Descending);
    list(&ctx, query, "Failed to fetch user items").await
}

/// `GET /items/:id`
pub async fn get_item(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let id = path_param(&request, "id")?;
    let document = fetch_item(&ctx, id, "Failed to fetch item").await?;
    Ok(HttpResponse::ok(json!({ "item": document.into_json() })))
}

/// `POST /items`
pub async fn create_item(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    let mut fields = strip_fields(body_fields(&request)?, PROTECTED_ITEM_FIELDS);

    let has_title = fields
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|title| !title.trim().is_empty());
    if !has_title {
        return Err(ApiError::bad_request("Title is required"));
    }

    let now = now_timestamp();
    fields.extend(stamp([
        ("userId", Value::from(user.uid.as_str())),
        ("isAvailable", Value::Bool(true)),
        ("isGivenAway", Value::Bool(false)),
        ("claimCount", Value::from(0)),
        ("createdAt", Value::from(now.as_str())),
        ("updatedAt", Value::from(now)),
    ]));

    let document = ctx
        .store
        .add(ITEMS, fields)
        .await
        .map_err(|e| ApiError::internal("Failed to create item", e))?;
    tracing::info!(item_id = %document.id, user = %user.uid, "Item created");
    Ok(HttpResponse::created(json!({ "item": document.into_json() })))
}

/// `PUT /items/:id`
pub async fn update_item(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    let id = path_param(&request, "id")?;
    let item = load_item(&ctx, id, "Failed to update item").await?;
    if !item.is_owned_by(&user.uid) {
        return Err(ApiError::forbidden("You can only update your own items"));
    }

    let mut fields = strip_fields(body_fields(&request)?, &["id", "userId", "createdAt", "claimCount"]);
    fields.insert("updatedAt".to_string(), Value::from(now_timestamp()));
    let item = apply(&ctx, id, fields, "Failed to update item").await?;
    Ok(HttpResponse::ok(json!({ "item": item })))
}

/// `DELETE /items/:id`
pub async fn delete_item(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    let user = require_identity(&request)?;
    let id = path_param(&request, "id")?;
    let item = load_item(&ctx, id, "Failed to delete item").await?;
    if !item.is_owned_by(&user.uid) {
        return Err(ApiError::forbidden("You can only delete your own items"));
    }

    ctx.store
        .delete(ITEMS, id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete item", e))?;
    tracing::info!(item_id = %id, user = %user.uid, "Item deleted");
    Ok(HttpResponse::ok(json!({ "success": true, "message": "Item deleted successfully" })))
}

/// `POST /items/:id/claim`
pub async fn claim_item(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    const FAILURE: &str = "Failed to claim item";
    let user = require_identity(&request)?;
    let id = path_param(&request, "id")?;
    let item = load_item(&ctx, id, FAILURE).await?;

    if !item.is_available {
        return Err(ApiError::invalid_state("Item is no longer available"));
    }
    if item.is_owned_by(&user.uid) {
        return Err(ApiError::invalid_state("You cannot claim your own item"));
    }
    if item.claimed_by.as_deref() == Some(user.uid.as_str()) {
        return Err(ApiError::invalid_state("You have already claimed this item"));
    }

    ctx.store
        .increment(ITEMS, id, "claimCount", 1)
        .await
        .map_err(|e| ApiError::internal(FAILURE, e))?;
    let now = now_timestamp();
    let fields = stamp([
        ("claimedBy", Value::from(user.uid.as_str())),
        ("claimedAt", Value::from(now.as_str())),
        ("isAvailable", Value::Bool(false)),
        ("updatedAt", Value::from(now)),
    ]);
    let item = apply(&ctx, id, fields, FAILURE).await?;

    tracing::info!(item_id = %id, claimed_by = %user.uid, "Item claimed");
    Ok(HttpResponse::ok(json!({ "item": item, "message": "Item claimed successfully" })))
}

/// `POST /items/:id/complete`
pub async fn complete_item(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    const FAILURE: &str = "Failed to complete item";
    let user = require_identity(&request)?;
    let id = path_param(&request, "id")?;
    let input: CompleteInput = body_as(&request)?;
    let item = load_item(&ctx, id, FAILURE).await?;

    if !item.is_owned_by(&user.uid) {
        return Err(ApiError::forbidden("You can only complete your own items"));
    }
    if item.is_given_away {
        return Err(ApiError::invalid_state("Item is already marked as completed"));
    }

    let now = now_timestamp();
    let mut fields = stamp([
        ("isGivenAway", Value::Bool(true)),
        ("isAvailable", Value::Bool(false)),
        ("completedAt", Value::from(now.as_str())),
        ("updatedAt", Value::from(now)),
    ]);
    if let Some(claimed_by) = input.claimed_by_user_id {
        fields.insert("claimedBy".to_string(), Value::from(claimed_by));
    }
    let item = apply(&ctx, id, fields, FAILURE).await?;
    Ok(HttpResponse::ok(json!({ "item": item, "message": "Item marked as completed successfully" })))
}

/// `POST /items/:id/given`
pub async fn mark_given(ctx: AppContext, request: HttpRequest) -> HandlerResult {
    const FAILURE: &str = "Failed to mark item as given away";
    let user = require_identity(&request)?;
    let id = path_param(&request, "id")?;
    let item = load_item(&ctx, id, FAILURE).await?;

    if !item.is_owned_by(&user.uid) {
        return Err(ApiError::forbidden("You can only mark your own items as given away"));
    }
    if item.is_given_away {
        return Err(ApiError::invalid_state("Item is already marked as given away"));
    }

    let now = now_timestamp();
    let fields = stamp([
        ("isGivenAway", Value::Bool(true)),
        ("isAvailable", Value::Bool(false)),
        ("givenAwayAt", Value::from(now.as_str())),
        ("updatedAt", Value::from(now)),
    ]);
    let item = apply(&ctx, id, fields, FAILURE).await?;
    Ok(HttpResponse::ok(json!({ "item": item, "message": "Item marked as given away" })))
}
