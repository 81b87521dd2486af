//! Route handlers and the API route table.
//!
//! # Responsibilities
//! - Declare every route in match-priority order
//! - Enforce business rules (ownership, item state transitions)
//! - Translate record store failures into `ApiError::Internal`
//!
//! # Design Decisions
//! - Handlers re-check the identity slot themselves; the dispatcher only
//!   guarantees the hook ran
//! - Literal segments are declared before captures at the same position

pub mod auth;
pub mod health;
pub mod items;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::http::request::HttpRequest;
use crate::routing::{handler, RouteDefinition, RouteTable, RouteTableError};
use crate::store::Fields;

/// Build the application's route table.
///
/// `/health` always lives at the root; every other route is mounted under
/// `base_path`.
pub fn route_table(base_path: &str) -> Result<RouteTable, RouteTableError> {
    let mut routes = vec![RouteDefinition::get("/health", handler(health::health))];
    routes.extend(api_routes().into_iter().map(|route| route.nested(base_path)));
    RouteTable::new(routes)
}

fn api_routes() -> Vec<RouteDefinition> {
    vec![
        // Items
        RouteDefinition::get("/items", handler(items::list_items)),
        RouteDefinition::get("/items/user", handler(items::my_items)).authenticated(),
        RouteDefinition::get("/items/user/:userId", handler(items::items_by_user)),
        RouteDefinition::get("/items/:id", handler(items::get_item)),
        RouteDefinition::post("/items", handler(items::create_item)).authenticated(),
        RouteDefinition::put("/items/:id", handler(items::update_item)).authenticated(),
        RouteDefinition::delete("/items/:id", handler(items::delete_item)).authenticated(),
        RouteDefinition::post("/items/:id/claim", handler(items::claim_item)).authenticated(),
        RouteDefinition::post("/items/:id/complete", handler(items::complete_item)).authenticated(),
        RouteDefinition::post("/items/:id/given", handler(items::mark_given)).authenticated(),
        // Users
        RouteDefinition::get("/users/profile", handler(users::get_own_profile)).authenticated(),
        RouteDefinition::post("/users/profile", handler(users::create_profile)).authenticated(),
        RouteDefinition::put("/users/profile", handler(users::update_profile)).authenticated(),
        RouteDefinition::get("/users/stats", handler(users::own_stats)).authenticated(),
        RouteDefinition::get("/users/stats/:uid", handler(users::user_stats)),
        RouteDefinition::get("/users/:uid", handler(users::public_profile)),
        // Auth
        RouteDefinition::post("/auth/verify", handler(auth::verify_token)),
        RouteDefinition::get("/auth/me", handler(auth::me)).authenticated(),
    ]
}

/// The caller's identity, or the 401 every auth-checking handler returns.
pub(crate) fn require_identity(request: &HttpRequest) -> Result<&Identity, ApiError> {
    request.identity().ok_or_else(ApiError::authentication_required)
}

/// A path capture the route pattern guarantees.
pub(crate) fn path_param<'a>(request: &'a HttpRequest, name: &str) -> Result<&'a str, ApiError> {
    request
        .param(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing path parameter `{}`", name)))
}

/// The body as a JSON object; an absent body is an empty object.
pub(crate) fn body_fields(request: &HttpRequest) -> Result<Fields, ApiError> {
    match &request.body {
        None => Ok(Fields::new()),
        Some(Value::Object(fields)) => Ok(fields.clone()),
        Some(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

/// Decode the body into `T`; an absent body decodes from `{}`.
pub(crate) fn body_as<T: DeserializeOwned>(request: &HttpRequest) -> Result<T, ApiError> {
    let body = request.body.clone().unwrap_or_else(|| Value::Object(Fields::new()));
    serde_json::from_value(body).map_err(|_| ApiError::bad_request("Invalid request body"))
}
