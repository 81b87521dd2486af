//! Domain records stored in the `items` and `users` collections.
//!
//! Items are partly schemaless: fields the API does not interpret (description,
//! category, imageUrls, ...) travel through `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Identity;
use crate::store::Fields;

/// Fields a client may never set directly on an item.
pub const PROTECTED_ITEM_FIELDS: &[&str] = &[
    "id",
    "userId",
    "createdAt",
    "updatedAt",
    "claimCount",
    "isAvailable",
    "isGivenAway",
    "claimedBy",
    "claimedAt",
    "completedAt",
    "givenAwayAt",
];

/// Profile fields a client may update.
pub const EDITABLE_PROFILE_FIELDS: &[&str] = &["displayName", "phone", "address", "bio", "photoURL", "location"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_given_away: bool,
    #[serde(default)]
    pub claim_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_away_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Item {
    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.user_id == uid
    }
}

/// Body of `POST /items/:id/complete`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteInput {
    #[serde(default, alias = "claimedBy")]
    pub claimed_by_user_id: Option<String>,
}

/// Body of `POST /auth/verify`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyInput {
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    /// A fresh profile seeded from a verified identity.
    pub fn from_identity(identity: &Identity, now: &str) -> Self {
        Self {
            uid: identity.uid.clone(),
            display_name: identity.name.clone().unwrap_or_default(),
            email: identity.email.clone().unwrap_or_default(),
            photo_url: identity.picture.clone().unwrap_or_default(),
            phone: None,
            address: None,
            bio: None,
            location: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// The subset of a profile visible to anyone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub uid: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<UserProfile> for PublicProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            uid: profile.uid,
            display_name: profile.display_name,
            photo_url: profile.photo_url,
            bio: profile.bio,
            location: profile.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub given_items_count: usize,
    pub offered_items_count: usize,
}

/// Keep only the keys in `allowed`.
pub fn retain_fields(mut fields: Fields, allowed: &[&str]) -> Fields {
    fields.retain(|key, _| allowed.contains(&key.as_str()));
    fields
}

/// Drop every key in `denied`.
pub fn strip_fields(mut fields: Fields, denied: &[&str]) -> Fields {
    fields.retain(|key, _| !denied.contains(&key.as_str()));
    fields
}

/// Serialize a record into store fields.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(serde::ser::Error::custom(format!("expected an object, got {}", other))),
    }
}
