//! Row Store Queries
//!
//! JSON-encoded query and permission strings understood by the hosted
//! row store's REST API.

use serde_json::json;

pub fn equal(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

pub fn order_desc(attribute: &str) -> String {
    json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

pub fn limit(n: usize) -> String {
    json!({ "method": "limit", "values": [n] }).to_string()
}

pub fn offset(n: usize) -> String {
    json!({ "method": "offset", "values": [n] }).to_string()
}

/// Read/update/delete permissions for a single user
pub fn user_permissions(user_id: &str) -> Vec<String> {
    ["read", "update", "delete"]
        .iter()
        .map(|action| format!("{}(\"user:{}\")", action, user_id))
        .collect()
}
