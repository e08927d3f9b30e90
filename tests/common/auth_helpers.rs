//! Session token helpers

use chrono::Duration;
use storefront_layout::backend::auth::create_token;

pub const JWT_SECRET: &str = "integration-secret";

/// Token for `store_id`, valid for an hour
pub fn store_token(store_id: &str) -> String {
    create_token(JWT_SECRET, store_id, "owner", Duration::hours(1))
        .expect("Failed to create test token")
}

/// Token for `store_id` that expired two hours ago
pub fn expired_token(store_id: &str) -> String {
    create_token(JWT_SECRET, store_id, "owner", Duration::hours(-2))
        .expect("Failed to create test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
