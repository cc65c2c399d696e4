//! Catalog API authentication
//!
//! The server exchanges a private key for a JWT which is then sent as a
//! bearer token on every API request.

use serde::{Deserialize, Serialize};

/// Username sent with key-based logins; the server identifies the user by key
pub const KEY_LOGIN_USER: &str = "unused";

/// Body of `POST /v1/authenticate`
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    #[serde(rename = "privateKey")]
    pub private_key: &'a str,
    #[serde(rename = "createIfMissing")]
    pub create_if_missing: bool,
}

impl<'a> AuthRequest<'a> {
    /// Login with an existing account's private key, never creating one
    pub fn with_key(private_key: &'a str) -> Self {
        Self {
            username: KEY_LOGIN_USER,
            private_key,
            create_if_missing: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub jwt: String,
}

/// Authorization header value for a token
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
