use serde::{Deserialize, Serialize};

/// Access-token claims. `userId` matches the payload shape the companion
/// auth service signs; verification resolves it to the acting user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}
