use serde::{Deserialize, Serialize};

/// Access token payload. Tokens are issued by the identity service and
/// only verified here.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub employee_id: u64,
    pub tenant_id: u64,
    pub role: u8, // role id
    pub exp: usize,
}
