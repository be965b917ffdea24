use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) fn sign_for_test(claims: &Claims, secret: &str) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: usize) -> Claims {
        Claims {
            sub: "jane@company.com".into(),
            employee_id: 10,
            tenant_id: 1,
            role: 2,
            exp,
        }
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn accepts_token_signed_with_same_secret() {
        let token = sign_for_test(&claims(far_future()), "secret");
        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.employee_id, 10);
        assert_eq!(decoded.tenant_id, 1);
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let token = sign_for_test(&claims(far_future()), "secret");
        assert!(verify_token(&token, "other").is_err());

        let expired = sign_for_test(&claims(1_000), "secret");
        assert!(verify_token(&expired, "secret").is_err());
    }
}
