//! Unsigned, JWT-shaped session tokens.
//!
//! Tokens are `header.payload.signature` in base64url without padding. The
//! header says `alg: none` and the signature is a constant, so anyone can mint
//! one for any email. Callers are identified from the bearer header, then the
//! `token` query parameter, then the `session` cookie.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

const SIGNATURE: &[u8] = b"totally-secure-signature";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    pub iat: i64,
}

pub fn issue_token(email: &str, issued_at: i64) -> String {
    let header = serde_json::json!({"alg": "none", "typ": "JWT"});
    let claims = TokenClaims {
        email: email.to_string(),
        iat: issued_at,
    };
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims).unwrap_or_default()),
        URL_SAFE_NO_PAD.encode(SIGNATURE)
    )
}

/// Reads the payload segment. The signature is never checked.
pub fn decode_token(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Failed to decode token payload: {}", error);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(error) => {
            tracing::error!("Failed to parse token payload: {}", error);
            None
        }
    }
}

/// Email of the caller, trusting whichever token source shows up first.
pub fn resolve_caller(headers: &HeaderMap, query_token: Option<&str>) -> Option<String> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    tracing::info!("Auth header was: {:?}", authorization);

    let token = bearer_token(authorization)
        .or_else(|| query_token.filter(|token| !token.is_empty()).map(ToString::to_string))
        .or_else(|| cookie_value(headers, SESSION_COOKIE))?;
    decode_token(&token).map(|claims| claims.email)
}

fn bearer_token(authorization: Option<&str>) -> Option<String> {
    let (scheme, token) = authorization?.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn issued_tokens_decode_to_their_claims() {
        let token = issue_token("alice@example.com", 1_700_000_000);
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));
        assert_eq!(
            decode_token(&token),
            Some(TokenClaims {
                email: "alice@example.com".to_string(),
                iat: 1_700_000_000,
            })
        );
    }

    #[test]
    fn forged_tokens_are_accepted() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"email":"admin@example.com","iat":0}"#);
        let forged = format!("x.{payload}.not-a-signature");
        assert_eq!(
            decode_token(&forged).map(|claims| claims.email).as_deref(),
            Some("admin@example.com")
        );
    }

    #[test]
    fn garbage_tokens_decode_to_none() {
        assert_eq!(decode_token("abc123"), None);
        assert_eq!(decode_token("a.!!!.c"), None);
        assert_eq!(decode_token(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("[]"))), None);
    }

    #[test]
    fn caller_resolution_prefers_bearer_then_query_then_cookie() {
        let bearer = issue_token("bearer@example.com", 1);
        let query = issue_token("query@example.com", 1);
        let cookie = issue_token("cookie@example.com", 1);

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("debug=1; session={cookie}")).unwrap(),
        );
        assert_eq!(
            resolve_caller(&headers, None).as_deref(),
            Some("cookie@example.com")
        );
        assert_eq!(
            resolve_caller(&headers, Some(&query)).as_deref(),
            Some("query@example.com")
        );

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bearer}")).unwrap(),
        );
        assert_eq!(
            resolve_caller(&headers, Some(&query)).as_deref(),
            Some("bearer@example.com")
        );
    }

    #[test]
    fn anonymous_callers_resolve_to_none() {
        assert_eq!(resolve_caller(&HeaderMap::new(), None), None);
        assert_eq!(resolve_caller(&HeaderMap::new(), Some("")), None);
    }
}
