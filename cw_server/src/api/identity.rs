//! Caller identity extraction.
//!
//! Authentication is the gateway's job: it validates the caller's token
//! against the auth service and forwards the resolved user id in the
//! `x-user-id` header. This module only lifts that header into a typed
//! extractor; a missing or malformed header becomes `Caller(None)`, which
//! the ledger engine rejects as not authenticated. The extractor itself
//! never fails, so the "Not authenticated" error always comes from the
//! engine in the wire's error-variant shape.

use axum::{extract::FromRequestParts, http::request::Parts};
use casino_wallet::ledger::UserId;
use std::convert::Infallible;

/// Header carrying the gateway-resolved user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Gateway-asserted caller identity.
///
/// # Example
///
/// ```rust,no_run
/// use cw_server::api::identity::Caller;
///
/// async fn handler(Caller(user_id): Caller) -> String {
///     match user_id {
///         Some(id) => format!("caller is user {id}"),
///         None => "anonymous".to_string(),
///     }
/// }
/// # let _ = handler;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Option<UserId>);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok());

        Ok(Caller(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Caller {
        let (mut parts, ()) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_header_present() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.0, Some(42));
    }

    #[tokio::test]
    async fn test_header_missing() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.0, None);
    }

    #[tokio::test]
    async fn test_header_malformed() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-number")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.0, None);
    }
}
