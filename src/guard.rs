use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::app_state::AppState;
use crate::cookies;
use crate::sessions::SessionRegistry;

/// Read the raw session token out of the request's `Cookie` header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies::decode(header, cookie_name)
}

/// Resolve the caller's identity from the request cookies. Pure lookup, no
/// mutation: decode the session cookie, then ask the registry who owns the
/// token.
pub fn authenticate(
    headers: &HeaderMap,
    cookie_name: &str,
    registry: &SessionRegistry,
) -> Option<String> {
    let token = session_token(headers, cookie_name)?;
    registry.resolve(&token)
}

/// The identity resolved for the current request, or `None` for anonymous
/// callers. Extracted per request and discarded with the response.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<String>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticate(
            &parts.headers,
            &state.config().session.cookie_name,
            state.sessions(),
        );
        Ok(CurrentUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn resolves_identity_for_live_token() {
        let registry = SessionRegistry::new();
        let token = registry.create("alice");
        let headers = headers_with_cookie(&format!("portal_session={token}"));

        assert_eq!(
            authenticate(&headers, "portal_session", &registry).as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn revoked_token_is_anonymous() {
        let registry = SessionRegistry::new();
        let token = registry.create("alice");
        registry.revoke(&token);
        let headers = headers_with_cookie(&format!("portal_session={token}"));

        assert_eq!(authenticate(&headers, "portal_session", &registry), None);
    }

    #[test]
    fn missing_cookie_header_is_anonymous() {
        let registry = SessionRegistry::new();
        registry.create("alice");

        assert_eq!(authenticate(&HeaderMap::new(), "portal_session", &registry), None);
    }

    #[test]
    fn forged_token_is_anonymous() {
        let registry = SessionRegistry::new();
        registry.create("alice");
        let headers = headers_with_cookie("portal_session=forged");

        assert_eq!(authenticate(&headers, "portal_session", &registry), None);
    }
}
