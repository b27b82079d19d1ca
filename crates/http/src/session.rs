//! Cookie-backed session identity.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use mission_chat_core::constants::SESSION_COOKIE_NAME;
use uuid::Uuid;

/// The caller's session id. A request without a valid cookie gets a fresh
/// id, and the response then carries the `Set-Cookie` header for it.
#[derive(Debug, Clone)]
pub struct SessionId {
    id: String,
    issued: bool,
}

impl SessionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    const fn is_new(&self) -> bool {
        self.issued
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE_NAME).and_then(|v| Uuid::parse_str(v).ok()) {
            Some(id) => Self { id: id.to_string(), issued: false },
            None => Self { id: Uuid::new_v4().to_string(), issued: true },
        }
    }

    fn set_cookie_header(&self) -> Option<HeaderValue> {
        let cookie = format!("{SESSION_COOKIE_NAME}={}; HttpOnly; SameSite=Lax; Path=/", self.id);
        HeaderValue::from_str(&cookie).ok()
    }
}

fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl IntoResponseParts for SessionId {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.issued {
            if let Some(cookie) = self.set_cookie_header() {
                res.headers_mut().append(SET_COOKIE, cookie);
            }
        }
        Ok(res)
    }
}
