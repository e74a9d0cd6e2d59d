use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::session::{SESSION_COOKIE, SessionId};

const SESSION_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Restores the caller's session id from the `cart_session` cookie, minting a
/// fresh one when absent or unparseable. The id is made available to handlers
/// as a `SessionId` extension; newly minted ids are set on the response.
pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    let existing = req
        .headers()
        .get(http::header::COOKIE)
        .and_then(|header| header.to_str().ok())
        .and_then(session_id_from_cookies);

    let (session_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    };

    req.extensions_mut().insert(SessionId(session_id));

    let mut response = next.run(req).await;

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, session_id, SESSION_MAX_AGE_SECS
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response
                .headers_mut()
                .append(http::header::SET_COOKIE, value);
        }
    }

    response
}

fn session_id_from_cookies(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let header = format!("theme=dark; cart_session={}; lang=en", id);

        assert_eq!(session_id_from_cookies(&header), Some(id));
    }

    #[test]
    fn rejects_garbage_session_values() {
        assert_eq!(session_id_from_cookies("cart_session=not-a-uuid"), None);
        assert_eq!(session_id_from_cookies(""), None);
        assert_eq!(session_id_from_cookies("other=value"), None);
    }
}
