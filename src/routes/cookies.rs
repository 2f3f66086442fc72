use axum::http::{HeaderMap, HeaderValue, header};

pub use push::server::cookie_value;

use crate::{auth::SessionTokens, error::AppError};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// `Set-Cookie` headers carrying a freshly issued session.
pub fn session_cookies(tokens: &SessionTokens, secure: bool) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie(ACCESS_COOKIE, &tokens.access_token, tokens.access_ttl_secs, secure)?,
    );
    headers.append(
        header::SET_COOKIE,
        cookie(REFRESH_COOKIE, &tokens.refresh_token, tokens.refresh_ttl_secs, secure)?,
    );
    Ok(headers)
}

/// Expires both session cookies on the client.
pub fn cleared_session_cookies(secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
        // Name and attributes are fixed ASCII, so this always parses.
        if let Ok(value) = cookie(name, "", 0, secure) {
            headers.append(header::SET_COOKIE, value);
        }
    }
    headers
}

fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, AppError> {
    // Browsers drop `SameSite=None` cookies that are not also `Secure`.
    let attributes = if secure {
        "HttpOnly; Secure; SameSite=None"
    } else {
        "HttpOnly; SameSite=Lax"
    };
    HeaderValue::from_str(&format!(
        "{name}={value}; Path=/; Max-Age={}; {attributes}",
        max_age.max(0)
    ))
    .map_err(|err| AppError::internal(format!("invalid cookie value: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> SessionTokens {
        SessionTokens {
            access_token: "access.jwt".to_string(),
            refresh_token: "refresh.jwt".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        }
    }

    #[test]
    fn session_cookies_are_http_only_cross_site() {
        let headers = session_cookies(&tokens(), true).expect("cookies");
        let values: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().expect("ascii").to_string())
            .collect();

        assert_eq!(
            values,
            vec![
                "accessToken=access.jwt; Path=/; Max-Age=900; HttpOnly; Secure; SameSite=None",
                "refreshToken=refresh.jwt; Path=/; Max-Age=604800; HttpOnly; Secure; SameSite=None",
            ]
        );
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        let headers = cleared_session_cookies(false);
        assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(
            headers
                .get_all(header::SET_COOKIE)
                .iter()
                .all(|value| value.to_str().is_ok_and(|value| value.contains("Max-Age=0")))
        );
    }

    #[test]
    fn reads_named_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("accessToken=abc; refreshToken=def"),
        );

        assert_eq!(cookie_value(&headers, REFRESH_COOKIE).as_deref(), Some("def"));
        assert_eq!(cookie_value(&headers, ACCESS_COOKIE).as_deref(), Some("abc"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
