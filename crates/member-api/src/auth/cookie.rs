//! 토큰 쿠키 처리.
//!
//! 액세스 토큰은 루트 경로 쿠키로, 리프레시 토큰은 리프레시 엔드포인트
//! 경로로만 전송되는 쿠키로 내려갑니다. 둘 다 HttpOnly이며 Secure
//! 플래그는 설정으로 제어합니다 (TLS 배포에서만 켭니다).

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

/// 액세스 토큰 쿠키 이름.
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// 리프레시 토큰 쿠키 이름.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// 리프레시 토큰 쿠키가 전송되는 경로.
pub const REFRESH_COOKIE_PATH: &str = "/auth/refresh";

/// 요청 헤더에서 이름으로 쿠키 값을 찾습니다.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
        .next()
}

/// Set-Cookie 헤더 값 생성.
///
/// JWT와 쿠키 속성만 담으므로 헤더 값으로 항상 유효합니다.
pub fn build_cookie(
    name: &str,
    value: &str,
    path: &str,
    max_age_secs: i64,
    secure: bool,
) -> HeaderValue {
    let mut cookie = format!(
        "{name}={value}; HttpOnly; SameSite=Lax; Path={path}; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).expect("cookie value contains no invalid header characters")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_get_cookie_single() {
        let headers = headers_with_cookie("accessToken=abc.def.ghi");
        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_get_cookie_among_many() {
        let headers = headers_with_cookie("theme=dark; accessToken=tok; lang=ko");
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME).as_deref(), Some("tok"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), None);
    }

    #[test]
    fn test_get_cookie_absent() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), None);
    }

    #[test]
    fn test_build_cookie_attributes() {
        let cookie = build_cookie(ACCESS_COOKIE_NAME, "tok", "/", 3600, false);
        let value = cookie.to_str().unwrap();

        assert!(value.starts_with("accessToken=tok"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=3600"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn test_build_cookie_secure_flag() {
        let cookie = build_cookie(REFRESH_COOKIE_NAME, "tok", REFRESH_COOKIE_PATH, 60, true);
        let value = cookie.to_str().unwrap();

        assert!(value.contains("Path=/auth/refresh"));
        assert!(value.contains("Secure"));
    }
}
