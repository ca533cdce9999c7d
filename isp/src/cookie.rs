//! Reading request cookies and formatting `Set-Cookie` values.

use http::header::{COOKIE, HeaderMap};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::macros::format_description;

/// Returns the value of the first cookie named `name` across all Cookie headers.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Formats a timestamp the way cookie `expires` attributes are written:
/// `Thu, 31-Dec-37 23:59:59 GMT`. Years past 2037 use four digits, since
/// two-digit years above 37 are read as 19xx by older clients.
pub fn cookie_date(at: SystemTime) -> Result<String, time::error::Format> {
    let at = OffsetDateTime::from(at);
    if at.year() > 2037 {
        at.format(format_description!(
            "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
        ))
    } else {
        at.format(format_description!(
            "[weekday repr:short], [day]-[month repr:short]-[year repr:last_two] [hour]:[minute]:[second] GMT"
        ))
    }
}

/// Builds a `Set-Cookie` value.
pub fn set_cookie_value(name: &str, value: &str, expires: &str, domain: &str, path: &str) -> String {
    format!("{name}={value}; expires={expires}; Domain={domain}; Path={path};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::time::Duration;

    #[test]
    fn test_find_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; neonimg_p1_v1=2f"));
        headers.append(COOKIE, HeaderValue::from_static("neonglobaluserid=abc; a=3"));

        assert_eq!(find_cookie(&headers, "a"), Some("1"));
        assert_eq!(find_cookie(&headers, "neonimg_p1_v1"), Some("2f"));
        assert_eq!(find_cookie(&headers, "neonglobaluserid"), Some("abc"));
        assert_eq!(find_cookie(&headers, "neonimg_p1"), None);
        assert_eq!(find_cookie(&HeaderMap::new(), "a"), None);
    }

    #[test]
    fn test_cookie_date_formats() {
        // 2014-05-01 12:34:56 UTC, a Thursday
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_398_947_696);
        assert_eq!(cookie_date(at).unwrap(), "Thu, 01-May-14 12:34:56 GMT");

        // 2040-01-01 00:00:00 UTC, a Sunday
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(2_208_988_800);
        assert_eq!(cookie_date(at).unwrap(), "Sun, 01-Jan-2040 00:00:00 GMT");
    }

    #[test]
    fn test_set_cookie_value_layout() {
        assert_eq!(
            set_cookie_value("n", "v", "Thu, 31-Dec-37 23:59:59 GMT", ".neon-images.com", "/"),
            "n=v; expires=Thu, 31-Dec-37 23:59:59 GMT; Domain=.neon-images.com; Path=/;"
        );
    }
}
