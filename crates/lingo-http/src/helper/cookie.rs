use cookie::{Cookie, time::Duration};
use http::{HeaderMap, header::COOKIE};

/// Gets the cookie with the given name from the `cookie` headers.
pub(crate) fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cookie<'a>> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
}

/// Builds a cookie scoped to the whole site.
pub(crate) fn build_cookie(
    name: &str,
    value: &str,
    max_age: Option<std::time::Duration>,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_owned(), value.to_owned()))
        .path("/")
        .build();
    if let Some(max_age) = max_age {
        let seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        cookie.set_max_age(Duration::seconds(seconds));
    }
    cookie
}
