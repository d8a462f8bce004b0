use http::{HeaderMap, Uri, header::AsHeaderName, uri::PathAndQuery};
use lingo_core::error::Error;
use url::form_urlencoded;

/// Gets a header value as `&str`.
pub(crate) fn get_header_str<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Gets the first value of a query parameter.
pub(crate) fn get_query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Returns a copy of the URI with the query parameter set to `value`,
/// or removed if `value` is `None`.
///
/// Setting replaces the first occurrence in place and drops the others;
/// a parameter which is not present yet is appended.
pub(crate) fn with_query_param(uri: &Uri, name: &str, value: Option<&str>) -> Result<Uri, Error> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut replaced = false;
    if let Some(query) = uri.query() {
        for (key, current) in form_urlencoded::parse(query.as_bytes()) {
            if key != name {
                serializer.append_pair(&key, &current);
            } else if let Some(value) = value.filter(|_| !replaced) {
                serializer.append_pair(name, value);
                replaced = true;
            }
        }
    }
    if let Some(value) = value.filter(|_| !replaced) {
        serializer.append_pair(name, value);
    }

    let query = serializer.finish();
    let path = uri.path();
    let path_and_query = if query.is_empty() {
        PathAndQuery::try_from(path)?
    } else {
        PathAndQuery::try_from(format!("{path}?{query}"))?
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|err| Error::with_source("fail to rebuild the URI", err))
}
