/// Canonicalizes a language tag for comparison.
///
/// The tag is lower-cased and any Unicode extension sequence (`-u-…`)
/// is removed together with everything after it.
pub fn canonicalize_locale(tag: &str) -> String {
    let mut canonical = tag.trim().to_ascii_lowercase();
    if let Some(position) = canonical.find("-u-") {
        canonical.truncate(position);
    }
    canonical
}

/// Returns the next coarser candidate by removing the rightmost subtag.
///
/// A single-character subtag left dangling, such as the `x` in `zh-hant-x-foo`,
/// is removed as well since it cannot stand on its own.
fn strip_subtag(candidate: &str) -> Option<&str> {
    let mut position = candidate.rfind('-')?;
    let bytes = candidate.as_bytes();
    if position >= 2 && bytes[position - 2] == b'-' {
        position -= 2;
    }
    Some(&candidate[..position])
}

/// Matches the requested language tags against the available locales.
///
/// Tags are tried in order. For each tag the canonical form is compared
/// case-insensitively with the available locales, then progressively coarser
/// forms are tried by dropping the rightmost subtag, so `de-AT` falls back to `de`.
/// The first hit is returned with the casing of `available`; when nothing
/// matches, `default_locale` is returned.
pub fn match_locale<'a, R, A>(
    requested: &[R],
    available: &'a [A],
    default_locale: &'a str,
) -> &'a str
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    for tag in requested {
        let tag = tag.as_ref();
        let canonical = canonicalize_locale(tag);
        let mut candidate = canonical.as_str();
        while !candidate.is_empty() {
            let found = available
                .iter()
                .map(|locale| locale.as_ref())
                .find(|locale| locale.eq_ignore_ascii_case(candidate));
            if let Some(locale) = found {
                tracing::debug!(requested = tag, locale, "locale matched");
                return locale;
            }
            match strip_subtag(candidate) {
                Some(coarser) => candidate = coarser,
                None => break,
            }
        }
    }
    default_locale
}
