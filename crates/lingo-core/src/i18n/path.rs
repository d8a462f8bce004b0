use crate::{JsonValue, LazyLock};
use regex::Regex;
use std::borrow::Cow;

/// Bracket notation for array indexes, e.g. `items[0]`.
static BRACKET_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\w+)\]").expect("fail to create a regex for the bracket notation")
});

/// A segment of a path into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Object key. Numeric keys also index into arrays.
    Key(&'a str),
    /// Array index. Also used as a key for objects.
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    #[inline]
    fn from(key: &'a str) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    #[inline]
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Steps into a child of `value`.
fn child<'a>(value: &'a JsonValue, segment: PathSegment<'_>) -> Option<&'a JsonValue> {
    match (value, segment) {
        (JsonValue::Object(map), PathSegment::Key(key)) => map.get(key),
        (JsonValue::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
        (JsonValue::Array(vec), PathSegment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|index| vec.get(index))
        }
        (JsonValue::Array(vec), PathSegment::Index(index)) => vec.get(index),
        _ => None,
    }
}

/// Looks up a value by path segments.
///
/// It returns `None` if any segment does not exist. An explicit `null`
/// is found as `Some(&JsonValue::Null)`.
pub fn lookup_segments<'a>(
    value: &'a JsonValue,
    segments: &[PathSegment<'_>],
) -> Option<&'a JsonValue> {
    segments
        .iter()
        .try_fold(value, |current, &segment| child(current, segment))
}

/// Looks up a value by a dot-notated path like `a.b.c` or `a.items[1]`.
///
/// An empty path addresses `value` itself.
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }

    let path = if path.contains('[') {
        BRACKET_INDEX.replace_all(path, ".$1")
    } else {
        Cow::Borrowed(path)
    };
    path.split('.')
        .try_fold(value, |current, key| child(current, PathSegment::Key(key)))
}

#[cfg(test)]
mod tests {
    use super::{PathSegment, lookup_path, lookup_segments};
    use crate::{JsonValue, json};

    fn fixture() -> JsonValue {
        json!({
            "a": { "b": { "c": 1 }, "arr": [10, 20, 30] },
            "x": null,
            "z": 0,
        })
    }

    #[test]
    fn it_lookups_dot_notated_paths() {
        let value = fixture();
        assert_eq!(lookup_path(&value, "a.b.c"), Some(&json!(1)));
        assert_eq!(lookup_path(&value, "a.arr.1"), Some(&json!(20)));
        assert_eq!(lookup_path(&value, "a.arr[2]"), Some(&json!(30)));
        assert_eq!(lookup_path(&value, "z"), Some(&json!(0)));
        assert_eq!(lookup_path(&value, ""), Some(&value));
    }

    #[test]
    fn it_lookups_path_segments() {
        let value = fixture();
        let segments: [PathSegment<'_>; 3] = ["a".into(), "b".into(), "c".into()];
        assert_eq!(lookup_segments(&value, &segments), Some(&json!(1)));

        let segments = [PathSegment::Key("a"), PathSegment::Key("arr"), PathSegment::Index(0)];
        assert_eq!(lookup_segments(&value, &segments), Some(&json!(10)));
    }

    #[test]
    fn it_distinguishes_null_from_missing() {
        let value = fixture();
        assert_eq!(lookup_path(&value, "x"), Some(&JsonValue::Null));
        assert_eq!(lookup_path(&value, "y"), None);
        assert_eq!(lookup_path(&value, "a.b.d"), None);
        assert_eq!(lookup_path(&value, "notfound"), None);
        assert_eq!(lookup_path(&value, "x.y"), None);
        assert_eq!(lookup_path(&value, "a.arr.5"), None);
        assert_eq!(lookup_path(&value, "a.arr.first"), None);
    }
}
