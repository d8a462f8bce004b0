use crate::{JsonValue, LazyLock};
use regex::{Captures, Regex};

/// Placeholders of the form `{{ key.path }}`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(.*?)\}\}").expect("fail to create a regex for the template placeholder")
});

/// Formats the value which replaces a placeholder.
///
/// Arrays are flattened into comma-separated elements, where `null` elements
/// are left empty. Objects have no textual form.
fn format_value(value: Option<&JsonValue>) -> String {
    match value {
        Some(JsonValue::String(s)) => s.clone(),
        Some(value @ (JsonValue::Number(_) | JsonValue::Bool(_))) => value.to_string(),
        Some(JsonValue::Array(vec)) => vec
            .iter()
            .map(|value| format_value(Some(value)))
            .collect::<Vec<_>>()
            .join(","),
        _ => String::new(),
    }
}

/// Renders a template by replacing every `{{ key }}` with the matching value in `data`.
///
/// Keys are dot-notated paths into objects and arrays, e.g. `{{ user.name }}`
/// or `{{ 0 }}`. Missing keys, `null` values and objects render as an empty
/// string, while arrays render their elements separated by commas.
pub fn render_template(template: &str, data: &JsonValue) -> String {
    if !template.contains("{{") {
        return template.to_owned();
    }
    PLACEHOLDER
        .replace_all(template, |captures: &Captures<'_>| {
            let key = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            format_value(super::lookup_path(data, key))
        })
        .into_owned()
}
