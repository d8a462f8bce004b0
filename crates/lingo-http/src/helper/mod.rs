/// Helper utilities.
mod cookie;
mod form_data;
mod query;

pub(crate) use self::cookie::{build_cookie, get_cookie};
pub(crate) use self::form_data::find_text_field;
pub(crate) use self::query::{get_header_str, get_query_param, with_query_param};
