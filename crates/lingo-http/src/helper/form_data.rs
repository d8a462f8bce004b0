use bytes::Bytes;
use futures::{future, stream};
use lingo_core::error::Error;
use multer::Multipart;
use std::convert::Infallible;

/// Returns the text of the first non-file field of a `multipart/form-data` body
/// whose name satisfies the predicate.
pub(crate) async fn find_text_field(
    content_type: &str,
    body: Bytes,
    mut predicate: impl FnMut(&str) -> bool,
) -> Result<Option<String>, Error> {
    let boundary = multer::parse_boundary(content_type)?;
    let body = stream::once(future::ready(Ok::<_, Infallible>(body)));
    let mut multipart = Multipart::new(body, boundary);
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_none() && field.name().is_some_and(&mut predicate) {
            let text = field.text().await?;
            return Ok(Some(text.trim().to_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::find_text_field;
    use bytes::Bytes;
    use futures::executor::block_on;

    const CONTENT_TYPE: &str = "multipart/form-data; boundary=X-LINGO-BOUNDARY";

    fn multipart_body(fields: &[(&str, Option<&str>, &str)]) -> Bytes {
        let mut body = String::new();
        for &(name, file_name, value) in fields {
            body.push_str("--X-LINGO-BOUNDARY\r\n");
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n"
                )),
            }
            body.push_str("\r\n");
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str("--X-LINGO-BOUNDARY--\r\n");
        Bytes::from(body)
    }

    #[test]
    fn it_finds_text_fields() {
        let body = multipart_body(&[
            ("csrf_token_file", Some("token.txt"), "file"),
            ("name", None, "lingo"),
            ("1_csrf_token", None, " abc123 "),
        ]);
        let value = block_on(find_text_field(CONTENT_TYPE, body.clone(), |name| {
            name.contains("csrf_token")
        }));
        assert_eq!(value.unwrap().as_deref(), Some("abc123"));

        let value = block_on(find_text_field(CONTENT_TYPE, body, |name| name == "email"));
        assert_eq!(value.unwrap(), None);
    }

    #[test]
    fn it_requires_a_boundary() {
        let body = multipart_body(&[("name", None, "lingo")]);
        let value = block_on(find_text_field("multipart/form-data", body, |_| true));
        assert!(value.is_err());
    }
}
