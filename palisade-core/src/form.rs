//! Submitted form processing
//!
//! URL-encoded bodies are decoded in place. Multipart bodies go through
//! `multer`; only text fields are read, file parts are skipped.

use crate::Error;
use bytes::Bytes;

/// Parse URL-encoded form data into ordered key/value pairs
pub fn parse_form_pairs(body: &[u8]) -> Result<Vec<(String, String)>, Error> {
    serde_urlencoded::from_bytes(body)
        .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))
}

/// First value submitted for `name`, if any
pub fn form_value(body: &[u8], name: &str) -> Result<Option<String>, Error> {
    let pairs = parse_form_pairs(body)?;
    Ok(pairs.into_iter().find(|(key, _)| key == name).map(|(_, value)| value))
}

/// Encode key/value pairs as a URL-encoded form body
pub fn encode_form(pairs: &[(&str, &str)]) -> Result<String, Error> {
    serde_urlencoded::to_string(pairs)
        .map_err(|e| Error::Serialization(format!("Failed to encode form data: {}", e)))
}

/// First text value submitted for `name` in a `multipart/form-data` body
pub async fn multipart_value(
    content_type: &str,
    body: Vec<u8>,
    name: &str,
) -> Result<Option<String>, Error> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| Error::BadRequest(format!("Invalid multipart content type: {}", e)))?;

    let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to parse multipart data: {}", e)))?
    {
        if field.name() != Some(name) || field.file_name().is_some() {
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|e| Error::BadRequest(format!("Failed to read multipart field: {}", e)))?;
        return Ok(Some(text));
    }

    Ok(None)
}

/// Build a `multipart/form-data` body from text fields.
///
/// Returns the body and the matching `Content-Type` value.
pub fn encode_multipart(boundary: &str, fields: &[(&str, &str)]) -> (Vec<u8>, String) {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    (
        body.into_bytes(),
        format!("multipart/form-data; boundary={boundary}"),
    )
}
