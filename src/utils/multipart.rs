use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;

use crate::api::error;

/// Cap on each text part of a form.
pub const MAX_FIELD_BYTES: usize = 8 * 1024;
/// Cap on the number of parts in one form, file included.
pub const MAX_PARTS: usize = 16;

/// The single file part of an upload form.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Drain a multipart payload. The part named `file_field` is buffered as the
/// upload (capped at `max_bytes`); every other part is read as a UTF-8 text field
/// of at most `MAX_FIELD_BYTES`. Forms with more than `MAX_PARTS` parts are refused.
pub async fn read_upload_form(
    mut payload: Multipart,
    file_field: &str,
    max_bytes: usize,
) -> Result<UploadForm, error::Error> {
    let mut form = UploadForm::default();
    let mut parts = 0;

    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        parts += 1;
        if parts > MAX_PARTS {
            return Err(error::Error::bad_request("Too many form fields"));
        }
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(|f| f.to_string());
            let content_type = field.content_type().map(|m| m.essence_str().to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) =
                field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
            {
                if bytes.len() + chunk.len() > max_bytes {
                    return Err(error::Error::bad_request(format!(
                        "File size exceeds maximum allowed size of {} bytes",
                        max_bytes
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            form.file = Some(UploadedFile { filename, content_type, bytes });
        } else {
            let mut value = Vec::new();
            while let Some(chunk) =
                field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
            {
                if value.len() + chunk.len() > MAX_FIELD_BYTES {
                    return Err(error::Error::bad_request(format!("Field '{name}' is too large")));
                }
                value.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(value)
                .map_err(|_| error::Error::bad_request(format!("Field '{name}' is not valid UTF-8")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
