use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

/// A parsed multipart request: text fields by name plus the public URLs of
/// any uploaded files, already written under the upload directory.
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub images: Vec<String>,
}

pub async fn read_form(config: &AppConfig, multipart: &mut Multipart) -> AppResult<UploadForm> {
    let mut fields = HashMap::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let file_name = field.file_name().map(str::to_string);
        match file_name {
            Some(original) => {
                let data = field.bytes().await.map_err(bad_multipart)?;
                if data.is_empty() {
                    continue;
                }
                let ext = Path::new(&original)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{e}"))
                    .unwrap_or_default();
                let stored_name = format!("{}{}", Uuid::new_v4(), ext);

                tokio::fs::create_dir_all(&config.upload_dir)
                    .await
                    .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
                let path = Path::new(&config.upload_dir).join(&stored_name);
                tokio::fs::write(&path, &data)
                    .await
                    .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

                images.push(format!(
                    "{}/uploads/{}",
                    config.server_url.trim_end_matches('/'),
                    stored_name
                ));
            }
            None => {
                let name = field.name().unwrap_or_default().to_string();
                let value = field.text().await.map_err(bad_multipart)?;
                fields.insert(name, value);
            }
        }
    }

    Ok(UploadForm { fields, images })
}

impl UploadForm {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> AppResult<String> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("missing field `{name}`")))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> AppResult<T> {
        self.require(name)?
            .parse::<T>()
            .map_err(|_| AppError::BadRequest(format!("invalid value for field `{name}`")))
    }

    pub fn parse_opt<T: FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("invalid value for field `{name}`"))),
        }
    }
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("malformed multipart payload: {err}"))
}

#[cfg(test)]
mod tests {
    use super::UploadForm;
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            images: vec![],
        }
    }

    #[test]
    fn require_rejects_missing_and_empty() {
        let f = form(&[("name", "Desk"), ("empty", "")]);
        assert_eq!(f.require("name").unwrap(), "Desk");
        assert!(f.require("empty").is_err());
        assert!(f.require("absent").is_err());
    }

    #[test]
    fn parse_reports_bad_numbers() {
        let f = form(&[("price", "1999"), ("remains", "many")]);
        assert_eq!(f.parse::<i64>("price").unwrap(), 1999);
        assert!(f.parse::<i32>("remains").is_err());
        assert_eq!(f.parse_opt::<i32>("absent").unwrap(), None);
    }
}
