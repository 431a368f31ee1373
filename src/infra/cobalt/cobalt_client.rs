// Client for a cobalt media-resolution instance (https://github.com/imputnet/cobalt).
// The API takes a media URL and answers with either a direct/tunneled file
// URL, a picker of several media items, or an error code.

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CobaltStatus {
    Error,
    Tunnel,
    Redirect,
    Picker,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PickerKind {
    Photo,
    Video,
    Gif,
}

impl PickerKind {
    /// Extension used when naming picker attachments (`1.mp4`, `2.jpg`, ...).
    pub fn extension(self) -> &'static str {
        match self {
            PickerKind::Video => "mp4",
            PickerKind::Photo => "jpg",
            PickerKind::Gif => "gif",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickerItem {
    #[serde(rename = "type")]
    pub kind: PickerKind,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CobaltError {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CobaltResponse {
    pub status: CobaltStatus,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub picker: Option<Vec<PickerItem>>,
    pub error: Option<CobaltError>,
}

pub struct CobaltClient {
    http: reqwest::Client,
    instance_url: String,
    api_key: Option<String>,
}

impl CobaltClient {
    pub fn new(instance_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            instance_url,
            api_key,
        }
    }

    /// Ask the instance to resolve `url` into downloadable media.
    pub async fn resolve(&self, url: &str) -> anyhow::Result<CobaltResponse> {
        let mut request = self
            .http
            .post(&self.instance_url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "url": url }));
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Api-Key {key}"));
        }

        let response = request
            .send()
            .await
            .context("cobalt instance unreachable")?;
        Ok(response
            .json::<CobaltResponse>()
            .await
            .context("cobalt response was not valid JSON")?)
    }

    /// Download a resolved file into memory for re-upload as an attachment.
    pub async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("failed to download file: {}", response.status());
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Normalize an API error code ("error.api.link.invalid") to the form used
/// by the translation keys ("link_invalid").
pub fn normalize_error_code(code: &str) -> String {
    code.trim_start_matches("error.api.")
        .replace('.', "_")
        .replace("invalid_body", "link_invalid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_picker_responses() {
        let json = r#"{
            "status": "picker",
            "picker": [
                { "type": "photo", "url": "https://a" },
                { "type": "video", "url": "https://b" }
            ]
        }"#;

        let response: CobaltResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, CobaltStatus::Picker);
        let picker = response.picker.unwrap();
        assert_eq!(picker.len(), 2);
        assert_eq!(picker[0].kind.extension(), "jpg");
        assert_eq!(picker[1].kind.extension(), "mp4");
    }

    #[test]
    fn deserializes_error_responses() {
        let json = r#"{ "status": "error", "error": { "code": "error.api.link.invalid" } }"#;
        let response: CobaltResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, CobaltStatus::Error);
        assert_eq!(response.error.unwrap().code, "error.api.link.invalid");
    }

    #[test]
    fn normalizes_api_error_codes() {
        assert_eq!(normalize_error_code("error.api.link.invalid"), "link_invalid");
        assert_eq!(normalize_error_code("error.api.invalid_body"), "link_invalid");
        assert_eq!(
            normalize_error_code("error.api.fetch.empty"),
            "fetch_empty"
        );
    }
}
