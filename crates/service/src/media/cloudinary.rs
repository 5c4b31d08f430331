use std::time::Duration;

use async_trait::async_trait;
use configs::{MediaConfig, MediaCredentials};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::{ImageUpload, MediaError, MediaHost, UploadedImage};

const SIGNATURE_ALGORITHM: &str = "sha256";

/// Cloudinary upload API client using signed requests.
pub struct CloudinaryMediaHost {
    client: reqwest::Client,
    base_url: String,
    credentials: MediaCredentials,
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryMediaHost {
    pub fn new(credentials: MediaCredentials, cfg: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .map_err(|e| MediaError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            credentials,
            folder: cfg.folder.clone().filter(|f| !f.trim().is_empty()),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1_1/{}/image/{}", self.base_url, self.credentials.cloud_name, action)
    }

    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.credentials.api_secret)
    }

    async fn read_error(resp: reqwest::Response) -> MediaError {
        let status = resp.status().as_u16();
        let message = match resp.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error message".to_string(),
        };
        MediaError::Rejected { status, message }
    }
}

/// Sorted `key=value` pairs joined by `&`; empty values are left out.
pub fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut pairs: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex SHA-256 of the string to sign with the API secret appended.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn unix_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

#[async_trait]
impl MediaHost for CloudinaryMediaHost {
    #[instrument(skip(self, image), fields(size = image.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
        if image.is_empty() {
            return Err(MediaError::EmptyFile);
        }

        let mut signed = vec![("timestamp", unix_timestamp())];
        if let Some(folder) = &self.folder {
            signed.push(("folder", folder.clone()));
        }
        let signature = self.sign(&signed);

        let file_name = image.file_name.clone().unwrap_or_else(|| "upload".to_string());
        let mut part = Part::bytes(image.bytes.to_vec()).file_name(file_name);
        if let Some(ct) = &image.content_type {
            part = part.mime_str(ct).map_err(|e| MediaError::Http(e.to_string()))?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", SIGNATURE_ALGORITHM);
        for (k, v) in signed {
            form = form.text(k, v);
        }

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }

        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;
        debug!(public_id = %body.public_id, "image uploaded");
        Ok(UploadedImage { secure_url: body.secure_url, public_id: body.public_id })
    }

    #[instrument(skip(self))]
    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let signed = vec![("public_id", public_id.to_string()), ("timestamp", unix_timestamp())];
        let signature = self.sign(&signed);

        let mut form: Vec<(&str, String)> = signed;
        form.push(("api_key", self.credentials.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", SIGNATURE_ALGORITHM.to_string()));

        let resp = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }

        let body: DestroyResponse = resp
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaError::InvalidResponse(format!("destroy result {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn host(base_url: &str) -> CloudinaryMediaHost {
        let cfg = MediaConfig { base_url: base_url.to_string(), ..MediaConfig::default() };
        let creds = MediaCredentials {
            cloud_name: "demo".into(),
            api_key: "1234".into(),
            api_secret: "shh".into(),
        };
        CloudinaryMediaHost::new(creds, &cfg).unwrap()
    }

    #[test]
    fn string_to_sign_is_sorted_and_skips_empty_values() {
        let params = vec![
            ("timestamp", "1315060510".to_string()),
            ("folder", String::new()),
            ("public_id", "sample".to_string()),
        ];
        assert_eq!(string_to_sign(&params), "public_id=sample&timestamp=1315060510");
    }

    #[test]
    fn signature_is_hex_sha256_and_depends_on_secret() {
        let params = vec![("timestamp", "1315060510".to_string())];
        let a = sign_params(&params, "secret-a");
        let b = sign_params(&params, "secret-b");
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(a, sign_params(&params, "secret-a"));
    }

    #[tokio::test]
    async fn upload_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .and(body_string_contains("name=\"api_key\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "public_id": "abc123",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/abc123.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploaded = host(&server.uri())
            .upload(ImageUpload::new(b"fake-jpeg-bytes".to_vec()).with_file_name("ada.jpg").with_content_type("image/jpeg"))
            .await
            .unwrap();
        assert_eq!(uploaded.public_id, "abc123");
        assert_eq!(uploaded.secure_url, "https://res.cloudinary.com/demo/image/upload/abc123.jpg");
    }

    #[tokio::test]
    async fn upload_error_carries_host_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Invalid Signature" }
            })))
            .mount(&server)
            .await;

        let err = host(&server.uri()).upload(ImageUpload::new(vec![1, 2, 3])).await.unwrap_err();
        match err {
            MediaError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_image_is_not_sent() {
        let server = MockServer::start().await;
        let err = host(&server.uri()).upload(ImageUpload::new(Vec::new())).await.unwrap_err();
        assert!(matches!(err, MediaError::EmptyFile));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_accepts_ok_and_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/destroy"))
            .and(body_string_contains("public_id=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "not found" })))
            .mount(&server)
            .await;

        host(&server.uri()).delete("abc123").await.unwrap();
    }
}
