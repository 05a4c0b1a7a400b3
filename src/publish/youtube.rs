use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::publish::{PlatformPublisher, PublishRequest, YouTubeCredentials};

const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=multipart&part=snippet,status";

/// Single-shot YouTube video insert (multipart upload). Shorts are ordinary
/// uploads; the vertical format and `#Shorts` tag do the classification.
pub struct YouTubePublisher {
    credentials: YouTubeCredentials,
    timeout: Duration,
}

impl YouTubePublisher {
    pub fn new(credentials: YouTubeCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }
}

#[async_trait]
impl PlatformPublisher for YouTubePublisher {
    async fn publish(&self, request: &PublishRequest) -> LoopforgeResult<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LoopforgeError::publish(format!("youtube client setup failed: {e}")))?;

        let video = tokio::fs::read(&request.video_path).await.map_err(|e| {
            LoopforgeError::publish(format!(
                "failed to read video '{}': {e}",
                request.video_path.display()
            ))
        })?;

        let metadata = serde_json::json!({
            "snippet": {
                "title": request.title,
                "description": request.you_tube_caption,
                "categoryId": "22",
            },
            "status": { "privacyStatus": "public" },
        });

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| LoopforgeError::publish(format!("youtube form error: {e}")))?,
            )
            .part(
                "video",
                reqwest::multipart::Part::bytes(video)
                    .file_name("loop.mp4")
                    .mime_str("video/mp4")
                    .map_err(|e| LoopforgeError::publish(format!("youtube form error: {e}")))?,
            );

        let response = client
            .post(UPLOAD_URL)
            .bearer_auth(&self.credentials.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| LoopforgeError::publish(format!("youtube upload request failed: {e}")))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .unwrap_or(serde_json::Value::Null);
        if !status.is_success() {
            return Err(LoopforgeError::publish(format!(
                "youtube upload rejected with status {status}: {body}"
            )));
        }

        let id = body.get("id").and_then(|v| v.as_str()).unwrap_or("unknown");
        Ok(format!("published as https://youtube.com/shorts/{id}"))
    }
}
