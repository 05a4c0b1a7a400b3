use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::publish::{PlatformPublisher, PublishRequest, TikTokCredentials};

const UPLOAD_URL: &str = "https://open-api.tiktok.com/share/video/upload/";

/// Single-shot TikTok video upload over the share API.
pub struct TikTokPublisher {
    credentials: TikTokCredentials,
    timeout: Duration,
}

impl TikTokPublisher {
    pub fn new(credentials: TikTokCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }
}

#[async_trait]
impl PlatformPublisher for TikTokPublisher {
    async fn publish(&self, request: &PublishRequest) -> LoopforgeResult<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LoopforgeError::publish(format!("tiktok client setup failed: {e}")))?;

        let video = tokio::fs::read(&request.video_path).await.map_err(|e| {
            LoopforgeError::publish(format!(
                "failed to read video '{}': {e}",
                request.video_path.display()
            ))
        })?;
        let cover = tokio::fs::read(&request.cover_path).await.map_err(|e| {
            LoopforgeError::publish(format!(
                "failed to read cover '{}': {e}",
                request.cover_path.display()
            ))
        })?;

        let form = reqwest::multipart::Form::new()
            .text("caption", request.tik_tok_caption.clone())
            .part(
                "video",
                reqwest::multipart::Part::bytes(video)
                    .file_name("loop.mp4")
                    .mime_str("video/mp4")
                    .map_err(|e| LoopforgeError::publish(format!("tiktok form error: {e}")))?,
            )
            .part(
                "cover",
                reqwest::multipart::Part::bytes(cover)
                    .file_name("cover.png")
                    .mime_str("image/png")
                    .map_err(|e| LoopforgeError::publish(format!("tiktok form error: {e}")))?,
            );

        let response = client
            .post(UPLOAD_URL)
            .bearer_auth(&self.credentials.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| LoopforgeError::publish(format!("tiktok upload request failed: {e}")))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .unwrap_or(serde_json::Value::Null);
        if !status.is_success() {
            return Err(LoopforgeError::publish(format!(
                "tiktok upload rejected with status {status}: {body}"
            )));
        }

        let share_id = body
            .pointer("/data/share_id")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        Ok(format!("posted to TikTok (share_id {share_id})"))
    }
}
