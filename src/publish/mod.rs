pub mod tiktok;
pub mod youtube;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::LoopforgeResult;
use crate::publish::tiktok::TikTokPublisher;
use crate::publish::youtube::YouTubePublisher;

/// Supported publishing destinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::TikTok, Platform::YouTube];

    pub fn label(self) -> &'static str {
        match self {
            Platform::TikTok => "TikTok",
            Platform::YouTube => "YouTube Shorts",
        }
    }
}

/// Outcome of one platform attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Success,
    Failed,
    Skipped,
}

/// One entry per attempted platform, independent of its siblings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlatformPostResult {
    pub platform: Platform,
    pub status: PostStatus,
    pub detail: String,
}

/// Everything a platform needs to publish one finalized loop.
#[derive(Clone, Debug)]
pub struct PublishRequest {
    pub video_path: PathBuf,
    pub cover_path: PathBuf,
    pub title: String,
    pub tik_tok_caption: String,
    pub you_tube_caption: String,
}

#[derive(Clone, Debug)]
pub struct TikTokCredentials {
    pub access_token: String,
}

#[derive(Clone, Debug)]
pub struct YouTubeCredentials {
    pub access_token: String,
}

/// Explicit publisher configuration. Platforms left as `None` are reported
/// as skipped rather than attempted. Passed in by the caller; the library
/// never reads the ambient environment.
#[derive(Clone, Debug)]
pub struct PublishConfig {
    pub tiktok: Option<TikTokCredentials>,
    pub youtube: Option<YouTubeCredentials>,
    /// Upper bound per outbound HTTP call; exceeding it is a platform
    /// failure, not a fatal error.
    pub request_timeout: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            tiktok: None,
            youtube: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Single-shot publish seam. HTTP clients implement this for real platforms;
/// tests inject fakes.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// Attempt one publish; `Ok` carries a human-readable success detail.
    async fn publish(&self, request: &PublishRequest) -> LoopforgeResult<String>;
}

/// A platform slot: configured with a publisher, or unconfigured (skipped).
pub type PublisherSlot = (Platform, Option<Box<dyn PlatformPublisher>>);

fn slots_from_config(config: &PublishConfig) -> Vec<PublisherSlot> {
    Platform::ALL
        .into_iter()
        .map(|platform| {
            let publisher: Option<Box<dyn PlatformPublisher>> = match platform {
                Platform::TikTok => config.tiktok.clone().map(|creds| {
                    Box::new(TikTokPublisher::new(creds, config.request_timeout))
                        as Box<dyn PlatformPublisher>
                }),
                Platform::YouTube => config.youtube.clone().map(|creds| {
                    Box::new(YouTubePublisher::new(creds, config.request_timeout))
                        as Box<dyn PlatformPublisher>
                }),
            };
            (platform, publisher)
        })
        .collect()
}

/// Fan the finalized assets out to every supported platform.
///
/// Always returns exactly one result per [`Platform::ALL`] member, in that
/// order. Attempts run concurrently and are joined all-settled: one
/// platform's failure becomes its own `failed` entry and never aborts a
/// sibling or the overall request. No retries; single attempt per platform.
pub async fn distribute(config: &PublishConfig, request: &PublishRequest) -> Vec<PlatformPostResult> {
    distribute_to(slots_from_config(config), request).await
}

/// Distribution over explicit slots; the seam used by tests with fake
/// publishers.
pub async fn distribute_to(
    slots: Vec<PublisherSlot>,
    request: &PublishRequest,
) -> Vec<PlatformPostResult> {
    let attempts = slots.into_iter().map(|(platform, publisher)| async move {
        let Some(publisher) = publisher else {
            return PlatformPostResult {
                platform,
                status: PostStatus::Skipped,
                detail: format!("{} credentials not configured", platform.label()),
            };
        };
        match publisher.publish(request).await {
            Ok(detail) => PlatformPostResult {
                platform,
                status: PostStatus::Success,
                detail,
            },
            Err(e) => {
                tracing::warn!(platform = platform.label(), error = %e, "platform publish failed");
                PlatformPostResult {
                    platform,
                    status: PostStatus::Failed,
                    detail: e.to_string(),
                }
            }
        }
    });
    futures::future::join_all(attempts).await
}
