use std::path::PathBuf;

use crate::audio::synth::synthesize_loop_audio;
use crate::captions::build::{build_tiktok_caption, build_youtube_caption};
use crate::encode::ffmpeg::{cleanup_frames, encode_video_with_audio, extract_cover};
use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::interpret::prompt::{Interpretation, interpret};
use crate::publish::{PlatformPostResult, PublishConfig, PublishRequest, distribute};
use crate::session::paths::{
    GenerationPaths, GenerationToken, PublicAssets, TempGuard, finalize_public_assets,
};
use crate::visual::render::{RenderOpts, render_visual_loop_with};

/// Explicit configuration for one generator instance: output locations and
/// publisher credentials. Constructed by the caller (the CLI builds it from
/// flags and env vars); the library never reads ambient state.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Root for per-token temporary workspaces.
    pub temp_root: PathBuf,
    /// Root for finalized, publicly addressable assets.
    pub public_root: PathBuf,
    /// URL prefix corresponding to `public_root`.
    pub public_base_url: String,
    pub publish: PublishConfig,
    pub render: RenderOpts,
}

impl GeneratorConfig {
    pub fn new(
        temp_root: impl Into<PathBuf>,
        public_root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            temp_root: temp_root.into(),
            public_root: public_root.into(),
            public_base_url: public_base_url.into(),
            publish: PublishConfig::default(),
            render: RenderOpts::default(),
        }
    }
}

/// The complete response contract for one generation run. Serialized field
/// names match the public payload (`videoUrl`, `tikTokCaption`, ...).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub prompt: String,
    pub interpretation: Interpretation,
    #[serde(flatten)]
    pub assets: PublicAssets,
    pub duration_seconds: u32,
    pub fps: u32,
    pub tik_tok_caption: String,
    pub you_tube_caption: String,
    pub posts: Vec<PlatformPostResult>,
}

/// Run the full generation pipeline for one prompt.
///
/// Stage order: interpret → render → synthesize → encode → cover → frame
/// cleanup → finalize public assets → captions → distribute. A whitespace-only
/// prompt is rejected before any filesystem activity. Stage failures abort
/// the run; platform publish failures do not (they land as `failed` entries
/// in `posts`). The token-scoped temp workspace is removed on every exit
/// path by a drop guard.
#[tracing::instrument(skip(config))]
pub async fn generate(prompt: &str, config: &GeneratorConfig) -> LoopforgeResult<GenerationResult> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(LoopforgeError::validation("prompt is required"));
    }

    let interpretation = interpret(trimmed);
    let token = GenerationToken::new();
    let paths = GenerationPaths::new(&config.temp_root, &token);
    paths.prepare()?;
    let _guard = TempGuard::new(&paths);

    // Render, synthesis, and encode are CPU/subprocess work; keep them off
    // the async executor.
    let stage_interp = interpretation.clone();
    let stage_paths = paths.clone();
    let render_opts = config.render;
    tokio::task::spawn_blocking(move || -> LoopforgeResult<()> {
        render_visual_loop_with(&stage_interp, &stage_paths, &render_opts)?;
        synthesize_loop_audio(&stage_interp, &stage_paths)?;
        encode_video_with_audio(&stage_paths, &stage_interp)?;
        extract_cover(&stage_paths)?;
        // The encode is durable at this point; a frame cleanup failure must
        // not mask it.
        if let Err(e) = cleanup_frames(&stage_paths) {
            tracing::warn!(error = %e, "frame cleanup failed after successful encode");
        }
        Ok(())
    })
    .await
    .map_err(|e| LoopforgeError::Other(anyhow::anyhow!("generation stage task failed: {e}")))??;

    let assets = finalize_public_assets(&paths, &token, &config.public_root, &config.public_base_url)?;

    let tik_tok_caption = build_tiktok_caption(trimmed, &interpretation);
    let you_tube_caption = build_youtube_caption(trimmed, &interpretation);

    let posts = distribute(
        &config.publish,
        &PublishRequest {
            video_path: paths.video_path.clone(),
            cover_path: paths.cover_path.clone(),
            title: interpretation.title.clone(),
            tik_tok_caption: tik_tok_caption.clone(),
            you_tube_caption: you_tube_caption.clone(),
        },
    )
    .await;

    Ok(GenerationResult {
        prompt: trimmed.to_string(),
        duration_seconds: interpretation.duration_seconds,
        fps: interpretation.fps,
        interpretation,
        assets,
        tik_tok_caption,
        you_tube_caption,
        posts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Canvas;

    fn config(root: &std::path::Path) -> GeneratorConfig {
        GeneratorConfig::new(root.join("tmp"), root.join("public"), "/generated")
    }

    #[tokio::test]
    async fn whitespace_prompt_fails_validation_before_any_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());

        let err = generate("   \n\t ", &cfg).await.unwrap_err();
        assert!(err.is_validation());
        assert!(!cfg.temp_root.exists());
        assert!(!cfg.public_root.exists());
    }

    #[tokio::test]
    async fn stage_failure_still_removes_temp_workspace() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = config(tmp.path());
        // A zero-width canvas makes the PNG writer reject every frame, which
        // stands in for an arbitrary mid-pipeline stage failure.
        cfg.render = RenderOpts {
            canvas: Canvas {
                width: 0,
                height: 0,
            },
        };

        let err = generate("iridescent slime stretch", &cfg).await.unwrap_err();
        assert!(matches!(err, LoopforgeError::Render(_)));

        // Guard ran: the temp root exists but holds no token workspaces.
        let leftovers: Vec<_> = std::fs::read_dir(&cfg.temp_root)
            .map(|it| it.collect())
            .unwrap_or_default();
        assert!(leftovers.is_empty());
        assert!(!cfg.public_root.exists());
    }

    #[test]
    fn result_serializes_with_payload_field_names() {
        let interpretation = crate::interpret::prompt::interpret("bubble pour");
        let result = GenerationResult {
            prompt: "bubble pour".into(),
            duration_seconds: interpretation.duration_seconds,
            fps: interpretation.fps,
            interpretation,
            assets: crate::session::paths::PublicAssets {
                video_url: "/g/t/loop.mp4".into(),
                audio_url: "/g/t/audio.wav".into(),
                cover_url: "/g/t/cover.png".into(),
            },
            tik_tok_caption: "t".into(),
            you_tube_caption: "y".into(),
            posts: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("videoUrl").is_some());
        assert!(json.get("audioUrl").is_some());
        assert!(json.get("coverUrl").is_some());
        assert!(json.get("tikTokCaption").is_some());
        assert!(json.get("youTubeCaption").is_some());
        assert!(json.get("durationSeconds").is_some());
        assert!(json.get("posts").is_some());
    }
}
