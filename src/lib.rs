//! Loopforge turns a short text prompt into a short, seamlessly looping
//! 9:16 ASMR video with matching procedural audio, then fans the result out
//! to short-form platforms.
//!
//! # Pipeline overview
//!
//! 1. **Interpret**: prompt -> [`Interpretation`] (trigger, mood, palette,
//!    duration, fps). Pure and reproducible: same prompt, same plan.
//! 2. **Render**: procedural loop-perfect PNG frames, one per
//!    `duration_seconds * fps`, all motion periodic in the loop phase.
//! 3. **Synthesize**: loop-matched stereo WAV on a circular time domain.
//! 4. **Encode**: frames + audio muxed to MP4 by the system `ffmpeg`
//!    binary; cover image extracted from frame 0.
//! 5. **Publish**: all-settled fan-out to TikTok and YouTube with
//!    per-platform success/failed/skipped isolation.
//!
//! Key constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: interpretation, rendering, and synthesis
//!   are pure functions of the prompt-derived seed.
//! - **Guaranteed teardown**: every run's temp workspace is token-scoped and
//!   removed on all exit paths, success or failure.
#![forbid(unsafe_code)]

mod audio;
mod captions;
mod encode;
mod foundation;
mod interpret;
mod pipeline;
mod publish;
mod session;
mod visual;

pub use audio::synth::{CHANNELS, SAMPLE_RATE, synthesize_loop_audio};
pub use captions::build::{build_tiktok_caption, build_youtube_caption};
pub use encode::ffmpeg::{
    FRAME_INPUT_PATTERN, cleanup_frames, encode_video_with_audio, ensure_parent_dir,
    extract_cover, is_ffmpeg_on_path,
};
pub use foundation::core::{Canvas, FrameBuf, LOOP_CANVAS, Point, Rgb8, Vec2};
pub use foundation::error::{LoopforgeError, LoopforgeResult};
pub use foundation::math::{Rng64, prompt_seed};
pub use interpret::prompt::{
    FPS_CHOICES, Interpretation, MAX_DURATION_SECONDS, MIN_DURATION_SECONDS, Trigger, interpret,
};
pub use pipeline::{GenerationResult, GeneratorConfig, generate};
pub use publish::{
    Platform, PlatformPostResult, PlatformPublisher, PostStatus, PublishConfig, PublishRequest,
    PublisherSlot, TikTokCredentials, YouTubeCredentials, distribute, distribute_to,
};
pub use session::paths::{
    GenerationPaths, GenerationToken, PublicAssets, TempGuard, finalize_public_assets,
};
pub use visual::render::{RenderOpts, frame_path, render_visual_loop, render_visual_loop_with};
pub use visual::scene::paint_frame;
