use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::interpret::prompt::Interpretation;
use crate::session::paths::GenerationPaths;

/// ffmpeg image2 input pattern; must stay in sync with
/// [`crate::visual::render::frame_path`] naming.
pub const FRAME_INPUT_PATTERN: &str = "frame_%05d.png";

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LoopforgeResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn count_frames(frames_dir: &Path) -> LoopforgeResult<u32> {
    let entries = std::fs::read_dir(frames_dir).map_err(|e| {
        LoopforgeError::encode(format!(
            "failed to read frame directory '{}': {e}",
            frames_dir.display()
        ))
    })?;
    let mut count = 0u32;
    for entry in entries {
        let entry = entry.map_err(|e| {
            LoopforgeError::encode(format!("failed to list frame directory entry: {e}"))
        })?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("frame_") && name.ends_with(".png") {
            count += 1;
        }
    }
    Ok(count)
}

/// Mux the rendered frame sequence and the synthesized audio into a single
/// MP4 at `paths.video_path` via the system `ffmpeg` binary.
///
/// We intentionally shell out to `ffmpeg` rather than linking FFmpeg to avoid
/// native dev header/lib requirements. Fails loudly before spawning when the
/// frame count is zero, disagrees with the interpretation, or the audio file
/// is missing; never silently truncates.
#[tracing::instrument(skip(paths, interpretation))]
pub fn encode_video_with_audio(
    paths: &GenerationPaths,
    interpretation: &Interpretation,
) -> LoopforgeResult<()> {
    let frames = count_frames(&paths.frames_dir)?;
    if frames == 0 {
        return Err(LoopforgeError::encode(format!(
            "no frames found in '{}'",
            paths.frames_dir.display()
        )));
    }
    if frames != interpretation.frame_count() {
        return Err(LoopforgeError::encode(format!(
            "frame count mismatch: found {frames}, interpretation expects {}",
            interpretation.frame_count()
        )));
    }
    if !paths.audio_path.is_file() {
        return Err(LoopforgeError::encode(format!(
            "audio file '{}' is missing",
            paths.audio_path.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(LoopforgeError::encode(
            "ffmpeg is required for MP4 encoding, but was not found on PATH",
        ));
    }
    ensure_parent_dir(&paths.video_path)?;

    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null()).stdout(Stdio::null());
    cmd.args(["-y", "-loglevel", "error", "-framerate"])
        .arg(interpretation.fps.to_string())
        .arg("-i")
        .arg(paths.frames_dir.join(FRAME_INPUT_PATTERN))
        .arg("-i")
        .arg(&paths.audio_path)
        .args([
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
            "-movflags",
            "+faststart",
        ])
        .arg(&paths.video_path);

    let output = cmd.output().map_err(|e| {
        LoopforgeError::encode(format!(
            "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LoopforgeError::encode(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Extract the cover image: a copy of frame 0.
pub fn extract_cover(paths: &GenerationPaths) -> LoopforgeResult<()> {
    let first = crate::visual::render::frame_path(&paths.frames_dir, 0);
    std::fs::copy(&first, &paths.cover_path).map_err(|e| {
        LoopforgeError::encode(format!(
            "failed to extract cover from '{}': {e}",
            first.display()
        ))
    })?;
    Ok(())
}

/// Delete the intermediate frame sequence. Call only after the encode has
/// durably completed; a failure here is reported so the caller can log it
/// without masking the successful encode.
pub fn cleanup_frames(paths: &GenerationPaths) -> LoopforgeResult<()> {
    std::fs::remove_dir_all(&paths.frames_dir).map_err(|e| {
        LoopforgeError::encode(format!(
            "failed to remove frame directory '{}': {e}",
            paths.frames_dir.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::prompt::interpret;
    use crate::session::paths::{GenerationPaths, GenerationToken};

    fn workspace() -> (tempfile::TempDir, GenerationPaths) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        paths.prepare().unwrap();
        (tmp, paths)
    }

    #[test]
    fn encode_rejects_empty_frame_dir() {
        let (_tmp, paths) = workspace();
        std::fs::write(&paths.audio_path, b"wav").unwrap();
        let err = encode_video_with_audio(&paths, &interpret("slime")).unwrap_err();
        assert!(err.to_string().contains("no frames"));
    }

    #[test]
    fn encode_rejects_frame_count_mismatch() {
        let (_tmp, paths) = workspace();
        std::fs::write(&paths.audio_path, b"wav").unwrap();
        std::fs::write(paths.frames_dir.join("frame_00000.png"), b"png").unwrap();
        let err = encode_video_with_audio(&paths, &interpret("slime")).unwrap_err();
        assert!(err.to_string().contains("frame count mismatch"));
    }

    #[test]
    fn encode_rejects_missing_audio() {
        let (_tmp, paths) = workspace();
        let interp = interpret("slime");
        for i in 0..interp.frame_count() {
            std::fs::write(
                crate::visual::render::frame_path(&paths.frames_dir, i),
                b"png",
            )
            .unwrap();
        }
        let err = encode_video_with_audio(&paths, &interp).unwrap_err();
        assert!(err.to_string().contains("audio file"));
    }

    #[test]
    fn cover_is_a_copy_of_frame_zero() {
        let (_tmp, paths) = workspace();
        std::fs::write(
            crate::visual::render::frame_path(&paths.frames_dir, 0),
            b"frame0-bytes",
        )
        .unwrap();
        extract_cover(&paths).unwrap();
        assert_eq!(std::fs::read(&paths.cover_path).unwrap(), b"frame0-bytes");
    }

    #[test]
    fn cleanup_removes_frames_and_reports_missing_dir() {
        let (_tmp, paths) = workspace();
        std::fs::write(paths.frames_dir.join("frame_00000.png"), b"png").unwrap();
        cleanup_frames(&paths).unwrap();
        assert!(!paths.frames_dir.exists());
        assert!(cleanup_frames(&paths).is_err());
    }
}
