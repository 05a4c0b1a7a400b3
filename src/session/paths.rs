use std::fmt;
use std::path::{Path, PathBuf};

use crate::foundation::error::{LoopforgeError, LoopforgeResult};

/// Opaque identifier for one generation run. Namespaces every temporary and
/// public path so concurrent runs can never collide. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GenerationToken(uuid::Uuid);

impl GenerationToken {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for GenerationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Filesystem locations for one run, all scoped under `<temp_base>/<token>`.
/// Owned exclusively by that run; the temp portion is deleted by
/// [`TempGuard`] on every exit path, while finalized public copies persist.
#[derive(Clone, Debug)]
pub struct GenerationPaths {
    pub temp_root: PathBuf,
    pub frames_dir: PathBuf,
    pub audio_path: PathBuf,
    pub video_path: PathBuf,
    pub cover_path: PathBuf,
}

impl GenerationPaths {
    /// Derive the path set. Pure; no filesystem activity until
    /// [`GenerationPaths::prepare`].
    pub fn new(temp_base: &Path, token: &GenerationToken) -> Self {
        let temp_root = temp_base.join(token.to_string());
        Self {
            frames_dir: temp_root.join("frames"),
            audio_path: temp_root.join("audio.wav"),
            video_path: temp_root.join("loop.mp4"),
            cover_path: temp_root.join("cover.png"),
            temp_root,
        }
    }

    /// Create the temp root and frame directory.
    pub fn prepare(&self) -> LoopforgeResult<()> {
        std::fs::create_dir_all(&self.frames_dir).map_err(|e| {
            LoopforgeError::render(format!(
                "failed to prepare generation workspace '{}': {e}",
                self.temp_root.display()
            ))
        })?;
        Ok(())
    }
}

/// Drop guard that removes the run's temp root on every exit path, including
/// stage failures and panics. Removal failure is logged, never surfaced: a
/// cleanup problem must not mask the pipeline outcome.
pub struct TempGuard {
    temp_root: PathBuf,
}

impl TempGuard {
    pub fn new(paths: &GenerationPaths) -> Self {
        Self {
            temp_root: paths.temp_root.clone(),
        }
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if !self.temp_root.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.temp_root) {
            tracing::warn!(
                temp_root = %self.temp_root.display(),
                error = %e,
                "failed to remove generation temp directory"
            );
        }
    }
}

/// Public URLs for the finalized assets of one run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAssets {
    pub video_url: String,
    pub audio_url: String,
    pub cover_url: String,
}

/// Copy the encoder outputs to the token-keyed public location and return
/// stable URLs. This is the single serialization point after which the run's
/// externally visible artifacts are fixed.
pub fn finalize_public_assets(
    paths: &GenerationPaths,
    token: &GenerationToken,
    public_root: &Path,
    base_url: &str,
) -> LoopforgeResult<PublicAssets> {
    let dest_dir = public_root.join(token.to_string());
    std::fs::create_dir_all(&dest_dir).map_err(|e| {
        LoopforgeError::encode(format!(
            "failed to create public asset directory '{}': {e}",
            dest_dir.display()
        ))
    })?;

    for (src, name) in [
        (&paths.video_path, "loop.mp4"),
        (&paths.audio_path, "audio.wav"),
        (&paths.cover_path, "cover.png"),
    ] {
        std::fs::copy(src, dest_dir.join(name)).map_err(|e| {
            LoopforgeError::encode(format!(
                "failed to publish '{}' to '{}': {e}",
                src.display(),
                dest_dir.display()
            ))
        })?;
    }

    let base = base_url.trim_end_matches('/');
    Ok(PublicAssets {
        video_url: format!("{base}/{token}/loop.mp4"),
        audio_url: format!("{base}/{token}/audio.wav"),
        cover_url: format!("{base}/{token}/cover.png"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_scope_paths() {
        let a = GenerationToken::new();
        let b = GenerationToken::new();
        assert_ne!(a, b);

        let base = Path::new("/tmp/loopforge-test");
        let pa = GenerationPaths::new(base, &a);
        let pb = GenerationPaths::new(base, &b);
        assert_ne!(pa.temp_root, pb.temp_root);
        assert!(pa.frames_dir.starts_with(&pa.temp_root));
        assert!(pa.audio_path.starts_with(&pa.temp_root));
        assert!(pa.video_path.starts_with(&pa.temp_root));
        assert!(pa.cover_path.starts_with(&pa.temp_root));
    }

    #[test]
    fn temp_guard_removes_workspace_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        paths.prepare().unwrap();
        std::fs::write(paths.frames_dir.join("frame_00000.png"), b"x").unwrap();

        {
            let _guard = TempGuard::new(&paths);
            assert!(paths.temp_root.exists());
        }
        assert!(!paths.temp_root.exists());
    }

    #[test]
    fn temp_guard_tolerates_already_removed_root() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        let guard = TempGuard::new(&paths);
        // Never prepared; dropping must be a no-op.
        drop(guard);
    }

    #[test]
    fn finalize_copies_assets_and_builds_urls() {
        let tmp = tempfile::tempdir().unwrap();
        let token = GenerationToken::new();
        let paths = GenerationPaths::new(&tmp.path().join("tmp"), &token);
        paths.prepare().unwrap();
        std::fs::write(&paths.video_path, b"mp4").unwrap();
        std::fs::write(&paths.audio_path, b"wav").unwrap();
        std::fs::write(&paths.cover_path, b"png").unwrap();

        let public_root = tmp.path().join("public");
        let assets =
            finalize_public_assets(&paths, &token, &public_root, "/generated/").unwrap();

        assert_eq!(assets.video_url, format!("/generated/{token}/loop.mp4"));
        assert_eq!(assets.audio_url, format!("/generated/{token}/audio.wav"));
        assert_eq!(assets.cover_url, format!("/generated/{token}/cover.png"));
        assert!(public_root.join(token.to_string()).join("loop.mp4").exists());
        assert!(public_root.join(token.to_string()).join("cover.png").exists());
    }

    #[test]
    fn finalize_fails_loudly_when_outputs_are_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let token = GenerationToken::new();
        let paths = GenerationPaths::new(&tmp.path().join("tmp"), &token);
        paths.prepare().unwrap();

        let err = finalize_public_assets(&paths, &token, &tmp.path().join("public"), "/g")
            .unwrap_err();
        assert!(err.to_string().contains("failed to publish"));
    }
}
