use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::core::{Canvas, FrameBuf, LOOP_CANVAS};
use crate::foundation::error::{LoopforgeError, LoopforgeResult};
use crate::interpret::prompt::Interpretation;
use crate::session::paths::GenerationPaths;
use crate::visual::scene::paint_frame;

/// Renderer options. The canvas is fixed 9:16 in production; tests shrink it.
#[derive(Clone, Copy, Debug)]
pub struct RenderOpts {
    pub canvas: Canvas,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            canvas: LOOP_CANVAS,
        }
    }
}

/// Path of frame `i` inside `frames_dir`. Naming must stay in sync with
/// [`crate::encode::ffmpeg::FRAME_INPUT_PATTERN`].
pub fn frame_path(frames_dir: &Path, i: u32) -> PathBuf {
    frames_dir.join(format!("frame_{i:05}.png"))
}

/// Render the full visual loop: exactly `interpretation.frame_count()`
/// sequentially numbered PNGs in `paths.frames_dir`.
///
/// Motion is driven purely by `phase = TAU * i / count`, so the sequence is
/// seam-free when played on repeat. Frames are independent and rendered in
/// parallel; the first I/O failure aborts the run (partial frame output is
/// never valid).
#[tracing::instrument(skip(interpretation, paths))]
pub fn render_visual_loop(
    interpretation: &Interpretation,
    paths: &GenerationPaths,
) -> LoopforgeResult<()> {
    render_visual_loop_with(interpretation, paths, &RenderOpts::default())
}

pub fn render_visual_loop_with(
    interpretation: &Interpretation,
    paths: &GenerationPaths,
    opts: &RenderOpts,
) -> LoopforgeResult<()> {
    let count = interpretation.frame_count();
    if count == 0 {
        return Err(LoopforgeError::render(
            "interpretation yields zero frames (duration * fps must be positive)",
        ));
    }
    let colors = interpretation.palette_colors()?;

    std::fs::create_dir_all(&paths.frames_dir).map_err(|e| {
        LoopforgeError::render(format!(
            "failed to create frame directory '{}': {e}",
            paths.frames_dir.display()
        ))
    })?;

    (0..count).into_par_iter().try_for_each(|i| {
        let phase = TAU * f64::from(i) / f64::from(count);
        let mut buf = FrameBuf::new(opts.canvas);
        paint_frame(interpretation.trigger, &mut buf, &colors, interpretation.seed, phase);

        let out = frame_path(&paths.frames_dir, i);
        image::save_buffer_with_format(
            &out,
            &buf.data,
            buf.width,
            buf.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            LoopforgeError::render(format!("failed to write frame '{}': {e}", out.display()))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::prompt::{Trigger, interpret};
    use crate::session::paths::{GenerationPaths, GenerationToken};

    fn tiny_interpretation() -> Interpretation {
        Interpretation {
            duration_seconds: 1,
            fps: 8,
            ..interpret("bubble pour")
        }
    }

    const TINY: RenderOpts = RenderOpts {
        canvas: Canvas {
            width: 48,
            height: 86,
        },
    };

    #[test]
    fn writes_exactly_frame_count_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        let interp = tiny_interpretation();
        assert_eq!(interp.trigger, Trigger::BubblePour);

        render_visual_loop_with(&interp, &paths, &TINY).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(&paths.frames_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names.len(), interp.frame_count() as usize);
        assert_eq!(names[0], "frame_00000.png");
        assert_eq!(*names.last().unwrap(), format!("frame_{:05}.png", interp.frame_count() - 1));
    }

    #[test]
    fn zero_frames_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        let interp = Interpretation {
            duration_seconds: 0,
            ..tiny_interpretation()
        };
        let err = render_visual_loop_with(&interp, &paths, &TINY).unwrap_err();
        assert!(err.to_string().contains("zero frames"));
    }

    #[test]
    fn unwritable_frame_dir_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut paths = GenerationPaths::new(tmp.path(), &GenerationToken::new());
        // Point the frame dir below a regular file so create_dir_all fails.
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        paths.frames_dir = blocker.join("frames");
        assert!(render_visual_loop_with(&tiny_interpretation(), &paths, &TINY).is_err());
    }
}
