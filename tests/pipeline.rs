use std::path::Path;
use std::process::Command;

use loopforge::{
    Canvas, GeneratorConfig, PostStatus, RenderOpts, Trigger, generate,
};

fn ffmpeg_tools_available() -> bool {
    let probe = |bin: &str| {
        Command::new(bin)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    };
    probe("ffmpeg") && probe("ffprobe")
}

fn container_duration_secs(path: &Path) -> f64 {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .expect("run ffprobe");
    assert!(out.status.success(), "ffprobe failed");
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).expect("ffprobe json");
    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .expect("ffprobe duration")
}

#[tokio::test]
async fn whitespace_prompt_is_rejected_before_any_output() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = GeneratorConfig::new(
        tmp.path().join("tmp"),
        tmp.path().join("public"),
        "/generated",
    );
    let err = generate("   ", &cfg).await.unwrap_err();
    assert!(err.is_validation());
    assert!(!cfg.temp_root.exists());
    assert!(!cfg.public_root.exists());
}

#[tokio::test]
async fn end_to_end_crunchy_kinetic_sand() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping end_to_end_crunchy_kinetic_sand: ffmpeg/ffprobe not on PATH");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = GeneratorConfig::new(
        tmp.path().join("tmp"),
        tmp.path().join("public"),
        "/generated",
    );
    // Small canvas keeps the test fast; the pipeline is otherwise identical.
    cfg.render = RenderOpts {
        canvas: Canvas {
            width: 108,
            height: 192,
        },
    };

    let result = generate("Crunchy kinetic sand ASMR", &cfg).await.unwrap();

    assert_eq!(result.interpretation.trigger, Trigger::KineticSand);
    assert!((6..=15).contains(&result.duration_seconds));
    assert!([24, 30].contains(&result.fps));

    for url in [
        &result.assets.video_url,
        &result.assets.audio_url,
        &result.assets.cover_url,
    ] {
        assert!(url.starts_with("/generated/"), "unexpected url '{url}'");
        let rel = url.trim_start_matches("/generated/");
        assert!(
            cfg.public_root.join(rel).is_file(),
            "missing public asset for '{url}'"
        );
    }

    assert!(result.tik_tok_caption.contains("#kineticsand"));
    assert!(result.you_tube_caption.contains("#Shorts"));

    assert_eq!(result.posts.len(), 2);
    assert!(result.posts.iter().all(|p| p.status == PostStatus::Skipped));

    // Temp workspace removed on the success path too.
    let leftovers: Vec<_> = std::fs::read_dir(&cfg.temp_root)
        .map(|it| it.collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty(), "temp workspaces left behind");

    // Container duration tracks frame count / fps.
    let video_rel = result.assets.video_url.trim_start_matches("/generated/");
    let duration = container_duration_secs(&cfg.public_root.join(video_rel));
    let expected = f64::from(result.duration_seconds);
    assert!(
        (duration - expected).abs() < 0.75,
        "container duration {duration} vs expected {expected}"
    );
}
