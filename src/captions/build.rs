use crate::interpret::prompt::{Interpretation, Trigger};

/// Hashtags specific to the trigger category, shared by both platforms so the
/// captions stay thematically consistent.
fn trigger_tags(trigger: Trigger) -> &'static [&'static str] {
    match trigger {
        Trigger::KineticSand => &["#kineticsand", "#sandasmr", "#crunchy"],
        Trigger::SlimeStretch => &["#slime", "#slimeasmr", "#satisfyingslime"],
        Trigger::BubblePour => &["#bubbles", "#waterasmr", "#pouring"],
        Trigger::GlassTapping => &["#tapping", "#tappingasmr", "#glasssounds"],
    }
}

/// TikTok caption: short hook line plus a dense hashtag block. Pure and
/// deterministic.
pub fn build_tiktok_caption(prompt: &str, interpretation: &Interpretation) -> String {
    let tags = trigger_tags(interpretation.trigger).join(" ");
    format!(
        "{} 🔁 {}\n\n{} #asmr #satisfying #loop #fyp",
        interpretation.title,
        prompt.trim(),
        tags
    )
}

/// YouTube Shorts caption: title-led copy with a lighter tag set and the
/// mandatory `#Shorts`. Pure and deterministic.
pub fn build_youtube_caption(prompt: &str, interpretation: &Interpretation) -> String {
    let tags = trigger_tags(interpretation.trigger)
        .iter()
        .take(2)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{}\n\nA seamless {}s {} loop — {}. Prompt: \"{}\".\n\n#Shorts #ASMR {}",
        interpretation.title,
        interpretation.duration_seconds,
        interpretation.trigger.label().to_lowercase(),
        interpretation.visual_mood,
        prompt.trim(),
        tags
    )
}
