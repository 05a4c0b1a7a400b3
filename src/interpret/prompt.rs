use crate::foundation::core::Rgb8;
use crate::foundation::error::LoopforgeResult;
use crate::foundation::math::{Rng64, prompt_seed};

/// Closed set of ASMR trigger categories. Every downstream stage dispatches
/// on this enum: the renderer picks a scene painter, the synthesizer picks a
/// waveform model, the caption builder picks a hashtag set.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    KineticSand,
    SlimeStretch,
    BubblePour,
    GlassTapping,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [
        Trigger::KineticSand,
        Trigger::SlimeStretch,
        Trigger::BubblePour,
        Trigger::GlassTapping,
    ];

    /// Human-readable label used in titles and captions.
    pub fn label(self) -> &'static str {
        match self {
            Trigger::KineticSand => "Kinetic Sand",
            Trigger::SlimeStretch => "Slime Stretch",
            Trigger::BubblePour => "Bubble Pour",
            Trigger::GlassTapping => "Glass Tapping",
        }
    }
}

/// Immutable output of the prompt interpreter. All downstream stages read
/// this value and nothing else, which is what keeps visuals and audio
/// thematically consistent.
///
/// Serialized field names match the public response payload
/// (`durationSeconds`, `visualMood`, ...).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub trigger: Trigger,
    pub title: String,
    pub visual_mood: String,
    pub motion_description: String,
    /// Ordered `#rrggbb` values; drives every fill/stroke downstream.
    pub palette: Vec<String>,
    pub duration_seconds: u32,
    pub fps: u32,
    /// Deterministic seed derived from the prompt; shared by the renderer
    /// and the synthesizer.
    pub seed: u64,
}

impl Interpretation {
    /// Exact frame count all stages must agree on.
    pub fn frame_count(&self) -> u32 {
        self.duration_seconds * self.fps
    }

    /// Palette parsed into colors. The interpreter only emits valid hex, so
    /// this fails only on hand-constructed interpretations.
    pub fn palette_colors(&self) -> LoopforgeResult<Vec<Rgb8>> {
        self.palette.iter().map(|h| Rgb8::from_hex(h)).collect()
    }
}

/// Duration bounds in whole seconds. Integer seconds keep
/// `duration_seconds * fps` an exact frame count.
pub const MIN_DURATION_SECONDS: u32 = 6;
pub const MAX_DURATION_SECONDS: u32 = 15;

/// Standard short-form frame rates the interpreter may choose from.
pub const FPS_CHOICES: [u32; 2] = [30, 24];

struct TriggerProfile {
    trigger: Trigger,
    keywords: &'static [&'static str],
    moods: &'static [&'static str],
    motion: &'static str,
    palettes: &'static [[&'static str; 3]],
}

const PROFILES: [TriggerProfile; 4] = [
    TriggerProfile {
        trigger: Trigger::KineticSand,
        keywords: &["sand", "crunch", "crunchy", "grain", "kinetic", "crumble"],
        moods: &["earthy calm", "sunlit warmth", "dusty amber"],
        motion: "granular ridges shearing and crumbling in a steady pulse",
        palettes: &[
            ["#d9a066", "#8a5a2b", "#f2d0a4"],
            ["#c2956b", "#6e4a24", "#e8c187"],
        ],
    },
    TriggerProfile {
        trigger: Trigger::SlimeStretch,
        keywords: &["slime", "stretch", "goo", "gooey", "putty", "iridescent"],
        moods: &["glossy dreamlike", "neon hypnotic", "pearlescent drift"],
        motion: "a glossy blob stretching tall and settling back without pause",
        palettes: &[
            ["#7b5ee6", "#31c8a8", "#f2f0ff"],
            ["#e65ec0", "#5ec8e6", "#2a2140"],
        ],
    },
    TriggerProfile {
        trigger: Trigger::BubblePour,
        keywords: &["bubble", "bubbles", "pour", "pouring", "fizz", "fluid", "liquid"],
        moods: &["cool aquatic", "midnight fizz", "soft lagoon"],
        motion: "bubbles rising through a slow pour, each on its own endless climb",
        palettes: &[
            ["#1b3b6f", "#65c8d0", "#dff3f5"],
            ["#0e2a4a", "#3fa2c8", "#bfe9ef"],
        ],
    },
    TriggerProfile {
        trigger: Trigger::GlassTapping,
        keywords: &["tap", "taps", "tapping", "glass", "click", "nail", "nails"],
        moods: &["crystalline still", "cold shimmer", "quiet sparkle"],
        motion: "ripples blooming from unhurried fingertip taps",
        palettes: &[
            ["#20304a", "#9fd4e8", "#f0f8fb"],
            ["#16202e", "#76b6d6", "#d8eef6"],
        ],
    },
];

const DEFAULT_TRIGGER: Trigger = Trigger::SlimeStretch;

fn classify(prompt_lower: &str) -> Trigger {
    // First profile with a keyword hit wins; scoring by hit count would be
    // tunable but classification quality is heuristic, not contractual.
    let mut best = DEFAULT_TRIGGER;
    let mut best_hits = 0usize;
    for profile in &PROFILES {
        let hits = profile
            .keywords
            .iter()
            .filter(|k| prompt_lower.contains(*k))
            .count();
        if hits > best_hits {
            best = profile.trigger;
            best_hits = hits;
        }
    }
    best
}

fn profile_for(trigger: Trigger) -> &'static TriggerProfile {
    PROFILES
        .iter()
        .find(|p| p.trigger == trigger)
        .unwrap_or(&PROFILES[1])
}

/// Map free text to a structured generation plan.
///
/// Total for any non-empty trimmed prompt: unrecognized input falls back to
/// the default trigger rather than erroring. Deterministic: every randomized
/// choice is drawn from a SplitMix64 RNG seeded with the FNV-1a hash of the
/// trimmed prompt. Duration and fps bounds are enforced here, nowhere else.
pub fn interpret(prompt: &str) -> Interpretation {
    let trimmed = prompt.trim();
    let lower = trimmed.to_lowercase();
    let seed = prompt_seed(trimmed);
    let mut rng = Rng64::new(seed);

    let trigger = classify(&lower);
    let profile = profile_for(trigger);

    let mood = profile.moods[rng.next_usize(profile.moods.len())];
    let palette = profile.palettes[rng.next_usize(profile.palettes.len())];
    let duration_seconds = MIN_DURATION_SECONDS
        + (rng.next_u64() % u64::from(MAX_DURATION_SECONDS - MIN_DURATION_SECONDS + 1)) as u32;
    let fps = FPS_CHOICES[rng.next_usize(FPS_CHOICES.len())];

    Interpretation {
        trigger,
        title: format!("{} Loop — {}", profile.trigger.label(), title_case(mood)),
        visual_mood: mood.to_string(),
        motion_description: profile.motion.to_string(),
        palette: palette.iter().map(|s| s.to_string()).collect(),
        duration_seconds,
        fps,
        seed,
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
