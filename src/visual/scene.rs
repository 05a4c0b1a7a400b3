use std::f64::consts::TAU;

use crate::foundation::core::{FrameBuf, Point, Rgb8};
use crate::foundation::math::{Rng64, fract1, smoothstep};
use crate::interpret::prompt::Trigger;

/// Paint one frame of the loop at `phase` (radians, `[0, TAU)`).
///
/// Every painter parameterizes motion as a periodic function of `phase`:
/// trigonometric terms use integer multiples of the phase and travelling
/// elements advance by an integer number of wraps per loop. That makes
/// frame 0 and the notional frame `count` pixel-identical, which is the
/// whole seam-free-loop guarantee.
///
/// Per-element constants (positions, sizes, timings) are re-derived from
/// `seed` on every call in a fixed order, so painting is pure and frames can
/// be rendered in any order or in parallel.
pub fn paint_frame(trigger: Trigger, buf: &mut FrameBuf, colors: &[Rgb8], seed: u64, phase: f64) {
    let palette = ScenePalette::new(colors);
    match trigger {
        Trigger::KineticSand => paint_kinetic_sand(buf, &palette, seed, phase),
        Trigger::SlimeStretch => paint_slime_stretch(buf, &palette, seed, phase),
        Trigger::BubblePour => paint_bubble_pour(buf, &palette, seed, phase),
        Trigger::GlassTapping => paint_glass_tapping(buf, &palette, seed, phase),
    }
}

/// Palette accessor that tolerates short palettes by wrapping the index.
struct ScenePalette {
    colors: Vec<Rgb8>,
}

impl ScenePalette {
    fn new(colors: &[Rgb8]) -> Self {
        let colors = if colors.is_empty() {
            vec![Rgb8::new(0x60, 0x60, 0x70)]
        } else {
            colors.to_vec()
        };
        Self { colors }
    }

    fn get(&self, i: usize) -> Rgb8 {
        self.colors[i % self.colors.len()]
    }

    fn base(&self) -> Rgb8 {
        self.get(0)
    }

    fn accent(&self) -> Rgb8 {
        self.get(1)
    }

    fn highlight(&self) -> Rgb8 {
        self.get(2)
    }
}

fn background(buf: &mut FrameBuf, palette: &ScenePalette) {
    buf.fill_vertical_gradient(palette.base().scale(0.35), palette.base().scale(0.8));
}

fn w(buf: &FrameBuf) -> f64 {
    f64::from(buf.width)
}

fn h(buf: &FrameBuf) -> f64 {
    f64::from(buf.height)
}

/// Granular field: a bed of grains that shear sideways in a slow pulse while
/// a crumble wave travels down the frame once per loop.
fn paint_kinetic_sand(buf: &mut FrameBuf, palette: &ScenePalette, seed: u64, phase: f64) {
    background(buf, palette);
    let mut rng = Rng64::new(seed ^ 0x5a6d);
    let grain_count = 260;
    let scale = w(buf).min(h(buf));

    // Crumble wave position, one full traversal per loop.
    let wave_y = fract1(phase / TAU);

    for _ in 0..grain_count {
        let x0 = rng.next_f64_01();
        let y0 = rng.next_f64_01();
        let phi = rng.next_f64_range(0.0, TAU);
        let size = rng.next_f64_range(0.004, 0.011) * scale;
        let tone = rng.next_f64_01();

        // Lateral shear, two pulses per loop, depth-weighted.
        let dx = 0.015 * (2.0 * phase + phi).sin() * (0.3 + 0.7 * y0);
        // Vertical settle, one pulse per loop.
        let dy = 0.006 * (phase + 2.0 * phi).sin();

        let dist = (y0 - wave_y).abs().min(1.0 - (y0 - wave_y).abs());
        let agitation = 1.0 - smoothstep(0.0, 0.18, dist);
        let jx = 0.01 * agitation * (3.0 * phase + 5.0 * phi).sin();

        let color = palette.accent().mix(palette.highlight(), tone * 0.6 + agitation * 0.4);
        buf.disk(
            Point::new((x0 + dx + jx) * w(buf), (y0 + dy) * h(buf)),
            size * (1.0 + 0.35 * agitation),
            color,
            0.85,
        );
    }
}

/// A glossy blob that stretches tall mid-loop and settles back. The stretch
/// envelope is `(1 - cos(phase)) / 2`, zero at both loop ends.
fn paint_slime_stretch(buf: &mut FrameBuf, palette: &ScenePalette, seed: u64, phase: f64) {
    background(buf, palette);
    let mut rng = Rng64::new(seed ^ 0x517e);
    let wobble = rng.next_f64_range(0.0, TAU);

    let stretch = 0.5 - 0.5 * phase.cos();
    let cx = w(buf) * 0.5 + w(buf) * 0.03 * (2.0 * phase + wobble).sin();
    let base_y = h(buf) * 0.62;
    let top_y = base_y - h(buf) * (0.12 + 0.30 * stretch);
    let base_r = w(buf) * (0.21 - 0.05 * stretch);

    // Body as a stack of disks from the anchored base to the rising tip.
    let steps = 48;
    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps);
        let y = base_y + (top_y - base_y) * t;
        // Taper toward the tip, with a periodic ripple along the body.
        let taper = 1.0 - 0.72 * t;
        let ripple = 1.0 + 0.06 * (3.0 * phase + t * TAU).sin();
        let color = palette.accent().mix(palette.highlight(), t * 0.7);
        buf.disk(Point::new(cx, y), base_r * taper * ripple, color, 0.92);
    }

    // Specular highlight drifting with the stretch.
    buf.disk(
        Point::new(cx - base_r * 0.35, base_y - (base_y - top_y) * 0.55),
        base_r * 0.18,
        palette.highlight(),
        0.5 + 0.3 * stretch,
    );
}

/// Bubbles rising through a slow pour. Each bubble climbs an integer number
/// of screen heights per loop, so its wrapped position is loop-continuous.
fn paint_bubble_pour(buf: &mut FrameBuf, palette: &ScenePalette, seed: u64, phase: f64) {
    background(buf, palette);
    let mut rng = Rng64::new(seed ^ 0xb0bb1e);

    // Pour column, gently swaying with two cycles per loop.
    let col_x = w(buf) * 0.5;
    let sway = w(buf) * 0.02 * (2.0 * phase).sin();
    for yi in 0..buf.height {
        let y = f64::from(yi);
        let width = w(buf) * (0.05 + 0.012 * (y / h(buf) * TAU + 3.0 * phase).sin());
        let x = col_x + sway * (y / h(buf));
        for xi in (x - width) as i64..=(x + width) as i64 {
            let t = ((xi as f64 - x) / width).abs();
            buf.blend_px(
                xi,
                i64::from(yi),
                palette.accent().mix(palette.highlight(), 0.3),
                0.25 * (1.0 - t * t),
            );
        }
    }

    let bubble_count = 26;
    for _ in 0..bubble_count {
        let x0 = rng.next_f64_range(0.2, 0.8);
        let y0 = rng.next_f64_01();
        let cycles = 1 + rng.next_usize(3) as u64; // integer climbs per loop
        let phi = rng.next_f64_range(0.0, TAU);
        let r = rng.next_f64_range(0.008, 0.028) * w(buf);

        let yw = fract1(y0 - cycles as f64 * (phase / TAU));
        let x = (x0 + 0.02 * (2.0 * phase + phi).sin()) * w(buf);
        let y = yw * h(buf);

        buf.ring(Point::new(x, y), r, r * 0.25 + 1.0, palette.highlight(), 0.8);
        buf.disk(
            Point::new(x - r * 0.3, y - r * 0.3),
            r * 0.25,
            palette.highlight(),
            0.6,
        );
    }
}

/// Ripples blooming from fingertip taps. `taps` events per loop; each ripple
/// ages over exactly one loop via the wrapped phase offset, so a ring that
/// fades out at the end is reborn at radius zero on wrap.
fn paint_glass_tapping(buf: &mut FrameBuf, palette: &ScenePalette, seed: u64, phase: f64) {
    background(buf, palette);
    let mut rng = Rng64::new(seed ^ 0x7a9);
    let taps = 5usize;
    let max_r = w(buf).min(h(buf)) * 0.55;

    for k in 0..taps {
        let t_k = (k as f64 + rng.next_f64_range(0.1, 0.9)) / taps as f64;
        let cx = rng.next_f64_range(0.25, 0.75) * w(buf);
        let cy = rng.next_f64_range(0.25, 0.75) * h(buf);

        let age = fract1(phase / TAU - t_k);
        let radius = age * max_r;
        let fade = (1.0 - age) * (1.0 - age);

        buf.ring(
            Point::new(cx, cy),
            radius,
            2.5 + 6.0 * age,
            palette.highlight(),
            0.7 * fade,
        );
        buf.ring(
            Point::new(cx, cy),
            radius * 0.6,
            2.0,
            palette.accent(),
            0.45 * fade,
        );
        // Contact glow right after the tap lands.
        buf.disk(
            Point::new(cx, cy),
            max_r * 0.05 * (1.0 - smoothstep(0.0, 0.25, age)),
            palette.highlight(),
            0.8 * (1.0 - smoothstep(0.0, 0.25, age)),
        );
    }
}
