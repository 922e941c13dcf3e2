//! Green-to-red LED bar gradient

use smart_leds::RGB8;

const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
const YELLOW: RGB8 = RGB8 { r: 255, g: 255, b: 0 };
const ORANGE: RGB8 = RGB8 { r: 255, g: 120, b: 0 };
const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

/// End of the green-yellow segment, as a fraction of the strip
const YELLOW_AT: f32 = 0.15;
/// End of the yellow-orange segment
const ORANGE_AT: f32 = 0.35;

/// Linear blend between two colours, `t` in `0.0..=1.0`
pub fn lerp_color(a: RGB8, b: RGB8, t: f32) -> RGB8 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t) as u8;
    RGB8 {
        r: mix(a.r, b.r),
        g: mix(a.g, b.g),
        b: mix(a.b, b.b),
    }
}

fn scale(c: RGB8, brightness: f32) -> RGB8 {
    RGB8 {
        r: (f32::from(c.r) * brightness) as u8,
        g: (f32::from(c.g) * brightness) as u8,
        b: (f32::from(c.b) * brightness) as u8,
    }
}

/// Colour of a pixel at `ratio` along the strip, before dimming
fn bar_color(ratio: f32) -> RGB8 {
    if ratio < YELLOW_AT {
        lerp_color(GREEN, YELLOW, ratio / YELLOW_AT)
    } else if ratio < ORANGE_AT {
        lerp_color(YELLOW, ORANGE, (ratio - YELLOW_AT) / (ORANGE_AT - YELLOW_AT))
    } else {
        lerp_color(ORANGE, RED, (ratio - ORANGE_AT) / (1.0 - ORANGE_AT))
    }
}

/// Overall brightness for a bar of length `step`
pub fn brightness(step: usize, pixels: usize) -> f32 {
    let span = pixels.saturating_sub(1).max(1) as f32;
    let progress = (step as f32 / span).min(1.0);
    libm::powf(progress, 2.2) * 0.9 + 0.1
}

/// Fill `out` with a bar lit up to and including `step`
pub fn gradient(step: usize, out: &mut [RGB8]) {
    let pixels = out.len();
    let span = pixels.saturating_sub(1).max(1) as f32;
    let level = brightness(step, pixels);

    for (i, px) in out.iter_mut().enumerate() {
        *px = if i <= step {
            scale(bar_color(i as f32 / span), level)
        } else {
            RGB8::default()
        };
    }
}
