use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging gradient for weighted bars
// ---------------------------------------------------------------------------

/// Map `value` in `[lo, hi]` onto a red → blue ramp (low = red).
/// A degenerate range maps everything to the midpoint.
pub fn gradient(value: f64, lo: f64, hi: f64) -> Color32 {
    let span = hi - lo;
    let t = if span.abs() < f64::EPSILON {
        0.5
    } else {
        ((value - lo) / span).clamp(0.0, 1.0)
    };
    let red = Hsl::new(5.0, 0.70, 0.45);
    let blue = Hsl::new(215.0, 0.70, 0.45);
    to_color32(red.mix(blue, t as f32))
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn gradient_endpoints_differ() {
        let low = gradient(0.0, 0.0, 10.0);
        let high = gradient(10.0, 0.0, 10.0);
        assert_ne!(low, high);
        assert!(low.r() > low.b());
        assert!(high.b() > high.r());
        assert_eq!(gradient(3.0, 3.0, 3.0), gradient(7.0, 7.0, 7.0));
    }
}
