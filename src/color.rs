use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use rusty_iris::model::Primary;

// ---------------------------------------------------------------------------
// Fixed plot colours
// ---------------------------------------------------------------------------

/// Scatter colour of measured samples (matplotlib's dodgerblue).
pub const MEASURED: Color32 = Color32::from_rgb(30, 144, 255);

/// Colour of fitted / model curves.
pub const FIT: Color32 = Color32::LIGHT_GRAY;

/// Marker colour of flagged equal-step rows.
pub const FLAGGED: Color32 = Color32::YELLOW;

/// Trace colour of a display primary.
pub fn channel_color(primary: Primary) -> Color32 {
    match primary {
        Primary::R => Color32::from_rgb(230, 60, 60),
        Primary::G => Color32::from_rgb(60, 190, 80),
        Primary::B => Color32::from_rgb(70, 110, 240),
    }
}

// ---------------------------------------------------------------------------
// Hue colouring
// ---------------------------------------------------------------------------

/// Colour for a hue angle in radians, so isoslant samples show the hue
/// they were measured at.
pub fn hue_color(angle: f64) -> Color32 {
    let hue = angle.to_degrees().rem_euclid(360.0) as f32;
    let hsl = Hsl::new(hue, 0.75, 0.55);
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
    use std::f64::consts::PI;

    fn close(a: Color32, b: Color32) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 1;
        d(a.r(), b.r()) && d(a.g(), b.g()) && d(a.b(), b.b())
    }

    #[test]
    fn hue_wraps_full_turns() {
        assert!(close(hue_color(0.5), hue_color(0.5 + 2.0 * PI)));
        assert!(close(hue_color(-PI / 2.0), hue_color(1.5 * PI)));
    }

    #[test]
    fn zero_hue_is_reddish() {
        let c = hue_color(0.0);
        assert!(c.r() > c.g() && c.r() > c.b());
    }
}
