//! Confidence colouring.

use crate::geometry::lerp;

/// Hue in degrees for a detection confidence: red at 0, green at 1.
pub fn confidence_hue(confidence: f64) -> f64 {
    lerp(0.0, 120.0, confidence)
}

/// `hsl(hue, 100%, 50%)` for a confidence, or `None` if it is not finite.
pub fn confidence_color(confidence: f64) -> Option<[u8; 3]> {
    let hue = confidence_hue(confidence);
    hue.is_finite().then(|| hsl_to_rgb(hue, 1.0, 0.5))
}

/// Convert HSL (hue in degrees, saturation and lightness in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());

    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = lightness - chroma / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}
