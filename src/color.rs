use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Category colours: platform / bucket label → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a column (e.g. platforms) to distinct colours, so a
/// platform keeps its colour across every chart.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new(categories: &[String]) -> Self {
        let mapping = categories
            .iter()
            .cloned()
            .zip(generate_palette(categories.len()))
            .collect();
        CategoryColors { mapping }
    }

    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping.get(category).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heat-map
// ---------------------------------------------------------------------------

/// Blue (-1) → white (0) → red (+1); missing coefficients are grey.
pub fn correlation_color(value: Option<f64>) -> Color32 {
    let Some(r) = value else {
        return Color32::from_gray(90);
    };
    let r = r.clamp(-1.0, 1.0) as f32;
    let white: Lab = Srgb::new(0.97f32, 0.97, 0.97).into_color();
    let end: Lab = if r < 0.0 {
        Srgb::new(0.13f32, 0.40, 0.67).into_color()
    } else {
        Srgb::new(0.70f32, 0.09, 0.17).into_color()
    };
    let rgb: Srgb = white.mix(end, r.abs()).into_color();
    to_color32(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| a != b));
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_category_is_grey() {
        let colors = CategoryColors::new(&["IG".to_string(), "TikTok".to_string()]);
        assert_ne!(colors.color_for("IG"), colors.color_for("TikTok"));
        assert_eq!(colors.color_for("Snapchat"), Color32::GRAY);
    }

    #[test]
    fn correlation_scale_diverges() {
        let neg = correlation_color(Some(-1.0));
        let pos = correlation_color(Some(1.0));
        let zero = correlation_color(Some(0.0));
        assert!(neg.b() > neg.r());
        assert!(pos.r() > pos.b());
        assert!(zero.r() > 240 && zero.b() > 240);
        assert_eq!(correlation_color(None), Color32::from_gray(90));
    }
}
