use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            let hsl = Hsl::new(hue, 0.75, 0.45);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Lighten `color` by scaling its distance to white: the new lightness is
/// `1 - amount * (1 - lightness)`. `amount = 1` leaves the colour unchanged,
/// `amount = 0` gives white.
pub fn lighten_color(color: Color32, amount: f32) -> Color32 {
    let rgb = Srgb::new(
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    );
    let mut hsl: Hsl = rgb.into_color();
    hsl.lightness = 1.0 - amount * (1.0 - hsl.lightness);
    to_color32(hsl.into_color())
}

// ---------------------------------------------------------------------------
// Color mapping: instrument index → Color32
// ---------------------------------------------------------------------------

/// Maps instrument indices to distinct colours.
#[derive(Debug, Clone)]
pub struct InstrumentColors {
    mapping: BTreeMap<u32, Color32>,
    default_color: Color32,
}

impl InstrumentColors {
    /// Build a colour map for the given instrument indices.
    pub fn new(instruments: &std::collections::BTreeSet<u32>) -> Self {
        let palette = generate_palette(instruments.len());
        let mapping = instruments.iter().copied().zip(palette).collect();
        InstrumentColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour of an instrument.
    pub fn color_for(&self, instrument: u32) -> Color32 {
        self.mapping
            .get(&instrument)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..4 {
            for j in i + 1..4 {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn lighten_extremes() {
        let c = Color32::from_rgb(200, 40, 40);
        assert_eq!(lighten_color(c, 0.0), Color32::WHITE);
        let same = lighten_color(c, 1.0);
        assert!((same.r() as i32 - 200).abs() <= 1);
        assert!((same.g() as i32 - 40).abs() <= 1);
    }

    #[test]
    fn lighter_means_brighter() {
        let c = Color32::from_rgb(20, 60, 160);
        let l = lighten_color(c, 0.5);
        let sum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(sum(l) > sum(c));
    }

    #[test]
    fn unknown_instrument_is_gray() {
        let colors = InstrumentColors::new(&[1, 2].into_iter().collect());
        assert_ne!(colors.color_for(1), colors.color_for(2));
        assert_eq!(colors.color_for(9), Color32::GRAY);
    }
}
