use crate::preferences::{Genre, Preferences, Season};
use anyhow::Result;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;

/// Local, never-failing illustration of last resort.
pub trait PlaceholderRenderer: Send + Sync {
    fn render(&self, page_text: &str, preferences: &Preferences) -> Result<Vec<u8>>;
}

/// Draws a season-colored gradient card with genre motifs and a centered
/// title ribbon. Pure function of the preferences: motif placement is seeded
/// from the preference fields, so the same wizard answers always produce the
/// same PNG.
pub struct GradientPlaceholder {
    width: u32,
    height: u32,
}

impl Default for GradientPlaceholder {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl PlaceholderRenderer for GradientPlaceholder {
    fn render(&self, _page_text: &str, preferences: &Preferences) -> Result<Vec<u8>> {
        let (top, bottom) = season_colors(preferences.season);
        let mut canvas = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let t = (x + y) as f32 / (self.width + self.height) as f32;
            Rgba([
                lerp(top[0], bottom[0], t),
                lerp(top[1], bottom[1], t),
                lerp(top[2], bottom[2], t),
                255,
            ])
        });

        let mut rng = StdRng::seed_from_u64(preference_seed(preferences));
        match preferences.genre {
            Genre::Fantasy => {
                for _ in 0..20 {
                    let cx = rng.random_range(0.0..self.width as f32);
                    let cy = rng.random_range(0.0..self.height as f32);
                    let radius = rng.random_range(8.0..16.0);
                    draw_star(&mut canvas, cx, cy, radius, [255, 235, 59], 0.6);
                }
            }
            Genre::SciFi => {
                for _ in 0..10 {
                    let cx = rng.random_range(0.0..self.width as f32);
                    let cy = rng.random_range(0.0..self.height as f32);
                    draw_circle(&mut canvas, cx, cy, 15.0, [0, 255, 255], 0.3);
                }
            }
            _ => {}
        }

        self.draw_title_ribbon(&mut canvas);

        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl GradientPlaceholder {
    // Band across the middle where the presentation layer typesets
    // "{name}'s Adventure".
    fn draw_title_ribbon(&self, canvas: &mut RgbaImage) {
        let band_height = self.height / 8;
        let top = (self.height - band_height) / 2;
        for y in top..top + band_height {
            for x in 0..self.width {
                blend_pixel(canvas, x, y, [20, 20, 40], 0.45);
            }
        }
        // Thin highlight lines framing the band.
        for x in 0..self.width {
            blend_pixel(canvas, x, top, [255, 255, 255], 0.8);
            blend_pixel(canvas, x, top + band_height - 1, [255, 255, 255], 0.8);
        }
    }
}

/// Season gradient endpoints: the original palette blended over white.
fn season_colors(season: Season) -> ([u8; 3], [u8; 3]) {
    match season {
        // systemGreen @ 0.7 -> systemYellow @ 0.5
        Season::Spring => ([97, 216, 123], [255, 230, 128]),
        // systemBlue @ 0.7 -> systemYellow @ 0.8
        Season::Summer => ([77, 162, 255], [255, 214, 51]),
        // systemOrange @ 0.7 -> systemRed @ 0.5
        Season::Fall => ([255, 181, 77], [255, 157, 152]),
        // systemBlue @ 0.5 -> white
        Season::Winter => ([128, 189, 255], [255, 255, 255]),
    }
}

fn preference_seed(preferences: &Preferences) -> u64 {
    let mut hasher = DefaultHasher::new();
    preferences.display_name().hash(&mut hasher);
    preferences.genre.label().hash(&mut hasher);
    preferences.season.label().hash(&mut hasher);
    hasher.finish()
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: [u8; 3], alpha: f32) {
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let Rgba([r, g, b, a]) = *canvas.get_pixel(x, y);
    let mix = |dst: u8, src: u8| (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8;
    canvas.put_pixel(
        x,
        y,
        Rgba([mix(r, color[0]), mix(g, color[1]), mix(b, color[2]), a]),
    );
}

fn draw_circle(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 3], alpha: f32) {
    let (min_x, max_x) = ((cx - radius).floor() as i64, (cx + radius).ceil() as i64);
    let (min_y, max_y) = ((cy - radius).floor() as i64, (cy + radius).ceil() as i64);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if x < 0 || y < 0 {
                continue;
            }
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            if dx * dx + dy * dy <= radius * radius {
                blend_pixel(canvas, x as u32, y as u32, color, alpha);
            }
        }
    }
}

/// Five-point star, rasterized with an even-odd point-in-polygon test over
/// the bounding box.
fn draw_star(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 3], alpha: f32) {
    let points = 5usize;
    let inner_radius = radius * 0.4;
    let vertices: Vec<(f32, f32)> = (0..points * 2)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::PI / points as f32;
            let r = if i % 2 == 0 { radius } else { inner_radius };
            (cx + r * angle.sin(), cy - r * angle.cos())
        })
        .collect();

    let (min_x, max_x) = ((cx - radius).floor() as i64, (cx + radius).ceil() as i64);
    let (min_y, max_y) = ((cy - radius).floor() as i64, (cy + radius).ceil() as i64);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if x < 0 || y < 0 {
                continue;
            }
            if point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, &vertices) {
                blend_pixel(canvas, x as u32, y as u32, color, alpha);
            }
        }
    }
}

fn point_in_polygon(px: f32, py: f32, vertices: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Preferences;

    fn prefs(name: &str, genre: Genre, season: Season) -> Preferences {
        Preferences {
            child_name: name.to_string(),
            child_age: "7".to_string(),
            genre,
            season,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_produces_png_bytes() {
        let renderer = GradientPlaceholder {
            width: 64,
            height: 64,
        };
        let bytes = renderer
            .render("a page", &prefs("Mira", Genre::Fantasy, Season::Winter))
            .unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_render_is_deterministic_per_preferences() {
        let renderer = GradientPlaceholder {
            width: 64,
            height: 64,
        };
        let preferences = prefs("Mira", Genre::Fantasy, Season::Winter);
        let first = renderer.render("page one", &preferences).unwrap();
        let second = renderer.render("entirely different text", &preferences).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_varies_with_season_and_genre() {
        let renderer = GradientPlaceholder {
            width: 64,
            height: 64,
        };
        let winter = renderer
            .render("p", &prefs("Mira", Genre::Fantasy, Season::Winter))
            .unwrap();
        let summer = renderer
            .render("p", &prefs("Mira", Genre::Fantasy, Season::Summer))
            .unwrap();
        let scifi = renderer
            .render("p", &prefs("Mira", Genre::SciFi, Season::Winter))
            .unwrap();
        assert_ne!(winter, summer);
        assert_ne!(winter, scifi);
    }

    #[test]
    fn test_point_in_polygon_square() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_polygon(5.0, 5.0, &square));
        assert!(!point_in_polygon(15.0, 5.0, &square));
    }
}
