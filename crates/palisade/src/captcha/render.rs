//! Captcha image rendering.
//!
//! Draws the code onto a small RGB canvas with per-character jitter, then
//! speckles random points and line distractors over it before PNG encoding.

use std::io::Cursor;

use ab_glyph::{FontRef, PxScale};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use palisade_common::AdminError;
use rand::Rng;

const FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Speckle points drawn over the code.
const NOISE_POINTS: u32 = 200;

/// Distractor lines drawn over the code.
const NOISE_LINES: u32 = 4;

/// Renders a code string into a noisy PNG.
pub struct CodeRenderer {
    width: u32,
    height: u32,
    font: FontRef<'static>,
}

impl CodeRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self, AdminError> {
        let font = FontRef::try_from_slice(FONT_BYTES)
            .map_err(|e| AdminError::Captcha(format!("embedded font failed to load: {e}")))?;
        Ok(Self {
            width,
            height,
            font,
        })
    }

    /// Render `code` to PNG bytes.
    pub fn render(&self, code: &str) -> Result<Vec<u8>, AdminError> {
        let mut rng = rand::rng();
        let mut img: RgbImage =
            ImageBuffer::from_pixel(self.width, self.height, Rgb([255, 255, 255]));

        self.draw_code(&mut img, &mut rng, code);
        self.add_noise(&mut img, &mut rng);

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| AdminError::Captcha(format!("PNG encode failed: {e}")))?;
        Ok(png)
    }

    fn draw_code(&self, img: &mut RgbImage, rng: &mut impl Rng, code: &str) {
        let font_size = self.height as f32 * rng.random_range(0.8..0.9);
        let slot_width = self.width / code.len().max(1) as u32;

        for (i, ch) in code.chars().enumerate() {
            let x = i as u32 * slot_width + rng.random_range(0..slot_width / 4 + 1);
            let headroom = (self.height as f32 - font_size).max(1.0) as u32;
            let y = rng.random_range(0..headroom);

            draw_text_mut(
                img,
                Rgb([0, 0, 0]),
                x as i32,
                y as i32,
                PxScale::from(font_size),
                &self.font,
                &ch.to_string(),
            );
        }
    }

    fn add_noise(&self, img: &mut RgbImage, rng: &mut impl Rng) {
        for _ in 0..NOISE_POINTS {
            let x = rng.random_range(0..self.width);
            let y = rng.random_range(0..self.height);
            img.put_pixel(x, y, noise_color(rng));
        }

        for _ in 0..NOISE_LINES {
            let color = noise_color(rng);
            let start = (
                rng.random_range(0.0..self.width as f32),
                rng.random_range(0.0..self.height as f32),
            );
            let end = (
                rng.random_range(0.0..self.width as f32),
                rng.random_range(0.0..self.height as f32),
            );
            draw_line_segment_mut(img, start, end, color);
            // Second pass offset by one pixel gives a 2px stroke.
            draw_line_segment_mut(
                img,
                (start.0, start.1 + 1.0),
                (end.0, end.1 + 1.0),
                color,
            );
        }
    }
}

fn noise_color(rng: &mut impl Rng) -> Rgb<u8> {
    Rgb([
        rng.random_range(100..200),
        rng.random_range(100..200),
        rng.random_range(100..200),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_valid_png_of_the_configured_size() {
        let renderer = CodeRenderer::new(120, 40).unwrap();
        let png = renderer.render("AB3D").unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 120);
        assert_eq!(decoded.height(), 40);
    }

    #[test]
    fn every_render_is_nonempty_and_distinct() {
        let renderer = CodeRenderer::new(120, 40).unwrap();
        let first = renderer.render("AB3D").unwrap();
        let second = renderer.render("AB3D").unwrap();

        assert!(!first.is_empty());
        // Noise placement is random, so two renders of one code differ.
        assert_ne!(first, second);
    }
}
