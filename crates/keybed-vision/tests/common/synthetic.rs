// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic keyboard frames for end-to-end tests and benchmarks.

#![allow(dead_code)]

use image::{Rgb, RgbImage};

pub const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
pub const WHITE_KEY: Rgb<u8> = Rgb([230, 230, 230]);
pub const BLACK_KEY: Rgb<u8> = Rgb([20, 20, 20]);
pub const BODY: Rgb<u8> = Rgb([150, 150, 150]);

/// A keyboard spanning the full frame width, bounded by two straight edges.
///
/// Positions inside the keyboard use local coordinates `u = x / width` and
/// `v = (y - top(x)) / (bottom(x) - top(x))`. Equal edge slopes give a sheared
/// parallelogram, different slopes a trapezoid seen in perspective.
#[derive(Debug, Clone)]
pub struct KeyboardScene {
    pub width: u32,
    pub height: u32,
    /// Top edge at `x = 0`.
    pub top: f32,
    pub keyboard_height: f32,
    /// Slope of the top edge in degrees.
    pub skew_deg: f32,
    /// Slope of the bottom edge in degrees.
    pub bottom_skew_deg: f32,
    pub black_keys: u32,
    pub black_key_width: f32,
    /// `v` range of the black keys.
    pub black_key_rows: (f32, f32),
    /// `v` where the gray body starts.
    pub body_start: f32,
}

impl Default for KeyboardScene {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            top: 140.0,
            keyboard_height: 200.0,
            skew_deg: 2.0,
            bottom_skew_deg: 2.0,
            black_keys: 7,
            black_key_width: 20.0,
            black_key_rows: (0.15, 0.5),
            // Slightly above the two-thirds split, so a band split on a
            // slightly misplaced boundary line still sees only body below it.
            body_start: 0.6,
        }
    }
}

impl KeyboardScene {
    pub fn top_at(&self, x: f32) -> f32 {
        self.top + x * self.skew_deg.to_radians().tan()
    }

    /// Bottom edge; `keyboard_height` below the top edge at `x = 0`.
    pub fn bottom_at(&self, x: f32) -> f32 {
        self.top + self.keyboard_height + x * self.bottom_skew_deg.to_radians().tan()
    }

    fn black_key_centre(&self, i: u32) -> f32 {
        (i + 1) as f32 * self.width as f32 / (self.black_keys + 1) as f32
    }

    pub fn render(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let (xf, yf) = (x as f32, y as f32);
            let top = self.top_at(xf);
            let v = (yf - top) / (self.bottom_at(xf) - top);
            if !(0.0..1.0).contains(&v) {
                return BACKGROUND;
            }
            if v >= self.body_start {
                return BODY;
            }
            let (key_top, key_bottom) = self.black_key_rows;
            let on_black_key = (key_top..key_bottom).contains(&v)
                && (0..self.black_keys)
                    .any(|i| (xf - self.black_key_centre(i)).abs() < self.black_key_width / 2.0);
            if on_black_key { BLACK_KEY } else { WHITE_KEY }
        })
    }
}

/// Keyboard frame with the default scene.
pub fn keyboard_frame() -> RgbImage {
    KeyboardScene::default().render()
}

/// Keyboard whose top and bottom edges converge towards the right, so its
/// right side is about a fifth shorter than its left.
pub fn trapezoid_scene() -> KeyboardScene {
    KeyboardScene {
        skew_deg: 2.0,
        bottom_skew_deg: -2.0,
        ..KeyboardScene::default()
    }
}

pub fn uniform_frame(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}
