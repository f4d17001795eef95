//! Built-in 5×7 bitmap face, used when the TrueType font cannot be loaded.
//!
//! Covers what a canonical timestamp needs (`0-9`, `:` and space) plus
//! `-`, `/` and `.`. Anything else draws as a hollow box. Each glyph bit is
//! painted as a square block sized so the glyph height tracks the requested
//! font size.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
/// Blank columns between glyphs.
const GLYPH_SPACING: i32 = 1;

/// Each row is 5 bits wide, most significant bit on the left.
type Glyph = [u8; 7];

const UNKNOWN: Glyph = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

fn glyph(c: char) -> Glyph {
    match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ' ' => [0; 7],
        _ => UNKNOWN,
    }
}

/// Side of one glyph pixel for a given font size.
///
/// A TrueType face at `size` px has a cap height of roughly 0.7 × size; the
/// bitmap glyph is scaled to match.
pub fn block_size(font_size: f32) -> i32 {
    ((font_size * 0.7 / GLYPH_HEIGHT as f32).round() as i32).max(1)
}

/// Width and height in pixels of `text` rendered at `font_size`.
pub fn text_size(font_size: f32, text: &str) -> (u32, u32) {
    let block = block_size(font_size);
    let chars = text.chars().count() as i32;
    if chars == 0 {
        return (0, 0);
    }
    let width = (chars * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING) * block;
    (width as u32, (GLYPH_HEIGHT * block) as u32)
}

/// Draw `text` with its top-left corner at (`x`, `y`). Clipped to the canvas.
pub fn draw_text(canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, font_size: f32, text: &str) {
    let block = block_size(font_size);
    let advance = (GLYPH_WIDTH + GLYPH_SPACING) * block;

    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i32 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let rect = Rect::at(origin_x + col * block, y + row as i32 * block)
                    .of_size(block as u32, block as u32);
                draw_filled_rect_mut(canvas, rect, color);
            }
        }
    }
}
