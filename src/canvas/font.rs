//! Glyph metrics for the PDF standard-14 fonts used by labels.
//!
//! The canvas never embeds font programs; viewers supply Helvetica and
//! Courier. Widths come from the Adobe core-font AFM files (units of 1/1000
//! em), which lets labels be measured and centered without a rasterizer.

use crate::types::{FontFamily, FontStyle, FontWeight};

/// Helvetica and Helvetica-Oblique advance widths for `' '..='~'`.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191,
    333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 278, 278, 584, 584, 584, 556,
   1015, 667, 667, 722, 722, 667, 611, 778,
    722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722,
    500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold and Helvetica-BoldOblique advance widths for `' '..='~'`.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238,
    333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778,
    722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611,
    611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778,
    556, 556, 500, 389, 280, 389, 584,
];

/// Every Courier glyph has the same advance.
const COURIER_WIDTH: u16 = 600;

const HELVETICA_ASCENT: u16 = 718;
const COURIER_ASCENT: u16 = 629;

/// Measured size of a text run, in the same unit as the requested font size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Horizontal advance of the whole run
    pub advance: f64,
    /// Height above the baseline
    pub ascent: f64,
}

/// Map text to WinAnsiEncoding bytes. Characters outside it become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(ch: char) -> u8 {
    match ch as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => b'?',
    }
}

/// Advance width of one encoded byte, 1/1000 em.
fn glyph_width(style: FontStyle, byte: u8) -> u16 {
    if style.family == FontFamily::Monospace {
        return COURIER_WIDTH;
    }
    let bold = style.weight == FontWeight::Bold;
    match byte {
        0x20..=0x7E => {
            let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
            table[usize::from(byte - 0x20)]
        }
        // nbsp
        0xA0 => 278,
        // degree
        0xB0 => 400,
        // two/three superior
        0xB2 | 0xB3 => 333,
        // Adieresis, Odieresis, Udieresis
        0xC4 => if bold { 722 } else { 667 },
        0xD6 => 778,
        0xDC => 722,
        // germandbls
        0xDF => 611,
        // adieresis, odieresis, udieresis
        0xE4 => 556,
        0xF6 | 0xFC => if bold { 611 } else { 556 },
        // Rest of Latin-1: average lowercase advance
        _ => 556,
    }
}

/// Measure `text` at `size` without rendering it.
///
/// No kerning is applied, so the advance of a concatenation is the sum of
/// the advances of its parts.
pub fn measure(text: &str, size: f64, style: FontStyle) -> TextExtent {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|byte| u32::from(glyph_width(style, byte)))
        .sum();
    let ascent = match style.family {
        FontFamily::Sans => HELVETICA_ASCENT,
        FontFamily::Monospace => COURIER_ASCENT,
    };
    TextExtent {
        advance: f64::from(units) * size / 1000.0,
        ascent: f64::from(ascent) * size / 1000.0,
    }
}
