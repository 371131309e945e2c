//! Standard PDF font faces and their advance widths.
//!
//! Only the faces that need no embedding are supported. Widths come from the
//! Adobe AFM files (1/1000 em) for the printable ASCII range; anything outside
//! that range is measured with the face's average lowercase width.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Built-in font faces usable for captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardFont {
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Helvetica-Bold")]
    HelveticaBold,
    #[serde(rename = "Helvetica-Oblique")]
    HelveticaOblique,
    #[serde(rename = "Helvetica-BoldOblique")]
    HelveticaBoldOblique,
    #[serde(rename = "Courier")]
    Courier,
    #[serde(rename = "Courier-Bold")]
    CourierBold,
}

impl StandardFont {
    pub const ALL: [StandardFont; 6] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::Courier,
        StandardFont::CourierBold,
    ];

    /// PostScript name of the face.
    pub fn name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
        }
    }

    pub fn is_monospace(self) -> bool {
        matches!(self, StandardFont::Courier | StandardFont::CourierBold)
    }

    /// Advance width of a single character in points.
    pub fn char_width(self, ch: char, size: f32) -> f32 {
        self.advance(ch) as f32 * size / 1000.0
    }

    /// Width of a whole string in points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| self.advance(ch) as u32).sum();
        units as f32 * size / 1000.0
    }

    fn advance(self, ch: char) -> u16 {
        if self.is_monospace() {
            return 600;
        }
        let table = match self {
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                &HELVETICA_BOLD_WIDTHS
            }
            _ => &HELVETICA_WIDTHS,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else if matches!(
            self,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique
        ) {
            611
        } else {
            556
        }
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StandardFont {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StandardFont::ALL
            .iter()
            .copied()
            .find(|font| font.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown font '{}'", s))
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];
