//! The fixed five-entry color palette and its swatch geometry.
//!
//! Every process holds its own copy of the palette; nothing here is shared
//! across the process boundary. Only the *index* of a color travels through
//! the message channel.

/// Number of palette entries. A received color index is valid iff it lies in
/// `0..PALETTE_SIZE`.
pub const PALETTE_SIZE: usize = 5;

/// Swatch edge length in pixels.
pub const SWATCH_SIZE: u32 = 50;
/// Horizontal gap between adjacent swatches.
pub const SWATCH_GAP: u32 = 10;
/// Origin of the first swatch in the primary window.
pub const SWATCH_ORIGIN: (i32, i32) = (50, 120);

/// A packed `0xRRGGBB` color, the same representation the drawing layer
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u32);

impl Rgb {
    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

/// The ordered, immutable palette.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: [Rgb; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: [
                Rgb(0xFFB6C1), // pastel pink
                Rgb(0xE0FFFF), // pastel cyan
                Rgb(0xA52A2A), // brown
                Rgb(0xFFA500), // orange
                Rgb(0x9ACD32), // yellow-green
            ],
        }
    }
}

impl Palette {
    /// Look up a palette entry, `None` when the index is out of range.
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.entries
    }
}

/// Axis-aligned bounds of one clickable swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwatchBox {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl SwatchBox {
    /// Inclusive containment test, matching the hit-testing contract.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && px <= self.x + self.w as i32
            && py >= self.y
            && py <= self.y + self.h as i32
    }
}

/// The fixed row of swatch boxes drawn in (and hit-tested against) the
/// primary window.
pub fn swatch_boxes() -> Vec<SwatchBox> {
    let (ox, oy) = SWATCH_ORIGIN;
    (0..PALETTE_SIZE)
        .map(|i| SwatchBox {
            x: ox + i as i32 * (SWATCH_SIZE + SWATCH_GAP) as i32,
            y: oy,
            w: SWATCH_SIZE,
            h: SWATCH_SIZE,
        })
        .collect()
}
