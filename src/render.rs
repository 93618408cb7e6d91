//! Stateless render controller.
//!
//! `redraw` repaints an entire window from a `WindowState` — there is no
//! partial or differential drawing. Every Expose and every accepted color
//! change goes through the same full pass.
//!
//! Drawing happens through the narrow `DrawSurface` trait so the controller
//! is independent of the GPU stack and can be driven against a mock surface
//! in tests. One `begin_frame`..`present` span is a single critical section:
//! callers that can race (the secondary's event loop and its listener) must
//! hold the window's redraw lock across the whole call.

use crate::palette::{Palette, Rgb, SwatchBox, swatch_boxes};

/// Window dimensions shared by both processes.
pub const WINDOW_WIDTH: u32 = 400;
pub const WINDOW_HEIGHT: u32 = 200;

const PRIMARY_BACKGROUND: Rgb = Rgb(0xFFFF00);
const SECONDARY_BACKGROUND: Rgb = Rgb(0x00008B);
const TEXT_DARK: Rgb = Rgb(0x000000);
const TEXT_LIGHT: Rgb = Rgb(0xFFFFFF);

/// Which process owns the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
}

/// Per-window state, owned exclusively by the process that created the
/// window. The secondary's copy is mutated from two execution contexts and
/// therefore lives behind its redraw lock.
#[derive(Debug, Clone)]
pub struct WindowState {
    pub role: Role,
    /// Unset before the first accepted color message; otherwise a valid
    /// palette index.
    pub current_color: Option<usize>,
    /// Primary only: a live child suppresses the parent view.
    pub child_active: bool,
    pub swatches: Vec<SwatchBox>,
}

impl WindowState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            current_color: None,
            child_active: false,
            swatches: swatch_boxes(),
        }
    }
}

/// The drawing primitives a window surface must provide.
///
/// `begin_frame` and `present` bracket one redraw; implementations may treat
/// everything in between as a single command sequence that must not be
/// interleaved with another frame.
pub trait DrawSurface {
    fn begin_frame(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb);
    fn present(&mut self) -> anyhow::Result<()>;
}

/// Repaint the full window for the given state.
pub fn redraw(
    surface: &mut dyn DrawSurface,
    state: &WindowState,
    palette: &Palette,
) -> anyhow::Result<()> {
    surface.begin_frame();

    match state.role {
        Role::Primary => {
            surface.fill_rect(
                0.0,
                0.0,
                WINDOW_WIDTH as f64,
                WINDOW_HEIGHT as f64,
                PRIMARY_BACKGROUND,
            );
            if !state.child_active {
                draw_text(surface, 50.0, 50.0, "Parent Window", TEXT_DARK, 14.0);
                draw_text(
                    surface,
                    50.0,
                    70.0,
                    "Press 'C' for child window",
                    TEXT_DARK,
                    14.0,
                );
                draw_text(
                    surface,
                    50.0,
                    90.0,
                    "Left-click mouse on colors",
                    TEXT_DARK,
                    14.0,
                );
                for (swatch, &color) in state.swatches.iter().zip(palette.entries()) {
                    surface.fill_rect(
                        swatch.x as f64,
                        swatch.y as f64,
                        swatch.w as f64,
                        swatch.h as f64,
                        color,
                    );
                }
            }
        }
        Role::Secondary => {
            let background = state
                .current_color
                .and_then(|i| palette.get(i))
                .unwrap_or(SECONDARY_BACKGROUND);
            surface.fill_rect(
                0.0,
                0.0,
                WINDOW_WIDTH as f64,
                WINDOW_HEIGHT as f64,
                background,
            );
            draw_text(surface, 50.0, 50.0, "Child Window", TEXT_LIGHT, 14.0);
            draw_text(surface, 50.0, 70.0, "Press Esc to exit", TEXT_LIGHT, 14.0);
        }
    }

    surface.present()
}

// --- Bitmap text ---
// The drawing trait only exposes rectangles, so text is rendered as a simple
// 5x7 bitmap font where each lit cell becomes one small filled rect.

const CHAR_W: f64 = 7.0;
const CHAR_H: f64 = 12.0;
const CHAR_GAP: f64 = 1.0;

/// Draw a line of text with its baseline at `y`.
pub fn draw_text(surface: &mut dyn DrawSurface, x: f64, y: f64, text: &str, color: Rgb, size: f64) {
    let scale = size / 14.0;
    let cw = CHAR_W * scale;
    let ch = CHAR_H * scale;
    let gap = CHAR_GAP * scale;

    for (i, ch_byte) in text.bytes().enumerate() {
        let cx = x + i as f64 * (cw + gap);

        if ch_byte == b' ' {
            continue;
        }

        draw_bitmap_char(surface, cx, y - ch, cw, ch, ch_byte, color);
    }
}

fn draw_bitmap_char(
    surface: &mut dyn DrawSurface,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    ch: u8,
    color: Rgb,
) {
    let bitmap = char_bitmap(ch);
    let pixel_w = w / 5.0;
    let pixel_h = h / 7.0;

    for (row, bits) in bitmap.iter().enumerate() {
        for col in 0..5 {
            if (bits >> (4 - col)) & 1 == 1 {
                let px = x + col as f64 * pixel_w;
                let py = y + row as f64 * pixel_h;
                surface.fill_rect(px, py, pixel_w, pixel_h, color);
            }
        }
    }
}

/// 5x7 bitmap per character; each row is a u8 whose lower 5 bits are pixels
/// (MSB = leftmost).
fn char_bitmap(ch: u8) -> [u8; 7] {
    match ch {
        b'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        b'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        b'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        b'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        b'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        b'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        b'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        b'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        b'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        b'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        b'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        b'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        b'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        b'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        b'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        b'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        b'S' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        b'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        b'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        b'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        b'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        b'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        b'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        b'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        b'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        b'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
        b'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        b'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        b'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        b'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        b'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        b'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        b'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        b'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        b's' => [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110],
        b't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        b'u' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        b'w' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
        b'x' => [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        b'-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        b'\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111], // box for unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    /// Records primitive calls in order so tests can inspect the frame.
    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<String>,
        rects: Vec<(f64, f64, f64, f64, Rgb)>,
    }

    impl DrawSurface for RecordingSurface {
        fn begin_frame(&mut self) {
            self.ops.push("begin".into());
        }

        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
            self.ops.push("rect".into());
            self.rects.push((x, y, w, h, color));
        }

        fn present(&mut self) -> anyhow::Result<()> {
            self.ops.push("present".into());
            Ok(())
        }
    }

    #[test]
    fn primary_without_child_draws_background_text_and_swatches() {
        let mut surface = RecordingSurface::default();
        let state = WindowState::new(Role::Primary);
        let palette = Palette::default();

        redraw(&mut surface, &state, &palette).unwrap();

        assert_eq!(surface.ops.first().map(String::as_str), Some("begin"));
        assert_eq!(surface.ops.last().map(String::as_str), Some("present"));

        // First rect is the full-window background.
        let (x, y, w, h, color) = surface.rects[0];
        assert_eq!((x, y), (0.0, 0.0));
        assert_eq!((w as u32, h as u32), (WINDOW_WIDTH, WINDOW_HEIGHT));
        assert_eq!(color, Rgb(0xFFFF00));

        // The last five rects are the swatches, in palette order.
        let tail = &surface.rects[surface.rects.len() - 5..];
        for (rect, &expected) in tail.iter().zip(palette.entries()) {
            assert_eq!(rect.4, expected);
            assert_eq!((rect.2, rect.3), (50.0, 50.0));
        }
    }

    #[test]
    fn primary_with_child_draws_background_only() {
        let mut surface = RecordingSurface::default();
        let mut state = WindowState::new(Role::Primary);
        state.child_active = true;

        redraw(&mut surface, &state, &Palette::default()).unwrap();

        assert_eq!(surface.rects.len(), 1);
    }

    #[test]
    fn secondary_background_tracks_current_color() {
        let palette = Palette::default();
        let mut state = WindowState::new(Role::Secondary);

        let mut surface = RecordingSurface::default();
        redraw(&mut surface, &state, &palette).unwrap();
        assert_eq!(surface.rects[0].4, Rgb(0x00008B));

        state.current_color = Some(1);
        let mut surface = RecordingSurface::default();
        redraw(&mut surface, &state, &palette).unwrap();
        assert_eq!(surface.rects[0].4, palette.get(1).unwrap());
    }
}
