//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────┬──────────────┐
//! │              [ outcome banner ]             │  YOU         │
//! │                                             │  MODE        │
//! │   local hands (green)   remote hand (blue)  │              │
//! │          sparkles where they touch          │  PEERS       │
//! │                                             │  1 bob       │
//! │                                             │  2 carol     │
//! ├─────────────────────────────────────────────┴──────────────┤
//! │  status bar / key legend                                   │
//! └────────────────────────────────────────────────────────────┘
//! ```

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use duel_sync::{ConnectionState, GestureLabel, MatchOutcome, SessionMode};
use hand_landmarks::{Landmark, LandmarkFrame, HAND_CONNECTIONS};

use crate::app::{connection_label, AppState, UiAction};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 960;
pub const WIN_H:      usize = 600;
pub const STAGE_W:    usize = 720;
pub const STAGE_H:    usize = 540;
const PANEL_W:        usize = WIN_W - STAGE_W;
const STATUS_Y:       usize = STAGE_H;
const BG_COLOR:       u32   = 0xFF101820;
const PANEL_BG:       u32   = 0xFF16213E;
const TEXT_BG:        u32   = 0xFF0F3460;
const LOCAL_COLOR:    u32   = 0xFF3DDC84;
const REMOTE_COLOR:   u32   = 0xFF4A90E2;
const SPARK_COLOR:    u32   = 0xFFFFD700;
const SELECTED_COLOR: u32   = 0xFFFFD700;

/// Normalized landmark → stage pixel.
pub fn project(l: &Landmark) -> (f32, f32) {
    (l.x * STAGE_W as f32, l.y * STAGE_H as f32)
}

/// [`project`], held within one stage size of the stage so line drawing
/// stays bounded whatever the frame holds.
fn stage_point(l: &Landmark) -> (isize, isize) {
    let (x, y) = project(l);
    let (w, h) = (STAGE_W as f32, STAGE_H as f32);
    (x.clamp(-w, 2.0 * w) as isize, y.clamp(-h, 2.0 * h) as isize)
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
}

impl Visualizer {
    pub fn new() -> Result<Self, String> {
        let mut window = Window::new(
            "Leap Duel: rock paper scissors",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Keys pressed since the last frame, as actions.
    pub fn poll_input(&mut self) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if !self.window.is_open() {
            actions.push(UiAction::Quit);
            return actions;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) { actions.push(UiAction::Quit); }
        if pressed(Key::R) { actions.push(UiAction::Pose(Some(GestureLabel::Rock))); }
        if pressed(Key::P) { actions.push(UiAction::Pose(Some(GestureLabel::Paper))); }
        if pressed(Key::S) { actions.push(UiAction::Pose(Some(GestureLabel::Scissors))); }
        if pressed(Key::N) { actions.push(UiAction::Pose(None)); }
        if pressed(Key::C) { actions.push(UiAction::Reconnect); }
        if pressed(Key::Key0) { actions.push(UiAction::ClearTarget); }

        const DIGITS: [Key; 9] = [
            Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5,
            Key::Key6, Key::Key7, Key::Key8, Key::Key9,
        ];
        for (i, &k) in DIGITS.iter().enumerate() {
            if pressed(k) { actions.push(UiAction::SelectPeer(i + 1)); }
        }
        actions
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState, conn: ConnectionState) {
        self.buf.fill(BG_COLOR);

        // ── Hands ─────────────────────────────────────────────────────────
        if let Some(remote) = app.remote() {
            self.draw_hand(remote, REMOTE_COLOR);
        }
        if app.local_hands().is_empty() {
            if let Some(local) = app.local() {
                self.draw_hand(local, LOCAL_COLOR);
            }
        } else {
            for hand in app.local_hands() {
                self.draw_hand(&hand.frame, LOCAL_COLOR);
            }
        }

        // ── Sparkles ──────────────────────────────────────────────────────
        for p in app.particles().particles() {
            let c = blend(BG_COLOR, SPARK_COLOR, p.life);
            self.fill_rect_i(p.x as isize - 1, p.y as isize - 1, 3, 3, c);
        }

        // ── Outcome banner ────────────────────────────────────────────────
        if app.mode() == SessionMode::Duel {
            if let Some(outcome) = app.banner().shown() {
                let text = outcome.to_string();
                let scale = 5;
                let w = text.chars().count() * 4 * scale;
                let x = STAGE_W.saturating_sub(w) / 2;
                self.draw_text(&text, x, 24, scale, banner_color(outcome));
            }
        }

        // ── Side panel ────────────────────────────────────────────────────
        self.draw_panel(app);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let status = format!("[{}]  {}", connection_label(conn), app.status);
        self.draw_text(&status, 10, STATUS_Y + 12, 2, 0xFFEEEEEE);
        self.draw_text(
            "R/P/S=pose  N=no hand  1-9=target  0=clear  C=reconnect  Q=quit",
            10, WIN_H - 18, 2, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_hand(&mut self, frame: &LandmarkFrame, color: u32) {
        let pts: Vec<(isize, isize)> = frame.joints().iter().map(stage_point).collect();

        for &(a, b) in HAND_CONNECTIONS.iter() {
            self.draw_line(pts[a], pts[b], blend(color, BG_COLOR, 0.35));
        }
        for &(x, y) in &pts {
            self.fill_rect_i(x - 2, y - 2, 5, 5, color);
        }
    }

    // ── Side panel ────────────────────────────────────────────────────────

    fn draw_panel(&mut self, app: &AppState) {
        self.fill_rect(STAGE_W, 0, PANEL_W, STATUS_Y, PANEL_BG);
        let x = STAGE_W + 12;

        self.draw_text(&format!("you: {}", app.username()), x, 12, 2, LOCAL_COLOR);
        let mode = match app.mode() {
            SessionMode::Duel  => "mode: duel",
            SessionMode::Share => "mode: share",
        };
        self.draw_text(mode, x, 32, 2, 0xFFAAAAAA);

        self.draw_text("PEERS", x, 64, 2, SELECTED_COLOR);
        let opponents = app.opponents();
        if opponents.is_empty() {
            self.draw_text("(none yet)", x, 86, 2, 0xFF666666);
        }
        let mut y = 86;
        for (i, name) in opponents.iter().take(9).enumerate() {
            let selected = app.selected() == Some(*name);
            let color = if selected { SELECTED_COLOR } else { REMOTE_COLOR };
            let line = format!("{} {}{}", i + 1, name, if selected { " <" } else { "" });
            self.draw_text(&line, x, y, 2, color);
            y += 18;
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    /// `fill_rect` for positions that may hang off the top or left edge.
    fn fill_rect_i(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        for dy in 0..h as isize {
            for dx in 0..w as isize {
                self.plot(x + dx, y + dy, color);
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn plot(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// Bresenham, clipped per pixel.
    fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), color: u32) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x, y, color);
            if x == to.0 && y == to.1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font: 3×5 glyphs, each pixel drawn `scale`×`scale`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

fn banner_color(outcome: MatchOutcome) -> u32 {
    match outcome {
        MatchOutcome::SelfWin       => LOCAL_COLOR,
        MatchOutcome::OpponentWin   => 0xFFE94560,
        MatchOutcome::Draw          => 0xFFEEEEEE,
        MatchOutcome::Indeterminate => 0xFF666666,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '[' => [0b011, 0b010, 0b010, 0b010, 0b011],
        ']' => [0b110, 0b010, 0b010, 0b010, 0b110],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_spans_the_stage() {
        assert_eq!(project(&Landmark::new(0.0, 0.0, 0.0)), (0.0, 0.0));
        assert_eq!(project(&Landmark::new(1.0, 1.0, 0.0)), (STAGE_W as f32, STAGE_H as f32));
    }

    #[test]
    fn stage_points_stay_bounded() {
        assert_eq!(stage_point(&Landmark::new(0.5, 0.5, 0.0)), (360, 270));
        let (x, y) = stage_point(&Landmark::new(1e9, -1e9, 0.0));
        assert_eq!((x, y), (2 * STAGE_W as isize, -(STAGE_H as isize)));
        let (x, _) = stage_point(&Landmark::new(f32::MAX, 0.0, 0.0));
        assert!(x <= 2 * STAGE_W as isize);
    }

    #[test]
    fn usernames_are_renderable() {
        for ch in "player-0042_x".chars() {
            assert_ne!(char_glyph(ch), char_glyph('\u{1}'), "no glyph for {ch:?}");
        }
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn banner_text_is_renderable() {
        for o in [MatchOutcome::SelfWin, MatchOutcome::OpponentWin, MatchOutcome::Draw] {
            for ch in o.to_string().chars() {
                assert_ne!(char_glyph(ch), char_glyph('\u{1}'), "no glyph for {ch:?}");
            }
        }
    }
}
