//! Terminal rendering: half-block pixel buffer, sprites and HUD
//!
//! The game lives in logical playfield units; everything here scales that
//! space onto whatever pixel grid the terminal currently offers (two
//! pixels per character cell, stacked vertically).

use std::io::{self, Write};
use std::path::Path;

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::font::{self, ADVANCE, GLYPH_H, GLYPH_W};
use crate::game::{Entity, Game};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);

/// Background for a score: score 1 gets the first palette entry, score 0
/// wraps around to the last.
pub fn background_color(score: u32) -> Rgb {
    let idx = (i64::from(score) - 1).rem_euclid(COLOR_COUNT as i64) as usize;
    let (r, g, b) = PALETTE[idx];
    Rgb(r, g, b)
}

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![BLACK; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, BLACK);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, r: Rect, c: Rgb) {
        for dy in 0..r.h {
            for dx in 0..r.w {
                self.set(r.x + dx, r.y + dy, c);
            }
        }
    }

    /// One-pixel outline
    pub fn stroke_rect(&mut self, r: Rect, c: Rgb) {
        for dx in 0..r.w {
            self.set(r.x + dx, r.y, c);
            self.set(r.x + dx, r.y + r.h - 1, c);
        }
        for dy in 0..r.h {
            self.set(r.x, r.y + dy, c);
            self.set(r.x + r.w - 1, r.y + dy, c);
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = BLACK;
        let mut prev_bg = BLACK;
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(to_ccolor(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(to_ccolor(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(to_ccolor(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn to_ccolor(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── Geometry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

impl From<&Entity> for Rect {
    fn from(e: &Entity) -> Self {
        Rect::new(e.x, e.y, e.w, e.h)
    }
}

/// Maps logical playfield rectangles onto buffer pixels
#[derive(Debug, Clone, Copy)]
struct Viewport {
    pw: i32,
    ph: i32,
    lw: i32,
    lh: i32,
}

impl Viewport {
    fn to_px(&self, r: Rect) -> Rect {
        let x0 = r.x * self.pw / self.lw;
        let y0 = r.y * self.ph / self.lh;
        let x1 = (r.x + r.w) * self.pw / self.lw;
        let y1 = (r.y + r.h) * self.ph / self.lh;
        Rect::new(x0, y0, (x1 - x0).max(1), (y1 - y0).max(1))
    }
}

// ── HUD layout (logical units) ──────────────────────────────────────────────

/// Big centered score; 72 units per digit cell
pub fn score_rect(score: u32, win_w: i32, win_h: i32) -> Rect {
    let d = font::digit_count(score);
    Rect::new((win_w - 72 * d) / 2, (win_h - 72) / 2, 72 * d, 160)
}

/// Top-left "Highscore: N" label; 14 units per character cell
pub fn high_score_rect(high_score: u32) -> Rect {
    let d = font::digit_count(high_score);
    Rect::new(10, 10, 14 * (11 + d), 24)
}

pub fn panel_rect(win_w: i32, win_h: i32) -> Rect {
    Rect::new((win_w - 400) / 2, (win_h - 100) / 2, 400, 100)
}

pub fn message_rect(win_w: i32, win_h: i32) -> Rect {
    let panel = panel_rect(win_w, win_h);
    // Room for the message plus one trailing cell
    let cells = RESTART_MESSAGE.chars().count() as i32 + 1;
    Rect::new(panel.x + 20, panel.y + (100 - 24) / 2, 14 * cells, 24)
}

// ── Sprites ─────────────────────────────────────────────────────────────────

/// Decoded image; `None` pixels are transparent
#[derive(Debug, Clone)]
pub struct Sprite {
    w: u32,
    h: u32,
    px: Vec<Option<Rgb>>,
}

impl Sprite {
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|source| Error::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        let img = img.to_rgba8();
        if img.width() == 0 || img.height() == 0 {
            return Err(Error::EmptySprite {
                path: path.to_path_buf(),
            });
        }
        log::info!(
            "loaded sprite {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Self::from_rgba(&img))
    }

    pub fn from_rgba(img: &image::RgbaImage) -> Self {
        let px = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a >= 128).then_some(Rgb(r, g, b))
            })
            .collect();
        Self {
            w: img.width(),
            h: img.height(),
            px,
        }
    }

    /// Nearest-neighbour scale into a pixel rectangle
    fn blit(&self, buf: &mut PixelBuf, dst: Rect) {
        if self.w == 0 || self.h == 0 {
            return;
        }
        for dy in 0..dst.h {
            let sy = (dy as u32 * self.h / dst.h as u32) as usize;
            for dx in 0..dst.w {
                let sx = (dx as u32 * self.w / dst.w as u32) as usize;
                if let Some(c) = self.px[sy * self.w as usize + sx] {
                    buf.set(dst.x + dx, dst.y + dy, c);
                }
            }
        }
    }
}

pub struct Sprites {
    pub player: Sprite,
    pub spike: Sprite,
}

impl Sprites {
    pub fn load(player: &Path, spike: &Path) -> Result<Self> {
        Ok(Self {
            player: Sprite::load(player)?,
            spike: Sprite::load(spike)?,
        })
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Draw `text` as large as fits in `dst` (pixel rect), at least scale 1.
fn draw_text(buf: &mut PixelBuf, dst: Rect, text: &str, fg: Rgb, align: Align) {
    let n = text.chars().count() as i32;
    if n == 0 {
        return;
    }
    let scale = (dst.w / (n * ADVANCE)).min(dst.h / GLYPH_H).max(1);
    let w = font::text_width(text) * scale;
    let x0 = match align {
        Align::Left => dst.x,
        Align::Center => dst.x + (dst.w - w) / 2,
    };
    let y0 = dst.y + (dst.h - GLYPH_H * scale) / 2;

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = font::glyph(ch) else {
            continue;
        };
        let cx = x0 + i as i32 * ADVANCE * scale;
        for row in 0..GLYPH_H {
            for col in 0..GLYPH_W {
                if glyph[(row * GLYPH_W + col) as usize] == 1 {
                    let cell = Rect::new(cx + col * scale, y0 + row * scale, scale, scale);
                    buf.fill_rect(cell, fg);
                }
            }
        }
    }
}

// ── Frame ───────────────────────────────────────────────────────────────────

/// Paint one frame. Reads the game, never changes it.
pub fn draw(game: &Game, sprites: &Sprites, buf: &mut PixelBuf) {
    let vp = Viewport {
        pw: buf.width() as i32,
        ph: buf.height() as i32,
        lw: game.win_w,
        lh: game.win_h,
    };
    if vp.pw == 0 || vp.ph == 0 {
        return;
    }
    let screen = Rect::new(0, 0, vp.pw, vp.ph);

    buf.fill_rect(screen, background_color(game.score));
    buf.stroke_rect(screen, WHITE);

    let score = vp.to_px(score_rect(game.score, game.win_w, game.win_h));
    draw_text(buf, score, &game.score.to_string(), WHITE, Align::Center);

    let label = format!("Highscore: {}", game.high_score);
    let hs = vp.to_px(high_score_rect(game.high_score));
    draw_text(buf, hs, &label, WHITE, Align::Left);

    sprites.player.blit(buf, vp.to_px(Rect::from(&game.player)));
    for spike in &game.spikes {
        sprites.spike.blit(buf, vp.to_px(Rect::from(spike)));
    }

    if game.lost {
        let panel = vp.to_px(panel_rect(game.win_w, game.win_h));
        buf.fill_rect(panel, BLACK);
        buf.stroke_rect(panel, WHITE);
        let msg = vp.to_px(message_rect(game.win_w, game.win_h));
        draw_text(buf, msg, RESTART_MESSAGE, WHITE, Align::Left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const RED: Rgb = Rgb(200, 0, 0);
    const GREEN: Rgb = Rgb(0, 200, 0);

    fn solid(c: Rgb) -> Sprite {
        Sprite::from_rgba(&RgbaImage::from_pixel(2, 2, Rgba([c.0, c.1, c.2, 255])))
    }

    fn sprites() -> Sprites {
        Sprites {
            player: solid(RED),
            spike: solid(GREEN),
        }
    }

    #[test]
    fn test_background_wraps_below_one() {
        assert_eq!(background_color(1), Rgb(239, 68, 68));
        assert_eq!(background_color(0), Rgb(14, 165, 233));
        assert_eq!(background_color(11), background_color(1));
        assert_eq!(background_color(10), background_color(0));
    }

    #[test]
    fn test_hud_layout() {
        assert_eq!(score_rect(5, 800, 600), Rect::new(364, 264, 72, 160));
        assert_eq!(score_rect(42, 800, 600), Rect::new(328, 264, 144, 160));
        assert_eq!(high_score_rect(7), Rect::new(10, 10, 168, 24));
        assert_eq!(panel_rect(800, 600), Rect::new(200, 250, 400, 100));
        assert_eq!(message_rect(800, 600), Rect::new(220, 288, 364, 24));
    }

    #[test]
    fn test_viewport_never_collapses() {
        let vp = Viewport {
            pw: 160,
            ph: 96,
            lw: 800,
            lh: 600,
        };
        assert_eq!(vp.to_px(Rect::new(200, 200, 40, 40)), Rect::new(40, 32, 8, 6));
        assert_eq!(vp.to_px(Rect::new(0, 0, 1, 1)), Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn test_transparent_pixels_skip() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 0]));
        let sprite = Sprite::from_rgba(&img);

        let mut buf = PixelBuf::new(4, 2);
        sprite.blit(&mut buf, Rect::new(0, 0, 4, 2));
        assert_eq!(buf.get(0, 0), Rgb(255, 0, 0));
        assert_eq!(buf.get(1, 1), Rgb(255, 0, 0));
        assert_eq!(buf.get(2, 0), BLACK);
        assert_eq!(buf.get(3, 1), BLACK);
    }

    #[test]
    fn test_missing_sprite_is_an_error() {
        let err = Sprite::load(Path::new("no/such/sprite.png")).unwrap_err();
        assert!(matches!(err, Error::Asset { .. }));
    }

    #[test]
    fn test_bundled_sprites_load() {
        let sprites = Sprites::load(Path::new(PLAYER_SPRITE), Path::new(SPIKE_SPRITE)).unwrap();
        assert_eq!((sprites.player.w, sprites.player.h), (16, 16));
        assert_eq!((sprites.spike.w, sprites.spike.h), (8, 16));
        // Spike tip is transparent at the corners
        assert!(sprites.spike.px[0].is_none());
    }

    #[test]
    fn test_draw_playing_frame() {
        let mut game = Game::new(1);
        game.spikes = vec![Entity::new(500, 530, 30, 70)];
        let mut buf = PixelBuf::new(160, 96);
        draw(&game, &sprites(), &mut buf);

        // Border
        assert_eq!(buf.get(0, 0), WHITE);
        assert_eq!(buf.get(159, 95), WHITE);
        // Background where nothing else is drawn
        assert_eq!(buf.get(41, 41), background_color(0));
        // Player at (200, 200) → pixel (40, 32)
        assert_eq!(buf.get(42, 34), RED);
        // Spike at (500, 530) → pixel (100, 84)
        assert_eq!(buf.get(102, 90), GREEN);
    }

    #[test]
    fn test_draw_lost_overlay() {
        let mut game = Game::new(1);
        game.lost = true;
        let mut buf = PixelBuf::new(160, 96);
        draw(&game, &sprites(), &mut buf);

        // Panel (200, 250, 400, 100) → pixel (40, 40, 80, 16)
        assert_eq!(buf.get(40, 40), WHITE);
        assert_eq!(buf.get(41, 41), BLACK);
        assert_eq!(buf.get(118, 54), BLACK);
        // Message glyphs land inside the panel
        let msg_white = (46..50).any(|y| (44..120).any(|x| buf.get(x, y) == WHITE));
        assert!(msg_white);
    }

    #[test]
    fn test_draw_score_digits() {
        let mut game = Game::new(1);
        game.score = 8;
        let mut buf = PixelBuf::new(160, 96);
        draw(&game, &sprites(), &mut buf);

        // Score rect (364, 264, 72, 160) → pixel (72, 42, 14, 25)
        let lit = (42..67).any(|y| (72..86).any(|x| buf.get(x, y) == WHITE));
        assert!(lit);
    }

    #[test]
    fn test_render_emits_half_blocks() {
        let mut buf = PixelBuf::new(3, 4);
        buf.set(1, 0, WHITE);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{2580}'));
        assert!(text.contains("\r\n"));
    }
}
