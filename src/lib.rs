//! Spike Hop - a bouncing square dodges spikes in your terminal
//!
//! Core modules:
//! - `game`: entities, physics, collision and spike spawning
//! - `input`: action mapping and held-key table
//! - `render`: half-block pixel buffer, sprites and HUD
//! - `font`: tiny bitmap font for the HUD
//! - `sound`: synthesized sound effects

pub mod error;
pub mod font;
pub mod game;
pub mod input;
pub mod render;
pub mod sound;

pub use error::{Error, Result};
pub use game::{Entity, Game, TickEvents};
pub use input::{Action, InputEvent, KeyLatch, Keys};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Logical playfield size (physics runs in these units)
    pub const WIN_W: i32 = 800;
    pub const WIN_H: i32 = 600;

    pub const GRAVITY: i32 = 1;
    /// Horizontal speed while a direction key is held
    pub const SPEED: i32 = 10;
    /// Vertical velocity applied on floor contact
    pub const BOUNCE_VELOCITY: i32 = -25;
    /// Ticks between a bounce and the next spike generation
    pub const SPAWN_DELAY_TICKS: u32 = 5;

    pub const PLAYER_START: (i32, i32) = (200, 200);
    pub const PLAYER_SIZE: i32 = 40;
    /// Where the player reappears after a restart
    pub const RESTART_POS: (i32, i32) = (100, 100);

    pub const SPIKE_W: i32 = 30;
    pub const SPIKE_BASE_H: i32 = 70;
    pub const MAX_EXTRA_SPIKES: u32 = 8;

    /// How long a press counts as held when the terminal can't report
    /// releases; spans the usual auto-repeat delay
    pub const KEY_HOLD_TICKS: u32 = 30;
    /// Presses closer together than this are terminal auto-repeat
    pub const KEY_REPEAT_WINDOW_TICKS: u32 = 3;

    /// ~60 Hz, not compensated for frame time
    pub const FRAME_DELAY: Duration = Duration::from_millis(1000 / 60);

    pub const PLAYER_SPRITE: &str = "assets/player.png";
    pub const SPIKE_SPRITE: &str = "assets/spike.png";

    pub const RESTART_MESSAGE: &str = "Press SPACE to play again";

    pub const COLOR_COUNT: usize = 10;
    /// Background palette, cycled by score
    pub const PALETTE: [(u8, u8, u8); COLOR_COUNT] = [
        (239, 68, 68),  // red
        (249, 115, 22), // orange
        (245, 158, 11), // amber
        (234, 179, 8),  // yellow
        (132, 204, 22), // lime
        (34, 197, 94),  // green
        (16, 185, 129), // emerald
        (20, 184, 166), // teal
        (6, 182, 212),  // cyan
        (14, 165, 233), // light blue
    ];
}
