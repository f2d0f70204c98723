//! Game state, physics and spike spawning
//!
//! Everything here runs in logical playfield units and never touches the
//! terminal, so a tick is fully reproducible from a seed and an input log.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::input::{Action, InputEvent, Keys};

/// An axis-aligned box with integer velocity: the player or a spike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub vx: i32,
    pub vy: i32,
}

impl Entity {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            vx: 0,
            vy: 0,
        }
    }
}

/// Closed-interval horizontal overlap: touching edges count.
pub fn overlaps_x(a: &Entity, b: &Entity) -> bool {
    b.x + b.w >= a.x && b.x <= a.x + a.w
}

/// Would the player, after this tick's vertical move, reach the spike?
///
/// Uses the player's current x, not the x after this tick's horizontal
/// move, so horizontal dodges take effect one tick late.
pub fn hits_spike(player: &Entity, spike: &Entity) -> bool {
    player.y + player.vy + player.h >= spike.y && overlaps_x(player, spike)
}

/// Spikes added beyond the one under the player for a given score
pub fn extra_spike_count(score: u32) -> u32 {
    (score / 5).min(MAX_EXTRA_SPIKES)
}

pub fn spike_height(score: u32) -> i32 {
    SPIKE_BASE_H + (score / 2) as i32
}

/// What happened during one call to [`Game::update`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickEvents {
    /// Player touched the floor and scored
    pub bounced: bool,
    /// A new spike generation replaced the old one
    pub spawned: bool,
    /// Player ran into a spike this tick
    pub lost: bool,
}

/// The whole game: player, spikes, scores and held keys
#[derive(Debug, Clone)]
pub struct Game {
    pub win_w: i32,
    pub win_h: i32,
    /// Quit was requested
    pub done: bool,
    /// Player hit a spike; physics is frozen until restart
    pub lost: bool,
    pub player: Entity,
    /// Current spike generation
    pub spikes: Vec<Entity>,
    pub keys: Keys,
    pub score: u32,
    pub high_score: u32,
    spawn_countdown: Option<u32>,
    rng: Pcg32,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        let (x, y) = PLAYER_START;
        Self {
            win_w: WIN_W,
            win_h: WIN_H,
            done: false,
            lost: false,
            player: Entity::new(x, y, PLAYER_SIZE, PLAYER_SIZE),
            spikes: Vec::new(),
            keys: Keys::default(),
            score: 0,
            high_score: 0,
            spawn_countdown: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Apply one input event.
    ///
    /// Besides the physics step this is the only place game state changes:
    /// quitting, and restarting on a fresh (non-repeat) confirm press while
    /// the run is lost.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit
            | InputEvent::KeyDown {
                action: Action::Quit,
                ..
            } => self.done = true,
            InputEvent::KeyDown { action, repeat } => {
                self.keys.press(action);
                if action == Action::Confirm && self.lost && !repeat {
                    self.restart();
                }
            }
            InputEvent::KeyUp(action) => self.keys.release(action),
        }
    }

    /// Start a new run. High score and the current spikes are kept.
    pub fn restart(&mut self) {
        log::debug!("restart after score {}", self.score);
        self.lost = false;
        self.score = 0;
        let (x, y) = RESTART_POS;
        self.player.x = x;
        self.player.y = y;
        self.player.vx = 0;
        self.player.vy = 0;
        self.spawn_countdown = None;
    }

    /// Advance the simulation by one tick. Does nothing while lost.
    pub fn update(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        if self.lost {
            return events;
        }

        if self.spikes.iter().any(|s| hits_spike(&self.player, s)) {
            self.lost = true;
            events.lost = true;
        }

        let right = self.keys.is_held(Action::Right);
        let left = self.keys.is_held(Action::Left);
        let p = &mut self.player;
        if right && !left {
            p.vx = SPEED;
        }
        if left && !right {
            p.vx = -SPEED;
        }

        p.x += p.vx;
        p.y += p.vy;
        p.vx = 0;
        p.vy += GRAVITY;

        let spawn_due = match self.spawn_countdown {
            Some(n) if n <= 1 => {
                self.spawn_countdown = None;
                true
            }
            Some(n) => {
                self.spawn_countdown = Some(n - 1);
                false
            }
            None => false,
        };

        let expected_x = p.x + p.vx;
        if expected_x + p.w > self.win_w {
            p.x = self.win_w - p.w;
            p.vx = 0;
        }
        if expected_x < 0 {
            p.x = 0;
            p.vx = 0;
        }

        let expected_y = p.y + p.vy;
        if expected_y + p.h > self.win_h {
            p.y = self.win_h - p.h;
            p.vy = BOUNCE_VELOCITY;
            self.score += 1;
            self.high_score = self.high_score.max(self.score);
            self.spawn_countdown = Some(SPAWN_DELAY_TICKS);
            events.bounced = true;
        }
        if expected_y < 0 {
            p.y = 0;
            p.vy = 0;
        }

        if spawn_due {
            self.spawn();
            events.spawned = true;
        }

        events
    }

    /// Replace the spike generation: one spike under the player plus
    /// `extra_spike_count(score)` at random positions, all the same height.
    pub fn spawn(&mut self) {
        self.spikes.clear();

        let h = spike_height(self.score);
        let y = self.win_h - h;
        self.spikes.push(Entity::new(self.player.x, y, SPIKE_W, h));

        let extra = extra_spike_count(self.score);
        for _ in 0..extra {
            let x = self.rng.random_range(0..self.win_w - SPIKE_W);
            self.spikes.push(Entity::new(x, y, SPIKE_W, h));
        }
        log::debug!(
            "spawned {} spikes of height {h} at score {}",
            self.spikes.len(),
            self.score
        );
    }
}
