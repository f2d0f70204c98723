use std::io::{self, Stdout, stdout};
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use spike_hop::consts::*;
use spike_hop::render::{self, PixelBuf, Sprites};
use spike_hop::sound::{Effect, Sfx};
use spike_hop::{Game, KeyLatch, input};

/// Puts the terminal back however `run` exits.
struct TerminalGuard {
    /// Terminal reports key releases
    enhanced: bool,
}

impl TerminalGuard {
    fn enter(out: &mut Stdout) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut guard = TerminalGuard { enhanced: false };
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        if terminal::supports_keyboard_enhancement()? {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            guard.enhanced = true;
        }
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.enhanced {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("spike-hop starting");

    let result = run();
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}

fn run() -> anyhow::Result<()> {
    let sprites = Sprites::load(Path::new(PLAYER_SPRITE), Path::new(SPIKE_SPRITE))
        .context("failed to load sprites")?;
    let sfx = Sfx::new();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let mut game = Game::new(seed);

    let mut out = stdout();
    let guard = TerminalGuard::enter(&mut out).context("failed to set up terminal")?;
    let mut latch = if guard.enhanced {
        None
    } else {
        log::info!("no key release events, holding keys for {KEY_HOLD_TICKS} ticks");
        Some(KeyLatch::new(KEY_HOLD_TICKS, KEY_REPEAT_WINDOW_TICKS))
    };

    let (cols, rows) = terminal::size().context("failed to query terminal size")?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);

    while !game.done {
        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(ev) = input::translate(key) {
                        let ev = match latch.as_mut() {
                            Some(latch) => latch.observe(ev),
                            None => ev,
                        };
                        game.handle_event(ev);
                    }
                }
                Event::Resize(c, r) => buf.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }
        if game.done {
            break;
        }
        if let Some(latch) = latch.as_mut() {
            for ev in latch.tick() {
                game.handle_event(ev);
            }
        }

        // Update
        let events = game.update();
        if events.lost {
            log::info!("hit a spike at score {} (best {})", game.score, game.high_score);
        }
        if let Some(sfx) = &sfx {
            if events.bounced {
                sfx.play(Effect::Bounce);
            }
            if events.lost {
                sfx.play(Effect::Death);
            }
        }

        // Render
        render::draw(&game, &sprites, &mut buf);
        buf.render(&mut out)?;

        thread::sleep(FRAME_DELAY);
    }

    drop(guard);
    log::info!("quit with high score {}", game.high_score);
    Ok(())
}
