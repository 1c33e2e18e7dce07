//! Test utilities and a scripted engine for Delve development.
//!
//! [`ScriptedBackend`] is a deterministic in-process stand-in for the native
//! engine: it draws a seeded map into whatever channels are bound, ends each
//! episode after a fixed number of steps, appends a plain-text log to the
//! recording it is given, and records every call it receives in a shared
//! [`EngineCalls`] log. [`fixtures`] builds buffer sets.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use delve_core::dims::{blstats, MAP_COLS, ROWNO, TERM_CO};
use delve_core::{Channel, EngineError, Seeds, TerminationReason};
use delve_engine::{EngineBackend, EngineContext, ResetArgs};
use delve_obs::Observation;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// First map-symbol glyph; scripted terrain is drawn from this range.
pub const TERRAIN_GLYPH_BASE: i16 = 2359;

/// Glyph drawn at the player's position.
pub const PLAYER_GLYPH: i16 = 337;

/// Message written on the first frame of every episode.
pub const WELCOME: &str = "Hello Agent, welcome to Delve!";

/// Seeds used when no initial seeds are supplied.
pub const DEFAULT_SEEDS: Seeds = Seeds {
    core: 0x5eed,
    display: 0xd15,
    reseed: false,
    lgen: None,
};

/// How a [`ScriptedBackend`] behaves.
#[derive(Clone, Debug)]
pub struct Script {
    /// Steps until `done` is reported.
    pub episode_length: u32,
    /// Reason reported when an episode ends.
    pub how_done: TerminationReason,
    /// Fail every `start`.
    pub fail_start: bool,
    /// Fail every `reset` on a live context.
    pub fail_reset: bool,
    /// Fail the step with this 1-based index within an episode.
    pub fail_step_at: Option<u32>,
    /// Report `done` immediately after start or reset.
    pub done_on_reset: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            episode_length: 10,
            how_done: TerminationReason::Died,
            fail_start: false,
            fail_reset: false,
            fail_step_at: None,
            done_on_reset: false,
        }
    }
}

impl Script {
    pub fn episode_length(mut self, steps: u32) -> Self {
        self.episode_length = steps;
        self
    }

    pub fn how_done(mut self, reason: TerminationReason) -> Self {
        self.how_done = reason;
        self
    }
}

/// Every call a scripted engine received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineCalls {
    pub starts: u32,
    pub resets: u32,
    pub steps: u32,
    pub ends: u32,
    /// Initial seeds passed to each start/reset, in call order.
    pub initial_seeds: Vec<Option<Seeds>>,
    /// Transcript display name seen by each start/reset.
    pub transcript_names: Vec<String>,
    /// Live seeds set through `set_seed`.
    pub live_seeds: Vec<Seeds>,
    pub actions: Vec<i32>,
}

/// Shared handle to an [`EngineCalls`] log.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<EngineCalls>>);

impl CallLog {
    /// Lock the log. Poisoning is ignored; tests only read it.
    pub fn lock(&self) -> MutexGuard<'_, EngineCalls> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A copy of the log.
    pub fn snapshot(&self) -> EngineCalls {
        self.lock().clone()
    }
}

/// Deterministic in-process engine.
#[derive(Debug)]
pub struct ScriptedBackend {
    script: Script,
    calls: CallLog,
}

impl ScriptedBackend {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: CallLog::default(),
        }
    }

    /// The call log shared with every context this backend starts.
    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new(Script::default())
    }
}

fn note_reset(calls: &CallLog, args: &ResetArgs<'_>) {
    let mut log = calls.lock();
    log.initial_seeds.push(args.initial_seeds);
    log.transcript_names
        .push(args.settings.transcript_name.as_str().to_owned());
}

fn clone_recording(
    operation: &'static str,
    file: Option<&File>,
) -> Result<Option<File>, EngineError> {
    file.map(File::try_clone)
        .transpose()
        .map_err(|e| EngineError::Failed {
            operation,
            reason: e.to_string(),
        })
}

fn rng_for(seeds: &Seeds) -> ChaCha8Rng {
    let lgen = seeds.lgen.map_or(0, |l| l.rotate_left(17) ^ 1);
    ChaCha8Rng::seed_from_u64(seeds.core ^ lgen)
}

impl EngineBackend for ScriptedBackend {
    fn start(
        &mut self,
        obs: &mut Observation,
        args: ResetArgs<'_>,
    ) -> Result<Box<dyn EngineContext>, EngineError> {
        note_reset(&self.calls, &args);
        if self.script.fail_start {
            return Err(EngineError::StartFailed {
                reason: "scripted start failure".into(),
            });
        }
        self.calls.lock().starts += 1;
        let live = args.initial_seeds.unwrap_or(DEFAULT_SEEDS);
        let mut ctx = ScriptedContext {
            script: self.script.clone(),
            calls: self.calls.clone(),
            rng: rng_for(&live),
            live,
            turn: 0,
            episode: 0,
            recording: clone_recording("start", args.transcript)?,
        };
        ctx.begin_episode(obs)?;
        Ok(Box::new(ctx))
    }
}

/// A context started by [`ScriptedBackend`].
#[derive(Debug)]
pub struct ScriptedContext {
    script: Script,
    calls: CallLog,
    rng: ChaCha8Rng,
    live: Seeds,
    turn: u32,
    episode: u32,
    recording: Option<File>,
}

impl ScriptedContext {
    fn record(&mut self, operation: &'static str, line: &str) -> Result<(), EngineError> {
        let Some(file) = self.recording.as_mut() else {
            return Ok(());
        };
        file.write_all(line.as_bytes())
            .map_err(|e| EngineError::Failed {
                operation,
                reason: e.to_string(),
            })
    }

    fn begin_episode(&mut self, obs: &mut Observation) -> Result<(), EngineError> {
        self.turn = 0;
        self.episode += 1;
        self.record("reset", &format!("episode {}\n", self.episode))?;
        obs.set_done(self.script.done_on_reset);
        obs.set_in_normal_game(true);
        self.draw(obs, true);
        Ok(())
    }

    /// Draw the current frame into every bound channel.
    fn draw(&mut self, obs: &mut Observation, first: bool) {
        let x = (self.rng.next_u32() as usize) % MAP_COLS;
        let y = (self.rng.next_u32() as usize) % ROWNO;
        let player = y * MAP_COLS + x;

        if let Some(glyphs) = obs.channel_mut::<i16>(Channel::Glyphs) {
            for g in glyphs.iter_mut() {
                *g = TERRAIN_GLYPH_BASE + (self.rng.next_u32() % 96) as i16;
            }
            glyphs[player] = PLAYER_GLYPH;
        }
        if let Some(chars) = obs.channel_mut::<u8>(Channel::Chars) {
            chars.fill(b'.');
            chars[player] = b'@';
        }
        if let Some(stats) = obs.channel_mut::<i64>(Channel::Blstats) {
            stats[blstats::X] = x as i64;
            stats[blstats::Y] = y as i64;
            stats[blstats::HP] = 12;
            stats[blstats::HPMAX] = 12;
            stats[blstats::DEPTH] = 1;
            stats[blstats::DLEVEL] = 1;
            stats[blstats::TIME] = i64::from(self.turn) + 1;
        }
        if let Some(message) = obs.channel_mut::<u8>(Channel::Message) {
            message.fill(0);
            if first {
                message[..WELCOME.len()].copy_from_slice(WELCOME.as_bytes());
            }
        }
        if let Some(tty) = obs.channel_mut::<u8>(Channel::TtyChars) {
            tty.fill(b' ');
            if first {
                tty[..WELCOME.len()].copy_from_slice(WELCOME.as_bytes());
            }
            tty[(y + 1) * TERM_CO + x] = b'@';
        }
        if let Some(cursor) = obs.channel_mut::<u8>(Channel::TtyCursor) {
            cursor[0] = (y + 1) as u8;
            cursor[1] = x as u8;
        }
    }
}

impl EngineContext for ScriptedContext {
    fn reset(&mut self, obs: &mut Observation, args: ResetArgs<'_>) -> Result<(), EngineError> {
        note_reset(&self.calls, &args);
        if self.script.fail_reset {
            return Err(EngineError::Failed {
                operation: "reset",
                reason: "scripted reset failure".into(),
            });
        }
        self.calls.lock().resets += 1;
        if let Some(next) = args.transcript {
            let next = clone_recording("reset", Some(next))?;
            // Flush the finished episode into the old recording first.
            self.record("reset", "end\n")?;
            self.recording = next;
        }
        if let Some(seeds) = args.initial_seeds {
            self.live = seeds;
            self.rng = rng_for(&seeds);
        }
        self.begin_episode(obs)
    }

    fn step(&mut self, obs: &mut Observation) -> Result<(), EngineError> {
        if self.script.fail_step_at == Some(self.turn + 1) {
            return Err(EngineError::Failed {
                operation: "step",
                reason: "scripted step failure".into(),
            });
        }
        {
            let mut log = self.calls.lock();
            log.steps += 1;
            log.actions.push(obs.action());
        }
        self.turn += 1;
        self.record("step", &format!("step {}\n", obs.action()))?;
        self.draw(obs, false);
        if self.turn >= self.script.episode_length {
            obs.set_done(true);
            obs.set_how_done(self.script.how_done);
            self.record("step", "done\n")?;
        }
        Ok(())
    }

    fn set_seed(&mut self, seeds: Seeds) -> Result<(), EngineError> {
        self.calls.lock().live_seeds.push(seeds);
        self.live = seeds;
        self.rng = rng_for(&seeds);
        Ok(())
    }

    fn get_seed(&mut self) -> Result<Seeds, EngineError> {
        Ok(self.live)
    }

    fn end(mut self: Box<Self>) {
        let _ = self.record("end", "end\n");
        self.calls.lock().ends += 1;
    }
}
