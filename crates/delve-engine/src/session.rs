//! The session lifecycle.
//!
//! [`Session`] owns one engine context, the observation the engine writes
//! into, the buffers behind it, and the current transcript recording.
//!
//! # Ownership model
//!
//! `Session` is [`Send`] but not [`Sync`]. Every mutating method takes
//! `&mut self`, so `reset`, `step` and `close` can never overlap, and the
//! observation cannot be read while the engine is writing it.
//!
//! # Shutdown
//!
//! [`close()`](Session::close) ends the context and closes the recording.
//! It is idempotent and also runs on drop.

use std::fmt;
use std::path::Path;

use delve_core::{
    Seeds, SessionConfig, SessionError, SessionState, Settings, TerminationReason,
};
use delve_obs::{BufferSet, Observation};

use crate::engine::{EngineBackend, EngineContext, ResetArgs};
use crate::seeds::{self, SeedController};
use crate::transcript::{PendingTranscript, Transcript};

const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Session>();
    }
};

/// A single engine session.
///
/// ```ignore
/// let mut session = Session::new(backend, SessionConfig::new("libdelve.so"))?;
/// session.set_buffers(BufferSet::new().with(Channel::Glyphs, HostArray::<i16>::for_channel(Channel::Glyphs)))?;
/// session.reset()?;
/// while !session.done() {
///     session.step(0)?;
/// }
/// println!("{:?}", session.how_done());
/// ```
pub struct Session {
    backend: Box<dyn EngineBackend>,
    context: Option<Box<dyn EngineContext>>,
    settings: Settings,
    obs: Observation,
    seeds: SeedController,
    transcript: Transcript,
    state: SessionState,
    steps: u64,
    episodes: u64,
}

impl Session {
    /// Validate `config` and open its transcript, if one is configured.
    ///
    /// No engine call happens until the first [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// [`SessionError::Length`], [`SessionError::NulByte`],
    /// [`SessionError::PathTooLong`] from validation, or
    /// [`SessionError::Io`] if the transcript cannot be opened.
    pub fn new(
        backend: impl EngineBackend + 'static,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let settings = config.validate()?;
        let transcript = match config.transcript_path() {
            Some(path) => Transcript::open(path)?,
            None => Transcript::none(),
        };
        tracing::debug!(
            engine = %settings.engine_path.display(),
            transcript = ?transcript.path().map(Path::display),
            "session created"
        );
        Ok(Self {
            backend: Box::new(backend),
            context: None,
            settings,
            obs: Observation::new(),
            seeds: SeedController::new(),
            transcript,
            state: SessionState::New,
            steps: 0,
            episodes: 0,
        })
    }

    // ── Buffers ────────────────────────────────────────────────────

    /// Bind the observation buffers. Channels absent from `set` are unbound.
    ///
    /// # Errors
    ///
    /// [`SessionError::Lifecycle`] after the first reset, or
    /// [`SessionError::Bind`] if any region is rejected, in which case no
    /// binding changes.
    pub fn set_buffers(&mut self, set: BufferSet) -> Result<(), SessionError> {
        if self.state != SessionState::New {
            return Err(SessionError::Lifecycle {
                operation: "set_buffers",
                state: self.state,
            });
        }
        self.obs.bind(set)?;
        tracing::debug!(bound = ?self.obs.bound_channels().collect::<Vec<_>>(), "buffers bound");
        Ok(())
    }

    // ── Reset ──────────────────────────────────────────────────────

    /// Start a new episode, recording into the current transcript.
    ///
    /// Clears the transcript display name. The first call starts the engine.
    ///
    /// # Errors
    ///
    /// [`SessionError::Lifecycle`] after close, [`SessionError::Engine`],
    /// or [`SessionError::InternalInconsistency`] if the engine reports the
    /// new episode already finished.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.ensure_open("reset")?;
        self.settings.transcript_name = Default::default();
        // A live engine keeps writing to its current recording.
        let transcript = match self.context {
            Some(_) => None,
            None => self.transcript.file(),
        };
        let args = ResetArgs {
            settings: &self.settings,
            transcript,
            initial_seeds: self.seeds.take(),
        };
        let outcome = run_reset(
            self.backend.as_mut(),
            &mut self.context,
            &mut self.obs,
            args,
        );
        self.finish_reset(outcome)
    }

    /// Start a new episode recording into `path`.
    ///
    /// The new file is opened before the engine call and the old one is
    /// closed only once the engine has switched over; on any failure the
    /// previous recording and display name stay in place.
    ///
    /// # Errors
    ///
    /// As [`reset`](Self::reset), plus [`SessionError::PathTooLong`],
    /// [`SessionError::NonUtf8Name`] and
    /// [`SessionError::Io`] from opening `path` (no engine call is made).
    pub fn reset_with_transcript(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        self.ensure_open("reset")?;
        let pending = PendingTranscript::open(path.as_ref())?;
        let previous_name =
            std::mem::replace(&mut self.settings.transcript_name, pending.name().clone());
        let args = ResetArgs {
            settings: &self.settings,
            transcript: Some(pending.file()),
            initial_seeds: self.seeds.take(),
        };
        let outcome = run_reset(
            self.backend.as_mut(),
            &mut self.context,
            &mut self.obs,
            args,
        );
        if outcome.is_err() {
            self.settings.transcript_name = previous_name;
            return outcome;
        }
        self.transcript.install(pending);
        self.finish_reset(outcome)
    }

    fn finish_reset(&mut self, outcome: Result<(), SessionError>) -> Result<(), SessionError> {
        outcome?;
        self.steps = 0;
        if self.obs.done() {
            self.state = SessionState::Done;
            tracing::warn!("engine reported done right after reset");
            return Err(SessionError::InternalInconsistency {
                reason: "done right after reset".to_owned(),
            });
        }
        self.episodes += 1;
        self.state = SessionState::Ready;
        tracing::debug!(
            episode = self.episodes,
            transcript = self.settings.transcript_name.as_str(),
            "episode reset"
        );
        Ok(())
    }

    // ── Step ───────────────────────────────────────────────────────

    /// Advance one turn with `action`.
    ///
    /// Checks run before the action is written, so a rejected call leaves
    /// the observation untouched. If the engine call fails, the previous
    /// action is restored.
    ///
    /// # Errors
    ///
    /// [`SessionError::Lifecycle`] after close, [`SessionError::NotReady`]
    /// before the first reset, [`SessionError::AlreadyDone`] once the
    /// episode has ended, or [`SessionError::Engine`].
    pub fn step(&mut self, action: i32) -> Result<(), SessionError> {
        self.ensure_open("step")?;
        let Some(ctx) = self.context.as_mut() else {
            return Err(SessionError::NotReady { operation: "step" });
        };
        if self.obs.done() {
            return Err(SessionError::AlreadyDone);
        }
        let previous = self.obs.action();
        self.obs.set_action(action);
        if let Err(e) = ctx.step(&mut self.obs) {
            self.obs.set_action(previous);
            tracing::warn!(action, error = %e, "engine step failed");
            return Err(e.into());
        }
        self.steps += 1;
        if self.obs.done() {
            self.state = SessionState::Done;
            tracing::info!(
                episode = self.episodes,
                steps = self.steps,
                how_done = ?self.obs.how_done(),
                "episode done"
            );
        } else {
            self.state = SessionState::Running;
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Whether the current episode has ended. `false` before the first reset.
    pub fn done(&self) -> bool {
        self.obs.done()
    }

    /// Whether the engine is in normal play.
    pub fn in_normal_game(&self) -> bool {
        self.obs.in_normal_game()
    }

    /// Why the episode ended; `None` while it is still running.
    pub fn how_done(&self) -> Option<TerminationReason> {
        self.obs.how_done()
    }

    /// The observation and its bound buffers.
    pub fn observation(&self) -> &Observation {
        &self.obs
    }

    /// The validated settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The current recording.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Steps taken since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of successful resets.
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    // ── Seeds ──────────────────────────────────────────────────────

    /// Seeds for the next reset only. The last call before a reset wins.
    pub fn set_initial_seeds(&mut self, seeds: Seeds) {
        self.seeds.set_initial(seeds);
    }

    /// The seeds waiting for the next reset.
    pub fn pending_initial_seeds(&self) -> Option<&Seeds> {
        self.seeds.pending()
    }

    /// Replace the live engine seeds.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotReady`] without a live context (before the first
    /// reset or after close), or [`SessionError::Engine`].
    pub fn set_seeds(&mut self, seeds: Seeds) -> Result<(), SessionError> {
        seeds::set_live(self.context.as_mut(), seeds)?;
        tracing::debug!(?seeds, "live seeds set");
        Ok(())
    }

    /// Read the live engine seeds.
    ///
    /// # Errors
    ///
    /// As [`set_seeds`](Self::set_seeds).
    pub fn get_seeds(&mut self) -> Result<Seeds, SessionError> {
        seeds::get_live(self.context.as_mut())
    }

    // ── Settings ───────────────────────────────────────────────────

    /// Replace the starting-kit specification used by later resets.
    ///
    /// # Errors
    ///
    /// [`SessionError::Length`] or [`SessionError::NulByte`]; the previous
    /// value is kept.
    pub fn set_wizkit(&mut self, wizkit: &str) -> Result<(), SessionError> {
        self.settings.set_wizkit(wizkit)
    }

    // ── Close ──────────────────────────────────────────────────────

    /// End the engine context and close the recording. Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(ctx) = self.context.take() {
            ctx.end();
        }
        self.transcript.close();
        self.state = SessionState::Closed;
        tracing::info!(episodes = self.episodes, "session closed");
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Lifecycle {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

/// `start` the engine when there is no context yet, `reset` it otherwise.
fn run_reset(
    backend: &mut dyn EngineBackend,
    context: &mut Option<Box<dyn EngineContext>>,
    obs: &mut Observation,
    args: ResetArgs<'_>,
) -> Result<(), SessionError> {
    match context {
        Some(ctx) => ctx.reset(obs, args)?,
        None => {
            let ctx = backend.start(obs, args)?;
            tracing::info!(engine = %args.settings.engine_path.display(), "engine started");
            *context = Some(ctx);
        }
    }
    Ok(())
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("episodes", &self.episodes)
            .field("steps", &self.steps)
            .field("transcript", &self.transcript.path())
            .field("obs", &self.obs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use delve_core::{Channel, EngineError};
    use delve_obs::HostArray;

    /// What the engine saw on each call.
    #[derive(Debug, Default)]
    struct Log {
        starts: u32,
        resets: u32,
        ends: u32,
        seeds: Vec<Option<Seeds>>,
        names: Vec<String>,
        had_transcript: Vec<bool>,
    }

    /// Ends the episode after `length` steps; optionally fails or reports
    /// done on reset.
    struct Mock {
        log: Arc<Mutex<Log>>,
        length: u32,
        fail_reset: bool,
        done_on_reset: bool,
    }

    struct MockCtx {
        log: Arc<Mutex<Log>>,
        length: u32,
        turn: u32,
        fail_reset: bool,
        done_on_reset: bool,
        live: Seeds,
    }

    impl Mock {
        fn new(length: u32) -> (Self, Arc<Mutex<Log>>) {
            let log = Arc::new(Mutex::new(Log::default()));
            (
                Self {
                    log: Arc::clone(&log),
                    length,
                    fail_reset: false,
                    done_on_reset: false,
                },
                log,
            )
        }
    }

    fn record(log: &Mutex<Log>, args: &ResetArgs<'_>) {
        let mut log = log.lock().unwrap();
        log.seeds.push(args.initial_seeds);
        log.names.push(args.settings.transcript_name.as_str().to_owned());
        log.had_transcript.push(args.transcript.is_some());
    }

    fn first_frame(obs: &mut Observation, done: bool) {
        obs.set_done(done);
        obs.set_in_normal_game(true);
        if let Some(g) = obs.channel_mut::<i16>(Channel::Glyphs) {
            g.fill(2359);
        }
    }

    impl EngineBackend for Mock {
        fn start(
            &mut self,
            obs: &mut Observation,
            args: ResetArgs<'_>,
        ) -> Result<Box<dyn EngineContext>, EngineError> {
            record(&self.log, &args);
            self.log.lock().unwrap().starts += 1;
            first_frame(obs, self.done_on_reset);
            Ok(Box::new(MockCtx {
                log: Arc::clone(&self.log),
                length: self.length,
                turn: 0,
                fail_reset: self.fail_reset,
                done_on_reset: self.done_on_reset,
                live: args.initial_seeds.unwrap_or(Seeds::new(0, 0, false)),
            }))
        }
    }

    impl EngineContext for MockCtx {
        fn reset(&mut self, obs: &mut Observation, args: ResetArgs<'_>) -> Result<(), EngineError> {
            record(&self.log, &args);
            if self.fail_reset {
                return Err(EngineError::Failed {
                    operation: "reset",
                    reason: "scripted".into(),
                });
            }
            self.log.lock().unwrap().resets += 1;
            self.turn = 0;
            first_frame(obs, self.done_on_reset);
            Ok(())
        }

        fn step(&mut self, obs: &mut Observation) -> Result<(), EngineError> {
            self.turn += 1;
            if self.turn >= self.length {
                obs.set_done(true);
                obs.set_how_done(TerminationReason::Quit);
            }
            Ok(())
        }

        fn set_seed(&mut self, seeds: Seeds) -> Result<(), EngineError> {
            self.live = seeds;
            Ok(())
        }

        fn get_seed(&mut self) -> Result<Seeds, EngineError> {
            Ok(self.live)
        }

        fn end(self: Box<Self>) {
            self.log.lock().unwrap().ends += 1;
        }
    }

    fn session(length: u32) -> (Session, Arc<Mutex<Log>>) {
        let (mock, log) = Mock::new(length);
        (Session::new(mock, SessionConfig::new("mock")).unwrap(), log)
    }

    #[test]
    fn step_before_reset_is_not_ready_and_leaves_obs() {
        let (mut s, _) = session(3);
        s.set_buffers(BufferSet::new().with(Channel::Glyphs, HostArray::<i16>::for_channel(Channel::Glyphs)))
            .unwrap();
        let err = s.step(7).unwrap_err();
        assert!(matches!(err, SessionError::NotReady { operation: "step" }));
        assert_eq!(s.observation().action(), 0);
        assert!(s.observation().glyphs().unwrap().iter().all(|&g| g == 0));
        assert!(!s.done());
    }

    #[test]
    fn first_reset_starts_then_resets() {
        let (mut s, log) = session(3);
        s.reset().unwrap();
        s.reset().unwrap();
        let log = log.lock().unwrap();
        assert_eq!(log.starts, 1);
        assert_eq!(log.resets, 1);
        assert_eq!(s.episodes(), 2);
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn step_until_done_then_already_done() {
        let (mut s, _) = session(3);
        s.reset().unwrap();
        s.step(0).unwrap();
        assert_eq!(s.state(), SessionState::Running);
        s.step(0).unwrap();
        s.step(0).unwrap();
        assert!(s.done());
        assert_eq!(s.state(), SessionState::Done);
        assert_eq!(s.how_done(), Some(TerminationReason::Quit));
        assert_eq!(s.steps(), 3);

        assert!(matches!(s.step(5), Err(SessionError::AlreadyDone)));
        assert_eq!(s.observation().action(), 0);

        s.reset().unwrap();
        assert!(!s.done());
        assert_eq!(s.steps(), 0);
        s.step(1).unwrap();
    }

    #[test]
    fn initial_seeds_are_consumed_once() {
        let (mut s, log) = session(3);
        s.set_initial_seeds(Seeds::new(1, 2, false));
        s.set_initial_seeds(Seeds::new(3, 4, true).with_lgen(0));
        s.reset().unwrap();
        s.reset().unwrap();
        let log = log.lock().unwrap();
        assert_eq!(
            log.seeds,
            vec![Some(Seeds::new(3, 4, true).with_lgen(0)), None]
        );
    }

    #[test]
    fn seeds_are_consumed_even_when_reset_fails() {
        let (mut mock, log) = Mock::new(3);
        mock.fail_reset = true;
        let mut s = Session::new(mock, SessionConfig::new("mock")).unwrap();
        s.reset().unwrap();
        s.set_initial_seeds(Seeds::new(9, 9, false));
        assert!(matches!(s.reset(), Err(SessionError::Engine(_))));
        assert!(s.pending_initial_seeds().is_none());
        assert_eq!(log.lock().unwrap().seeds[1], Some(Seeds::new(9, 9, false)));
    }

    #[test]
    fn done_after_reset_is_internal_inconsistency() {
        let (mut mock, _) = Mock::new(3);
        mock.done_on_reset = true;
        let mut s = Session::new(mock, SessionConfig::new("mock")).unwrap();
        let err = s.reset().unwrap_err();
        assert!(matches!(err, SessionError::InternalInconsistency { .. }));
        assert_eq!(s.state(), SessionState::Done);
        assert_eq!(s.episodes(), 0);
    }

    #[test]
    fn live_seeds_round_trip_through_context() {
        let (mut s, _) = session(3);
        assert!(matches!(
            s.get_seeds(),
            Err(SessionError::NotReady { operation: "get_seeds" })
        ));
        s.reset().unwrap();
        let seeds = Seeds::new(11, 12, true);
        s.set_seeds(seeds).unwrap();
        assert_eq!(s.get_seeds().unwrap(), seeds);
    }

    #[test]
    fn set_buffers_after_reset_is_lifecycle_error() {
        let (mut s, _) = session(3);
        s.reset().unwrap();
        let err = s.set_buffers(BufferSet::new()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Lifecycle {
                operation: "set_buffers",
                state: SessionState::Ready
            }
        ));
    }

    #[test]
    fn close_twice_is_a_no_op_and_blocks_reuse() {
        let (mut s, log) = session(3);
        s.reset().unwrap();
        s.close();
        s.close();
        assert_eq!(log.lock().unwrap().ends, 1);
        assert_eq!(s.state(), SessionState::Closed);
        assert!(matches!(
            s.reset(),
            Err(SessionError::Lifecycle {
                operation: "reset",
                state: SessionState::Closed
            })
        ));
        assert!(matches!(s.step(0), Err(SessionError::Lifecycle { .. })));
        assert!(matches!(
            s.get_seeds(),
            Err(SessionError::NotReady { operation: "get_seeds" })
        ));
        assert!(matches!(
            s.set_seeds(Seeds::new(1, 2, false)),
            Err(SessionError::NotReady { operation: "set_seeds" })
        ));
        drop(s);
        assert_eq!(log.lock().unwrap().ends, 1);
    }

    #[test]
    fn drop_ends_the_context() {
        let (mut s, log) = session(3);
        s.reset().unwrap();
        drop(s);
        assert_eq!(log.lock().unwrap().ends, 1);
    }

    #[test]
    fn plain_reset_clears_name_and_keeps_recording() {
        let dir = tempfile::tempdir().unwrap();
        let (mock, log) = Mock::new(3);
        let config = SessionConfig::new("mock").transcript(dir.path().join("ep0.ttyrec"));
        let mut s = Session::new(mock, config).unwrap();
        assert_eq!(s.settings().transcript_name.as_str(), "ep0.ttyrec");

        s.reset().unwrap();
        s.reset().unwrap();
        let log = log.lock().unwrap();
        assert_eq!(log.names, vec!["".to_owned(), "".to_owned()]);
        assert_eq!(log.had_transcript, vec![true, false]);
        assert_eq!(s.transcript().path(), Some(dir.path().join("ep0.ttyrec").as_path()));
    }

    #[test]
    fn failed_engine_reset_keeps_old_transcript_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let (mut mock, _) = Mock::new(3);
        mock.fail_reset = true;
        let mut s = Session::new(mock, SessionConfig::new("mock")).unwrap();
        s.reset_with_transcript(dir.path().join("a.ttyrec")).unwrap();
        assert_eq!(s.settings().transcript_name.as_str(), "a.ttyrec");

        let err = s.reset_with_transcript(dir.path().join("b.ttyrec")).unwrap_err();
        assert!(matches!(err, SessionError::Engine(_)));
        assert_eq!(s.settings().transcript_name.as_str(), "a.ttyrec");
        assert_eq!(s.transcript().path(), Some(dir.path().join("a.ttyrec").as_path()));
    }

    #[test]
    fn unopenable_transcript_skips_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let (mut s, log) = session(3);
        s.set_initial_seeds(Seeds::new(1, 1, false));
        let err = s
            .reset_with_transcript(dir.path().join("nope").join("x.ttyrec"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
        assert_eq!(log.lock().unwrap().starts, 0);
        assert!(s.pending_initial_seeds().is_some());
        assert_eq!(s.state(), SessionState::New);
    }

    #[test]
    fn oversized_wizkit_is_rejected() {
        let (mut s, _) = session(3);
        assert!(matches!(
            s.set_wizkit(&"k".repeat(5000)),
            Err(SessionError::Length { field: "wizkit", .. })
        ));
        s.set_wizkit("wand of wishing").unwrap();
        assert_eq!(s.settings().wizkit.as_str(), "wand of wishing");
    }
}
