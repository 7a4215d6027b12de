//! Frame orchestration
//!
//! `Game` is what the browser loop holds behind `Rc<RefCell<_>>`. Input
//! callbacks write into it between frames, `frame` advances everything once,
//! and commentary comes back as jobs the host drives to completion and hands
//! back through `finish_commentary`.

use std::collections::HashMap;
use std::rc::Rc;

use futures::future::AbortHandle;
use serde::Serialize;

use crate::commentary::{
    Commentary, CommentaryBackend, CommentaryClient, CommentaryRequest, CommentaryTask, RateLimiter,
};
use crate::input::{PendingInput, VisionError, VisionSample};
use crate::platform::{Clock, Timer};
use crate::renderer::DrawList;
use crate::session::{Difficulty, Session, SessionChange, TauntLevel};
use crate::settings::Settings;
use crate::sim::{GameEvent, TickInput, World, tick};

/// How long a commentary line stays on screen
pub const COMMENTARY_VISIBLE_MS: f64 = 4_000.0;

/// Mixed into the world seed so spawns and commentary picks don't correlate
const COMMENTARY_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// What the HUD shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub round: u32,
    pub max_rounds: u32,
    pub misses: u32,
    pub ended: bool,
    pub taunt_level: TauntLevel,
}

/// Identifies a commentary job and the session it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentaryTicket {
    pub epoch: u64,
    pub id: u64,
}

/// A commentary request for the host to drive
///
/// The host awaits `task` (e.g. with `spawn_local`) and passes the result to
/// `Game::finish_commentary` along with `ticket`.
pub struct CommentaryJob {
    pub ticket: CommentaryTicket,
    pub task: CommentaryTask,
}

/// Rolling FPS over the last 60 frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    /// Record a frame timestamp (ms)
    pub fn record(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest entry is the one we'll overwrite next
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

pub struct Game {
    pub world: World,
    pub session: Session,
    pub input: PendingInput,
    settings: Settings,
    clock: Rc<dyn Clock>,
    commentary: CommentaryClient,
    /// Reused across frames
    events: Vec<GameEvent>,
    /// Bumped on restart and shutdown; jobs from older epochs are ignored
    epoch: u64,
    next_job_id: u64,
    in_flight: HashMap<u64, AbortHandle>,
    /// Line and the time it was accepted
    latest_commentary: Option<(Commentary, f64)>,
    running: bool,
    fps: FpsCounter,
}

impl Game {
    pub fn new(
        seed: u64,
        settings: Settings,
        clock: Rc<dyn Clock>,
        timer: Rc<dyn Timer>,
        backend: Option<Rc<dyn CommentaryBackend>>,
    ) -> Self {
        let session = Session::new(settings.difficulty);
        let world = World::new(seed, session.round, session.speed_multiplier());
        let limiter = RateLimiter::new(
            clock.clone(),
            settings.rate_limit_window_ms,
            settings.rate_limit_max_requests,
        );
        let commentary = CommentaryClient::new(
            backend,
            timer,
            limiter,
            settings.commentary_timeout_ms,
            seed ^ COMMENTARY_SEED_SALT,
        );

        log::info!(
            "New session: seed {}, difficulty {}, {} rounds",
            seed,
            session.difficulty.as_str(),
            session.max_rounds()
        );

        Self {
            world,
            session,
            input: PendingInput::default(),
            settings,
            clock,
            commentary,
            events: Vec::new(),
            epoch: 0,
            next_job_id: 0,
            in_flight: HashMap::new(),
            latest_commentary: None,
            running: true,
            fps: FpsCounter::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    /// Events produced by the most recent frame
    pub fn last_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Most recent commentary line accepted for this session
    pub fn latest_commentary(&self) -> Option<&Commentary> {
        self.latest_commentary.as_ref().map(|(line, _)| line)
    }

    /// The latest line while it is still due on screen
    pub fn visible_commentary(&self) -> Option<&Commentary> {
        let (line, shown_at) = self.latest_commentary.as_ref()?;
        (self.clock.now_ms() - shown_at <= COMMENTARY_VISIBLE_MS).then_some(line)
    }

    // === Input ===

    /// Aim and pinch already extracted by the host
    pub fn push_aim(&mut self, raw_x: f32, raw_y: f32, pinch_distance: f32) -> Result<(), VisionError> {
        let sample = VisionSample::new(raw_x, raw_y, pinch_distance).inspect_err(|e| {
            log::debug!("Dropped aim sample: {}", e);
        })?;
        let now = self.clock.now_ms();
        self.input.push_sample(sample, now);
        Ok(())
    }

    /// Full hand as a flat `[x, y, z, ...]` buffer
    pub fn push_landmarks(&mut self, flat: &[f32]) -> Result<(), VisionError> {
        let sample = VisionSample::from_flat(flat).inspect_err(|e| {
            log::debug!("Dropped vision frame: {}", e);
        })?;
        let now = self.clock.now_ms();
        self.input.push_sample(sample, now);
        Ok(())
    }

    /// Fire without a pinch (keyboard/click), still debounced
    pub fn shoot(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.input.trigger.pull(now)
    }

    // === Frame ===

    /// Advance one frame
    ///
    /// Returns commentary jobs started this frame. Once the session is over
    /// the world stops moving, but the caller keeps drawing.
    pub fn frame(&mut self, time_ms: f64) -> Vec<CommentaryJob> {
        self.events.clear();
        if !self.running {
            return Vec::new();
        }
        self.fps.record(time_ms);

        let shoot = self.input.take_shot();
        if self.session.is_over() {
            return Vec::new();
        }

        let input = TickInput {
            aim: self.input.aim,
            shoot,
            round: self.session.round,
            speed_multiplier: self.session.speed_multiplier(),
            refill: false,
        };
        tick(&mut self.world, &input, &mut self.events);

        let mut jobs = Vec::new();
        for i in 0..self.events.len() {
            let event = self.events[i];
            match self.session.apply(&event) {
                SessionChange::Scored { points } => {
                    log::debug!("+{} (score {})", points, self.session.score);
                }
                SessionChange::Missed => {
                    jobs.push(self.request_commentary());
                }
                SessionChange::None => {}
            }
        }

        // Replacements fly at the speed of the round the outcome led to
        let (round, speed) = (self.session.round, self.session.speed_multiplier());
        self.world.refill(round, speed, &mut self.events);
        jobs
    }

    fn request_commentary(&mut self) -> CommentaryJob {
        let lang = self.commentary.pick_lang();
        let request = CommentaryRequest::new(self.session.score, self.session.misses, self.session.round, lang);
        let task = self.commentary.request(request);

        self.next_job_id += 1;
        let ticket = CommentaryTicket {
            epoch: self.epoch,
            id: self.next_job_id,
        };
        self.in_flight.insert(ticket.id, task.abort_handle());
        CommentaryJob { ticket, task }
    }

    /// Hand back a finished job
    ///
    /// Returns the line if it belongs to the current session and should be
    /// shown; aborted jobs and jobs from an earlier session yield `None`.
    pub fn finish_commentary(
        &mut self,
        ticket: CommentaryTicket,
        result: Option<Commentary>,
    ) -> Option<&Commentary> {
        if ticket.epoch != self.epoch {
            log::debug!("Ignoring commentary from session epoch {}", ticket.epoch);
            return None;
        }
        self.in_flight.remove(&ticket.id);
        if !self.running {
            return None;
        }
        let line = result?;
        self.latest_commentary = Some((line, self.clock.now_ms()));
        self.latest_commentary()
    }

    /// Commentary jobs not yet handed back
    pub fn pending_commentary(&self) -> usize {
        self.in_flight.len()
    }

    // === Presentation ===

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.session.score,
            round: self.session.round.min(self.session.max_rounds()),
            max_rounds: self.session.max_rounds(),
            misses: self.session.misses,
            ended: self.session.is_over(),
            taunt_level: self.session.taunt_level(),
        }
    }

    pub fn draw_list(&self) -> DrawList {
        DrawList::build(&self.world, self.settings.effects)
    }

    // === Lifecycle ===

    /// Drop expired rate-limit windows; the host calls this on its own schedule
    pub fn sweep(&mut self) -> usize {
        self.commentary.sweep()
    }

    /// Difficulty for the next `restart`
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
    }

    /// Start a fresh session, discarding any commentary still in flight
    pub fn restart(&mut self, seed: u64) {
        self.cancel_commentary();
        self.session = Session::new(self.settings.difficulty);
        self.world = World::new(seed, self.session.round, self.session.speed_multiplier());
        self.input = PendingInput::default();
        self.events.clear();
        self.latest_commentary = None;
        self.running = true;
        log::info!(
            "Restarted: seed {}, difficulty {}",
            seed,
            self.session.difficulty.as_str()
        );
    }

    /// Stop the loop and cancel outstanding commentary
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.cancel_commentary();
        log::info!("Game shut down at score {}", self.session.score);
    }

    fn cancel_commentary(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        self.epoch += 1;
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("session", &self.session)
            .field("frame", &self.world.frame)
            .field("epoch", &self.epoch)
            .field("in_flight", &self.in_flight.len())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::CommentarySource;
    use crate::commentary::rate_limit::tests::ManualClock;
    use crate::consts::{BASE_SPEED, ESCAPE_Y, SPEED_PER_ROUND};
    use crate::sim::{PointerSmoother, TargetState};
    use futures::executor::block_on;
    use futures::future::{FutureExt, LocalBoxFuture};
    use glam::Vec2;

    /// Timer that fires immediately
    struct Instant;

    impl Timer for Instant {
        fn sleep(&self, _ms: u32) -> LocalBoxFuture<'static, ()> {
            futures::future::ready(()).boxed_local()
        }
    }

    fn game() -> (Game, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::default());
        clock.advance(1_000.0);
        let game = Game::new(42, Settings::default(), clock.clone(), Rc::new(Instant), None);
        (game, clock)
    }

    /// Park the raw aim and the smoothed cursor just off where the first
    /// target will be next frame: inside the hit radius, outside the headshot
    fn aim_at_first(game: &mut Game) -> u32 {
        let target = &game.world.targets[0];
        let (id, pos) = (target.id, target.pos + target.vel + Vec2::new(0.04, 0.0));
        game.world.cursor = PointerSmoother::new(pos);
        game.input.aim = pos;
        id
    }

    /// Force the live target out of the bottom of the screen next frame
    fn make_escape(game: &mut Game) {
        game.world.targets[0].pos = Vec2::new(0.5, ESCAPE_Y - 0.001);
        game.world.targets[0].vel = Vec2::new(0.0, 0.01);
    }

    #[test]
    fn test_frame_advances_world() {
        let (mut game, _) = game();
        assert!(game.frame(16.0).is_empty());
        assert_eq!(game.world.frame, 1);
        assert!(game.last_events().is_empty());
    }

    #[test]
    fn test_hit_scores() {
        let (mut game, _) = game();
        let id = aim_at_first(&mut game);
        assert!(game.shoot());

        game.frame(16.0);
        assert_eq!(game.world.target(id).map(|t| t.state), Some(TargetState::Shot));
        assert_eq!(game.session.score, 100);
        assert_eq!(game.session.round, 2);
        assert_eq!(game.session.misses, 0);
    }

    #[test]
    fn test_whiff_changes_nothing() {
        let (mut game, _) = game();
        game.world.cursor = PointerSmoother::new(Vec2::new(0.5, 0.05));
        game.input.aim = Vec2::new(0.5, 0.05);
        game.shoot();

        game.frame(16.0);
        assert!(matches!(game.last_events(), [GameEvent::ShotFired { .. }]));
        assert_eq!(game.hud().score, 0);
        assert_eq!(game.hud().misses, 0);
        assert_eq!(game.hud().round, 1);
    }

    #[test]
    fn test_shots_inside_debounce_fire_once() {
        let (mut game, clock) = game();
        assert!(game.shoot());
        clock.advance(100.0);
        assert!(!game.shoot());
        assert!(game.push_aim(0.5, 0.5, 0.0).is_ok());

        game.frame(16.0);
        let shots = game
            .last_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::ShotFired { .. }))
            .count();
        assert_eq!(shots, 1);

        clock.advance(250.0);
        assert!(game.shoot());
    }

    #[test]
    fn test_escape_counts_miss_and_requests_commentary() {
        let (mut game, _) = game();
        make_escape(&mut game);

        let jobs = game.frame(16.0);
        assert_eq!(game.session.misses, 1);
        assert_eq!(game.session.round, 2);
        assert_eq!(game.world.targets.len(), 1);
        assert_eq!(jobs.len(), 1);
        assert_eq!(game.pending_commentary(), 1);

        let CommentaryJob { ticket, task } = jobs.into_iter().next().unwrap();
        let result = block_on(task);
        let line = game.finish_commentary(ticket, result).cloned().unwrap();
        assert_eq!(line.source, CommentarySource::Fallback);
        assert!(!line.text.is_empty());
        assert_eq!(game.latest_commentary(), Some(&line));
        assert_eq!(game.pending_commentary(), 0);

        // Escape is reported once
        assert!(game.frame(32.0).is_empty());
        assert_eq!(game.session.misses, 1);
    }

    fn spawned_speed(game: &Game) -> Option<f32> {
        game.last_events().iter().find_map(|e| match e {
            GameEvent::TargetSpawned { id } => game.world.target(*id).map(|t| t.vel.x.abs()),
            _ => None,
        })
    }

    fn round_speed(round: u32) -> f32 {
        BASE_SPEED + round as f32 * SPEED_PER_ROUND
    }

    #[test]
    fn test_replacement_after_escape_uses_next_round_speed() {
        let (mut game, _) = game();
        make_escape(&mut game);

        game.frame(16.0);
        assert_eq!(game.session.round, 2);
        let speed = spawned_speed(&game).unwrap();
        assert!((speed - round_speed(2)).abs() < 1e-6, "speed {}", speed);
    }

    #[test]
    fn test_replacement_after_hit_uses_next_round_speed() {
        let (mut game, _) = game();
        aim_at_first(&mut game);
        game.shoot();
        game.frame(16.0);
        assert_eq!(game.session.round, 2);

        // The shot target has to fall off screen before its slot opens
        let mut speed = None;
        for i in 2..2_000 {
            game.frame(i as f64 * 16.0);
            speed = spawned_speed(&game);
            if speed.is_some() {
                break;
            }
        }
        let speed = speed.unwrap();
        assert_eq!(game.session.round, 2);
        assert!((speed - round_speed(2)).abs() < 1e-6, "speed {}", speed);
    }

    #[test]
    fn test_commentary_hides_after_display_window() {
        let (mut game, clock) = game();
        make_escape(&mut game);
        let job = game.frame(16.0).pop().unwrap();
        let result = block_on(job.task);
        assert!(game.finish_commentary(job.ticket, result).is_some());
        assert!(game.visible_commentary().is_some());

        clock.advance(COMMENTARY_VISIBLE_MS);
        assert!(game.visible_commentary().is_some());
        clock.advance(1.0);
        assert!(game.visible_commentary().is_none());
        assert!(game.latest_commentary().is_some());
    }

    #[test]
    fn test_commentary_from_previous_session_is_ignored() {
        let (mut game, _) = game();
        make_escape(&mut game);
        let job = game.frame(16.0).pop().unwrap();

        game.restart(7);
        assert_eq!(game.pending_commentary(), 0);
        let result = block_on(job.task);
        assert_eq!(result, None);
        assert!(game.finish_commentary(job.ticket, result).is_none());
        assert!(game.latest_commentary().is_none());
        assert_eq!(game.hud().misses, 0);
    }

    #[test]
    fn test_shutdown_stops_loop_and_aborts() {
        let (mut game, _) = game();
        make_escape(&mut game);
        let job = game.frame(16.0).pop().unwrap();

        game.shutdown();
        assert!(!game.is_running());
        assert_eq!(block_on(job.task), None);

        let frame = game.world.frame;
        game.frame(32.0);
        assert_eq!(game.world.frame, frame);
    }

    #[test]
    fn test_world_freezes_after_session_ends() {
        let (mut game, _) = game();
        game.session.round = game.session.max_rounds() + 1;
        let frame = game.world.frame;

        game.shoot();
        assert!(game.frame(16.0).is_empty());
        assert_eq!(game.world.frame, frame);

        let hud = game.hud();
        assert!(hud.ended);
        assert_eq!(hud.round, hud.max_rounds);
        assert!(!game.draw_list().is_empty());
    }

    #[test]
    fn test_difficulty_applies_on_restart() {
        let (mut game, _) = game();
        game.set_difficulty(Difficulty::Easy);
        assert_eq!(game.hud().max_rounds, 10);

        game.restart(1);
        assert_eq!(game.hud().max_rounds, 5);
        assert_eq!(game.session.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_bad_vision_frames_keep_last_aim() {
        let (mut game, _) = game();
        game.push_aim(0.25, 0.5, 0.3).unwrap();
        let aim = game.input.aim;

        assert!(game.push_aim(f32::NAN, 0.5, 0.3).is_err());
        assert!(game.push_landmarks(&[0.0; 9]).is_err());
        assert_eq!(game.input.aim, aim);
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::default();
        for i in 1..=120 {
            fps.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps.fps(), 60);
    }
}
