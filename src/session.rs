//! One interactive cube: state, history, gestures and playback.
//!
//! A [`Session`] owns everything a single cube view needs and is driven by the
//! caller's frame loop through [`Session::advance`]. Input handlers take
//! `&mut self`, run to completion and never block. Requests that arrive while
//! a turn is animating or a solve is running are ignored rather than queued.
//!
//! Every committed turn happens at the end of its animation: the cube, the
//! layer table and the history change together in one step, so no partial
//! rotation is ever observable as state.

use std::collections::VecDeque;
use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use log::{debug, error, info};
use nalgebra::Vector3;
use rand::Rng;

use crate::animation::{Animation, Easing, LayerTurn};
use crate::config::Config;
use crate::cube::Cube;
use crate::error::CubeError;
use crate::gesture::{FaceHit, GestureState, GestureTranslator, Settled};
use crate::grid::Layer;
use crate::history::MoveHistory;
use crate::notation::{format_sequence, parse_sequence, Move, Turn};
use crate::render::{full_scene, RenderCommand, RenderQueue};
use crate::solver::{SolveRequest, SolverOracle, Ticket};

/// Something observable that happened during [`Session::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A turn was committed and appended to history.
    Committed(Move),
    /// A released drag returned to rest without a turn.
    Cancelled(Layer),
    /// The last scramble step was committed.
    ScrambleFinished,
    /// Solver replay ended with a solved cube.
    Solved { steps: usize },
    /// Solver replay ended without solving the cube.
    SolveFailed(CubeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackKind {
    Scramble,
    Solve,
}

/// Moves replayed one at a time with a fixed delay between starts.
#[derive(Debug, Clone)]
struct Playback {
    kind: PlaybackKind,
    steps: VecDeque<Move>,
    step_delay: Duration,
    turn_duration: Duration,
    until_next: Duration,
    applied: usize,
}

/// Interactive cube session.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    cube: Cube,
    history: MoveHistory,
    gesture: GestureTranslator,
    render: RenderQueue,
    /// Button or replay turn currently animating.
    active_turn: Option<LayerTurn>,
    playback: Option<Playback>,
    solving: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Session {
    pub fn new(config: Config) -> Self {
        let cube = Cube::new(config.cubie_pitch);
        let mut render = RenderQueue::default();
        for command in full_scene(&cube) {
            render.push(command);
        }
        Self {
            gesture: GestureTranslator::new(config.clone()),
            config,
            cube,
            history: MoveHistory::new(),
            render,
            active_turn: None,
            playback: None,
            solving: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gesture.state()
    }

    /// Whether a solve request or its replay is in flight.
    pub fn is_solving(&self) -> bool {
        self.solving
    }

    /// Whether anything still needs [`Session::advance`] to finish.
    pub fn is_animating(&self) -> bool {
        self.active_turn.is_some() || self.playback.is_some() || self.gesture.is_settling()
    }

    /// Whether new input must be ignored.
    pub fn is_busy(&self) -> bool {
        self.is_animating()
            || self.solving
            || !matches!(self.gesture.state(), GestureState::Idle)
    }

    /// Takes the pending rendering instructions.
    pub fn drain_render_commands(&mut self) -> Vec<RenderCommand> {
        self.render.drain()
    }

    /// Starts a drag. Returns `false` if the press was ignored.
    pub fn pointer_down(&mut self, hit: Option<FaceHit>) -> bool {
        let busy = self.active_turn.is_some() || self.playback.is_some() || self.solving;
        self.gesture.pointer_down(hit, busy, &mut self.render)
    }

    pub fn pointer_move(&mut self, drag_vector: &Vector3<f64>, pixel_distance: f64) {
        self.gesture
            .pointer_move(drag_vector, pixel_distance, &self.cube, &mut self.render);
    }

    pub fn pointer_up(&mut self) {
        self.gesture.pointer_up(&self.cube, &mut self.render);
    }

    /// Animates a discrete move from a button. Returns `false` if ignored.
    ///
    /// The move is committed, and appears in history as one entry, when its
    /// animation ends.
    pub fn press(&mut self, m: Move) -> bool {
        if self.is_busy() {
            debug!("ignoring {m} while busy");
            return false;
        }
        self.start_turn(m, self.config.turn_duration);
        true
    }

    /// Queues a random scramble of outer-layer quarter turns.
    ///
    /// Returns the scramble, or `None` if the request was ignored.
    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec<Move>> {
        if self.is_busy() {
            debug!("ignoring scramble while busy");
            return None;
        }
        let moves: Vec<Move> = (0..self.config.scramble_length)
            .map(|_| random_outer_move(rng))
            .collect();
        info!("scrambling with {}", format_sequence(&moves));
        self.playback = Some(Playback {
            kind: PlaybackKind::Scramble,
            steps: moves.iter().copied().collect(),
            step_delay: self.config.scramble_step_delay,
            turn_duration: self.config.turn_duration,
            until_next: Duration::ZERO,
            applied: 0,
        });
        Some(moves)
    }

    /// Restores the solved cube and clears history. Returns `false` if ignored.
    pub fn reset(&mut self) -> bool {
        if self.is_busy() {
            debug!("ignoring reset while busy");
            return false;
        }
        self.cube = Cube::new(self.config.cubie_pitch);
        self.history.clear();
        for command in full_scene(&self.cube) {
            self.render.push(command);
        }
        true
    }

    /// Sends the history to `oracle` as a scramble.
    ///
    /// Returns `None` when busy or when there is nothing to solve. Otherwise
    /// the session stays in the solving state, rejecting other input, until
    /// the reply is handed to [`Session::start_solve_replay`] or the request
    /// is abandoned with [`Session::cancel_solve_request`].
    pub fn request_solve(&mut self, oracle: &impl SolverOracle) -> Option<Ticket<String>> {
        if self.is_busy() {
            debug!("ignoring solve while busy");
            return None;
        }
        if self.history.is_empty() {
            debug!("nothing to solve");
            return None;
        }
        self.solving = true;
        let request = SolveRequest::scramble(self.history.to_string())
            .with_max_depth(self.config.solve_max_depth);
        Some(oracle.solve(request))
    }

    /// Whether a solve request is waiting for the oracle's reply.
    pub fn is_awaiting_reply(&self) -> bool {
        self.solving && self.playback.is_none()
    }

    /// Starts replaying the oracle's reply. Returns the number of quarter-turn
    /// steps queued, or `None` if no request is waiting for a reply.
    ///
    /// Half turns are replayed as two quarter turns. On error the solving
    /// state is cleared and nothing is queued.
    pub fn start_solve_replay(
        &mut self,
        reply: Result<String, CubeError>,
    ) -> Result<Option<usize>, CubeError> {
        if !self.is_awaiting_reply() {
            debug!("ignoring solver reply without a pending request");
            return Ok(None);
        }
        let moves = match reply.and_then(|solution| parse_sequence(&solution)) {
            Ok(moves) => moves,
            Err(e) => {
                error!("solve aborted: {e}");
                self.solving = false;
                return Err(e);
            }
        };
        let steps: VecDeque<Move> = moves.into_iter().flat_map(Move::quarter_steps).collect();
        let count = steps.len();
        debug!("replaying {count} solver steps");
        self.playback = Some(Playback {
            kind: PlaybackKind::Solve,
            steps,
            step_delay: self.config.solve_step_delay,
            turn_duration: self.config.turn_duration + self.config.replay_extra_duration,
            until_next: Duration::ZERO,
            applied: 0,
        });
        Ok(Some(count))
    }

    /// Abandons a solve request whose reply will never be replayed.
    ///
    /// Returns `false` if no request is waiting. A replay already under way
    /// cannot be cancelled.
    pub fn cancel_solve_request(&mut self) -> bool {
        if !self.is_awaiting_reply() {
            return false;
        }
        debug!("solve request abandoned");
        self.solving = false;
        true
    }

    /// Requests a solution and queues its replay.
    ///
    /// Returns `Ok(false)` if the request was ignored.
    pub async fn solve(&mut self, oracle: &impl SolverOracle) -> Result<bool, CubeError> {
        let Some(ticket) = self.request_solve(oracle) else {
            return Ok(false);
        };
        let reply = ticket.await;
        Ok(self.start_solve_replay(reply)?.is_some())
    }

    /// Advances animations and playback by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        match self.gesture.advance(dt, &mut self.render) {
            Some(Settled::Commit(turn)) => self.finish_turn(turn, &mut events),
            Some(Settled::Cancel(turn)) => {
                self.render.reattach(&self.cube, &turn.members);
                events.push(SessionEvent::Cancelled(turn.layer));
            }
            None => {}
        }

        if let Some(turn) = &mut self.active_turn {
            let angle = turn.advance(dt);
            self.render.push(RenderCommand::RotateLayer {
                layer: turn.layer,
                axis: turn.layer.axis(),
                angle,
            });
            if turn.is_finished() {
                if let Some(turn) = self.active_turn.take() {
                    self.finish_turn(turn, &mut events);
                }
            }
        }

        self.advance_playback(dt, &mut events);
        events
    }

    /// Runs every pending animation and playback step to completion.
    pub fn settle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while self.is_animating() {
            events.extend(self.advance(Duration::MAX));
        }
        events
    }

    fn start_turn(&mut self, m: Move, duration: Duration) {
        let quarter_turns = signed_quarter_turns(m);
        let animation = Animation::new(
            0.0,
            f64::from(quarter_turns) * FRAC_PI_2,
            duration,
            Easing::EaseInOutCubic,
        );
        let members = self.cube.layer_members(m.layer).to_vec();
        self.render.detach_layer(&self.cube, m.layer);
        self.active_turn = Some(LayerTurn::new(m.layer, quarter_turns, animation, members));
    }

    fn finish_turn(&mut self, turn: LayerTurn, events: &mut Vec<SessionEvent>) {
        let committed = self.cube.commit_rotation(turn.layer, turn.target_angle());
        debug_assert!(committed.is_ok(), "non-quarter-turn angle reached commit");
        if let Err(e) = committed {
            error!("{e}");
            self.render.reattach(&self.cube, &turn.members);
            return;
        }
        self.render.reattach(&self.cube, &turn.members);

        if let Some(m) = Move::from_quarter_turns(turn.layer, turn.quarter_turns) {
            debug!("committed {m}");
            self.history.push(m);
            events.push(SessionEvent::Committed(m));
        }
    }

    fn advance_playback(&mut self, dt: Duration, events: &mut Vec<SessionEvent>) {
        let Some(mut playback) = self.playback.take() else {
            return;
        };
        playback.until_next = playback.until_next.saturating_sub(dt);

        if self.active_turn.is_some() {
            self.playback = Some(playback);
            return;
        }
        let solved_early = playback.kind == PlaybackKind::Solve && self.cube.is_solved();
        if playback.steps.is_empty() || solved_early {
            self.finish_playback(&playback, events);
            return;
        }
        if playback.until_next.is_zero() {
            if let Some(m) = playback.steps.pop_front() {
                self.start_turn(m, playback.turn_duration);
                playback.applied += 1;
                playback.until_next = playback.step_delay;
            }
        }
        self.playback = Some(playback);
    }

    fn finish_playback(&mut self, playback: &Playback, events: &mut Vec<SessionEvent>) {
        match playback.kind {
            PlaybackKind::Scramble => events.push(SessionEvent::ScrambleFinished),
            PlaybackKind::Solve => {
                self.solving = false;
                if self.cube.is_solved() {
                    info!("solved in {} steps", playback.applied);
                    self.history.clear();
                    events.push(SessionEvent::Solved {
                        steps: playback.applied,
                    });
                } else {
                    let e = CubeError::SolveVerificationFailed {
                        applied: playback.applied,
                    };
                    error!("{e}");
                    events.push(SessionEvent::SolveFailed(e));
                }
            }
        }
    }
}

/// Quarter turns of `m` in `-1..=2`, the short way round.
fn signed_quarter_turns(m: Move) -> i32 {
    match m.quarter_turns() {
        3 => -1,
        q => q,
    }
}

fn random_outer_move<R: Rng + ?Sized>(rng: &mut R) -> Move {
    let layer = Layer::OUTER[rng.random_range(0..Layer::OUTER.len())];
    let turn = if rng.random_bool(0.5) {
        Turn::Clockwise
    } else {
        Turn::CounterClockwise
    };
    Move::new(layer, turn)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    use super::*;
    use crate::geometry::Face;
    use crate::notation::decode;
    use crate::solver::{InverseScrambleEngine, WorkerSolver};

    /// Oracle that always gives the same answer.
    struct Fixed(Result<String, CubeError>);

    impl SolverOracle for Fixed {
        fn solve(&self, _request: SolveRequest) -> Ticket<String> {
            Ticket::ready(self.0.clone())
        }
    }

    fn press_all(session: &mut Session, moves: &str) {
        for m in parse_sequence(moves).unwrap() {
            assert!(session.press(m));
            session.settle();
        }
    }

    fn drag(session: &mut Session, face: Face, drag_vector: Vector3<f64>, angle: f64) {
        let config = session.config().clone();
        let pixels = angle / (config.drag_sensitivity * config.drag_gain);
        assert!(session.pointer_down(Some(FaceHit {
            face,
            point: face.normal() * 0.3,
        })));
        session.pointer_move(&drag_vector, pixels);
        session.pointer_up();
    }

    #[test]
    fn test_button_presses_keep_separate_entries() {
        let mut session = Session::default();
        press_all(&mut session, "F F");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().to_string(), "F F");
    }

    #[test]
    fn test_press_commits_at_animation_end() {
        let mut session = Session::default();
        assert!(session.press(decode("U").unwrap()));
        assert!(session.advance(Duration::from_millis(50)).is_empty());
        assert!(session.cube().is_solved());
        assert!(session.history().is_empty());

        let events = session.advance(Duration::from_millis(50));
        assert_eq!(events, vec![SessionEvent::Committed(decode("U").unwrap())]);
        assert!(!session.cube().is_solved());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_input_ignored_while_animating() {
        let mut session = Session::default();
        assert!(session.press(decode("R").unwrap()));
        assert!(!session.press(decode("U").unwrap()));
        assert!(!session.reset());
        assert!(!session.pointer_down(Some(FaceHit {
            face: Face::Up,
            point: Vector3::new(0.0, 0.3, 0.0),
        })));
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        assert!(session.scramble(&mut rng).is_none());
        session.settle();
        assert_eq!(session.history().to_string(), "R");
    }

    #[test]
    fn test_drag_below_threshold_changes_nothing() {
        let mut session = Session::default();
        drag(
            &mut session,
            Face::Right,
            Vector3::new(0.0, 0.3, 0.0),
            FRAC_PI_4 - 1e-6,
        );
        let events = session.settle();
        assert_eq!(events, vec![SessionEvent::Cancelled(Layer::Right)]);
        assert!(session.history().is_empty());
        assert!(session.cube().is_solved());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_drag_above_threshold_commits() {
        let mut session = Session::default();
        drag(
            &mut session,
            Face::Right,
            Vector3::new(0.0, 0.3, 0.0),
            FRAC_PI_4 + 1e-6,
        );
        session.settle();
        assert_eq!(session.history().to_string(), "R'");

        drag(
            &mut session,
            Face::Right,
            Vector3::new(0.0, -0.3, 0.0),
            FRAC_PI_4 + 1e-6,
        );
        session.settle();
        assert_eq!(session.history().to_string(), "R' R");
        assert!(session.cube().is_solved());
    }

    #[test]
    fn test_drag_reparents_and_restores() {
        let mut session = Session::default();
        session.drain_render_commands();
        drag(
            &mut session,
            Face::Front,
            Vector3::new(0.3, 0.0, 0.0),
            FRAC_PI_2,
        );
        session.settle();
        let commands = session.drain_render_commands();
        assert_eq!(
            commands.first(),
            Some(&RenderCommand::OrbitControls { enabled: false })
        );
        let placed = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::PlaceCubie { .. }))
            .count();
        assert_eq!(placed, 9);
        let orbit_on = RenderCommand::OrbitControls { enabled: true };
        assert!(commands.contains(&orbit_on));
    }

    #[test]
    fn test_scramble_is_seeded_and_recorded() {
        let mut first = Session::new(Config::default().instant());
        let mut second = Session::new(Config::default().instant());
        let a = first.scramble(&mut ChaCha12Rng::seed_from_u64(42)).unwrap();
        let b = second.scramble(&mut ChaCha12Rng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a
            .iter()
            .all(|m| Layer::OUTER.contains(&m.layer) && m.turn != Turn::Half));

        let events = first.settle();
        assert_eq!(events.last(), Some(&SessionEvent::ScrambleFinished));
        assert_eq!(first.history().moves(), a.as_slice());
    }

    #[test]
    fn test_solve_replays_inverse() {
        let mut session = Session::default();
        press_all(&mut session, "R U R' U'");
        let solved = pollster::block_on(session.solve(&Fixed(Ok("U R U' R'".to_string()))));
        assert_eq!(solved, Ok(true));
        assert!(session.is_solving());

        let events = session.settle();
        assert_eq!(events.last(), Some(&SessionEvent::Solved { steps: 4 }));
        assert!(session.cube().is_solved());
        assert!(session.history().is_empty());
        assert!(!session.is_solving());
    }

    #[test]
    fn test_solve_through_worker() {
        let solver = WorkerSolver::spawn(InverseScrambleEngine).unwrap();
        pollster::block_on(solver.init()).unwrap();

        let mut session = Session::new(Config::default().instant());
        session.scramble(&mut ChaCha12Rng::seed_from_u64(7));
        session.settle();
        assert_eq!(session.history().len(), 10);

        assert_eq!(pollster::block_on(session.solve(&solver)), Ok(true));
        let events = session.settle();
        assert!(matches!(events.last(), Some(SessionEvent::Solved { .. })));
        assert!(session.cube().is_solved());
    }

    #[test]
    fn test_half_turns_replay_as_quarter_steps() {
        let mut session = Session::default();
        press_all(&mut session, "F F");
        let ticket = session.request_solve(&Fixed(Ok("F2".to_string()))).unwrap();
        let reply = pollster::block_on(ticket);
        assert_eq!(session.start_solve_replay(reply), Ok(Some(2)));
        let events = session.settle();
        assert_eq!(events.last(), Some(&SessionEvent::Solved { steps: 2 }));
    }

    #[test]
    fn test_replay_stops_once_solved() {
        let mut session = Session::default();
        press_all(&mut session, "R");
        pollster::block_on(session.solve(&Fixed(Ok("R' U U'".to_string())))).unwrap();
        let events = session.settle();
        assert_eq!(events.last(), Some(&SessionEvent::Solved { steps: 1 }));
    }

    #[test]
    fn test_wrong_solution_fails_verification() {
        let mut session = Session::default();
        press_all(&mut session, "R U");
        pollster::block_on(session.solve(&Fixed(Ok("U'".to_string())))).unwrap();
        let events = session.settle();
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SolveFailed(CubeError::SolveVerificationFailed {
                applied: 1
            }))
        );
        assert!(!session.is_solving());
        assert!(!session.cube().is_solved());
        assert_eq!(session.history().to_string(), "R U U'");
    }

    #[test]
    fn test_solver_error_releases_guard() {
        let mut session = Session::default();
        press_all(&mut session, "L");
        let oracle = Fixed(Err(CubeError::SolverFailed("timeout".to_string())));
        let result = pollster::block_on(session.solve(&oracle));
        assert_eq!(result, Err(CubeError::SolverFailed("timeout".to_string())));
        assert!(!session.is_solving());
        assert!(session.press(decode("L'").unwrap()));
    }

    #[test]
    fn test_garbled_reply_is_invalid_notation() {
        let mut session = Session::default();
        press_all(&mut session, "L");
        let result = pollster::block_on(session.solve(&Fixed(Ok("L' X".to_string()))));
        assert_eq!(
            result,
            Err(CubeError::InvalidNotation {
                token: "X".to_string()
            })
        );
        assert!(!session.is_solving());
    }

    #[test]
    fn test_solve_ignored_without_history_or_while_pending() {
        let mut session = Session::default();
        let oracle = Fixed(Ok(String::new()));
        assert!(session.request_solve(&oracle).is_none());

        press_all(&mut session, "D");
        let ticket = session.request_solve(&oracle);
        assert!(ticket.is_some());
        assert!(session.request_solve(&oracle).is_none());
        assert!(!session.press(decode("D'").unwrap()));
        assert!(!session.pointer_down(Some(FaceHit {
            face: Face::Down,
            point: Vector3::new(0.0, -0.3, 0.0),
        })));
    }

    #[test]
    fn test_reset_restores_solved_cube() {
        let mut session = Session::default();
        press_all(&mut session, "R U M");
        assert!(session.reset());
        assert!(session.cube().is_solved());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_reply_without_request_is_ignored() {
        let mut session = Session::default();
        press_all(&mut session, "R");
        assert_eq!(session.start_solve_replay(Ok("R'".to_string())), Ok(None));
        assert!(!session.is_solving());
        assert!(!session.is_animating());
        assert_eq!(session.history().to_string(), "R");
    }

    #[test]
    fn test_reply_during_replay_is_ignored() {
        let mut session = Session::default();
        press_all(&mut session, "R");
        let ticket = session.request_solve(&Fixed(Ok("R'".to_string()))).unwrap();
        let reply = pollster::block_on(ticket);
        assert_eq!(session.start_solve_replay(reply), Ok(Some(1)));
        assert_eq!(session.start_solve_replay(Ok("U".to_string())), Ok(None));
        assert!(session.is_solving());

        let events = session.settle();
        assert_eq!(events.last(), Some(&SessionEvent::Solved { steps: 1 }));
        assert!(!session.is_solving());
    }

    #[test]
    fn test_abandoned_request_releases_guard() {
        let mut session = Session::default();
        press_all(&mut session, "R");
        let ticket = session.request_solve(&Fixed(Ok("R'".to_string())));
        drop(ticket);
        assert!(session.is_busy());
        assert!(!session.reset());

        assert!(session.cancel_solve_request());
        assert!(!session.is_solving());
        assert!(!session.cancel_solve_request());
        assert!(session.press(decode("R'").unwrap()));
        session.settle();
        assert!(session.cube().is_solved());
        assert_eq!(session.start_solve_replay(Ok("R".to_string())), Ok(None));
    }

    #[test]
    fn test_solve_respects_max_depth() {
        let solver = WorkerSolver::spawn(InverseScrambleEngine).unwrap();
        pollster::block_on(solver.init()).unwrap();

        let mut config = Config::default().instant();
        config.solve_max_depth = Some(1);
        let mut session = Session::new(config);
        press_all(&mut session, "R U");
        let result = pollster::block_on(session.solve(&solver));
        assert!(matches!(result, Err(CubeError::SolverFailed(_))));
        assert!(!session.is_solving());
        assert_eq!(session.history().to_string(), "R U");
    }
}
