//! External solver adapter.
//!
//! The solving algorithm is a black box behind [`SolveEngine`]. It runs on a
//! dedicated worker thread fed through a command channel, and every request
//! hands back a [`Ticket`]: a future that resolves once the worker replies.
//!
//! Protocol:
//! - `init` must be acknowledged before the worker accepts `solve` requests.
//! - A request is either the scramble as a move-token string or the 54-letter
//!   facelet string of the current state.
//! - The reply is a move-token string. Callers are responsible for replaying it
//!   and checking that the cube ends solved.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::task::{Context, Poll, Waker};
use std::thread;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::CubeError;
use crate::history::invert;
use crate::notation::{format_sequence, parse_sequence};

/// Cube state handed to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveTarget {
    /// Space-separated moves that scrambled a solved cube.
    Scramble(String),
    /// `URFDLB` facelet string of the current state.
    Facelets(String),
}

/// What the oracle is asked to solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
    pub target: SolveTarget,
    /// Longest acceptable solution, in moves. `None` leaves it to the engine.
    pub max_depth: Option<usize>,
}

impl SolveRequest {
    pub fn scramble(moves: impl Into<String>) -> Self {
        Self {
            target: SolveTarget::Scramble(moves.into()),
            max_depth: None,
        }
    }

    pub fn facelets(facelets: impl Into<String>) -> Self {
        Self {
            target: SolveTarget::Facelets(facelets.into()),
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A solving algorithm. Runs on the worker thread.
pub trait SolveEngine: Send + 'static {
    /// One-time setup, such as building pruning tables.
    fn init(&mut self) -> Result<(), CubeError> {
        Ok(())
    }

    /// Returns a move-token string that solves the request.
    fn solve(&mut self, request: &SolveRequest) -> Result<String, CubeError>;
}

/// Answers scramble requests with the inverted scramble.
#[derive(Debug, Default, Clone, Copy)]
pub struct InverseScrambleEngine;

impl SolveEngine for InverseScrambleEngine {
    fn solve(&mut self, request: &SolveRequest) -> Result<String, CubeError> {
        let scramble = match &request.target {
            SolveTarget::Scramble(scramble) => scramble,
            SolveTarget::Facelets(_) => {
                return Err(CubeError::SolverFailed(
                    "facelet requests need a search solver".to_string(),
                ));
            }
        };
        let solution = invert(&parse_sequence(scramble)?);
        if let Some(max_depth) = request.max_depth {
            if solution.len() > max_depth {
                return Err(CubeError::SolverFailed(format!(
                    "no solution within {max_depth} moves"
                )));
            }
        }
        Ok(format_sequence(&solution))
    }
}

struct Slot<T> {
    result: Option<Result<T, CubeError>>,
    completed: bool,
    waker: Option<Waker>,
}

/// Pending reply from the solver.
pub struct Ticket<T>(Arc<Mutex<Slot<T>>>);

impl<T> fmt::Debug for Ticket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("completed", &self.0.lock().completed)
            .finish()
    }
}

impl<T> Ticket<T> {
    fn pending() -> (Self, Responder<T>) {
        let slot = Arc::new(Mutex::new(Slot {
            result: None,
            completed: false,
            waker: None,
        }));
        (Ticket(Arc::clone(&slot)), Responder(slot))
    }

    /// A ticket that is already resolved.
    pub fn ready(result: Result<T, CubeError>) -> Self {
        let (ticket, responder) = Self::pending();
        responder.complete(result);
        ticket
    }

    pub fn is_completed(&self) -> bool {
        self.0.lock().completed
    }
}

impl<T> Future for Ticket<T> {
    type Output = Result<T, CubeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.0.lock();
        match slot.result.take() {
            Some(result) => Poll::Ready(result),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Worker-side half of a [`Ticket`].
///
/// Dropping it unanswered resolves the ticket with
/// [`CubeError::SolverUnavailable`], so awaiting callers never hang.
struct Responder<T>(Arc<Mutex<Slot<T>>>);

impl<T> Responder<T> {
    fn complete(self, result: Result<T, CubeError>) {
        self.fill(result);
    }

    fn fill(&self, result: Result<T, CubeError>) {
        let waker = {
            let mut slot = self.0.lock();
            if slot.completed {
                return;
            }
            slot.result = Some(result);
            slot.completed = true;
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T> Drop for Responder<T> {
    fn drop(&mut self) {
        self.fill(Err(CubeError::SolverUnavailable(
            "worker dropped the request".to_string(),
        )));
    }
}

enum Command {
    Init(Responder<()>),
    Solve(SolveRequest, Responder<String>),
}

/// Anything that can be asked to solve a cube.
pub trait SolverOracle {
    fn solve(&self, request: SolveRequest) -> Ticket<String>;
}

/// Handle to a solver running on its own thread.
///
/// The thread exits once the handle is dropped and pending commands drain.
#[derive(Debug)]
pub struct WorkerSolver {
    commands: mpsc::Sender<Command>,
    ready: Arc<AtomicBool>,
}

impl WorkerSolver {
    pub fn spawn(engine: impl SolveEngine) -> Result<Self, CubeError> {
        let (commands, receiver) = mpsc::channel();
        let ready = Arc::new(AtomicBool::new(false));
        let worker_ready = Arc::clone(&ready);

        thread::Builder::new()
            .name("solver".to_string())
            .spawn(move || run_worker(engine, receiver, worker_ready))
            .map_err(|e| CubeError::SolverUnavailable(e.to_string()))?;

        Ok(Self { commands, ready })
    }

    /// Sends the init handshake. Resolves once the worker acknowledges.
    pub fn init(&self) -> Ticket<()> {
        let (ticket, responder) = Ticket::pending();
        // a closed channel drops the responder, which resolves the ticket
        let _ = self.commands.send(Command::Init(responder));
        ticket
    }

    /// Whether `init` has been acknowledged.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl SolverOracle for WorkerSolver {
    fn solve(&self, request: SolveRequest) -> Ticket<String> {
        if !self.is_ready() {
            return Ticket::ready(Err(CubeError::SolverUnavailable(
                "solver has not acknowledged init".to_string(),
            )));
        }
        debug!("requesting solve for {request:?}");
        let (ticket, responder) = Ticket::pending();
        let _ = self.commands.send(Command::Solve(request, responder));
        ticket
    }
}

fn run_worker(
    mut engine: impl SolveEngine,
    receiver: mpsc::Receiver<Command>,
    ready: Arc<AtomicBool>,
) {
    for command in receiver {
        match command {
            Command::Init(responder) => {
                let result = engine.init();
                match &result {
                    Ok(()) => {
                        ready.store(true, Ordering::Release);
                        debug!("solver ready");
                    }
                    Err(e) => warn!("solver init failed: {e}"),
                }
                responder.complete(result);
            }
            Command::Solve(request, responder) => {
                let result = engine.solve(&request);
                match &result {
                    Ok(solution) => debug!("solver replied {solution:?}"),
                    Err(e) => warn!("solver failed: {e}"),
                }
                responder.complete(result);
            }
        }
    }
    debug!("solver worker exiting");
}
