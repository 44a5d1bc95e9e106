//! Rubik's Cube Engine
//!
//! Command-line driver for the cube engine. Applies and inverts move
//! sequences, runs seeded scrambles, replays solver output and feeds synthetic
//! drag gestures through the same session the interactive viewer uses.

use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::debug;
use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use cubie::geometry::Face;
use cubie::gesture::FaceHit;
use cubie::grid::format_net;
use cubie::history::invert;
use cubie::notation::{format_sequence, parse_sequence};
use cubie::solver::{InverseScrambleEngine, WorkerSolver};
use cubie::{Config, Cube, CubeError, Session, SessionEvent};

/// Frame interval used when playing animations in real time.
const FRAME: Duration = Duration::from_millis(16);

/// Drives a 3x3x3 Rubik's cube model from the command line.
#[derive(Parser)]
#[command(name = "cubie")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed for the scramble generator.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Number of moves in a scramble.
    #[arg(long, global = true)]
    scramble_length: Option<usize>,
    /// Skip animations and step delays.
    #[arg(long, global = true)]
    instant: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a move sequence to a solved cube and print the result.
    Apply { moves: String },
    /// Print the sequence that undoes a move sequence.
    Invert { moves: String },
    /// Scramble a solved cube with random outer-layer turns.
    Scramble,
    /// Turn the given moves, then solve them through the solver worker.
    Solve {
        moves: String,
        /// Longest solution the solver may return.
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Feed one drag gesture through the gesture translator.
    Drag {
        /// Clicked face: R, L, U, D, F or B.
        #[arg(value_parser = parse_face)]
        face: Face,
        /// Drag vector in camera space.
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
        #[arg(allow_negative_numbers = true)]
        dz: f64,
        /// Cumulative pointer travel in pixels.
        pixels: f64,
    },
}

fn main() {
    env_logger::builder().format_timestamp(None).init();
    let cli = Cli::parse();

    let mut config = Config::default();
    if let Some(length) = cli.scramble_length {
        config.scramble_length = length;
    }
    if cli.instant {
        config = config.instant();
    }

    let result = match cli.command {
        Command::Apply { moves } => run_apply(&moves),
        Command::Invert { moves } => run_invert(&moves),
        Command::Scramble => run_scramble(config, cli.seed),
        Command::Solve { moves, max_depth } => {
            config.solve_max_depth = max_depth;
            run_solve(config, &moves)
        }
        Command::Drag {
            face,
            dx,
            dy,
            dz,
            pixels,
        } => run_drag(config, face, Vector3::new(dx, dy, dz), pixels),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn parse_face(value: &str) -> Result<Face, String> {
    match value {
        "R" => Ok(Face::Right),
        "L" => Ok(Face::Left),
        "U" => Ok(Face::Up),
        "D" => Ok(Face::Down),
        "F" => Ok(Face::Front),
        "B" => Ok(Face::Back),
        _ => Err(format!(
            "unknown face {value:?}, expected one of R L U D F B"
        )),
    }
}

/// Net and solved flag of a cube.
fn format_report(cube: &Cube) -> String {
    format!(
        "{}solved: {}\n",
        format_net(&cube.facelet_colors()),
        cube.is_solved()
    )
}

/// Runs animations until the session is idle, printing events as they occur.
fn drive(session: &mut Session) -> Vec<SessionEvent> {
    let realtime = session.config().turn_duration > Duration::ZERO;
    let mut events = Vec::new();
    while session.is_animating() {
        let dt = if realtime {
            thread::sleep(FRAME);
            FRAME
        } else {
            Duration::MAX
        };
        for event in session.advance(dt) {
            debug!("{event:?}");
            if let SessionEvent::Committed(m) = &event {
                println!("{m}");
            }
            events.push(event);
        }
        // the viewer would consume these; the CLI has nothing to draw
        session.drain_render_commands();
    }
    events
}

fn run_apply(moves: &str) -> Result<(), CubeError> {
    let moves = parse_sequence(moves)?;
    let mut cube = Cube::default();
    cube.apply_all(&moves);
    print!("{}", format_report(&cube));
    println!("facelets: {}", cube.facelets());
    Ok(())
}

fn run_invert(moves: &str) -> Result<(), CubeError> {
    let moves = parse_sequence(moves)?;
    println!("{}", format_sequence(&invert(&moves)));
    Ok(())
}

fn run_scramble(config: Config, seed: Option<u64>) -> Result<(), CubeError> {
    let mut rng = match seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::from_os_rng(),
    };
    let mut session = Session::new(config);
    if let Some(moves) = session.scramble(&mut rng) {
        println!("Scramble: {}", format_sequence(&moves));
    }
    drive(&mut session);
    print!("{}", format_report(session.cube()));
    Ok(())
}

fn run_solve(config: Config, moves: &str) -> Result<(), CubeError> {
    let moves = parse_sequence(moves)?;
    let solver = WorkerSolver::spawn(InverseScrambleEngine)?;
    let ready = solver.init();

    let mut session = Session::new(config);
    for m in moves {
        session.press(m);
        drive(&mut session);
    }
    println!("History: {}", session.history());

    pollster::block_on(ready)?;
    if !pollster::block_on(session.solve(&solver))? {
        println!("Nothing to solve");
        return Ok(());
    }
    println!("Replaying solution:");
    for event in drive(&mut session) {
        match event {
            SessionEvent::Solved { steps } => println!("Solved in {steps} steps"),
            SessionEvent::SolveFailed(e) => return Err(e),
            _ => {}
        }
    }
    print!("{}", format_report(session.cube()));
    Ok(())
}

fn run_drag(
    config: Config,
    face: Face,
    drag_vector: Vector3<f64>,
    pixels: f64,
) -> Result<(), CubeError> {
    let mut session = Session::new(config);
    let hit = FaceHit {
        face,
        point: face.normal() * session.cube().pitch(),
    };
    session.pointer_down(Some(hit));
    session.pointer_move(&drag_vector, pixels);
    session.pointer_up();

    for event in drive(&mut session) {
        if let SessionEvent::Cancelled(layer) = event {
            println!("Cancelled drag on {}", layer.letter());
        }
    }
    println!("History: {}", session.history());
    Ok(())
}
