//! Deskmate Headless Schedule Harness
//!
//! Validates the schedule puzzle logic and the shipped day data without a
//! renderer. Everything runs in-process against the public API of
//! `deskmate-logic`.
//!
//! Usage:
//!   cargo run -p deskmate-simtest
//!   cargo run -p deskmate-simtest -- --verbose --seed 7 --fuzz-rounds 1000
//!   cargo run -p deskmate-simtest -- --days path/to/days.json

use clap::Parser;
use deskmate_logic::catalog::{scatter_positions, DayCatalog};
use deskmate_logic::config::{validate_config, RoundConfig};
use deskmate_logic::geometry::Vec2;
use deskmate_logic::grid::GridPos;
use deskmate_logic::piece::PieceId;
use deskmate_logic::round::{RoundController, RoundError, RoundPhase, StatSink};
use deskmate_logic::session::{DaySession, OpenOutcome};
use deskmate_logic::solver;
use deskmate_logic::stats::Stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

// ── Day catalog (same JSON the game ships) ──────────────────────────────
const DAYS_JSON: &str = include_str!("../../../data/schedule_days.json");

#[derive(Parser, Debug)]
#[command(name = "deskmate-simtest", about = "Headless checks for the schedule puzzle")]
struct Args {
    /// Print every check, not just failures, and log at debug level.
    #[arg(short, long)]
    verbose: bool,

    /// Day catalog to check instead of the embedded one.
    #[arg(long)]
    days: Option<PathBuf>,

    /// Seed for the random drag fuzzer.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of random rounds to fuzz.
    #[arg(long, default_value_t = 200)]
    fuzz_rounds: u32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

/// Stat sink that remembers every delta it was handed.
#[derive(Default)]
struct PenaltyLog(Vec<i32>);

impl StatSink for PenaltyLog {
    fn apply_stat_delta(&mut self, delta: i32) {
        self.0.push(delta);
    }
}

type Harness = RoundController<Vec<bool>, PenaltyLog>;

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!("=== Deskmate Schedule Harness ===\n");

    let mut results = Vec::new();

    // 1. Day catalog validation
    let catalog = load_catalog(args.days.as_ref(), &mut results);

    if let Some(catalog) = &catalog {
        // 2. Every day has a packing
        results.extend(validate_solvability(catalog, args.verbose));

        // 3. Scripted playthrough of every day
        results.extend(validate_playthroughs(catalog));

        // 4. Timeout and penalty semantics
        results.extend(validate_timeouts(catalog));

        // 5. Day session gating
        results.extend(validate_day_session(catalog));

        // 6. Random drag fuzz
        results.extend(fuzz_rounds(catalog, args.seed, args.fuzz_rounds));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Day Catalog ──────────────────────────────────────────────────────

fn load_catalog(path: Option<&PathBuf>, results: &mut Vec<TestResult>) -> Option<DayCatalog> {
    println!("--- Day Catalog ---");

    let text = match path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                results.push(TestResult {
                    name: "catalog_read".into(),
                    passed: false,
                    detail: format!("{}: {}", path.display(), e),
                });
                return None;
            }
        },
        None => DAYS_JSON.to_string(),
    };

    let catalog = match DayCatalog::from_json(&text) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };
    log::info!(
        "loaded {} days and {} shapes",
        catalog.days.len(),
        catalog.shapes.len()
    );

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !catalog.days.is_empty(),
        detail: format!(
            "{} days, {} named shapes",
            catalog.days.len(),
            catalog.shapes.len()
        ),
    });

    let errors = catalog.validate();
    results.push(TestResult {
        name: "catalog_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "every day resolves to a valid round".into()
        } else {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    // Shapes must survive a save/load through their row notation
    let round_trip = serde_json::to_string(&catalog)
        .map_err(|e| e.to_string())
        .and_then(|json| DayCatalog::from_json(&json).map_err(|e| e.to_string()));
    results.push(TestResult {
        name: "catalog_round_trip".into(),
        passed: round_trip.as_ref().is_ok_and(|c| *c == catalog),
        detail: match &round_trip {
            Ok(_) => "serialize → parse reproduces the catalog".into(),
            Err(e) => e.clone(),
        },
    });

    let mut days: Vec<u32> = catalog.days.iter().map(|d| d.day).collect();
    days.sort_unstable();
    let consecutive = days.iter().enumerate().all(|(i, &d)| d == i as u32 + 1);
    results.push(TestResult {
        name: "catalog_days_consecutive".into(),
        passed: consecutive,
        detail: format!("days {:?}", days),
    });

    Some(catalog)
}

// ── 2. Solvability ──────────────────────────────────────────────────────

fn validate_solvability(catalog: &DayCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Solvability ---");
    let mut results = Vec::new();

    for entry in &catalog.days {
        let Ok(config) = entry.round_config(catalog) else {
            continue;
        };
        if !validate_config(&config).is_empty() {
            continue;
        }
        let solution = solver::solve(config.grid_width, config.grid_height, &config.shapes);
        let fill = config.total_cells() as f32 / config.grid_area().max(1) as f32;
        results.push(TestResult {
            name: format!("day{}_solvable", entry.day),
            passed: solution.is_some(),
            detail: format!(
                "{}×{} grid, {} blocks, {:.0}% filled",
                config.grid_width,
                config.grid_height,
                config.piece_count(),
                fill * 100.0
            ),
        });
        if verbose {
            if let Some(origins) = &solution {
                for (label, origin) in config.labels.iter().zip(origins) {
                    println!("    day {} {:>40} → ({}, {})", entry.day, label, origin.x, origin.y);
                }
            }
        }
    }

    results
}

// ── 3. Scripted Playthrough ─────────────────────────────────────────────

/// Drag a block from its anchor and let go over `cell`.
fn drop_on(rounds: &mut Harness, id: PieceId, cell: GridPos) -> Result<bool, RoundError> {
    let start = rounds.piece(id).ok_or(RoundError::UnknownPiece(id))?.anchor();
    let target = rounds.layout().ok_or(RoundError::NotActive)?.cell_center(cell);
    rounds.begin_drag(id, start)?;
    rounds.drag_to(target)?;
    Ok(rounds.end_drag(target)?.is_placed())
}

fn validate_playthroughs(catalog: &DayCatalog) -> Vec<TestResult> {
    println!("--- Scripted Playthrough ---");
    let mut results = Vec::new();

    for entry in &catalog.days {
        let Ok(config) = entry.round_config(catalog) else {
            continue;
        };
        let Some(origins) = solver::solve(config.grid_width, config.grid_height, &config.shapes)
        else {
            continue;
        };
        let mut rounds = Harness::with_settings(
            Vec::new(),
            PenaltyLog::default(),
            catalog.round_settings(),
        );
        if let Err(e) = rounds.start_round(config) {
            results.push(TestResult {
                name: format!("day{}_playthrough", entry.day),
                passed: false,
                detail: e.to_string(),
            });
            continue;
        }

        let mut rejected = Vec::new();
        for (i, &origin) in origins.iter().enumerate() {
            match drop_on(&mut rounds, PieceId(i as u32), origin) {
                Ok(true) => {}
                Ok(false) => rejected.push(format!("block {} at {:?}", i, origin)),
                Err(e) => rejected.push(format!("block {}: {}", i, e)),
            }
            rounds.tick(0.25);
        }
        let committed = rounds.commit();
        let handoff = catalog.round_settings().handoff_delay;
        rounds.tick(handoff + 0.1);

        let heard = rounds.listener().clone();
        results.push(TestResult {
            name: format!("day{}_playthrough", entry.day),
            passed: rejected.is_empty()
                && committed == Ok(true)
                && heard == vec![true]
                && rounds.stats().0.is_empty(),
            detail: if rejected.is_empty() {
                format!("commit={:?} resolved={:?}", committed, heard)
            } else {
                format!("rejected drops: {}", rejected.join(", "))
            },
        });
    }

    results
}

// ── 4. Timeouts & Penalties ─────────────────────────────────────────────

fn validate_timeouts(catalog: &DayCatalog) -> Vec<TestResult> {
    println!("--- Timeouts & Penalties ---");
    let mut results = Vec::new();

    for entry in &catalog.days {
        let Ok(config) = entry.round_config(catalog) else {
            continue;
        };
        let limit = config.time_limit;
        let penalty = config.failure_penalty;
        let mut rounds = Harness::with_settings(
            Vec::new(),
            PenaltyLog::default(),
            catalog.round_settings(),
        );
        if rounds.start_round(config).is_err() {
            continue;
        }

        // Tick in frame-sized steps until well past the limit
        let mut monotonic = true;
        let mut last = rounds.remaining_time();
        let mut elapsed = 0.0;
        while elapsed < limit + 5.0 {
            rounds.tick(1.0 / 30.0);
            elapsed += 1.0 / 30.0;
            if rounds.is_active() {
                monotonic &= rounds.remaining_time() < last;
                last = rounds.remaining_time();
            }
        }
        let late_commit = rounds.commit();

        results.push(TestResult {
            name: format!("day{}_timeout", entry.day),
            passed: monotonic
                && rounds.listener() == &vec![false]
                && rounds.stats().0 == vec![penalty]
                && late_commit == Ok(false)
                && rounds.outcome() == Some(RoundPhase::Failed),
            detail: format!(
                "resolved={:?} penalties={:?} timer strictly decreasing={}",
                rounds.listener(),
                rounds.stats().0,
                monotonic
            ),
        });
    }

    // Stats never drop below zero
    let mut stats = Stats {
        sentience: 3,
        dependency: 2,
    };
    stats.apply_stat_delta(-6);
    results.push(TestResult {
        name: "stats_clamp_at_zero".into(),
        passed: stats.dependency == 0 && stats.sentience == 3,
        detail: format!("{:?}", stats),
    });

    results
}

// ── 5. Day Session ──────────────────────────────────────────────────────

fn validate_day_session(catalog: &DayCatalog) -> Vec<TestResult> {
    println!("--- Day Session ---");
    let mut results = Vec::new();

    let Some(first) = catalog.days.first() else {
        return results;
    };
    let Ok(config) = first.round_config(catalog) else {
        return results;
    };

    let rounds = RoundController::with_settings(
        Vec::<bool>::new(),
        Stats::default(),
        catalog.round_settings(),
    );
    let mut session = DaySession::new(first.day, rounds);

    let opened = session.open(config.clone());
    let lists_items = match &opened {
        OpenOutcome::Instructions(text) => config
            .labels
            .iter()
            .all(|label| text.body.contains(label.as_str())),
        _ => false,
    };
    results.push(TestResult {
        name: "session_instructions".into(),
        passed: lists_items,
        detail: "first open shows instructions listing every item".into(),
    });

    let begun = session.begin();
    session.tick(config.time_limit);
    session.tick(catalog.round_settings().handoff_delay);
    let reopened = session.open(config.clone());
    results.push(TestResult {
        name: "session_single_attempt".into(),
        passed: begun.is_ok()
            && session.attempted()
            && !session.completed()
            && matches!(reopened, OpenOutcome::Notice(_)),
        detail: format!("reopen after failure → {:?}", reopened),
    });

    session.tick(3.0);
    let hidden = session.notice().is_none();
    session.reset_for_new_day(first.day + 1);
    let fresh = matches!(session.open(config), OpenOutcome::Instructions(_));
    results.push(TestResult {
        name: "session_new_day".into(),
        passed: hidden && fresh,
        detail: format!("notice hidden={} instructions after reset={}", hidden, fresh),
    });

    results
}

// ── 6. Random Drag Fuzz ─────────────────────────────────────────────────

/// A pointer near the grid: usually a cell centre (possibly one cell out
/// of range), sometimes anywhere in a margin around the grid.
fn random_pointer(rounds: &Harness, rng: &mut StdRng) -> Vec2 {
    let Some((layout, grid)) = rounds.layout().zip(rounds.grid()) else {
        return Vec2::ZERO;
    };
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    if rng.gen_bool(0.7) {
        let cell = GridPos::new(rng.gen_range(-1..=w), rng.gen_range(-1..=h));
        layout.cell_center(cell)
    } else {
        let x = layout.left + layout.cell_width * rng.gen_range(-2.0..w as f32 + 2.0);
        let y = layout.top - layout.cell_height * rng.gen_range(-2.0..h as f32 + 2.0);
        Vec2::new(x, y)
    }
}

fn random_step(rounds: &mut Harness, rng: &mut StdRng) {
    let pointer = random_pointer(rounds, rng);
    match rng.gen_range(0..10) {
        0..=2 => {
            let count = rounds.pieces().len().max(1);
            let id = PieceId(rng.gen_range(0..count) as u32);
            let from = rounds.piece(id).map_or(pointer, |p| p.anchor());
            let _ = rounds.begin_drag(id, from);
        }
        3 | 4 => {
            let _ = rounds.drag_to(pointer);
        }
        5 | 6 => {
            let _ = rounds.end_drag(pointer);
        }
        7 => {
            let _ = rounds.commit();
        }
        _ => rounds.tick(rng.gen_range(0.0..0.5)),
    }
}

/// Returns a description of the first broken invariant.
fn check_invariants(rounds: &Harness, last_remaining: f32) -> Option<String> {
    let remaining = rounds.remaining_time();
    if remaining < 0.0 {
        return Some(format!("negative remaining time {}", remaining));
    }
    if rounds.is_active() && remaining > last_remaining {
        return Some(format!("timer went up: {} → {}", last_remaining, remaining));
    }
    if rounds.listener().len() > 1 {
        return Some(format!("resolved {} times", rounds.listener().len()));
    }
    if rounds.stats().0.len() > 1 {
        return Some(format!("penalised {} times", rounds.stats().0.len()));
    }
    if rounds.phase() == RoundPhase::Failed && rounds.stats().0.len() != 1 {
        return Some("failed without penalty".into());
    }

    if let Some(grid) = rounds.grid() {
        let mut placed_cells = 0;
        for piece in rounds.pieces() {
            let owned = grid.cells_of(piece.id());
            match piece.origin() {
                Some(origin) => {
                    placed_cells += piece.shape().cell_count();
                    let expected: Vec<GridPos> = piece.shape().cells_at(origin).collect();
                    if owned.len() != expected.len() || !expected.iter().all(|c| owned.contains(c))
                    {
                        return Some(format!("{:?} cells disagree with its shape", piece.id()));
                    }
                    if expected.iter().any(|&c| !grid.contains(c)) {
                        return Some(format!("{:?} placed out of bounds", piece.id()));
                    }
                }
                None if !owned.is_empty() => {
                    return Some(format!("unplaced {:?} still owns cells", piece.id()));
                }
                None => {}
            }
        }
        if grid.occupied_count() != placed_cells {
            return Some(format!(
                "{} occupied cells but placed blocks cover {}",
                grid.occupied_count(),
                placed_cells
            ));
        }
    }

    let every_placed = !rounds.pieces().is_empty() && rounds.pieces().iter().all(|p| p.is_placed());
    if rounds.all_placed() != (rounds.is_active() && every_placed) {
        return Some("stale all-placed flag".into());
    }
    None
}

fn fuzz_one(
    catalog: &DayCatalog,
    config: RoundConfig,
    rng: &mut StdRng,
) -> Result<(bool, usize), String> {
    let penalty = config.failure_penalty;
    let mut rounds = Harness::with_settings(
        Vec::new(),
        PenaltyLog::default(),
        catalog.round_settings(),
    );
    rounds.start_round(config).map_err(|e| e.to_string())?;

    let mut last = rounds.remaining_time();
    let mut steps = 0;
    while rounds.phase() != RoundPhase::Idle && steps < 20_000 {
        random_step(&mut rounds, rng);
        steps += 1;
        if let Some(problem) = check_invariants(&rounds, last) {
            return Err(format!("step {}: {}", steps, problem));
        }
        last = rounds.remaining_time();
    }
    // Let any stragglers time out and hand off.
    rounds.tick(1000.0);
    rounds.tick(1000.0);

    match rounds.listener().as_slice() {
        [true] if rounds.stats().0.is_empty() => Ok((true, steps)),
        [false] if rounds.stats().0 == vec![penalty] => Ok((false, steps)),
        other => Err(format!(
            "ended with resolutions {:?} and penalties {:?}",
            other,
            rounds.stats().0
        )),
    }
}

fn fuzz_rounds(catalog: &DayCatalog, seed: u64, count: u32) -> Vec<TestResult> {
    println!("--- Random Drag Fuzz ---");
    let mut results = Vec::new();
    if catalog.days.is_empty() {
        return results;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut violations = Vec::new();
    let (mut successes, mut failures, mut total_steps) = (0u32, 0u32, 0usize);

    for round in 0..count {
        let entry = &catalog.days[rng.gen_range(0..catalog.days.len())];
        let Ok(mut config) = entry.round_config(catalog) else {
            continue;
        };
        config.positions = scatter_positions(config.piece_count(), &catalog.geometry, &mut rng);

        match fuzz_one(catalog, config, &mut rng) {
            Ok((true, steps)) => {
                successes += 1;
                total_steps += steps;
            }
            Ok((false, steps)) => {
                failures += 1;
                total_steps += steps;
            }
            Err(problem) => {
                log::warn!("fuzz round {} (day {}): {}", round, entry.day, problem);
                violations.push(format!("round {} day {}: {}", round, entry.day, problem));
            }
        }
    }

    results.push(TestResult {
        name: "fuzz_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!(
                "{} rounds (seed {}), {} steps, {} completed, {} timed out",
                count, seed, total_steps, successes, failures
            )
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    });

    results
}
