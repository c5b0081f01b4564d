//! CLI command implementations.

use std::path::Path;

use pendulab_debug::StateSnapshot;
use pendulab_io::{validate_config, SessionConfig};
use pendulab_lab::runner::{SweepReport, SweepRunner};
use pendulab_lab::scenarios::{Scenario, ScenarioKind};
use pendulab_lab::RunMetrics;
use pendulab_render::{JsonFrameExporter, Renderer};
use pendulab_session::{FrameDriver, PendulumSession};
use pendulab_telemetry::TracingSink;

fn load_config(path: Option<&str>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            println!("Config: {path}");
            Ok(SessionConfig::load(Path::new(path))?)
        }
        None => {
            println!("Config: defaults");
            Ok(SessionConfig::default())
        }
    }
}

/// Run one measured session.
pub fn simulate(
    config_path: Option<&str>,
    max_frames: u64,
    snapshot_path: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pendulab Simulation");
    println!("───────────────────");

    let config = load_config(config_path)?;
    let p = &config.pendulum;
    println!(
        "Pendulum: L = {} m, m = {} kg, g = {} m/s², θ0 = {} rad",
        p.length, p.bob_mass, p.gravity, p.initial_angle
    );
    println!(
        "Measuring {} oscillations (band ±{:.4} m, {:?} timing)",
        config.measurement.oscillations_target, config.measurement.proximity_band, config.timing
    );
    println!();

    let mut session = PendulumSession::new(config)?;
    session.add_sink(Box::new(TracingSink::default()));

    let summary = FrameDriver::new(&mut session).run_until_recorded(max_frames)?;
    match summary {
        Some(run) => {
            println!("  Period:        {:.4}s", run.period);
            println!("  Period²:       {:.4}s²", run.data_point().period_squared);
            if let Some(theory) = session.config().pendulum.theoretical_period() {
                println!("  Theory:        {:.4}s", theory);
                println!("  Rel. error:    {:.3}%", 100.0 * (run.period - theory).abs() / theory);
            }
        }
        None => {
            println!(
                "  No run completed within {max_frames} frames ({}/{} oscillations).",
                session.measurement().oscillations_observed(),
                session.measurement().oscillations_target()
            );
        }
    }
    println!("  Steps:         {}", session.bodies().step);
    println!("  Max residual:  {:.3e}m", session.max_residual());

    if let Some(path) = snapshot_path {
        session.snapshot().save(Path::new(path))?;
        println!("Snapshot written to: {path}");
    }

    let report = session.finish();
    if json {
        println!();
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Measure the period across lengths.
pub fn sweep(
    scenario_name: &str,
    lengths: Option<Vec<f64>>,
    oscillations: Option<u32>,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pendulab Length Sweep");
    println!("═════════════════════");
    println!();

    let mut scenarios: Vec<Scenario> = if let Some(lengths) = lengths {
        vec![Scenario::custom_sweep(lengths)]
    } else if scenario_name == "all" {
        ScenarioKind::all().iter().map(|&k| Scenario::from_kind(k)).collect()
    } else {
        match ScenarioKind::from_name(scenario_name) {
            Some(kind) => vec![Scenario::from_kind(kind)],
            None => {
                eprintln!("Unknown scenario: {scenario_name}");
                eprintln!("Available: seconds_pendulum, short_pendulum, length_sweep, all");
                return Err("Unknown scenario".into());
            }
        }
    };
    if let Some(n) = oscillations {
        scenarios = scenarios.into_iter().map(|s| s.with_oscillations(n)).collect();
    }

    let mut reports: Vec<SweepReport> = Vec::new();
    for scenario in &scenarios {
        println!(
            "Running: {} ({} length(s), {} oscillations each)",
            scenario.kind.name(),
            scenario.lengths.len(),
            scenario.oscillations
        );

        let report = SweepRunner::run(scenario).map_err(|e| format!("Sweep failed: {e}"))?;
        for run in &report.runs {
            println!(
                "  L = {:.3}m  T = {:.4}s  T² = {:.4}s²  (theory {:.4}s, {:.2}%)",
                run.length,
                run.period,
                run.period_squared(),
                run.theoretical_period,
                100.0 * run.relative_error
            );
        }
        for length in &report.incomplete {
            println!("  L = {length:.3}m  did not complete");
        }
        if let Some(g) = report.gravity_estimate() {
            println!("  g estimate:    {g:.4} m/s²");
        }
        println!();
        reports.push(report);
    }

    let all_runs: Vec<RunMetrics> = reports.into_iter().flat_map(|r| r.runs).collect();
    let csv = RunMetrics::to_csv(&all_runs);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Export render transforms frame by frame.
pub fn frames(
    config_path: Option<&str>,
    frame_count: u64,
    output_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pendulab Frame Export");
    println!("─────────────────────");

    let config = load_config(config_path)?;
    let mut session = PendulumSession::new(config)?;
    let mut exporter = JsonFrameExporter::new(output_path);

    let mut driver = FrameDriver::with_renderer(&mut session, &mut exporter)?;
    let summary = driver.run_frames(frame_count)?;
    driver.finish()?;

    println!("Frames:        {}", exporter.frame_count());
    if summary.degeneracies > 0 {
        println!("Degenerate:    {}", summary.degeneracies);
    }
    println!("Written to:    {output_path}");
    Ok(())
}

/// Inspect a state snapshot.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pendulab Snapshot Inspector");
    println!("───────────────────────────");
    println!();

    let snapshot = StateSnapshot::load(Path::new(path))
        .map_err(|e| format!("Failed to read snapshot: {e}"))?;
    println!("{}", snapshot.summary());

    if let Some(fit) = snapshot.dataset.fit() {
        println!();
        println!("Fit: T² = {:.4}·L + {:.4} (r² = {:.4})", fit.slope, fit.intercept, fit.r_squared);
        if let Some(g) = fit.gravity_estimate() {
            println!("g estimate: {g:.4} m/s²");
        }
    }
    if !snapshot.dataset.is_empty() {
        println!();
        println!("{}", snapshot.dataset.to_csv());
    }

    Ok(())
}

/// Validate a session config file.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pendulab Validator");
    println!("──────────────────");
    println!();

    println!("Validating config: {path}");
    let config = SessionConfig::load(Path::new(path))?;
    match validate_config(&config) {
        Ok(()) => println!("✅ Config is valid."),
        Err(e) => {
            println!("❌ Config validation failed: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
