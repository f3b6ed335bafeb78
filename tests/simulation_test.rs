//! Headless binary smoke tests

use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_crossroad_sim"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run crossroad_sim")
}

#[test]
fn test_headless_run_completes() {
    let output = run(&["--ticks", "50", "--seed", "7", "--spawn-rate", "0.5"]);
    assert!(output.status.success());

    let log = String::from_utf8_lossy(&output.stderr);
    assert!(log.contains("SIMULATION COMPLETE"), "log was: {}", log);
    assert!(log.contains("Ticks run: 50"));

    let spawned: usize = log
        .lines()
        .find_map(|line| line.split("Total cars spawned: ").nth(1))
        .and_then(|n| n.trim().parse().ok())
        .expect("spawn count in log");
    assert!(spawned > 0);
}

#[test]
fn test_map_output() {
    let output = run(&["--ticks", "4", "--seed", "3", "--map-every", "2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("=== Crossroad Map ===").count(), 2);
    assert!(stdout.contains("--- After tick 4 ---"));
}

#[test]
fn test_rejects_small_grid() {
    let output = run(&["--width", "4"]);
    assert!(!output.status.success());
}
