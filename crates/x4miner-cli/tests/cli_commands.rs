use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures/minimal_snapshot.json")
        .canonicalize()
        .expect("fixture snapshot present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("x4miner");
    cmd.env("RUST_LOG", "error")
        .env_remove("X4MINER_SNAPSHOT")
        .arg("--no-color")
        .arg("--snapshot")
        .arg(fixture_path());
    cmd
}

#[test]
fn trades_lists_most_profitable_first() {
    cli()
        .arg("trades")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 spaceweed ILLEGAL"))
        .stdout(predicate::str::contains("#2 energycells"))
        .stdout(predicate::str::contains("#3 ore"))
        .stdout(predicate::str::contains(
            "route Argon Prime -> The Reach -> Holy Vision",
        ));
}

#[test]
fn trades_limit_truncates_results() {
    cli()
        .args(["trades", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 spaceweed"))
        .stdout(predicate::str::contains("#2").not());
}

#[test]
fn avoid_illegal_drops_contraband_runs() {
    cli()
        .args(["trades", "--avoid-illegal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spaceweed").not())
        .stdout(predicate::str::contains("#1 energycells"));
}

#[test]
fn trades_json_is_machine_readable() {
    let output = cli()
        .args(["--format", "json", "trades", "--by-distance"])
        .output()
        .expect("command runs");
    assert!(output.status.success());

    let deals: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let wares: Vec<_> = deals
        .as_array()
        .expect("array of deals")
        .iter()
        .map(|deal| deal["ware"].as_str().expect("ware").to_string())
        .collect();
    assert_eq!(wares, vec!["energycells", "spaceweed", "ore"]);
    assert_eq!(deals[0]["variant"], "none");
}

#[test]
fn trades_from_player_reports_pickup_leg() {
    cli()
        .args(["trades", "--from-player", "--cargo", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pickup"))
        .stdout(predicate::str::contains("buy  10 units"));
}

#[test]
fn credits_require_from_player() {
    cli()
        .args(["trades", "--credits", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from-player"));
}

#[test]
fn distance_reports_route() {
    cli()
        .args(["distance", "--from", "ARG-001", "--to", "TEL-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ARG-001 -> TEL-001: 16.0 km"))
        .stdout(predicate::str::contains("route Argon Prime -> The Reach"));
}

#[test]
fn distance_respects_hostile_avoidance() {
    cli()
        .args([
            "distance",
            "--from",
            "ARG-001",
            "--to",
            "XEN-001",
            "--avoid-hostile",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("unreachable"));
}

#[test]
fn unknown_station_error_is_friendly() {
    cli()
        .args(["distance", "--from", "ARG-00", "--to", "TEL-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown station code: ARG-00"))
        .stderr(predicate::str::contains("Did you mean"));
}

#[test]
fn nearest_defaults_to_the_player() {
    cli()
        .args(["nearest", "-k", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closest station: ARG-002, distance 5 km"))
        .stdout(predicate::str::contains("Closest station: ARG-001, distance 6 km"))
        .stdout(predicate::str::contains("XEN-002").not());
}

#[test]
fn nearest_station_reports_directions() {
    cli()
        .args(["nearest", "--station", "TEL-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closest station: TEL-002"))
        .stdout(predicate::str::contains("Target is 8 km to the west (X axis)"))
        .stdout(predicate::str::contains("Target is 2 km below (Y axis)"));
}

#[test]
fn locate_resolves_component_offsets() {
    cli()
        .args(["locate", "--component", "[0x5]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[0x5]: (6000, 0, 0) in Argon Prime"));
}

#[test]
fn locate_unknown_component_fails() {
    cli()
        .args(["locate", "--component", "[0xdead]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown component"));
}

#[test]
fn snapshot_can_come_from_the_environment() {
    let mut cmd = cargo_bin_cmd!("x4miner");
    cmd.env("RUST_LOG", "error")
        .env("X4MINER_SNAPSHOT", fixture_path())
        .args(["--no-color", "locate", "--component", "[0x5]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(6000, 0, 0)"));
}

#[test]
fn missing_snapshot_is_reported() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("absent.json");
    let mut cmd = cargo_bin_cmd!("x4miner");
    cmd.env("RUST_LOG", "error")
        .arg("--snapshot")
        .arg(&missing)
        .arg("trades")
        .assert()
        .failure()
        .stderr(predicate::str::contains("snapshot not found"));
}

#[test]
fn wrecks_flag_keeps_wrecked_stations() {
    cli()
        .args(["--wrecks", "nearest", "--station", "TEL-001", "-k", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WRK-001"));
}

#[test]
fn factions_prints_a_strength_table() {
    cli()
        .arg("factions")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Faction           Relation   Sectors  Stations",
        ))
        .stdout(predicate::str::contains(
            "xenon                -1.00         1         3",
        ));
}

#[test]
fn factions_json_lists_every_owner() {
    let output = cli()
        .args(["--format", "json", "factions"])
        .output()
        .expect("command runs");
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let owners: Vec<_> = rows
        .as_array()
        .expect("array of factions")
        .iter()
        .map(|row| row["faction"].as_str().expect("faction").to_string())
        .collect();
    assert_eq!(owners, vec!["argon", "paranid", "teladi", "xenon"]);
    assert_eq!(rows[0]["stations"], 2);
}

#[test]
fn duplicates_lists_shared_codes() {
    cli()
        .arg("duplicates")
        .assert()
        .success()
        .stdout(predicate::str::contains("XEN-001 is used by 2 stations"))
        .stdout(predicate::str::contains("  * xenon_core at (0, 0, 0) owned by xenon"))
        .stdout(predicate::str::contains("    xenon_core at (4000, 0, 0) owned by xenon"));
}

#[test]
fn duplicates_for_a_unique_code_is_empty() {
    cli()
        .args(["duplicates", "--code", "ARG-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No duplicate station codes."));
}
