//! Synthetic snapshot generators.
//!
//! This module provides utilities for generating deterministic Issues and
//! Timelogs collections for testing purposes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use timelens::model::{Issue, Snapshot, Timelog};

/// Labels cycled through when generating issues.
pub const LABEL_POOL: [&str; 6] = [
    "Requirements Engineering",
    "Entwurf",
    "Implementation & Test",
    "Projektmanagement",
    "bug",
    "frontend",
];

/// Configuration for generating synthetic snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Number of distinct users.
    pub users: usize,
    /// Number of distinct issues.
    pub issues: usize,
    /// Number of timelogs.
    pub timelogs: usize,
    /// Days over which timelogs are spread.
    pub spread_days: i64,
    /// Seed for the deterministic generator.
    pub seed: u64,
    /// Timestamp of the earliest possible timelog.
    pub start_time: DateTime<Utc>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            users: 4,
            issues: 12,
            timelogs: 60,
            spread_days: 45,
            seed: 7,
            start_time: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
        }
    }
}

impl SnapshotConfig {
    /// Create a minimal config (small, fast generation).
    pub fn minimal() -> Self {
        Self {
            users: 2,
            issues: 3,
            timelogs: 8,
            spread_days: 10,
            ..Default::default()
        }
    }

    /// Create a large config for benchmarks and stress tests.
    pub fn large() -> Self {
        Self {
            users: 12,
            issues: 400,
            timelogs: 20_000,
            spread_days: 365,
            ..Default::default()
        }
    }
}

/// Small xorshift generator for reproducible fixtures.
#[derive(Debug, Clone)]
pub struct Rng(u64);

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in `0..bound`.
    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound.max(1)
    }
}

/// Generate the issue list.
pub fn generate_issues(config: &SnapshotConfig, rng: &mut Rng) -> Vec<Issue> {
    (0..config.issues)
        .map(|index| {
            let first = LABEL_POOL[index % LABEL_POOL.len()];
            let mut labels = vec![first];
            if rng.below(3) == 0 {
                labels.push(LABEL_POOL[rng.below(LABEL_POOL.len() as u64) as usize]);
            }
            let estimate = (rng.below(8) as i64) * 1800;
            let spent = (rng.below(12) as i64) * 900;
            Issue::new((index + 1).to_string(), labels)
                .with_title(format!("Issue {}", index + 1))
                .with_times(estimate, spent)
        })
        .collect()
}

/// Generate a full snapshot.
pub fn generate_snapshot(config: &SnapshotConfig) -> Snapshot {
    let mut rng = Rng::new(config.seed);
    let issues = generate_issues(config, &mut rng);
    let spread_minutes = (config.spread_days * 24 * 60).max(1) as u64;

    let timelogs = (0..config.timelogs)
        .map(|_| {
            let user = format!("user{}", rng.below(config.users as u64));
            let issue = issues[rng.below(issues.len() as u64) as usize].clone();
            let spent_at = config.start_time + Duration::minutes(rng.below(spread_minutes) as i64);
            let seconds = (rng.below(16) as i64 + 1) * 900;
            Timelog::new(user, issue, spent_at.to_rfc3339(), seconds)
        })
        .collect();

    Snapshot::new(issues, timelogs)
}

/// Wrap records in a GraphQL connection object.
pub fn connection_json<T: serde::Serialize>(records: &[T]) -> String {
    serde_json::json!({ "nodes": records }).to_string()
}

/// Write both collections as connection objects into `dir`.
pub fn write_snapshot_files(dir: &Path, snapshot: &Snapshot) -> (PathBuf, PathBuf) {
    let issues = dir.join("issues.json");
    let timelogs = dir.join("timelogs.json");
    std::fs::write(&issues, connection_json(&snapshot.issues)).unwrap();
    std::fs::write(&timelogs, connection_json(&snapshot.timelogs)).unwrap();
    (issues, timelogs)
}

/// Total booked seconds of all timelogs.
pub fn total_seconds(snapshot: &Snapshot) -> i64 {
    snapshot.timelogs.iter().map(|log| log.time_spent).sum()
}
