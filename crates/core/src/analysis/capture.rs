//! Capture-area and travel-time analysis of tracking output
//!
//! A single pass over an [`EventTable`]:
//! 1. validate the required columns and values
//! 2. keep the terminal row of each particle (last by time when a particle
//!    has more than one)
//! 3. hull the terminal (x, y) positions and compute the enclosed area
//! 4. summarize terminal time minus release time over the same particles

use super::hull::CaptureArea;
use super::stats::TravelTimeSummary;
use crate::core_types::{Vec2, Vec3};
use crate::error::{Error, Result};
use crate::tracking::{EventReason, EventTable, ParticleKey, ReasonCode, TrackColumns, TrackEvent};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info, warn};

/// Terminal position and timing of one particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub group: Option<i64>,
    pub particle: i64,
    /// Terminal position; z is reported but not used by the hull
    pub position: Vec3,
    pub release_time: f64,
    pub terminal_time: f64,
}

impl Endpoint {
    /// Elapsed time from release to termination
    #[inline]
    pub fn travel_time(&self) -> f64 {
        self.terminal_time - self.release_time
    }

    /// Planar projection used for the capture hull
    #[inline]
    pub fn planar(&self) -> Vec2 {
        self.position.xy()
    }
}

/// Result of one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureAnalysis {
    /// Terminal endpoints ordered by (group, particle)
    pub endpoints: Vec<Endpoint>,
    pub capture: CaptureArea,
    pub travel_time: TravelTimeSummary,
}

impl CaptureAnalysis {
    fn from_endpoints(endpoints: Vec<Endpoint>) -> Result<Self> {
        let planar: Vec<Vec2> = endpoints.iter().map(Endpoint::planar).collect();
        let times: Vec<f64> = endpoints.iter().map(Endpoint::travel_time).collect();
        let travel_time = TravelTimeSummary::from_samples(&times)
            .ok_or_else(|| Error::invalid("no terminal endpoints to summarize"))?;
        Ok(Self {
            capture: CaptureArea::from_points(&planar),
            endpoints,
            travel_time,
        })
    }
}

/// Reduce events to one endpoint per particle.
fn collect_endpoints(
    events: &[TrackEvent],
    terminal_reason: ReasonCode,
) -> Result<Vec<Endpoint>> {
    let release_code = EventReason::Release.code();

    let mut terminal: FxHashMap<ParticleKey, TrackEvent> = FxHashMap::default();
    let mut released: FxHashMap<ParticleKey, f64> = FxHashMap::default();
    let mut first_seen: FxHashMap<ParticleKey, f64> = FxHashMap::default();
    let mut duplicates = 0usize;

    for ev in events {
        first_seen
            .entry(ev.particle)
            .and_modify(|t| *t = t.min(ev.time))
            .or_insert(ev.time);
        if ev.reason == release_code {
            released
                .entry(ev.particle)
                .and_modify(|t| *t = t.min(ev.time))
                .or_insert(ev.time);
        }
        if ev.reason == terminal_reason {
            match terminal.entry(ev.particle) {
                Entry::Vacant(slot) => {
                    slot.insert(*ev);
                }
                Entry::Occupied(mut slot) => {
                    duplicates += 1;
                    if ev.time >= slot.get().time {
                        slot.insert(*ev);
                    }
                }
            }
        }
    }

    if terminal.is_empty() {
        return Err(Error::invalid(format!(
            "no rows with terminal reason code {terminal_reason}"
        )));
    }
    if duplicates > 0 {
        warn!(
            "{} extra terminal rows found; kept the latest row per particle",
            duplicates
        );
    }

    let mut endpoints: Vec<Endpoint> = terminal
        .into_iter()
        .map(|(key, ev)| {
            // Explicit column, then the release row, then the first event seen
            let release_time = ev.release_time.unwrap_or_else(|| {
                released
                    .get(&key)
                    .or_else(|| first_seen.get(&key))
                    .copied()
                    .unwrap_or(ev.time)
            });
            Endpoint {
                group: key.group,
                particle: key.id,
                position: ev.position,
                release_time,
                terminal_time: ev.time,
            }
        })
        .collect();
    endpoints.sort_by_key(|e| (e.group, e.particle));

    let negative = endpoints.iter().filter(|e| e.travel_time() < 0.0).count();
    if negative > 0 {
        warn!("{} particles terminate before their release time", negative);
    }
    Ok(endpoints)
}

fn endpoints_from_table(
    table: &EventTable,
    columns: &TrackColumns,
    terminal_reason: ReasonCode,
) -> Result<Vec<Endpoint>> {
    let events = columns.events(table)?;
    collect_endpoints(&events, terminal_reason)
}

/// Capture area and travel-time summary over every particle in `table`.
///
/// # Errors
/// Returns `InvalidInput` if a required column (`id, x, y, z, time, reason`)
/// is missing, a required value is malformed, or no row carries
/// `terminal_reason`.
pub fn analyze(table: &EventTable, terminal_reason: ReasonCode) -> Result<CaptureAnalysis> {
    let columns = TrackColumns::resolve(table)?;
    let endpoints = endpoints_from_table(table, &columns, terminal_reason)?;
    let analysis = CaptureAnalysis::from_endpoints(endpoints)?;
    info!(
        "Capture analysis: {} particles, area {:.3}, mean travel time {:.3}",
        analysis.travel_time.count, analysis.capture.area, analysis.travel_time.mean
    );
    Ok(analysis)
}

/// One analysis per release group.
///
/// Groups without a terminal row are absent from the result.
///
/// # Errors
/// Same as [`analyze`]; additionally `InvalidInput` if the table has no
/// group column.
pub fn analyze_by_group(
    table: &EventTable,
    terminal_reason: ReasonCode,
) -> Result<BTreeMap<i64, CaptureAnalysis>> {
    let columns = TrackColumns::resolve(table)?;
    if !columns.has_group() {
        return Err(Error::invalid(
            "event table has no release-group column (group, particlegroup or iprp)",
        ));
    }
    let endpoints = endpoints_from_table(table, &columns, terminal_reason)?;

    let mut by_group: BTreeMap<i64, Vec<Endpoint>> = BTreeMap::new();
    for e in endpoints {
        // Every key carries a group once the column is present
        let group = e.group.unwrap_or_default();
        by_group.entry(group).or_default().push(e);
    }

    let mut out = BTreeMap::new();
    for (group, endpoints) in by_group {
        let analysis = CaptureAnalysis::from_endpoints(endpoints)?;
        debug!(
            "Group {}: {} particles, area {:.3}",
            group, analysis.travel_time.count, analysis.capture.area
        );
        out.insert(group, analysis);
    }
    info!("Capture analysis over {} release groups", out.len());
    Ok(out)
}

/// Analyze independent runs in parallel.
///
/// Results are returned in input order; a failure in one run does not
/// affect the others.
pub fn analyze_runs(tables: &[EventTable], terminal_reason: ReasonCode) -> Vec<Result<CaptureAnalysis>> {
    tables
        .par_iter()
        .map(|table| analyze(table, terminal_reason))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TERM: ReasonCode = 3;

    fn table(rows: &[[f64; 6]]) -> EventTable {
        let mut t = EventTable::new(["id", "x", "y", "z", "time", "reason"]);
        for r in rows {
            t.push_row(r.to_vec()).unwrap();
        }
        t
    }

    #[test]
    fn test_square_capture_and_travel_times() {
        let t = table(&[
            [1.0, 5.0, 5.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 1.0, 10.0, 3.0],
            [2.0, 5.0, 5.0, 0.0, 0.0, 0.0],
            [2.0, 4.0, 0.0, 1.0, 20.0, 3.0],
            [3.0, 5.0, 5.0, 0.0, 0.0, 0.0],
            [3.0, 4.0, 4.0, 1.0, 30.0, 3.0],
            [4.0, 5.0, 5.0, 0.0, 0.0, 0.0],
            [4.0, 0.0, 4.0, 1.0, 40.0, 3.0],
        ]);
        let a = analyze(&t, TERM).unwrap();
        assert_eq!(a.endpoints.len(), 4);
        assert_relative_eq!(a.capture.area, 16.0);
        assert!(!a.capture.degenerate);
        assert_eq!(a.travel_time.count, 4);
        assert_relative_eq!(a.travel_time.mean, 25.0);
        assert_relative_eq!(a.travel_time.min, 10.0);
        assert_relative_eq!(a.travel_time.max, 40.0);
    }

    #[test]
    fn test_release_time_from_release_row() {
        let t = table(&[
            [1.0, 0.0, 0.0, 0.0, 2.0, 1.0],
            [1.0, 0.0, 0.0, 0.0, 5.0, 0.0],
            [1.0, 1.0, 1.0, 0.0, 12.0, 3.0],
        ]);
        let a = analyze(&t, TERM).unwrap();
        assert_relative_eq!(a.endpoints[0].release_time, 5.0);
        assert_relative_eq!(a.endpoints[0].travel_time(), 7.0);
    }

    #[test]
    fn test_release_time_falls_back_to_first_event() {
        let t = table(&[[1.0, 0.0, 0.0, 0.0, 2.0, 1.0], [1.0, 1.0, 1.0, 0.0, 12.0, 3.0]]);
        let a = analyze(&t, TERM).unwrap();
        assert_relative_eq!(a.endpoints[0].travel_time(), 10.0);
    }

    #[test]
    fn test_explicit_release_column_wins() {
        let t = EventTable::new(["irpt", "trelease", "t", "x", "y", "z", "ireason"])
            .with_row(vec![1.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .unwrap()
            .with_row(vec![1.0, 100.0, 150.0, 1.0, 1.0, 0.0, 3.0])
            .unwrap();
        let a = analyze(&t, TERM).unwrap();
        assert_relative_eq!(a.endpoints[0].release_time, 100.0);
        assert_relative_eq!(a.travel_time.mean, 50.0);
    }

    #[test]
    fn test_duplicate_terminal_rows_keep_latest() {
        let t = table(&[
            [1.0, 9.0, 9.0, 0.0, 50.0, 3.0],
            [1.0, 1.0, 1.0, 0.0, 20.0, 3.0],
            [1.0, 2.0, 2.0, 0.0, 50.0, 3.0],
        ]);
        let a = analyze(&t, TERM).unwrap();
        assert_eq!(a.endpoints.len(), 1);
        // Equal times: the later row wins
        assert_eq!(a.endpoints[0].position, Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_no_terminal_rows_is_invalid() {
        let t = table(&[[1.0, 0.0, 0.0, 0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0, 1.0, 2.0]]);
        let err = analyze(&t, TERM).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("terminal reason code 3"));
    }

    #[test]
    fn test_unknown_reason_codes_match_exactly() {
        let t = table(&[[1.0, 0.0, 0.0, 0.0, 1.0, 42.0], [2.0, 1.0, 0.0, 0.0, 1.0, 3.0]]);
        let a = analyze(&t, 42).unwrap();
        assert_eq!(a.endpoints.len(), 1);
        assert_eq!(a.endpoints[0].particle, 1);
        assert!(a.capture.degenerate);
    }

    #[test]
    fn test_by_group_requires_group_column() {
        let t = table(&[[1.0, 0.0, 0.0, 0.0, 1.0, 3.0]]);
        assert!(matches!(analyze_by_group(&t, TERM), Err(Error::InvalidInput(_))));

        // Reported ahead of the empty-match error
        let no_terminal = table(&[[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]]);
        let err = analyze_by_group(&no_terminal, TERM).unwrap_err();
        assert!(err.to_string().contains("release-group column"));
    }

    #[test]
    fn test_by_group_separates_reused_ids() {
        let mut t = EventTable::new(["group", "id", "x", "y", "z", "time", "reason"]);
        for (g, id, x, y) in [(1.0, 1.0, 0.0, 0.0), (1.0, 2.0, 1.0, 0.0), (1.0, 3.0, 0.0, 1.0)] {
            t.push_row(vec![g, id, x, y, 0.0, 10.0, 3.0]).unwrap();
        }
        for (g, id, x, y) in [(2.0, 1.0, 10.0, 10.0), (2.0, 2.0, 12.0, 10.0)] {
            t.push_row(vec![g, id, x, y, 0.0, 10.0, 3.0]).unwrap();
        }

        let groups = analyze_by_group(&t, TERM).unwrap();
        assert_eq!(groups.len(), 2);
        assert_relative_eq!(groups[&1].capture.area, 0.5);
        assert_eq!(groups[&1].travel_time.count, 3);
        assert!(groups[&2].capture.degenerate);

        // Without grouping, the same ids in different groups stay distinct
        let all = analyze(&t, TERM).unwrap();
        assert_eq!(all.travel_time.count, 5);
    }

    #[test]
    fn test_runs_are_independent() {
        let good = table(&[[1.0, 0.0, 0.0, 0.0, 1.0, 3.0]]);
        let bad = EventTable::new(["id", "x"]);
        let results = analyze_runs(&[good.clone(), bad, good], TERM);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
