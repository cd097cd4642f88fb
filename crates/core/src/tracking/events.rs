//! Typed view of the columns the analyzer needs

use super::reason::ReasonCode;
use super::table::EventTable;
use crate::core_types::Vec3;
use crate::error::{Error, Result};

/// Required columns and the header spellings accepted for each
const REQUIRED: [(&str, &[&str]); 6] = [
    ("id", &["id", "particleid", "particle_id", "irpt"]),
    ("x", &["x"]),
    ("y", &["y"]),
    ("z", &["z"]),
    ("time", &["time", "t"]),
    ("reason", &["reason", "ireason"]),
];

const GROUP: &[&str] = &["group", "particlegroup", "iprp"];
const RELEASE_TIME: &[&str] = &["release_time", "trelease"];

/// Identity of a tracked particle.
///
/// Particle ids restart in each release group, so the group is part of the
/// key whenever the table carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleKey {
    pub group: Option<i64>,
    pub id: i64,
}

/// One validated tracking event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEvent {
    pub particle: ParticleKey,
    pub position: Vec3,
    pub time: f64,
    pub reason: ReasonCode,
    /// Explicit release time, when the table records one
    pub release_time: Option<f64>,
}

/// Resolved positions of the analyzer's columns in an [`EventTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackColumns {
    id: usize,
    x: usize,
    y: usize,
    z: usize,
    time: usize,
    reason: usize,
    group: Option<usize>,
    release_time: Option<usize>,
}

fn find(table: &EventTable, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| table.column_index(a))
}

/// 2^63; every integral `f64` in `[-I64_LIMIT, I64_LIMIT)` converts exactly
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn integral(value: f64, row: usize, column: &str) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::invalid(format!(
            "row {row}: column '{column}' must be an integer, got {value}"
        )));
    }
    if !(-I64_LIMIT..I64_LIMIT).contains(&value) {
        return Err(Error::invalid(format!(
            "row {row}: column '{column}' value {value} is outside the 64-bit integer range"
        )));
    }
    Ok(value as i64)
}

fn finite(value: f64, row: usize, column: &str) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::invalid(format!(
            "row {row}: column '{column}' is missing or not numeric"
        )));
    }
    Ok(value)
}

impl TrackColumns {
    /// Locate the required columns (`id, x, y, z, time, reason`) and the
    /// optional group and release-time columns.
    ///
    /// # Errors
    /// Returns `InvalidInput` listing every required column that is absent.
    pub fn resolve(table: &EventTable) -> Result<Self> {
        let mut found = [0usize; 6];
        let mut missing = Vec::new();
        for (slot, (name, aliases)) in found.iter_mut().zip(REQUIRED) {
            match find(table, aliases) {
                Some(idx) => *slot = idx,
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(Error::invalid(format!(
                "event table is missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let [id, x, y, z, time, reason] = found;
        Ok(Self {
            id,
            x,
            y,
            z,
            time,
            reason,
            group: find(table, GROUP),
            release_time: find(table, RELEASE_TIME),
        })
    }

    /// Whether the table carries a release-group column
    pub fn has_group(&self) -> bool {
        self.group.is_some()
    }

    /// Whether the table carries an explicit release-time column
    pub fn has_release_time(&self) -> bool {
        self.release_time.is_some()
    }

    /// Convert every row into a [`TrackEvent`].
    ///
    /// # Errors
    /// Returns `InvalidInput` for the first row whose required values are not
    /// finite numbers, or whose id, group or reason is not an integer.
    pub fn events(&self, table: &EventTable) -> Result<Vec<TrackEvent>> {
        table
            .rows()
            .iter()
            .enumerate()
            .map(|(n, row)| {
                let group = match self.group {
                    Some(g) => Some(integral(row[g], n, "group")?),
                    None => None,
                };
                let release_time = match self.release_time {
                    Some(t) => Some(finite(row[t], n, "release_time")?),
                    None => None,
                };
                Ok(TrackEvent {
                    particle: ParticleKey {
                        group,
                        id: integral(row[self.id], n, "id")?,
                    },
                    position: Vec3::new(
                        finite(row[self.x], n, "x")?,
                        finite(row[self.y], n, "y")?,
                        finite(row[self.z], n, "z")?,
                    ),
                    time: finite(row[self.time], n, "time")?,
                    reason: integral(row[self.reason], n, "reason")?,
                    release_time,
                })
            })
            .collect()
    }
}
