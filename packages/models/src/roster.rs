//! Roster expansion: configured model names and parameter lists become an
//! explicit, validated list of fully-parameterised model specs.
//!
//! Expansion happens once, before any experiment runs: missing or invalid
//! parameter lists for a requested kind are configuration errors here, while
//! unrecognised model names are collected for the orchestrator to report and
//! skip (one bad name never aborts a sweep).

use hotspot_eval_events::TimeSpan;

use crate::{ModelError, ModelKind, ModelSpec, PhsParams, PhsWeight};

/// Parameter lists for the models that take parameters.
///
/// PHS expands to the full cartesian product of its five lists, in list
/// order, matching how sweeps enumerate parameter combinations.
#[derive(Debug, Clone, Default)]
pub struct ParamLists {
    /// Number of seeded random runs (seeds `0..num_random`).
    pub num_random: u32,
    /// RHS kernel bandwidths in meters.
    pub rhs_bandwidths: Vec<f64>,
    /// PHS atomic time units.
    pub phs_time_units: Vec<TimeSpan>,
    /// PHS time bandwidths.
    pub phs_time_bands: Vec<TimeSpan>,
    /// PHS atomic distance units in meters.
    pub phs_dist_units: Vec<f64>,
    /// PHS distance bandwidths in meters.
    pub phs_dist_bands: Vec<f64>,
    /// PHS weight schemes.
    pub phs_weights: Vec<PhsWeight>,
}

/// One expanded model: its kind, a unique label, and the spec to run.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    /// The model kind.
    pub kind: ModelKind,
    /// Unique human-readable label, used for diagnostics columns.
    pub label: String,
    /// The fully-parameterised spec.
    pub spec: ModelSpec,
}

/// The expanded sweep roster.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Models to run, in configuration order.
    pub entries: Vec<RosterEntry>,
    /// Configured names that matched no recognised model kind.
    pub unknown: Vec<String>,
}

impl Roster {
    /// Whether any runnable model was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expands configured model names against the parameter lists.
///
/// # Errors
///
/// Returns [`ModelError::MissingParams`] when a recognised, requested kind
/// lacks a required parameter list, and [`ModelError::InvalidParam`] for
/// non-positive bandwidths or units.
pub fn expand_roster(names: &[String], params: &ParamLists) -> Result<Roster, ModelError> {
    let mut roster = Roster::default();

    for name in names {
        let Ok(kind) = name.trim().parse::<ModelKind>() else {
            roster.unknown.push(name.trim().to_string());
            continue;
        };
        match kind {
            ModelKind::Naive => roster.entries.push(RosterEntry {
                kind,
                label: "naive".to_string(),
                spec: ModelSpec::Naive,
            }),
            ModelKind::Ideal => roster.entries.push(RosterEntry {
                kind,
                label: "ideal".to_string(),
                spec: ModelSpec::Ideal,
            }),
            ModelKind::Random => expand_random(params, &mut roster)?,
            ModelKind::Rhs => expand_rhs(params, &mut roster)?,
            ModelKind::Phs => expand_phs(params, &mut roster)?,
        }
    }
    Ok(roster)
}

fn expand_random(params: &ParamLists, roster: &mut Roster) -> Result<(), ModelError> {
    if params.num_random == 0 {
        return Err(ModelError::MissingParams {
            kind: ModelKind::Random,
            message: "num_random is 0".to_string(),
        });
    }
    for seed in 0..u64::from(params.num_random) {
        roster.entries.push(RosterEntry {
            kind: ModelKind::Random,
            label: format!("random-s{seed}"),
            spec: ModelSpec::Random { seed },
        });
    }
    Ok(())
}

fn expand_rhs(params: &ParamLists, roster: &mut Roster) -> Result<(), ModelError> {
    if params.rhs_bandwidths.is_empty() {
        return Err(ModelError::MissingParams {
            kind: ModelKind::Rhs,
            message: "no bandwidths configured".to_string(),
        });
    }
    for &bandwidth in &params.rhs_bandwidths {
        if bandwidth <= 0.0 {
            return Err(ModelError::InvalidParam {
                kind: ModelKind::Rhs,
                message: format!("bandwidth must be positive, got {bandwidth}"),
            });
        }
        roster.entries.push(RosterEntry {
            kind: ModelKind::Rhs,
            label: format!("rhs-b{bandwidth}"),
            spec: ModelSpec::Rhs { bandwidth },
        });
    }
    Ok(())
}

fn expand_phs(params: &ParamLists, roster: &mut Roster) -> Result<(), ModelError> {
    let missing = |message: &str| ModelError::MissingParams {
        kind: ModelKind::Phs,
        message: message.to_string(),
    };
    if params.phs_time_units.is_empty() {
        return Err(missing("no time units configured"));
    }
    if params.phs_time_bands.is_empty() {
        return Err(missing("no time bandwidths configured"));
    }
    if params.phs_dist_units.is_empty() {
        return Err(missing("no distance units configured"));
    }
    if params.phs_dist_bands.is_empty() {
        return Err(missing("no distance bandwidths configured"));
    }
    if params.phs_weights.is_empty() {
        return Err(missing("no weight schemes configured"));
    }

    for &time_unit in &params.phs_time_units {
        for &time_band in &params.phs_time_bands {
            for &dist_unit in &params.phs_dist_units {
                for &dist_band in &params.phs_dist_bands {
                    for &weight in &params.phs_weights {
                        if dist_unit <= 0.0 || dist_band <= 0.0 {
                            return Err(ModelError::InvalidParam {
                                kind: ModelKind::Phs,
                                message: format!(
                                    "distance unit/bandwidth must be positive, got {dist_unit}/{dist_band}"
                                ),
                            });
                        }
                        roster.entries.push(RosterEntry {
                            kind: ModelKind::Phs,
                            label: format!(
                                "phs-t{time_unit}-{time_band}-d{dist_unit}-{dist_band}-{weight}"
                            ),
                            spec: ModelSpec::Phs(PhsParams {
                                time_unit,
                                time_band,
                                dist_unit,
                                dist_band,
                                weight,
                            }),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}
