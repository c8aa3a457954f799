//! Reliability growth test-phase planning
//!
//! A phase plan ties together test time, MTBF targets and the growth
//! management parameters. Any subset may be fixed; the rest are derived from an
//! ordered rule table, each rule computing one variable from others that are
//! already known. Passes over the table repeat until a pass resolves nothing new.
//!
//! The growth curve relations use `ln(1/(1 − α)) ≈ α + α²/2`, so
//!
//! ```text
//! M_f = M_i · exp(α (α/2 + ln(T/t₁) + 1))
//! ```
//!
//! and every rule that involves `M_i`, `M_f`, `α`, `T` and `t₁` inverts this
//! same expression. The average MTBF rules use the expected failure count
//! `N(T) = (t₁/M_i)(T/t₁)^(1−α)`.
//!
//! [`plan_phases`] chains several phases of one program: each phase starts at the
//! final MTBF of the one before, and its expected failures are the program's
//! `N(T)` increment over the phase. The idealized curve uses the exact relation
//! `M_f = M_i (T/t₁)^α / (1 − α)` with its own solved growth rate.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, ReliabilityError};
use crate::optimize::solve_bracketed;

/// A quantity in a [`PhasePlan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlanVariable {
    /// Total test time of the program
    TotalTime,
    /// Length of the initial phase before fixes take effect
    FirstPhaseTime,
    InitialMtbf,
    /// Goal MTBF at the end of the test
    FinalMtbf,
    AverageMtbf,
    /// Duane growth rate `α`
    GrowthRate,
    /// Fraction of the initial failure intensity addressed by corrective action
    ManagementStrategy,
    /// Average fraction of a failure mode's intensity removed by a fix
    FixEffectiveness,
    /// Probability of observing at least one failure in the first phase
    Probability,
    /// Largest MTBF reachable with the management strategy and fix effectiveness
    GrowthPotential,
}

impl PlanVariable {
    pub const ALL: [PlanVariable; 10] = [
        PlanVariable::TotalTime,
        PlanVariable::FirstPhaseTime,
        PlanVariable::InitialMtbf,
        PlanVariable::FinalMtbf,
        PlanVariable::AverageMtbf,
        PlanVariable::GrowthRate,
        PlanVariable::ManagementStrategy,
        PlanVariable::FixEffectiveness,
        PlanVariable::Probability,
        PlanVariable::GrowthPotential,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlanVariable::TotalTime => "total_time",
            PlanVariable::FirstPhaseTime => "first_phase_time",
            PlanVariable::InitialMtbf => "initial_mtbf",
            PlanVariable::FinalMtbf => "final_mtbf",
            PlanVariable::AverageMtbf => "average_mtbf",
            PlanVariable::GrowthRate => "growth_rate",
            PlanVariable::ManagementStrategy => "management_strategy",
            PlanVariable::FixEffectiveness => "fix_effectiveness",
            PlanVariable::Probability => "probability",
            PlanVariable::GrowthPotential => "growth_potential",
        }
    }

    /// Fractions that must stay at or below one
    fn upper_limit(&self) -> Option<(f64, bool)> {
        match self {
            PlanVariable::Probability | PlanVariable::GrowthRate => Some((1.0, false)),
            PlanVariable::ManagementStrategy | PlanVariable::FixEffectiveness => Some((1.0, true)),
            _ => None,
        }
    }

    fn admits(&self, value: f64) -> bool {
        if !value.is_finite() || value <= 0.0 {
            return false;
        }
        match self.upper_limit() {
            Some((limit, true)) => value <= limit,
            Some((limit, false)) => value < limit,
            None => true,
        }
    }
}

impl fmt::Display for PlanVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of a test-phase plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhasePlan {
    pub total_time: f64,
    pub first_phase_time: f64,
    pub initial_mtbf: f64,
    pub final_mtbf: f64,
    pub average_mtbf: f64,
    pub growth_rate: f64,
    pub management_strategy: f64,
    pub fix_effectiveness: f64,
    pub probability: f64,
    pub growth_potential: f64,
}

impl PhasePlan {
    pub fn get(&self, variable: PlanVariable) -> f64 {
        match variable {
            PlanVariable::TotalTime => self.total_time,
            PlanVariable::FirstPhaseTime => self.first_phase_time,
            PlanVariable::InitialMtbf => self.initial_mtbf,
            PlanVariable::FinalMtbf => self.final_mtbf,
            PlanVariable::AverageMtbf => self.average_mtbf,
            PlanVariable::GrowthRate => self.growth_rate,
            PlanVariable::ManagementStrategy => self.management_strategy,
            PlanVariable::FixEffectiveness => self.fix_effectiveness,
            PlanVariable::Probability => self.probability,
            PlanVariable::GrowthPotential => self.growth_potential,
        }
    }

    pub fn set(&mut self, variable: PlanVariable, value: f64) {
        let slot = match variable {
            PlanVariable::TotalTime => &mut self.total_time,
            PlanVariable::FirstPhaseTime => &mut self.first_phase_time,
            PlanVariable::InitialMtbf => &mut self.initial_mtbf,
            PlanVariable::FinalMtbf => &mut self.final_mtbf,
            PlanVariable::AverageMtbf => &mut self.average_mtbf,
            PlanVariable::GrowthRate => &mut self.growth_rate,
            PlanVariable::ManagementStrategy => &mut self.management_strategy,
            PlanVariable::FixEffectiveness => &mut self.fix_effectiveness,
            PlanVariable::Probability => &mut self.probability,
            PlanVariable::GrowthPotential => &mut self.growth_potential,
        };
        *slot = value;
    }

    /// Growth rate of the idealized curve that ends at the final MTBF
    ///
    /// Root in `(0, 1)` of `(T/t₁)^α + (M_f/M_i)(α − 1) = 0`. Needs
    /// `M_f > M_i` and `T > t₁`.
    pub fn idealized_growth_rate(&self) -> Result<f64, ReliabilityError> {
        for variable in [InitialMtbf, FinalMtbf, TotalTime, FirstPhaseTime] {
            let value = self.get(variable);
            if !variable.admits(value) {
                return Err(DataError::InvalidParameter {
                    name: variable.name(),
                    value,
                }
                .into());
            }
        }
        let ratio = self.final_mtbf / self.initial_mtbf;
        let span = self.total_time / self.first_phase_time;
        if ratio <= 1.0 {
            return Err(DataError::InvalidParameter {
                name: "final_mtbf",
                value: self.final_mtbf,
            }
            .into());
        }
        if span <= 1.0 {
            return Err(DataError::InvalidParameter {
                name: "total_time",
                value: self.total_time,
            }
            .into());
        }
        let rate = solve_bracketed(
            "idealized growth rate",
            |alpha| span.powf(alpha) + ratio * (alpha - 1.0),
            0.0,
            1.0,
            1e-12,
            200,
        )?;
        Ok(rate)
    }

    /// MTBF on the idealized growth curve at test time `t`
    ///
    /// Flat at the initial MTBF through the first phase, then
    /// `M_i (t/t₁)^α / (1 − α)` with the [`idealized_growth_rate`]. Plans that
    /// cannot solve for it use `growth_rate`.
    ///
    /// [`idealized_growth_rate`]: PhasePlan::idealized_growth_rate
    pub fn idealized_mtbf(&self, t: f64) -> f64 {
        if t <= self.first_phase_time {
            return self.initial_mtbf;
        }
        let rate = self.idealized_growth_rate().unwrap_or(self.growth_rate);
        self.initial_mtbf * (t / self.first_phase_time).powf(rate) / (1.0 - rate)
    }
}

/// Known values for [`plan_phase`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanInputs {
    pub values: PhasePlan,
    pub fixed: BTreeSet<PlanVariable>,
}

impl PlanInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `variable` as known with `value`
    pub fn fix(mut self, variable: PlanVariable, value: f64) -> Self {
        self.values.set(variable, value);
        self.fixed.insert(variable);
        self
    }
}

/// A completed plan with the rule that produced each derived value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSolution {
    pub plan: PhasePlan,
    /// Derived variables in resolution order, with the relation used
    pub resolved_by: Vec<(PlanVariable, String)>,
    /// Variables no rule could reach, left at `0.0`
    pub unresolved: Vec<PlanVariable>,
}

impl PlanSolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

// ============================================================================
// Rule table
// ============================================================================

struct Rule {
    target: PlanVariable,
    inputs: &'static [PlanVariable],
    relation: &'static str,
    formula: fn(&PhasePlan) -> f64,
}

use PlanVariable::*;

#[inline]
fn exponent(p: &PhasePlan) -> f64 {
    p.growth_rate * (0.5 * p.growth_rate + (p.total_time / p.first_phase_time).ln() + 1.0)
}

#[inline]
fn log_time_ratio(p: &PhasePlan) -> f64 {
    (p.final_mtbf / p.initial_mtbf).ln() / p.growth_rate - 0.5 * p.growth_rate - 1.0
}

/// Expected failures by test time `t`
#[inline]
fn expected_failures(t: f64, first_phase_time: f64, initial_mtbf: f64, growth_rate: f64) -> f64 {
    (first_phase_time / initial_mtbf) * (t / first_phase_time).powf(1.0 - growth_rate)
}

const RULES: &[Rule] = &[
    Rule {
        target: InitialMtbf,
        inputs: &[FirstPhaseTime, ManagementStrategy, Probability],
        relation: "first-phase failure probability",
        formula: |p| -p.first_phase_time * p.management_strategy / (-p.probability).ln_1p(),
    },
    Rule {
        target: InitialMtbf,
        inputs: &[FinalMtbf, GrowthRate, TotalTime, FirstPhaseTime],
        relation: "growth curve",
        formula: |p| p.final_mtbf / exponent(p).exp(),
    },
    Rule {
        target: FinalMtbf,
        inputs: &[InitialMtbf, GrowthRate, TotalTime, FirstPhaseTime],
        relation: "growth curve",
        formula: |p| p.initial_mtbf * exponent(p).exp(),
    },
    Rule {
        target: GrowthRate,
        inputs: &[InitialMtbf, FinalMtbf, TotalTime, FirstPhaseTime],
        relation: "growth curve",
        formula: |p| {
            let l = (p.total_time / p.first_phase_time).ln();
            -l - 1.0 + ((1.0 + l).powi(2) + 2.0 * (p.final_mtbf / p.initial_mtbf).ln()).sqrt()
        },
    },
    Rule {
        target: TotalTime,
        inputs: &[InitialMtbf, FinalMtbf, GrowthRate, FirstPhaseTime],
        relation: "growth curve",
        formula: |p| p.first_phase_time * log_time_ratio(p).exp(),
    },
    Rule {
        target: FirstPhaseTime,
        inputs: &[InitialMtbf, FinalMtbf, GrowthRate, TotalTime],
        relation: "growth curve",
        formula: |p| p.total_time / log_time_ratio(p).exp(),
    },
    Rule {
        target: FirstPhaseTime,
        inputs: &[InitialMtbf, ManagementStrategy, Probability],
        relation: "first-phase failure probability",
        formula: |p| -p.initial_mtbf * (-p.probability).ln_1p() / p.management_strategy,
    },
    Rule {
        target: ManagementStrategy,
        inputs: &[InitialMtbf, FirstPhaseTime, Probability],
        relation: "first-phase failure probability",
        formula: |p| -p.initial_mtbf * (-p.probability).ln_1p() / p.first_phase_time,
    },
    Rule {
        target: ManagementStrategy,
        inputs: &[InitialMtbf, GrowthPotential, FixEffectiveness],
        relation: "growth potential",
        formula: |p| (1.0 - p.initial_mtbf / p.growth_potential) / p.fix_effectiveness,
    },
    Rule {
        target: Probability,
        inputs: &[FirstPhaseTime, ManagementStrategy, InitialMtbf],
        relation: "first-phase failure probability",
        formula: |p| -(-p.first_phase_time * p.management_strategy / p.initial_mtbf).exp_m1(),
    },
    Rule {
        target: FixEffectiveness,
        inputs: &[InitialMtbf, GrowthPotential, ManagementStrategy],
        relation: "growth potential",
        formula: |p| (1.0 - p.initial_mtbf / p.growth_potential) / p.management_strategy,
    },
    Rule {
        target: GrowthPotential,
        inputs: &[InitialMtbf, ManagementStrategy, FixEffectiveness],
        relation: "growth potential",
        formula: |p| p.initial_mtbf / (1.0 - p.management_strategy * p.fix_effectiveness),
    },
    Rule {
        target: AverageMtbf,
        inputs: &[TotalTime, FirstPhaseTime, InitialMtbf, GrowthRate],
        relation: "expected failures over the test",
        formula: |p| {
            p.total_time / expected_failures(p.total_time, p.first_phase_time, p.initial_mtbf, p.growth_rate)
        },
    },
    Rule {
        target: AverageMtbf,
        inputs: &[InitialMtbf, FinalMtbf],
        relation: "mean of initial and final",
        formula: |p| 0.5 * (p.initial_mtbf + p.final_mtbf),
    },
    // M_a = M_i (T/t₁)^α, reached only when the final MTBF is unknown
    Rule {
        target: TotalTime,
        inputs: &[AverageMtbf, InitialMtbf, GrowthRate, FirstPhaseTime],
        relation: "expected failures over the test",
        formula: |p| p.first_phase_time * (p.average_mtbf / p.initial_mtbf).powf(1.0 / p.growth_rate),
    },
    Rule {
        target: FirstPhaseTime,
        inputs: &[TotalTime, AverageMtbf, InitialMtbf, GrowthRate],
        relation: "expected failures over the test",
        formula: |p| p.total_time * (p.initial_mtbf / p.average_mtbf).powf(1.0 / p.growth_rate),
    },
    Rule {
        target: GrowthRate,
        inputs: &[TotalTime, FirstPhaseTime, AverageMtbf, InitialMtbf],
        relation: "expected failures over the test",
        formula: |p| (p.average_mtbf / p.initial_mtbf).ln() / (p.total_time / p.first_phase_time).ln(),
    },
];

/// Complete a test-phase plan from the fixed values in `inputs`
///
/// Fixed values must be admissible: finite and positive, with probability and
/// growth rate below one and management strategy and fix effectiveness at most
/// one. Variables no rule can reach are set to `0.0` and listed in
/// [`PlanSolution::unresolved`].
pub fn plan_phase(inputs: &PlanInputs) -> Result<PlanSolution, DataError> {
    let mut plan = PhasePlan::default();
    let mut known = BTreeSet::new();
    for &variable in &inputs.fixed {
        let value = inputs.values.get(variable);
        if !variable.admits(value) {
            return Err(DataError::InvalidParameter {
                name: variable.name(),
                value,
            });
        }
        plan.set(variable, value);
        known.insert(variable);
    }

    let mut resolved_by = Vec::new();
    loop {
        let mut progressed = false;
        for rule in RULES {
            if known.contains(&rule.target) || !rule.inputs.iter().all(|v| known.contains(v)) {
                continue;
            }
            let value = (rule.formula)(&plan);
            if rule.target.admits(value) {
                plan.set(rule.target, value);
                known.insert(rule.target);
                resolved_by.push((rule.target, rule.relation.to_string()));
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    let unresolved: Vec<PlanVariable> = PlanVariable::ALL
        .into_iter()
        .filter(|v| !known.contains(v))
        .collect();
    for variable in &unresolved {
        plan.set(*variable, 0.0);
    }
    if !unresolved.is_empty() {
        tracing::warn!(?unresolved, "phase plan left variables unresolved, defaulting to 0");
    }
    Ok(PlanSolution {
        plan,
        resolved_by,
        unresolved,
    })
}

// ============================================================================
// Multi-phase programs
// ============================================================================

/// Known values of one test phase for [`plan_phases`], `None` to derive
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseInputs {
    /// Cumulative program test time at the end of the phase
    pub test_time: Option<f64>,
    pub growth_rate: Option<f64>,
    /// Failures expected during the phase, only used to derive the test time
    pub failures: Option<f64>,
    pub average_mtbf: Option<f64>,
    pub final_mtbf: Option<f64>,
}

impl PhaseInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_time(mut self, test_time: f64) -> Self {
        self.test_time = Some(test_time);
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = Some(growth_rate);
        self
    }

    pub fn with_failures(mut self, failures: f64) -> Self {
        self.failures = Some(failures);
        self
    }

    pub fn with_average_mtbf(mut self, average_mtbf: f64) -> Self {
        self.average_mtbf = Some(average_mtbf);
        self
    }

    pub fn with_final_mtbf(mut self, final_mtbf: f64) -> Self {
        self.final_mtbf = Some(final_mtbf);
        self
    }
}

/// One completed phase of a program plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseRow {
    /// Cumulative program test time at the end of the phase
    pub test_time: f64,
    pub growth_rate: f64,
    pub expected_failures: f64,
    /// `expected_failures` rounded up
    pub failures: u64,
    pub average_mtbf: f64,
    /// Final MTBF of the previous phase, or the program's initial MTBF
    pub initial_mtbf: f64,
    pub final_mtbf: f64,
}

/// Test time of a phase that does not give one
///
/// Inverts the exact curve `M_f = M_i (T/t₁)^α / (1 − α)` when the final MTBF and
/// growth rate are known, otherwise adds `M_a · N` to the previous phase's end.
fn phase_test_time(phase: &PhaseInputs, growth_start: f64, initial_mtbf: f64, previous_time: f64) -> Option<f64> {
    if let (Some(final_mtbf), Some(rate)) = (phase.final_mtbf, phase.growth_rate) {
        let time = if final_mtbf == initial_mtbf {
            growth_start
        } else {
            growth_start * ((1.0 - rate) * final_mtbf / initial_mtbf).powf(1.0 / rate)
        };
        if time.is_finite() && time > 0.0 {
            return Some(time);
        }
    }
    match (phase.average_mtbf, phase.failures) {
        (Some(average), Some(failures)) => Some(previous_time + average * failures),
        _ => None,
    }
}

/// Plan a growth program test phase by phase
///
/// `growth_start` is the length of the first phase, before any fix is in
/// place, and `initial_mtbf` the program's MTBF over it. Each phase needs a test
/// time or the values to derive one, and a growth rate or a final MTBF. Every
/// phase is measured on the program curve from `initial_mtbf` at `growth_start`:
/// a missing growth rate is the idealized rate that reaches the phase's final
/// MTBF at its test time, and a missing final MTBF follows the approximate
/// growth curve.
pub fn plan_phases(
    growth_start: f64,
    initial_mtbf: f64,
    phases: &[PhaseInputs],
) -> Result<Vec<PhaseRow>, ReliabilityError> {
    if !FirstPhaseTime.admits(growth_start) {
        return Err(DataError::InvalidParameter {
            name: "growth start",
            value: growth_start,
        }
        .into());
    }
    if !InitialMtbf.admits(initial_mtbf) {
        return Err(DataError::InvalidParameter {
            name: "initial_mtbf",
            value: initial_mtbf,
        }
        .into());
    }

    let mut rows = Vec::with_capacity(phases.len());
    let mut phase_initial = initial_mtbf;
    let mut previous_time = 0.0;
    let mut cumulative_failures = 0.0;
    for (index, phase) in phases.iter().enumerate() {
        let number = index + 1;
        let test_time = match phase.test_time {
            Some(time) => time,
            None => phase_test_time(phase, growth_start, initial_mtbf, previous_time).ok_or(
                DataError::MissingPlanValue {
                    phase: number,
                    name: "test_time",
                },
            )?,
        };
        if !test_time.is_finite() || test_time <= previous_time {
            return Err(DataError::InvalidParameter {
                name: "phase test time",
                value: test_time,
            }
            .into());
        }

        let growth_rate = match (phase.growth_rate, phase.final_mtbf) {
            (Some(rate), _) => rate,
            (None, Some(final_mtbf)) => PhasePlan {
                total_time: test_time,
                first_phase_time: growth_start,
                initial_mtbf,
                final_mtbf,
                ..PhasePlan::default()
            }
            .idealized_growth_rate()?,
            (None, None) => {
                return Err(DataError::MissingPlanValue {
                    phase: number,
                    name: "growth_rate",
                }
                .into())
            }
        };
        if !GrowthRate.admits(growth_rate) {
            return Err(DataError::InvalidParameter {
                name: "growth_rate",
                value: growth_rate,
            }
            .into());
        }

        let final_mtbf = phase.final_mtbf.unwrap_or_else(|| {
            initial_mtbf
                * exponent(&PhasePlan {
                    total_time: test_time,
                    first_phase_time: growth_start,
                    growth_rate,
                    ..PhasePlan::default()
                })
                .exp()
        });

        let expected = expected_failures(test_time, growth_start, initial_mtbf, growth_rate) - cumulative_failures;
        if expected.is_nan() || expected <= 0.0 {
            return Err(DataError::InvalidParameter {
                name: "expected phase failures",
                value: expected,
            }
            .into());
        }
        let average_mtbf = phase
            .average_mtbf
            .unwrap_or((test_time - previous_time) / expected);

        tracing::debug!(phase = number, test_time, growth_rate, expected, "planned growth phase");
        rows.push(PhaseRow {
            test_time,
            growth_rate,
            expected_failures: expected,
            failures: expected.ceil() as u64,
            average_mtbf,
            initial_mtbf: phase_initial,
            final_mtbf,
        });

        previous_time = test_time;
        cumulative_failures += expected;
        phase_initial = final_mtbf;
    }
    Ok(rows)
}

// ============================================================================
// Feasibility
// ============================================================================

/// One MIL-HDBK-189C planning guideline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeasibilityCheck {
    pub name: &'static str,
    pub value: f64,
    pub low: f64,
    pub high: f64,
}

impl FeasibilityCheck {
    pub fn within(&self) -> bool {
        self.low <= self.value && self.value <= self.high
    }
}

/// Compare a plan against the historical ranges of successful programs
///
/// Checks whose inputs are unknown (zero) are omitted.
pub fn assess_feasibility(plan: &PhasePlan) -> Vec<FeasibilityCheck> {
    let ratio = |num: f64, den: f64| (num > 0.0 && den > 0.0).then(|| num / den);
    [
        ("initial to final MTBF", ratio(plan.initial_mtbf, plan.final_mtbf), 0.15, 0.47),
        (
            "fix effectiveness",
            Some(plan.fix_effectiveness).filter(|v| *v > 0.0),
            0.55,
            0.85,
        ),
        ("final MTBF to growth potential", ratio(plan.final_mtbf, plan.growth_potential), 0.60, 0.80),
        ("growth rate", Some(plan.growth_rate).filter(|v| *v > 0.0), 0.23, 0.64),
    ]
    .into_iter()
    .filter_map(|(name, value, low, high)| {
        value.map(|value| FeasibilityCheck {
            name,
            value,
            low,
            high,
        })
    })
    .collect()
}
