//! Test-phase planning

use approx::assert_relative_eq;
use reliakit::growth::{assess_feasibility, plan_phases, PhaseInputs, PhasePlan, PlanInputs, PlanVariable};
use reliakit::prelude::*;

#[test]
fn test_full_plan_from_program_goals() {
    let inputs = PlanInputs::new()
        .fix(PlanVariable::InitialMtbf, 45.0)
        .fix(PlanVariable::FinalMtbf, 150.0)
        .fix(PlanVariable::FirstPhaseTime, 500.0)
        .fix(PlanVariable::TotalTime, 8_000.0)
        .fix(PlanVariable::ManagementStrategy, 0.95)
        .fix(PlanVariable::FixEffectiveness, 0.7);
    let solution = plan_phase(&inputs).unwrap();
    assert!(solution.is_complete(), "{:?}", solution.unresolved);

    let plan = solution.plan;
    assert!(plan.growth_rate > 0.0 && plan.growth_rate < 1.0);
    assert_relative_eq!(plan.growth_potential, 45.0 / (1.0 - 0.95 * 0.7), max_relative = 1e-12);
    assert_relative_eq!(plan.probability, 1.0 - (-500.0 * 0.95 / 45.0f64).exp(), max_relative = 1e-12);
    assert!(plan.average_mtbf > 45.0 && plan.average_mtbf < 150.0);

    let derived: Vec<PlanVariable> = solution.resolved_by.iter().map(|(v, _)| *v).collect();
    assert!(derived.contains(&PlanVariable::GrowthRate));
    assert!(!derived.contains(&PlanVariable::FinalMtbf));
}

#[test]
fn test_feasibility_of_a_solved_plan() {
    let inputs = PlanInputs::new()
        .fix(PlanVariable::InitialMtbf, 45.0)
        .fix(PlanVariable::FinalMtbf, 150.0)
        .fix(PlanVariable::FirstPhaseTime, 500.0)
        .fix(PlanVariable::TotalTime, 8_000.0)
        .fix(PlanVariable::ManagementStrategy, 0.95)
        .fix(PlanVariable::FixEffectiveness, 0.7);
    let plan = plan_phase(&inputs).unwrap().plan;
    let checks = assess_feasibility(&plan);
    assert_eq!(checks.len(), 4);
    let ratio = checks.iter().find(|c| c.name == "initial to final MTBF").unwrap();
    assert_relative_eq!(ratio.value, 0.3);
    assert!(ratio.within());
}

#[test]
fn test_plan_inputs_load_from_json() {
    let json = r#"{ "values": { "initial_mtbf": 20.0, "growth_rate": 0.4, "total_time": 2000.0, "first_phase_time": 200.0 },
                   "fixed": ["InitialMtbf", "GrowthRate", "TotalTime", "FirstPhaseTime"] }"#;
    let inputs: PlanInputs = serde_json::from_str(json).unwrap();
    let solution = plan_phase(&inputs).unwrap();
    assert!(solution.plan.final_mtbf > 20.0);
}

#[test]
fn test_program_phases_reach_the_goal_mtbf() {
    // three phases, the last one sized to reach the goal
    let phases = [
        PhaseInputs::new().with_test_time(2_000.0).with_growth_rate(0.3),
        PhaseInputs::new().with_test_time(4_500.0).with_growth_rate(0.3),
        PhaseInputs::new().with_final_mtbf(120.0).with_growth_rate(0.3),
    ];
    let rows = plan_phases(1_000.0, 40.0, &phases).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].initial_mtbf, 40.0);
    assert_eq!(rows[2].final_mtbf, 120.0);
    assert_relative_eq!(rows[2].test_time, 1_000.0 * (0.7f64 * 120.0 / 40.0).powf(1.0 / 0.3), max_relative = 1e-12);
    for row in &rows {
        assert!(row.final_mtbf > row.initial_mtbf);
        assert_eq!(row.failures, row.expected_failures.ceil() as u64);
    }

    let total: f64 = rows.iter().map(|r| r.expected_failures).sum();
    let expected = (1_000.0 / 40.0) * (rows[2].test_time / 1_000.0f64).powf(0.7);
    assert_relative_eq!(total, expected, max_relative = 1e-10);
}

#[test]
fn test_phase_inputs_load_from_json() {
    let json = r#"[{ "test_time": 3000.0, "growth_rate": 0.35 }, { "test_time": 6000.0, "final_mtbf": 90.0 }]"#;
    let phases: Vec<PhaseInputs> = serde_json::from_str(json).unwrap();
    assert_eq!(phases[1].growth_rate, None);
    let rows = plan_phases(500.0, 30.0, &phases).unwrap();
    let ideal = PhasePlan {
        total_time: 6_000.0,
        first_phase_time: 500.0,
        initial_mtbf: 30.0,
        final_mtbf: 90.0,
        ..PhasePlan::default()
    };
    assert_relative_eq!(rows[1].growth_rate, ideal.idealized_growth_rate().unwrap(), max_relative = 1e-12);
}
