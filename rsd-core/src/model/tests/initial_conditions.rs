//! Initial-condition modes, explicit state and the reset law.

use crate::errors::RsdError;
use crate::example_models::cooling_model;
use crate::model::{InitialCondition, RunOptions};
use crate::value::Value;
use std::collections::HashMap;

#[test]
fn parse_initial_condition_modes() {
    assert_eq!(
        "original".parse::<InitialCondition>().unwrap(),
        InitialCondition::Original
    );
    assert_eq!(
        "current".parse::<InitialCondition>().unwrap(),
        InitialCondition::Current
    );

    let err = "not a real option".parse::<InitialCondition>().unwrap_err();
    assert_eq!(
        err,
        RsdError::InvalidInitialCondition("not a real option".to_string())
    );
}

#[test]
fn explicit_initial_condition() {
    let mut model = cooling_model().unwrap();
    let state = HashMap::from([("Cup Temperature".to_string(), Value::Scalar(33.0))]);
    let result = model
        .run(
            RunOptions::new()
                .with_initial_condition(InitialCondition::Explicit(0.0, state))
                .with_return_timestamps(vec![0.0]),
        )
        .unwrap();

    assert_eq!(result.column_scalar("cup_temperature").unwrap()[0], 33.0);
}

#[test]
fn current_continues_from_the_previous_run() {
    let mut model = cooling_model().unwrap();
    let first = model
        .run(RunOptions::new().with_return_timestamps(15.0))
        .unwrap();
    let temp_at_15 = first.column_scalar("cup_temperature").unwrap()[0];
    assert_eq!(model.time(), 15.0);

    let timestamps: Vec<f64> = (16..=30).map(|t| t as f64).collect();
    let second = model
        .run(
            RunOptions::new()
                .with_initial_condition(InitialCondition::Current)
                .with_return_timestamps(timestamps),
        )
        .unwrap();

    let temps = second.column_scalar("cup_temperature").unwrap();
    assert!(temps[0] < temp_at_15);
    assert!(temps.iter().all(|&t| t > 70.0));
}

#[test]
fn original_resets_before_running() {
    let mut model = cooling_model().unwrap();
    model
        .run(RunOptions::new().with_return_timestamps(30.0))
        .unwrap();
    assert_eq!(model.time(), 30.0);

    // The default initial condition restores the load-time snapshot.
    let result = model
        .run(RunOptions::new().with_return_timestamps(vec![0.0]))
        .unwrap();
    assert_eq!(result.column_scalar("cup_temperature").unwrap()[0], 180.0);
}

#[test]
fn set_initial_condition_without_running() {
    let mut model = cooling_model().unwrap();
    let state = HashMap::from([("cup_temperature".to_string(), Value::Scalar(50.0))]);
    model
        .set_initial_condition(InitialCondition::Explicit(7.0, state))
        .unwrap();

    assert_eq!(model.time(), 7.0);
    assert_eq!(model.get_scalar("cup_temperature").unwrap(), 50.0);

    model.set_initial_condition(InitialCondition::Original).unwrap();
    assert_eq!(model.time(), 0.0);
    assert_eq!(model.get_scalar("cup_temperature").unwrap(), 180.0);
}

#[test]
fn explicit_state_with_unknown_stock_fails() {
    let mut model = cooling_model().unwrap();
    let state = HashMap::from([("missing_stock".to_string(), Value::Scalar(1.0))]);
    let err = model
        .run(RunOptions::new().with_initial_condition(InitialCondition::Explicit(0.0, state)))
        .unwrap_err();
    assert_eq!(err, RsdError::UnknownVariable("missing_stock".to_string()));
}

#[test]
fn reset_law_after_runs_and_overrides() {
    let mut model = cooling_model().unwrap();
    let pristine = model.snapshot();

    model
        .run(RunOptions::new().with_param("ambient_temperature", 10.0))
        .unwrap();
    assert_ne!(model.snapshot(), pristine);

    model.reset_state();
    model.clear_overrides();
    assert_eq!(model.snapshot(), pristine);
    assert_eq!(model.get_scalar("ambient_temperature").unwrap(), 70.0);
}

#[test]
fn snapshot_restore_round_trip() {
    let mut model = cooling_model().unwrap();
    model
        .run(RunOptions::new().with_return_timestamps(10.0))
        .unwrap();
    let checkpoint = model.snapshot();

    model
        .run(RunOptions::new().with_return_timestamps(30.0))
        .unwrap();
    assert_ne!(model.snapshot(), checkpoint);

    model.restore(&checkpoint).unwrap();
    assert_eq!(model.snapshot(), checkpoint);
    assert_eq!(model.time(), 10.0);
}

#[test]
fn restore_rejects_incomplete_snapshots() {
    let mut model = cooling_model().unwrap();
    let mut snapshot = model.snapshot();
    snapshot.stocks.clear();

    let before = model.snapshot();
    let err = model.restore(&snapshot).unwrap_err();
    assert_eq!(
        err,
        RsdError::IncompleteState(vec!["cup_temperature".to_string()])
    );
    assert_eq!(model.snapshot(), before);
}
