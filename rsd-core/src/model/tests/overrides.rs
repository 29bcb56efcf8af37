//! Parameter overrides: constants, time series, persistence and clearing.

use crate::errors::RsdError;
use crate::example_models::cooling_model;
use crate::model::RunOptions;
use crate::timeseries::Timeseries;
use crate::value::Value;
use is_close::is_close;

#[test]
fn constant_param_replaces_the_equation() {
    let mut model = cooling_model().unwrap();
    let result = model
        .run(
            RunOptions::new()
                .with_param("Ambient Temperature", 20.0)
                .with_return_columns(&["ambient_temperature", "cup_temperature"]),
        )
        .unwrap();

    let ambient = result.column_scalar("ambient_temperature").unwrap();
    assert!(ambient.iter().all(|&v| v == 20.0));

    // The cup now cools towards the overridden ambient temperature.
    let temps = result.column_scalar("cup_temperature").unwrap();
    assert!(*temps.last().unwrap() < 70.0);
    assert!(temps.iter().all(|&t| t > 20.0));
}

#[test]
fn params_persist_after_the_run() {
    let mut model = cooling_model().unwrap();
    model
        .run(RunOptions::new().with_param("ambient_temperature", 20.0))
        .unwrap();
    assert_eq!(model.get_scalar("ambient_temperature").unwrap(), 20.0);

    // And apply to subsequent runs until cleared.
    let result = model
        .run(RunOptions::new().with_return_columns(&["ambient_temperature"]))
        .unwrap();
    assert_eq!(result.column_scalar("ambient_temperature").unwrap()[0], 20.0);

    model.clear_overrides();
    assert_eq!(model.get_scalar("ambient_temperature").unwrap(), 70.0);
}

#[test]
fn set_component_outside_a_run() {
    let mut model = cooling_model().unwrap();
    model.set_component("Ambient Temperature", 25.0).unwrap();
    assert_eq!(model.get_scalar("ambient_temperature").unwrap(), 25.0);
}

#[test]
fn set_components_installs_several_overrides_at_once() {
    let mut model = cooling_model().unwrap();
    model
        .set_components([
            ("ambient_temperature".to_string(), 20.0.into()),
            ("Cooling Time".to_string(), 5.0.into()),
        ])
        .unwrap();

    assert!(model.registry().has_override("ambient_temperature"));
    assert!(model.registry().has_override("cooling_time"));
    assert_eq!(model.get_scalar("ambient_temperature").unwrap(), 20.0);
    assert_eq!(model.get_scalar("cooling_time").unwrap(), 5.0);

    model.clear_overrides();
    assert!(!model.registry().has_override("ambient_temperature"));
}

#[test]
fn resetting_an_override_replaces_the_previous_one() {
    let mut model = cooling_model().unwrap();
    model
        .set_component(
            "ambient_temperature",
            Timeseries::from_pairs([(0.0, 0.0), (30.0, 100.0)]).unwrap(),
        )
        .unwrap();
    model.set_component("ambient_temperature", 42.0).unwrap();

    assert_eq!(model.get_scalar("ambient_temperature").unwrap(), 42.0);
}

#[test]
fn timeseries_param_is_interpolated_at_sample_times() {
    let mut model = cooling_model().unwrap();
    let series = Timeseries::from_pairs([(0.0, 10.0), (10.0, 20.0)]).unwrap();
    let result = model
        .run(
            RunOptions::new()
                .with_param("ambient_temperature", series)
                .with_return_columns(&["ambient_temperature"])
                .with_return_timestamps(vec![0.0, 5.0, 10.0, 11.0]),
        )
        .unwrap();

    let ambient = result.column_scalar("ambient_temperature").unwrap();
    assert!(is_close!(ambient[0], 10.0));
    assert!(is_close!(ambient[1], 15.0)); // midpoint linear interpolation
    assert!(is_close!(ambient[2], 20.0));
    assert!(is_close!(ambient[3], 20.0)); // boundary hold past the domain
}

#[test]
fn overriding_a_flow_freezes_its_stock() {
    let mut model = cooling_model().unwrap();
    let result = model
        .run(RunOptions::new().with_param("heat_loss", 0.0))
        .unwrap();

    let temps = result.column_scalar("cup_temperature").unwrap();
    assert!(temps.iter().all(|&t| t == 180.0));
}

#[test]
fn overriding_an_unknown_variable_fails() {
    let mut model = cooling_model().unwrap();
    let err = model.set_component("definitely_not_real", 1.0).unwrap_err();
    assert_eq!(
        err,
        RsdError::UnknownVariable("definitely_not_real".to_string())
    );

    let err = model
        .run(RunOptions::new().with_param("definitely_not_real", 1.0))
        .unwrap_err();
    assert_eq!(
        err,
        RsdError::UnknownVariable("definitely_not_real".to_string())
    );
}

#[test]
fn malformed_series_is_rejected_before_installation() {
    let err = Timeseries::from_pairs([(10.0, 1.0), (0.0, 2.0)]).unwrap_err();
    assert!(matches!(err, RsdError::InvalidOverride(_)));
}

#[test]
fn array_override_on_a_scalar_component_is_rejected() {
    let mut model = cooling_model().unwrap();
    let err = model
        .set_component("heat_loss", Value::from(vec![1.0, 2.0]))
        .unwrap_err();
    assert!(matches!(err, RsdError::InvalidOverride(_)));

    // Nothing was installed; the model still runs normally.
    assert!(!model.registry().has_override("heat_loss"));
    model.run(RunOptions::default()).unwrap();
}

#[test]
fn mis_shaped_overrides_on_a_subscripted_component_are_rejected() {
    let mut model = crate::example_models::herd_model().unwrap();

    let err = model.set_component("growth_rate", 1.0).unwrap_err();
    assert!(matches!(err, RsdError::InvalidOverride(_)));

    let err = model
        .set_component("growth_rate", Value::from(vec![1.0, 2.0, 3.0]))
        .unwrap_err();
    assert!(matches!(err, RsdError::InvalidOverride(_)));

    // Series overrides are scalar-valued by construction.
    let err = model
        .set_component(
            "growth_rate",
            Timeseries::from_pairs([(0.0, 1.0), (10.0, 2.0)]).unwrap(),
        )
        .unwrap_err();
    assert!(matches!(err, RsdError::InvalidOverride(_)));
}

#[test]
fn array_constant_override() {
    let mut model = crate::example_models::herd_model().unwrap();
    model
        .set_component("growth_rate", Value::from(vec![0.0, 0.0]))
        .unwrap();

    let result = model.run(RunOptions::default()).unwrap();
    let last = result
        .value_at(result.len() - 1, "population")
        .unwrap()
        .clone();
    assert_eq!(last, Value::from(vec![100.0, 200.0]));
}
