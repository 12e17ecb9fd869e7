//! End-to-end test of the forward model and back-cast runs.

mod common;

use wind_curtail::runner::StudyRunner;
use wind_curtail::tables::model::read_model_csv;

#[test]
fn model_run_produces_hand_checkable_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = common::write_study_tree(dir.path());
    let runner = StudyRunner::new(config).expect("metadata should load");
    let turbine = runner.resolve_turbine(common::ASSET).expect("fixture farm");

    let path = runner
        .model_turbine_year(turbine, common::YEAR)
        .expect("model run should succeed");
    assert!(path.is_file());

    let series = read_model_csv(&path).expect("output should read back");
    assert_eq!(series.cut_ins, vec![5.5, 8.0]);
    assert_eq!(series.rows.len(), 4);

    // Hub height equals reference height, so w_hub == measured speed and
    // the ramp gives 200 kW per m/s above 3 m/s.
    let close = |a: f64, b: f64| (a - b).abs() < 0.5;

    // 00:00: 4 m/s, warm and dry, in curfew, so both strategies cut.
    let h0 = &series.rows[0];
    assert!(close(h0.w_hub, 4.0));
    assert!(close(h0.power_kw, 200.0));
    assert_eq!(h0.blanket_kw, vec![0.0, 0.0]);
    assert_eq!(h0.smart_kw, vec![0.0, 0.0]);

    // 03:00: same wind but 5 °C, too cold for bats, smart keeps running.
    let h3 = &series.rows[1];
    assert_eq!(h3.blanket_kw, vec![0.0, 0.0]);
    assert!(close(h3.smart_kw[0], h3.power_kw));
    assert!(close(h3.smart_kw[1], h3.power_kw));

    // 12:00: daytime, outside the curfew, untouched at 7 m/s.
    let h12 = &series.rows[2];
    assert!(close(h12.power_kw, 800.0));
    assert!(close(h12.blanket_kw[0], 800.0));
    assert!(close(h12.smart_kw[1], 800.0));

    // 23:00: in curfew but 9 m/s clears both cut-ins.
    let h23 = &series.rows[3];
    assert!(close(h23.power_kw, 1200.0));
    assert!(close(h23.blanket_kw[1], 1200.0));
}

#[test]
fn model_all_sweeps_every_farm_year() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = common::write_study_tree(dir.path());
    let runner = StudyRunner::new(config).expect("metadata should load");

    let outcome = runner.model_all();
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 0);
}

#[test]
fn model_unknown_turbine_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = common::write_study_tree(dir.path());
    let runner = StudyRunner::new(config).expect("metadata should load");
    assert!(runner.resolve_turbine("Halkirk").is_err());
}

#[test]
fn turbine_resolves_by_index_too() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = common::write_study_tree(dir.path());
    let runner = StudyRunner::new(config).expect("metadata should load");
    let by_index = runner.resolve_turbine("0").expect("index 0 exists");
    assert_eq!(by_index.asset_name, common::ASSET);
}

#[test]
fn backcast_reconstructs_ramp_speeds() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = common::write_study_tree(dir.path());
    let runner = StudyRunner::new(config).expect("metadata should load");
    let turbine = runner.resolve_turbine(common::ASSET).expect("fixture farm");

    let path = runner
        .backcast_turbine_year(turbine, common::YEAR)
        .expect("back-cast should succeed");
    let content = std::fs::read_to_string(&path).expect("output readable");
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("time,power_kw,w_hub"));

    // 2 MW farm / 10 turbines = 200 kW = 4.0 m/s on the ramp.
    let first = lines.next().expect("one data row");
    let w_hub: f64 = first
        .rsplit(',')
        .next()
        .expect("w_hub cell")
        .parse()
        .expect("w_hub parses");
    assert!((w_hub - 4.0).abs() < 1e-6);
}

#[test]
fn missing_met_file_fails_the_year_not_the_process() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = common::write_study_tree(dir.path());
    // Ask for a year with no met data alongside the good one.
    config.study.years = vec![common::YEAR, 1999];
    let runner = StudyRunner::new(config).expect("metadata should load");

    let outcome = runner.model_all();
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 1);
}
