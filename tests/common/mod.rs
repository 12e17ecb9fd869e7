//! Shared fixtures: a miniature study directory tree with one farm, one
//! station, and four hand-checkable hours of August 1, 2021.

use std::fs;
use std::path::Path;

use wind_curtail::config::{CurtailmentConfig, StudyConfig, StudyScopeConfig};

/// The fixture farm name.
pub const ASSET: &str = "Castle River 1";

/// The fixture weather station.
pub const STATION: &str = "Lethbridge";

/// The fixture study year.
pub const YEAR: i32 = 2021;

/// Writes the study tree under `root` and returns a config pointing at it.
///
/// The fixture is built for clean arithmetic: hub height equals the
/// reference height, so hub-height speed equals the measured speed, and
/// the power curve is a straight ramp (3 m/s → 0 kW, 12 m/s → 1800 kW,
/// i.e. 200 kW per m/s above cut-in).
///
/// Hours of Aug 1 (curfew: ≤ 07:00 and ≥ 20:00; cut-ins 5.5 and 8.0):
///
/// | hour  | wind    | temp | rain | fate                                |
/// |-------|---------|------|------|-------------------------------------|
/// | 00:00 | 4.0 m/s | 15 ° | 0 mm | curtailed by blanket and smart      |
/// | 03:00 | 4.0 m/s |  5 ° | 0 mm | curtailed by blanket only (cold)    |
/// | 12:00 | 7.0 m/s | 18 ° | 0 mm | daytime, untouched                  |
/// | 23:00 | 9.0 m/s | 14 ° | 0 mm | curfew but above both cut-ins       |
pub fn write_study_tree(root: &Path) -> StudyConfig {
    let supply = root.join("supply");
    let curve_dir = supply.join("curve");
    let data = root.join("data");
    let real = root.join("real");
    for dir in [&supply, &curve_dir, &data, &real] {
        fs::create_dir_all(dir).expect("create fixture directory");
    }

    fs::write(
        supply.join("Nearby_base.csv"),
        format!(
            "Asset Name,Model,Nearby_Station,hub_height,number_of_turbines,total_capacity_MW,\
             Distance,Summer Jun-Jul,Pre-harvest Aug,Post-harvest/pre-snow Sep-Nov,\
             Snow covered Dec-Feb,Spring Mar-May\n\
             {ASSET},E-101,{STATION},10.0,10,18.0,12.5,0.08,0.1,0.05,0.003,0.03\n"
        ),
    )
    .expect("write metadata");

    // Straight ramp: 200 kW per m/s from 3 to 12 m/s.
    fs::write(
        curve_dir.join("E-101.txt"),
        "wind_speed\tpower\n3.0\t0.0\n12.0\t1800.0\n25.0\t1800.0\n",
    )
    .expect("write power curve");

    let mut sun = String::from("turbine_name,date,rise,set\n");
    for day in 1..=31 {
        sun.push_str(&format!("{ASSET},Aug {day:02} 2019,06:00,21:00\n"));
    }
    fs::write(supply.join("Sun.csv"), sun).expect("write sun table");

    // Wind in km/h chosen to land on 4.0 / 7.0 / 9.0 m/s via the 0.27778
    // conversion factor (14.4 × 0.27778 = 4.00003…).
    fs::write(
        data.join(format!("{STATION}_{YEAR}_filled.csv")),
        "Date/Time (LST),Temp (°C),Wind Spd (km/h),Precip. Amount (mm)\n\
         2021-08-01 00:00,15.0,14.4,0.0\n\
         2021-08-01 03:00,5.0,14.4,0.0\n\
         2021-08-01 12:00,18.0,25.2,0.0\n\
         2021-08-01 23:00,14.0,32.4,0.0\n",
    )
    .expect("write met data");

    fs::write(
        supply.join(format!("pool_price_{YEAR}.csv")),
        "Date (HE),Price ($)\n\
         08/01/2021 00,50.0\n\
         08/01/2021 03,40.0\n\
         08/01/2021 12,30.0\n\
         08/01/2021 23,20.0\n",
    )
    .expect("write pool prices");

    // Farm actuals: 2 MW over 10 turbines = 200 kW per turbine = 4 m/s
    // on the ramp; total 20 MWh for the metrics comparison.
    fs::write(
        real.join(format!("{YEAR}_{ASSET}.csv")),
        "Date (MST),Volume\n\
         2021-08-01 00:00,2.0\n\
         2021-08-01 03:00,2.0\n\
         2021-08-01 12:00,7.0\n\
         2021-08-01 23:00,9.0\n",
    )
    .expect("write actual generation");

    let mut config = StudyConfig::full_season();
    config.directories.data = data;
    config.directories.result = root.join("result");
    config.directories.real = real;
    config.directories.supply = supply;
    config.curtailment = CurtailmentConfig {
        cut_in_speeds: vec![5.5, 8.0],
        ..CurtailmentConfig::default()
    };
    config.study = StudyScopeConfig {
        years: vec![YEAR],
        scenario: "full_season".to_string(),
        save_plots: false,
    };
    assert!(config.validate().is_empty(), "fixture config must be valid");
    config
}
