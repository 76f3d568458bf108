//! Tests d'intégration du pipeline complet

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aerogeo::report::metrics;
use aerogeo::{
    process, AerogeoError, BoundaryOutcome, BoundarySource, Crs, PipelineOptions,
    PipelineStatus, Record, ReferenceBoundary, Value,
};

/// Frontière carrée (-50,-25) / (-40,-10), avec un membre crs optionnel
fn write_boundary(dir: &Path, crs: Option<&str>) -> PathBuf {
    let path = dir.join("brasil.geojson");
    let crs_member = crs
        .map(|name| format!(r#""crs":{{"type":"name","properties":{{"name":"{}"}}}},"#, name))
        .unwrap_or_default();
    std::fs::write(
        &path,
        format!(
            r#"{{"type":"FeatureCollection",{}"features":[{{"type":"Feature","properties":{{}},
            "geometry":{{"type":"Polygon","coordinates":[[[-50,-25],[-40,-25],[-40,-10],[-50,-10],[-50,-25]]]}}}}]}}"#,
            crs_member
        ),
    )
    .unwrap();
    path
}

fn turbine(id: i64, zone: &str, x: f64, y: f64, power: f64) -> Record {
    Record::new()
        .with("ID", id)
        .with("X", x)
        .with("Y", y)
        .with("FUSO_AG", zone)
        .with("POT_MW", power)
}

fn options(boundary: BoundarySource) -> PipelineOptions {
    PipelineOptions::default().with_boundary(boundary)
}

#[test]
fn test_three_record_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let boundary = write_boundary(dir.path(), None);

    let records = vec![
        turbine(1, "UTM 23", 500000.0, 8000000.0, 5.0),
        turbine(2, "UTM 99", 500000.0, 8000000.0, 5.0),
        turbine(3, "UTM 23", 510000.0, 8000000.0, 25.0),
    ];

    let output = process(records, &options(BoundarySource::File(boundary))).unwrap();

    assert_eq!(output.table.len(), 1);
    assert_eq!(output.table.value(0, "ID"), Some(&Value::Int(1)));
    assert_eq!(output.report.get(metrics::REMOVED_UNMAPPED_ZONE), 1);
    assert_eq!(output.report.get(metrics::REMOVED_OUTLIERS), 1);
    assert_eq!(output.report.get(metrics::REMOVED_OUTSIDE_BOUNDARY), 0);
    assert_eq!(output.report.get(metrics::INPUT_RECORDS), 3);
    assert_eq!(output.report.get(metrics::OUTPUT_RECORDS), 1);
    assert_eq!(output.report.status, PipelineStatus::Complete);
    assert!(output.boundary.is_filtered());

    let lon = output.table.value(0, "longitude").and_then(Value::as_f64).unwrap();
    let lat = output.table.value(0, "latitude").and_then(Value::as_f64).unwrap();
    assert!((lon - (-45.0)).abs() < 1e-9);
    assert!((lat - (-18.089)).abs() < 0.01);
}

#[test]
fn test_output_columns() {
    let output = process(
        vec![turbine(1, "UTM 23", 500000.0, 8000000.0, 2.0).with("NOME", "EOL Teste")],
        &PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(
        output.table.columns,
        vec!["ID", "X", "Y", "FUSO_AG", "POT_MW", "NOME", "latitude", "longitude"]
    );
    assert_eq!(output.table.value(0, "FUSO_AG"), Some(&Value::Int(23)));
}

#[test]
fn test_unmapped_zone_diagnostic() {
    let output = process(
        vec![
            turbine(1, "UTM 99", 500000.0, 8000000.0, 2.0),
            turbine(2, "UTM 23", 500000.0, 8000000.0, 2.0),
        ],
        &PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(output.table.len(), 1);
    assert_eq!(output.table.value(0, "FUSO_AG"), Some(&Value::Int(23)));
    assert_eq!(output.report.unmapped_zones.len(), 1);
    assert_eq!(output.report.unmapped_zones[0].zone.number(), 99);
}

#[test]
fn test_degraded_mode_returns_quality_filtered_data() {
    let records = vec![
        turbine(1, "UTM 23", 500000.0, 8000000.0, 2.0),
        // Hors de toute frontière plausible, gardé faute de filtrage
        turbine(2, "UTM 25", 800000.0, 9990000.0, 3.0),
        turbine(3, "UTM 23", 500000.0, 8000000.0, 30.0),
    ];

    let output = process(
        records,
        &options(BoundarySource::File(PathBuf::from("/nonexistent/BR_Pais.shp"))),
    )
    .unwrap();

    assert_eq!(output.table.len(), 2);
    assert_eq!(output.report.status, PipelineStatus::Degraded);
    assert!(matches!(output.boundary, BoundaryOutcome::Unfiltered { .. }));
    assert_eq!(output.report.get(metrics::REMOVED_OUTSIDE_BOUNDARY), 0);
    assert_eq!(output.dataset.crs, Crs::WGS84);
}

#[test]
fn test_boundary_crs_reconciliation() {
    let dir = tempfile::tempdir().unwrap();
    let boundary = write_boundary(dir.path(), Some("EPSG:4674"));

    let output = process(
        vec![
            turbine(1, "UTM 23", 500000.0, 8000000.0, 2.0),
            // Fortaleza, hors du carré
            turbine(2, "UTM 24", 552560.0, 9587500.0, 2.0),
        ],
        &options(BoundarySource::File(boundary)),
    )
    .unwrap();

    assert_eq!(output.dataset.crs, Crs::SIRGAS_2000);
    assert_eq!(output.table.len(), 1);
    assert_eq!(output.report.get(metrics::REMOVED_OUTSIDE_BOUNDARY), 1);
    assert_eq!(
        output.boundary,
        BoundaryOutcome::Filtered {
            boundary_crs: Crs::SIRGAS_2000,
            removed: 1
        }
    );
}

#[test]
fn test_preloaded_boundary_is_shared() {
    let dir = tempfile::tempdir().unwrap();
    let boundary = Arc::new(ReferenceBoundary::load(&write_boundary(dir.path(), None)).unwrap());
    let opts = options(BoundarySource::Preloaded(Arc::clone(&boundary)));

    for _ in 0..2 {
        let output = process(vec![turbine(1, "UTM 23", 500000.0, 8000000.0, 2.0)], &opts).unwrap();
        assert_eq!(output.table.len(), 1);
    }
    assert_eq!(Arc::strong_count(&boundary), 2);
}

#[test]
fn test_monotonic_shrinkage() {
    let dir = tempfile::tempdir().unwrap();
    let boundary = write_boundary(dir.path(), None);

    let mut records = Vec::new();
    for i in 0..40 {
        let zone = ["UTM 22", "UTM 23", "UTM 24", "UTM 99", "zona"][i % 5];
        let x = 300000.0 + (i as f64) * 10000.0;
        let y = 7500000.0 + (i as f64) * 50000.0;
        records.push(turbine(i as i64, zone, x, y, (i % 30) as f64));
    }
    records.push(turbine(0, "UTM 22", 300000.0, 7500000.0, 0.0));

    let input = records.len();
    let output = process(records, &options(BoundarySource::File(boundary))).unwrap();
    let report = &output.report;

    let geocoded = report.get(metrics::GEOCODED_RECORDS);
    let after_quality =
        geocoded - report.get(metrics::REMOVED_INVALID_COORDS) - report.get(metrics::REMOVED_OUTLIERS);

    assert!(geocoded <= input);
    assert!(after_quality <= geocoded);
    assert!(output.table.len() <= after_quality);
    assert_eq!(output.table.len(), input - report.total_removed());
    assert_eq!(report.get(metrics::REMOVED_DUPLICATES), 1);
}

#[test]
fn test_missing_required_column_is_fatal() {
    let records = vec![Record::new().with("X", 1.0).with("FUSO_AG", "UTM 23")];
    match process(records, &PipelineOptions::default()) {
        Err(AerogeoError::MissingColumns(columns)) => assert_eq!(columns, vec!["Y"]),
        other => panic!("expected MissingColumns, got {:?}", other.map(|o| o.table)),
    }
}

#[test]
fn test_no_geocoded_data_is_fatal() {
    let result = process(
        vec![turbine(1, "UTM 99", 500000.0, 8000000.0, 2.0)],
        &PipelineOptions::default(),
    );
    assert!(matches!(result, Err(AerogeoError::NoGeocodedData(_))));
}

#[test]
fn test_empty_after_quality_is_not_an_error() {
    let output = process(
        vec![turbine(1, "UTM 23", 500000.0, 8000000.0, 50.0)],
        &PipelineOptions::default(),
    )
    .unwrap();

    assert!(output.table.is_empty());
    assert_eq!(output.report.get(metrics::OUTPUT_RECORDS), 0);
}

#[test]
fn test_report_saved_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = process(
        vec![
            turbine(1, "UTM 23", 500000.0, 8000000.0, 2.0),
            turbine(2, "UTM 99", 500000.0, 8000000.0, 2.0),
        ],
        &PipelineOptions::default(),
    )
    .unwrap();

    let path = dir.path().join("report.json");
    output.report.save_to_file(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(json["status"], "Complete");
    assert_eq!(json["metrics"]["removed_unmapped_zone"], 1);
    assert_eq!(json["unmapped_zones"][0]["zone"], 99);
}
