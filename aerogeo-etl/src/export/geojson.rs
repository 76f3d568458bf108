//! Export GeoJSON (points longitude/latitude) avec geozero

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use aerogeo::types::{COLUMN_LATITUDE, COLUMN_LONGITUDE};
use aerogeo::{OutputTable, Value};
use anyhow::{Context, Result};
use geo::{Geometry, Point};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use tracing::info;

/// Exporte la table en FeatureCollection de points EPSG:4326
pub fn export_to_geojson(table: &OutputTable, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    let written = write_collection(&mut writer, table)?;
    writer.flush()?;

    info!(features = written, path = %output_path.display(), "GeoJSON écrit");
    Ok(())
}

/// Écrit la collection et retourne le nombre de features
fn write_collection<W: Write>(writer: &mut W, table: &OutputTable) -> Result<usize> {
    let lat = table
        .column_index(COLUMN_LATITUDE)
        .context("Output table has no latitude column")?;
    let lon = table
        .column_index(COLUMN_LONGITUDE)
        .context("Output table has no longitude column")?;

    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    let mut written = 0;
    for row in &table.rows {
        let (Some(y), Some(x)) = (row[lat].as_f64(), row[lon].as_f64()) else {
            continue;
        };
        if written > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, &table.columns, row, Point::new(x, y), [lat, lon])?;
        written += 1;
    }

    write!(writer, "]}}")?;
    Ok(written)
}

/// Écrit une feature : géométrie via geozero, propriétés via serde_json
fn write_feature<W: Write>(
    writer: &mut W,
    columns: &[String],
    row: &[Value],
    point: Point<f64>,
    skip: [usize; 2],
) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::Point(point).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":{{"#)?;
    let mut first = true;
    for (i, (name, value)) in columns.iter().zip(row).enumerate() {
        if skip.contains(&i) {
            continue;
        }
        if !first {
            write!(writer, ",")?;
        }
        first = false;
        serde_json::to_writer(&mut *writer, name)?;
        write!(writer, ":")?;
        serde_json::to_writer(&mut *writer, value)?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OutputTable {
        OutputTable {
            columns: vec![
                "NOME_EOL".to_string(),
                "POT_MW".to_string(),
                "latitude".to_string(),
                "longitude".to_string(),
            ],
            rows: vec![
                vec![
                    Value::from("EOL \"A\""),
                    Value::Float(2.1),
                    Value::Float(-18.5),
                    Value::Float(-45.0),
                ],
                vec![Value::Null, Value::Null, Value::Null, Value::Float(-36.5)],
            ],
        }
    }

    #[test]
    fn test_write_collection() {
        let mut buffer = Vec::new();
        let written = write_collection(&mut buffer, &table()).unwrap();
        assert_eq!(written, 1);

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], -45.0);
        assert_eq!(feature["geometry"]["coordinates"][1], -18.5);
        assert_eq!(feature["properties"]["NOME_EOL"], "EOL \"A\"");
        assert_eq!(feature["properties"]["POT_MW"], 2.1);
        assert!(feature["properties"].get("latitude").is_none());
    }

    #[test]
    fn test_export_to_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/aerogeradores.geojson");

        export_to_geojson(&table(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(r#"{"type":"FeatureCollection""#));
    }
}
