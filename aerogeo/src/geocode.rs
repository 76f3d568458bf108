//! Étape 1 : résolution des fuseaux et projection
//!
//! Les enregistrements sont regroupés par fuseau déclaré (dans l'ordre
//! d'apparition), chaque groupe est projeté depuis son CRS UTM vers le CRS
//! géographique cible, puis les groupes sont recombinés et dédoublonnés.

use std::collections::{HashMap, HashSet};

use geo::Point;
use tracing::{debug, info, warn};

use crate::crs::Crs;
use crate::error::{AerogeoError, Result};
use crate::reproject::SmartReprojector;
use crate::report::{metrics, PipelineReport};
use crate::types::{GeoDataset, GeoRecord, Record, Value, FIELD_X, FIELD_Y, FIELD_ZONE};
use crate::zone::{UtmZone, ZoneTable};

/// Colonnes sans lesquelles aucun enregistrement ne peut être localisé
pub const REQUIRED_COLUMNS: [&str; 3] = [FIELD_X, FIELD_Y, FIELD_ZONE];

/// Enregistrement localisable en attente de projection
struct Pending {
    record: Record,
    x: f64,
    y: f64,
}

/// Vérifie que les colonnes obligatoires existent dans le lot.
/// Une colonne existe dès qu'au moins un enregistrement porte le champ.
pub fn check_required_columns(records: &[Record]) -> Result<()> {
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !records.iter().any(|r| r.contains_field(column)))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AerogeoError::MissingColumns(missing))
    }
}

/// Projette un lot d'enregistrements bruts vers `target`.
///
/// # Errors
///
/// - `MissingColumns` si X, Y ou FUSO_AG n'existe dans aucun enregistrement
/// - `NoGeocodedData` si aucun fuseau ne produit d'enregistrement
pub fn geocode(
    records: Vec<Record>,
    zones: &ZoneTable,
    target: Crs,
    report: &mut PipelineReport,
) -> Result<GeoDataset> {
    check_required_columns(&records)?;

    // 1. Partitionner par fuseau, dans l'ordre d'apparition
    let mut order: Vec<UtmZone> = Vec::new();
    let mut partitions: HashMap<UtmZone, Vec<Pending>> = HashMap::new();
    let mut missing_required = 0;
    let mut unparseable = 0;

    for mut record in records {
        let coords = (
            record.get(FIELD_X).and_then(Value::as_f64),
            record.get(FIELD_Y).and_then(Value::as_f64),
        );
        let (Some(x), Some(y)) = coords else {
            missing_required += 1;
            continue;
        };
        let Some(zone_value) = record.get(FIELD_ZONE).filter(|v| !v.is_missing()) else {
            missing_required += 1;
            continue;
        };
        let Some(zone) = UtmZone::from_value(zone_value) else {
            unparseable += 1;
            continue;
        };

        record.set(FIELD_ZONE, Value::Int(i64::from(zone.number())));
        partitions
            .entry(zone)
            .or_insert_with(|| {
                order.push(zone);
                Vec::new()
            })
            .push(Pending { record, x, y });
    }

    report.add(metrics::DROPPED_MISSING_REQUIRED, missing_required);
    report.add(metrics::REMOVED_UNPARSEABLE_ZONE, unparseable);
    if unparseable > 0 {
        warn!(records = unparseable, "Valeurs FUSO_AG sans numéro de fuseau UTM");
    }

    // 2. Projeter chaque fuseau connu
    let mut projected = Vec::new();
    for zone in order {
        let Some(pending) = partitions.remove(&zone) else {
            continue;
        };

        let Some(source) = zones.projection(zone) else {
            warn!(zone = %zone, records = pending.len(), "Fuseau sans code EPSG, lignes ignorées");
            report.record_unmapped_zone(zone, pending.len());
            continue;
        };

        let reprojector = SmartReprojector::new(source, target)?;
        debug!(
            zone = %zone,
            source = %source,
            target = %target,
            records = pending.len(),
            reprojector = reprojector.description(),
            "Projecting zone"
        );

        for Pending { record, x, y } in pending {
            let geometry = reprojector.transform_point(Point::new(x, y))?;
            projected.push(GeoRecord {
                attributes: record,
                latitude: geometry.y(),
                longitude: geometry.x(),
                geometry,
            });
        }
    }

    // 3. Recombiner sans doublons exacts (première occurrence conservée)
    let before = projected.len();
    let mut seen = HashSet::with_capacity(before);
    projected.retain(|r| seen.insert(r.fingerprint()));
    report.add(metrics::REMOVED_DUPLICATES, before - projected.len());

    if projected.is_empty() {
        return Err(AerogeoError::NoGeocodedData(
            "no zone produced any georeferenced record".to_string(),
        ));
    }

    report.add(metrics::GEOCODED_RECORDS, projected.len());
    info!(
        records = projected.len(),
        duplicates = before - projected.len(),
        "Géocodage terminé"
    );

    Ok(GeoDataset::new(target, projected))
}
