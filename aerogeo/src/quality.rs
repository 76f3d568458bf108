//! Étape 2 : filtrage qualité
//!
//! Écarte les coordonnées non finies et les puissances déclarées
//! manquantes ou aberrantes. Cette étape n'échoue jamais : un résultat vide
//! est transmis tel quel à l'étape suivante.

use tracing::info;

use crate::report::{metrics, PipelineReport};
use crate::types::{GeoDataset, Value, FIELD_POWER};

/// Puissance maximale plausible d'un aérogénérateur (MW)
pub const DEFAULT_MAX_POWER_MW: f64 = 20.0;

/// Filtre qualité paramétré par le seuil de puissance
#[derive(Debug, Clone, Copy)]
pub struct QualityFilter {
    max_power_mw: f64,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POWER_MW)
    }
}

impl QualityFilter {
    pub fn new(max_power_mw: f64) -> Self {
        Self { max_power_mw }
    }

    pub fn max_power_mw(&self) -> f64 {
        self.max_power_mw
    }

    /// Applique le filtre. Idempotent.
    pub fn apply(&self, mut dataset: GeoDataset, report: &mut PipelineReport) -> GeoDataset {
        // Les infinis deviennent des valeurs manquantes dans toutes les colonnes
        for record in &mut dataset.records {
            for value in record.attributes.values_mut() {
                if matches!(value, Value::Float(v) if v.is_infinite()) {
                    *value = Value::Null;
                }
            }
        }

        // 1. Coordonnées
        let before = dataset.len();
        dataset
            .records
            .retain(|r| r.latitude.is_finite() && r.longitude.is_finite());
        let removed_coords = before - dataset.len();
        report.add(metrics::REMOVED_INVALID_COORDS, removed_coords);
        info!(removed = removed_coords, "Lignes avec latitude/longitude invalides supprimées");

        // 2. Puissance : coercition numérique puis seuil
        let before = dataset.len();
        dataset.records.retain_mut(|r| {
            let Some(power) = r.attributes.get(FIELD_POWER).and_then(Value::as_f64) else {
                return false;
            };
            if matches!(r.attributes.get(FIELD_POWER), Some(Value::Text(_))) {
                r.attributes.set(FIELD_POWER, power);
            }
            power <= self.max_power_mw
        });
        let removed_outliers = before - dataset.len();
        report.add(metrics::REMOVED_OUTLIERS, removed_outliers);
        info!(
            removed = removed_outliers,
            threshold_mw = self.max_power_mw,
            "Valeurs POT_MW aberrantes supprimées"
        );

        dataset
    }
}
