//! Rapport de traitement avec graceful degradation
//!
//! Chaque étape du pipeline enregistre ses compteurs ici plutôt que de les
//! afficher : l'appelant peut ainsi auditer les pertes de données étape par
//! étape, et les tests peuvent vérifier les compteurs directement.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::zone::UtmZone;

/// Noms des compteurs du rapport
pub mod metrics {
    /// Enregistrements reçus
    pub const INPUT_RECORDS: &str = "input_records";
    /// Enregistrements sans X, Y ou FUSO_AG exploitable
    pub const DROPPED_MISSING_REQUIRED: &str = "dropped_missing_required";
    /// FUSO_AG ne correspondant pas au motif "UTM <n>"
    pub const REMOVED_UNPARSEABLE_ZONE: &str = "removed_unparseable_zone";
    /// Enregistrements d'un fuseau absent de la table
    pub const REMOVED_UNMAPPED_ZONE: &str = "removed_unmapped_zone";
    /// Doublons exacts après recombinaison des fuseaux
    pub const REMOVED_DUPLICATES: &str = "removed_duplicates";
    /// Enregistrements géoréférencés en sortie d'étape 1
    pub const GEOCODED_RECORDS: &str = "geocoded_records";
    /// Latitude/longitude infinie ou manquante
    pub const REMOVED_INVALID_COORDS: &str = "removed_invalid_coords";
    /// POT_MW manquant, non numérique ou au-dessus du seuil
    pub const REMOVED_OUTLIERS: &str = "removed_outliers";
    /// Points hors de la frontière de référence
    pub const REMOVED_OUTSIDE_BOUNDARY: &str = "removed_outside_boundary";
    /// Points contenus dans plusieurs polygones de la frontière
    pub const MULTI_BOUNDARY_MATCHES: &str = "multi_boundary_matches";
    /// Enregistrements dans la table de sortie
    pub const OUTPUT_RECORDS: &str = "output_records";
}

/// Statut global du traitement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStatus {
    /// Toutes les étapes ont été appliquées
    Complete,
    /// Filtrage géographique sauté (frontière indisponible)
    Degraded,
}

/// Fuseau sans projection connue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedZone {
    pub zone: UtmZone,
    /// Nombre d'enregistrements écartés
    pub records: usize,
}

/// Rapport complet d'un traitement
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Statut global
    pub status: PipelineStatus,
    /// Durée du traitement
    pub duration_secs: f64,
    /// Compteurs par nom (voir [`metrics`])
    pub metrics: BTreeMap<String, usize>,
    /// Fuseaux ignorés, un par fuseau rencontré
    pub unmapped_zones: Vec<UnmappedZone>,
    /// Messages d'avertissement
    pub warnings: Vec<String>,
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self {
            status: PipelineStatus::Complete,
            duration_secs: 0.0,
            metrics: BTreeMap::new(),
            unmapped_zones: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl PipelineReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute `count` au compteur (le crée à zéro si besoin)
    pub fn add(&mut self, metric: &str, count: usize) {
        *self.metrics.entry(metric.to_string()).or_default() += count;
    }

    /// Valeur d'un compteur, 0 s'il n'a jamais été enregistré
    pub fn get(&self, metric: &str) -> usize {
        self.metrics.get(metric).copied().unwrap_or(0)
    }

    /// Enregistre un fuseau ignoré
    pub fn record_unmapped_zone(&mut self, zone: UtmZone, records: usize) {
        self.add(metrics::REMOVED_UNMAPPED_ZONE, records);
        self.unmapped_zones.push(UnmappedZone { zone, records });
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Marque le traitement comme dégradé
    pub fn mark_degraded(&mut self, reason: impl Into<String>) {
        self.status = PipelineStatus::Degraded;
        self.record_warning(reason);
    }

    /// Définit la durée du traitement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Total des enregistrements écartés, toutes étapes confondues
    pub fn total_removed(&self) -> usize {
        [
            metrics::DROPPED_MISSING_REQUIRED,
            metrics::REMOVED_UNPARSEABLE_ZONE,
            metrics::REMOVED_UNMAPPED_ZONE,
            metrics::REMOVED_DUPLICATES,
            metrics::REMOVED_INVALID_COORDS,
            metrics::REMOVED_OUTLIERS,
            metrics::REMOVED_OUTSIDE_BOUNDARY,
        ]
        .iter()
        .map(|m| self.get(m))
        .sum()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("PROCESSING REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- METRICS ---");
        for (name, count) in &self.metrics {
            println!("  {}: {}", name, count);
        }

        if !self.unmapped_zones.is_empty() {
            println!("\n--- UNMAPPED ZONES ---");
            for z in &self.unmapped_zones {
                println!("  {}: {} records skipped", z.zone, z.records);
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  {}", w);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} in, {} out, {} removed",
            self.status,
            self.get(metrics::INPUT_RECORDS),
            self.get(metrics::OUTPUT_RECORDS),
            self.total_removed()
        )
    }
}
