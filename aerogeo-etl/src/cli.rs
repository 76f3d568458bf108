//! Définition et implémentation des commandes CLI
//!
//! - `run` : collecte ArcGIS -> traitement -> export
//! - `fetch` : collecte seule, instantané JSON
//! - `process` : traitement d'un instantané -> export

use std::path::{Path, PathBuf};

use aerogeo::{process, PipelineOutput, PipelineStatus, Record};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use crate::config::Config;
use crate::export::{export_to_csv, export_to_geojson};
use crate::source::{load_snapshot, save_snapshot, ArcGisSource};

#[derive(Subcommand)]
pub enum Commands {
    /// Collecte ArcGIS, traitement et export
    Run {
        #[command(flatten)]
        common: ProcessArgs,

        /// Enregistrer aussi les données brutes en instantané JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Collecte seule, enregistrée en instantané JSON
    Fetch {
        /// Nom de preset (aneel) ou chemin vers une config JSON
        #[arg(long, default_value = "aneel")]
        config: String,

        /// Fichier d'instantané
        #[arg(short, long, default_value = "data/raw/aerogeradores.json")]
        output: PathBuf,
    },

    /// Traiter un instantané JSON (sans réseau)
    Process {
        /// Instantané produit par `fetch`
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        common: ProcessArgs,
    },
}

/// Options communes au traitement et à l'export
#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Nom de preset (aneel) ou chemin vers une config JSON
    #[arg(long, default_value = "aneel")]
    pub config: String,

    /// Frontière de référence (.shp, .geojson). Prioritaire sur la config et l'env
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// Désactiver le filtrage par frontière
    #[arg(long, conflicts_with = "boundary")]
    pub no_boundary: bool,

    /// POT_MW maximal plausible (inclus)
    #[arg(long)]
    pub max_power: Option<f64>,

    /// Fichier CSV de sortie
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Écrire aussi une FeatureCollection GeoJSON
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// Écrire le rapport de traitement en JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Charge la configuration : fichier/preset, puis env, puis arguments CLI
pub fn load_config(name_or_path: &str) -> Result<Config> {
    let mut config = Config::resolve(name_or_path)?;
    config.apply_env();
    Ok(config)
}

impl ProcessArgs {
    /// Applique les arguments CLI sur la configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.boundary {
            config.boundary_path = Some(path.clone());
        }
        if self.no_boundary {
            config.boundary_path = None;
        }
        if let Some(max) = self.max_power {
            config.max_power_mw = max;
        }
        if let Some(path) = &self.output {
            config.output.csv = path.clone();
        }
        if self.geojson.is_some() {
            config.output.geojson = self.geojson.clone();
        }
        if self.report.is_some() {
            config.output.report = self.report.clone();
        }
    }
}

/// Exécute la commande run
pub async fn cmd_run(args: &ProcessArgs, snapshot: Option<&Path>) -> Result<()> {
    let mut config = load_config(&args.config)?;
    args.apply(&mut config);

    let records = fetch(&config).await?;
    if let Some(path) = snapshot {
        save_snapshot(&records, path)?;
    }

    process_and_export(records, &config)
}

/// Exécute la commande fetch
pub async fn cmd_fetch(config: &str, output: &Path) -> Result<()> {
    let config = load_config(config)?;
    let records = fetch(&config).await?;
    save_snapshot(&records, output)
}

/// Exécute la commande process
pub fn cmd_process(input: &Path, args: &ProcessArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    args.apply(&mut config);

    let records = load_snapshot(input)?;
    process_and_export(records, &config)
}

async fn fetch(config: &Config) -> Result<Vec<Record>> {
    info!(url = %config.source.api_url, "Collecte des enregistrements");
    ArcGisSource::new(config.source.clone())?.fetch_all().await
}

/// Traite le lot puis écrit les fichiers de sortie configurés
pub fn process_and_export(records: Vec<Record>, config: &Config) -> Result<()> {
    let output = run_pipeline(records, config)?;

    export_to_csv(&output.table, &config.output.csv)?;
    if let Some(path) = &config.output.geojson {
        export_to_geojson(&output.table, path)?;
    }
    if let Some(path) = &config.output.report {
        output
            .report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
    }

    output.report.display();
    info!("{}", output.report.summary());
    Ok(())
}

/// Traitement seul, sans écriture
pub fn run_pipeline(records: Vec<Record>, config: &Config) -> Result<PipelineOutput> {
    let output = process(records, &config.pipeline_options()).context("Processing failed")?;

    if output.report.status == PipelineStatus::Degraded {
        warn!("Filtrage par frontière ignoré : la sortie n'est pas restreinte à la frontière");
    }
    Ok(output)
}
