//! Configuration de l'ETL

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Variable d'environnement remplaçant l'URL du service ArcGIS
pub const ENV_API_URL: &str = "AEROGEO_API_URL";
/// Variable d'environnement remplaçant le chemin de la frontière
pub const ENV_BOUNDARY_PATH: &str = "AEROGEO_BOUNDARY_PATH";

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,

    /// Frontière de référence (.shp ou .geojson). Absente : pas de filtrage
    #[serde(default)]
    pub boundary_path: Option<PathBuf>,

    /// Seuil de puissance (MW, inclus)
    #[serde(default = "default_max_power")]
    pub max_power_mw: f64,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Service ArcGIS interrogé
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Endpoint `.../MapServer/<layer>/query`
    pub api_url: String,

    /// Clause `where` de la requête
    #[serde(rename = "where", default = "default_where")]
    pub where_clause: String,

    /// Enregistrements par page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pause entre deux pages (ms)
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,
}

/// Fichiers produits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub csv: PathBuf,

    #[serde(default)]
    pub geojson: Option<PathBuf>,

    /// Rapport JSON du traitement
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("data/processed/aerogeradores.csv"),
            geojson: None,
            report: None,
        }
    }
}

fn default_max_power() -> f64 {
    aerogeo::DEFAULT_MAX_POWER_MW
}

fn default_where() -> String {
    "1=1".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_page_delay() -> u64 {
    200
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "aneel" => Self::load_embedded(include_str!("presets/aneel.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: aneel", preset),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.extension().is_some_and(|e| e == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(name_or_path)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les surcharges AEROGEO_API_URL et AEROGEO_BOUNDARY_PATH
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var_os(ENV_BOUNDARY_PATH).map(PathBuf::from),
        );
    }

    /// Remplace l'URL et la frontière si fournies (valeurs vides ignorées)
    pub fn apply_overrides(&mut self, api_url: Option<String>, boundary: Option<PathBuf>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.source.api_url = url;
        }
        if let Some(path) = boundary.filter(|p| !p.as_os_str().is_empty()) {
            self.boundary_path = Some(path);
        }
    }

    /// Source de frontière pour le pipeline
    pub fn boundary_source(&self) -> aerogeo::BoundarySource {
        match &self.boundary_path {
            Some(path) => aerogeo::BoundarySource::File(path.clone()),
            None => aerogeo::BoundarySource::Disabled,
        }
    }

    /// Options du pipeline
    pub fn pipeline_options(&self) -> aerogeo::PipelineOptions {
        aerogeo::PipelineOptions {
            max_power_mw: self.max_power_mw,
            boundary: self.boundary_source(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aneel_preset() {
        let config = Config::from_preset("aneel").unwrap();
        assert!(config.source.api_url.ends_with("/MapServer/0/query"));
        assert_eq!(config.source.where_clause, "1=1");
        assert_eq!(config.source.page_size, 1000);
        assert_eq!(config.source.page_delay_ms, 200);
        assert_eq!(config.max_power_mw, 20.0);
        assert!(config.boundary_path.is_some());
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("full").is_err());
    }

    #[test]
    fn test_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"source":{"api_url":"http://localhost/query"}}"#).unwrap();
        assert_eq!(config.source.page_size, 1000);
        assert_eq!(config.max_power_mw, 20.0);
        assert!(config.boundary_path.is_none());
        assert!(matches!(
            config.boundary_source(),
            aerogeo::BoundarySource::Disabled
        ));
        assert_eq!(
            config.output.csv,
            PathBuf::from("data/processed/aerogeradores.csv")
        );
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::from_preset("aneel").unwrap();
        config.apply_overrides(Some("http://mirror/query".to_string()), Some("br.geojson".into()));
        assert_eq!(config.source.api_url, "http://mirror/query");
        assert_eq!(config.boundary_path, Some(PathBuf::from("br.geojson")));

        config.apply_overrides(Some("  ".to_string()), None);
        assert_eq!(config.source.api_url, "http://mirror/query");
    }

    #[test]
    fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.json");
        std::fs::write(
            &path,
            r#"{"source":{"api_url":"http://localhost/query","page_size":500},"max_power_mw":15.0}"#,
        )
        .unwrap();

        let config = Config::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(config.source.page_size, 500);
        assert_eq!(config.pipeline_options().max_power_mw, 15.0);
    }
}
