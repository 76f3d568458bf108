//! Collecte paginée depuis un service ArcGIS REST (`.../MapServer/<n>/query`)
//!
//! Pagination par `resultOffset` / `resultRecordCount`. La collecte s'arrête
//! sur une page vide, ou sur une page incomplète quand le serveur ne signale
//! pas `exceededTransferLimit`.

use std::time::Duration;

use aerogeo::Record;
use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::config::SourceConfig;

/// Une page de résultats
#[derive(Debug)]
pub struct Page {
    pub records: Vec<Record>,
    /// Le serveur indique qu'il reste des enregistrements
    pub exceeded_transfer_limit: bool,
}

/// Client de collecte pour une couche ArcGIS
pub struct ArcGisSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl ArcGisSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aerogeo-etl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// Récupère tous les enregistrements de la couche
    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        let page_size = self.config.page_size.max(1);
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.fetch_page(offset, page_size).await?;
            let count = page.records.len();
            records.extend(page.records);
            info!(fetched = records.len(), "Enregistrements collectés");

            if !has_more(count, page_size, page.exceeded_transfer_limit) {
                break;
            }
            offset += count;
            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
        }

        info!(records = records.len(), url = %self.config.api_url, "Téléchargement terminé");
        Ok(records)
    }

    async fn fetch_page(&self, offset: usize, page_size: usize) -> Result<Page> {
        debug!(offset, page_size, "Requête de page");

        let result_offset = offset.to_string();
        let result_count = page_size.to_string();
        let body: JsonValue = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("where", self.config.where_clause.as_str()),
                ("outFields", "*"),
                ("f", "json"),
                ("resultOffset", result_offset.as_str()),
                ("resultRecordCount", result_count.as_str()),
            ])
            .send()
            .await
            .context(format!("Request failed at offset {}", offset))?
            .error_for_status()
            .context(format!("HTTP error at offset {}", offset))?
            .json()
            .await
            .context(format!("Invalid JSON at offset {}", offset))?;

        parse_page(&body).context(format!("Invalid ArcGIS response at offset {}", offset))
    }
}

/// Continue tant que la page est pleine ou que le serveur l'exige
pub fn has_more(count: usize, page_size: usize, exceeded_transfer_limit: bool) -> bool {
    count > 0 && (count >= page_size || exceeded_transfer_limit)
}

/// Extrait `features[].attributes` d'une réponse de `query`.
/// Les géométries sont ignorées : les coordonnées viennent des attributs X/Y.
pub fn parse_page(body: &JsonValue) -> Result<Page> {
    // ArcGIS répond 200 avec un objet `error` en cas de requête invalide
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(JsonValue::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(JsonValue::as_str)
            .unwrap_or("unknown error");
        bail!("ArcGIS error {}: {}", code, message);
    }

    let records = match body.get("features") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(features)) => features
            .iter()
            .filter_map(|f| f.get("attributes").and_then(JsonValue::as_object))
            .map(Record::from_json_object)
            .collect(),
        Some(_) => bail!("`features` is not an array"),
    };

    let exceeded_transfer_limit = body
        .get("exceededTransferLimit")
        .and_then(JsonValue::as_bool)
        .unwrap_or(false);

    Ok(Page {
        records,
        exceeded_transfer_limit,
    })
}
