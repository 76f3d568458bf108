//! # aerogeo-etl
//!
//! Collecte du registre des aérogénérateurs de l'ANEEL, normalisation des
//! coordonnées avec `aerogeo` et export CSV / GeoJSON.
//!
//! ## Usage CLI
//!
//! ```bash
//! # Collecte + traitement + export
//! aerogeo-etl run --config aneel --output data/processed/aerogeradores.csv
//!
//! # Collecte seule (instantané JSON)
//! aerogeo-etl fetch --output data/raw/aerogeradores.json
//!
//! # Traitement d'un instantané, sans réseau
//! aerogeo-etl process --input data/raw/aerogeradores.json --boundary BR_Pais.shp
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod source;

pub use config::Config;
