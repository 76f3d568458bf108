//! Types d'erreurs pour le crate aerogeo

use std::path::PathBuf;

use thiserror::Error;

use crate::crs::Crs;

/// Erreurs pouvant survenir pendant le traitement d'un lot d'aérogénérateurs
#[derive(Debug, Error)]
pub enum AerogeoError {
    /// Colonnes obligatoires absentes du lot (X, Y, FUSO_AG)
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    /// Aucune zone n'a produit d'enregistrement géoréférencé
    #[error("No valid geocoded data: {0}")]
    NoGeocodedData(String),

    /// Erreur d'I/O lors de la lecture de la frontière
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fichier de frontière illisible ou mal formé
    #[error("Invalid boundary file {path}: {reason}")]
    InvalidBoundary { path: PathBuf, reason: String },

    /// Format de fichier non reconnu
    #[error("Unsupported boundary format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Système de référence non reconnu (fichier .prj, membre crs)
    #[error("Unknown coordinate reference system: {0}")]
    UnknownCrs(String),

    /// Reprojection impossible entre deux systèmes
    #[error("Reprojection {from} -> {to} not supported: {reason}")]
    UnsupportedReprojection { from: Crs, to: Crs, reason: String },

    /// Échec de transformation d'une coordonnée
    #[error("Coordinate transformation failed: {0}")]
    Transform(String),
}

impl AerogeoError {
    /// Crée une erreur d'I/O avec le chemin concerné
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Crée une erreur de frontière invalide
    pub fn invalid_boundary(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidBoundary {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Crée une erreur de reprojection non supportée
    pub fn unsupported(from: Crs, to: Crs, reason: impl Into<String>) -> Self {
        Self::UnsupportedReprojection {
            from,
            to,
            reason: reason.into(),
        }
    }
}

/// Alias de résultat du crate
pub type Result<T> = std::result::Result<T, AerogeoError>;
