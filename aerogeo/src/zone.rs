//! Fuseaux UTM et table fuseau -> système projeté
//!
//! Les aérogénérateurs brésiliens sont fournis dans le fuseau déclaré par
//! l'exploitant (`FUSO_AG = "UTM 23"`). Seuls les fuseaux 18 à 25
//! (SIRGAS 2000 / UTM hémisphère sud) sont connus.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::crs::Crs;
use crate::types::Value;

/// Numéro de fuseau UTM extrait de `FUSO_AG`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UtmZone(u32);

impl UtmZone {
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    pub const fn number(self) -> u32 {
        self.0
    }

    /// Extrait le fuseau d'un libellé du type "UTM 23" (motif `UTM\s*(\d+)`)
    pub fn parse(label: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| Regex::new(r"UTM\s*(\d+)").expect("valid regex"));

        let digits = pattern.captures(label)?.get(1)?.as_str();
        digits.parse().ok().map(Self)
    }

    /// Extrait le fuseau d'une valeur d'attribut (seuls les textes sont acceptés)
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::parse)
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UTM {}", self.0)
    }
}

/// Table fixe fuseau -> CRS projeté, indexée par le numéro de fuseau
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneTable {
    first_zone: u32,
    entries: [Crs; 8],
}

impl ZoneTable {
    /// SIRGAS 2000 / UTM zones 18S à 25S (EPSG:31978 à 31985)
    pub const SIRGAS_2000_UTM_SOUTH: ZoneTable = ZoneTable {
        first_zone: 18,
        entries: [
            Crs::from_epsg(31978),
            Crs::from_epsg(31979),
            Crs::from_epsg(31980),
            Crs::from_epsg(31981),
            Crs::from_epsg(31982),
            Crs::from_epsg(31983),
            Crs::from_epsg(31984),
            Crs::from_epsg(31985),
        ],
    };

    /// CRS projeté du fuseau, `None` si le fuseau n'est pas couvert
    pub fn projection(&self, zone: UtmZone) -> Option<Crs> {
        let index = zone.number().checked_sub(self.first_zone)?;
        self.entries.get(index as usize).copied()
    }

    /// Fuseaux couverts, dans l'ordre
    pub fn zones(&self) -> impl Iterator<Item = (UtmZone, Crs)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, crs)| (UtmZone(self.first_zone + i as u32), *crs))
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::SIRGAS_2000_UTM_SOUTH
    }
}
