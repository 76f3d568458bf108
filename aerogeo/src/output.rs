//! Table de sortie
//!
//! Colonnes : les attributs dans l'ordre de première apparition, puis
//! `latitude` et `longitude`. La géométrie de travail n'y figure pas.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{GeoDataset, Value, COLUMN_LATITUDE, COLUMN_LONGITUDE};

/// Table tabulaire prête pour l'analyse
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl OutputTable {
    /// Construit la table depuis le jeu de données final.
    /// Un attribut absent d'un enregistrement donne `Null`.
    pub fn from_dataset(dataset: &GeoDataset) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in &dataset.records {
            for (name, _) in record.attributes.iter() {
                if !index.contains_key(name) && name != COLUMN_LATITUDE && name != COLUMN_LONGITUDE {
                    index.insert(name.to_string(), columns.len());
                    columns.push(name.to_string());
                }
            }
        }

        let attribute_count = columns.len();
        let rows = dataset
            .records
            .iter()
            .map(|record| {
                let mut row = vec![Value::Null; attribute_count + 2];
                for (name, value) in record.attributes.iter() {
                    if let Some(&i) = index.get(name) {
                        row[i] = value.clone();
                    }
                }
                row[attribute_count] = Value::Float(record.latitude);
                row[attribute_count + 1] = Value::Float(record.longitude);
                row
            })
            .collect();

        columns.push(COLUMN_LATITUDE.to_string());
        columns.push(COLUMN_LONGITUDE.to_string());

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position d'une colonne
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Valeur d'une cellule par nom de colonne
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let i = self.column_index(column)?;
        self.rows.get(row)?.get(i)
    }
}
