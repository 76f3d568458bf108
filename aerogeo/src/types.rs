//! Types de données pour le crate aerogeo

use std::fmt;

use geo::Point;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::crs::Crs;

/// Nom du champ d'abscisse projetée
pub const FIELD_X: &str = "X";
/// Nom du champ d'ordonnée projetée
pub const FIELD_Y: &str = "Y";
/// Nom du champ de fuseau ("UTM 23")
pub const FIELD_ZONE: &str = "FUSO_AG";
/// Nom du champ de puissance déclarée (MW)
pub const FIELD_POWER: &str = "POT_MW";
/// Colonne dérivée de latitude
pub const COLUMN_LATITUDE: &str = "latitude";
/// Colonne dérivée de longitude
pub const COLUMN_LONGITUDE: &str = "longitude";

/// Valeur scalaire d'un attribut
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Valeur manquante au sens tabulaire (null ou NaN)
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Coercition numérique : les textes numériques sont parsés,
    /// tout le reste (booléens, textes invalides, null) donne `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Text(s) => fast_float::parse::<f64, _>(s.trim())
                .ok()
                .filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Octets canoniques pour l'empreinte d'une ligne
    fn write_canonical(&self, hasher: &mut blake3::Hasher) {
        match self {
            Value::Null => {
                hasher.update(&[0]);
            }
            Value::Bool(b) => {
                hasher.update(&[1, u8::from(*b)]);
            }
            Value::Int(v) => {
                hasher.update(&[2]);
                hasher.update(&v.to_le_bytes());
            }
            Value::Float(v) if v.is_nan() => {
                hasher.update(&[0]);
            }
            // 2.0 == 2 et -0.0 == 0.0 : même empreinte que l'entier
            Value::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                hasher.update(&[2]);
                hasher.update(&(*v as i64).to_le_bytes());
            }
            Value::Float(v) => {
                hasher.update(&[3]);
                hasher.update(&v.to_bits().to_le_bytes());
            }
            Value::Text(s) => {
                hasher.update(&[4]);
                hasher.update(&(s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) if v.is_nan() => Ok(()),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            // Les enregistrements sont plats : un objet imbriqué est gardé en texte
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Enregistrement brut : liste ordonnée de champs (nom -> valeur)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit un enregistrement depuis l'objet `attributes` d'une feature ArcGIS
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: object
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v)))
                .collect(),
        }
    }

    /// Ajoute ou remplace un champ (l'ordre d'insertion est conservé)
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Variante chaînable de [`Record::set`]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Vrai si le champ est présent et non manquant
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_missing())
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.fields.iter_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Sérialisé comme un objet JSON plat, dans l'ordre des champs
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Enregistrement géoréférencé (attributs + coordonnées dérivées + géométrie)
#[derive(Debug, Clone)]
pub struct GeoRecord {
    /// Attributs d'origine (FUSO_AG contient le numéro de fuseau extrait)
    pub attributes: Record,
    /// Latitude en degrés (EPSG:4326)
    pub latitude: f64,
    /// Longitude en degrés (EPSG:4326)
    pub longitude: f64,
    /// Point dans le système du jeu de données
    pub geometry: Point<f64>,
}

impl GeoRecord {
    /// Empreinte de la ligne complète, indépendante de l'ordre des champs.
    /// Les champs manquants et nuls sont équivalents.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut fields: Vec<(&str, &Value)> = self
            .attributes
            .iter()
            .filter(|(_, v)| !v.is_missing())
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = blake3::Hasher::new();
        for (name, value) in fields {
            hasher.update(name.as_bytes());
            hasher.update(&[0xff]);
            value.write_canonical(&mut hasher);
        }
        for coord in [
            self.latitude,
            self.longitude,
            self.geometry.x(),
            self.geometry.y(),
        ] {
            // -0.0 + 0.0 == +0.0
            hasher.update(&(coord + 0.0).to_bits().to_le_bytes());
        }
        hasher.finalize()
    }
}

/// Jeu de données de travail : tous les points partagent le même CRS
#[derive(Debug, Clone)]
pub struct GeoDataset {
    pub crs: Crs,
    pub records: Vec<GeoRecord>,
}

impl GeoDataset {
    pub fn new(crs: Crs, records: Vec<GeoRecord>) -> Self {
        Self { crs, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Int(5).as_f64(), Some(5.0));
        assert_eq!(Value::from(" 2.5 ").as_f64(), Some(2.5));
        assert_eq!(Value::from("2,5").as_f64(), None);
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::Float(f64::NAN).as_f64(), None);
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_from_json_object() {
        let json: serde_json::Value = serde_json::json!({
            "X": 500000.0,
            "Y": 8000000,
            "FUSO_AG": "UTM 23",
            "NOME": null
        });
        let record = Record::from_json_object(json.as_object().unwrap());

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("X"), Some(&Value::Float(500000.0)));
        assert_eq!(record.get("Y"), Some(&Value::Int(8000000)));
        assert!(record.contains_field("NOME"));
        assert!(!record.has_value("NOME"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut record = Record::new().with("A", 1).with("B", 2);
        record.set("A", "x");
        let names: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(record.get("A"), Some(&Value::from("x")));
    }

    #[test]
    fn test_fingerprint_ignores_field_order_and_nulls() {
        let a = GeoRecord {
            attributes: Record::new().with("A", 1).with("B", "x"),
            latitude: -10.0,
            longitude: -40.0,
            geometry: Point::new(-40.0, -10.0),
        };
        let b = GeoRecord {
            attributes: Record::new()
                .with("B", "x")
                .with("A", 1)
                .with("C", Value::Null),
            ..a.clone()
        };
        let c = GeoRecord {
            attributes: Record::new().with("A", 2).with("B", "x"),
            ..a.clone()
        };

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_fingerprint_numeric_equality() {
        let base = GeoRecord {
            attributes: Record::new().with("POT_MW", 2).with("Z", 0.0),
            latitude: 0.0,
            longitude: -40.0,
            geometry: Point::new(-40.0, 0.0),
        };
        let as_floats = GeoRecord {
            attributes: Record::new().with("POT_MW", 2.0).with("Z", -0.0),
            latitude: -0.0,
            ..base.clone()
        };
        let fractional = GeoRecord {
            attributes: Record::new().with("POT_MW", 2.5).with("Z", 0.0),
            ..base.clone()
        };

        assert_eq!(base.fingerprint(), as_floats.fingerprint());
        assert_ne!(base.fingerprint(), fractional.fingerprint());
    }

    #[test]
    fn test_record_serializes_in_field_order() {
        let record = Record::new()
            .with("Y", 8000000)
            .with("X", 500000.5)
            .with("FUSO_AG", "UTM 23")
            .with("NOME", Value::Null);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Y":8000000,"X":500000.5,"FUSO_AG":"UTM 23","NOME":null}"#);
    }
}
