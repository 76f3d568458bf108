//! Détection du CRS d'un fichier .prj (WKT)

use std::sync::OnceLock;

use memchr::memmem;
use regex::Regex;

use crate::crs::Crs;
use crate::error::{AerogeoError, Result};

/// Marqueurs d'autorité EPSG (WKT1 puis WKT2)
const AUTHORITY_MARKERS: &[&[u8]] = &[b"AUTHORITY[\"EPSG\"", b"ID[\"EPSG\""];

/// Détecte le CRS d'un .prj.
///
/// Seule l'autorité EPSG portée par le nœud racine identifie le CRS. Les .prj
/// ESRI n'en ont pas : on reconnaît alors les noms usuels.
pub fn detect_crs(data: &[u8]) -> Result<Crs> {
    let text = simdutf8::basic::from_utf8(data)
        .map_err(|_| AerogeoError::UnknownCrs("non UTF-8 .prj".to_string()))?;

    if let Some(crs) = authority_code(data) {
        return Ok(crs);
    }

    let name = text.trim().to_ascii_uppercase().replace([' ', '-'], "_");

    if name.starts_with("PROJCS") || name.starts_with("PROJCRS") {
        static UTM: OnceLock<Regex> = OnceLock::new();
        let utm = UTM.get_or_init(|| {
            Regex::new(r"(SIRGAS_?2000|WGS_(?:19)?84)_UTM_ZONE_(\d{1,2})([NS])").expect("valid regex")
        });

        if let Some(caps) = utm.captures(&name) {
            let zone: u32 = caps[2].parse().unwrap_or(0);
            let south = &caps[3] == "S";
            let code = match (caps[1].starts_with("SIRGAS"), south) {
                (true, true) if (17..=25).contains(&zone) => Some(31960 + zone),
                (true, false) if (17..=22).contains(&zone) => Some(31954 + zone),
                (false, true) if (1..=60).contains(&zone) => Some(32700 + zone),
                (false, false) if (1..=60).contains(&zone) => Some(32600 + zone),
                _ => None,
            };
            if let Some(code) = code {
                return Ok(Crs::from_epsg(code));
            }
        }

        if name.contains("WEB_MERCATOR") || name.contains("PSEUDO_MERCATOR") {
            return Ok(Crs::WEB_MERCATOR);
        }
    } else if name.contains("SIRGAS_2000") || name.contains("SIRGAS2000") {
        return Ok(Crs::SIRGAS_2000);
    } else if name.contains("WGS_1984") || name.contains("WGS_84") {
        return Ok(Crs::WGS84);
    }

    let preview: String = text.trim().chars().take(60).collect();
    Err(AerogeoError::UnknownCrs(preview))
}

/// Code EPSG déclaré par AUTHORITY[...] ou ID[...] directement sous la racine.
/// Les autorités imbriquées (DATUM, UNIT, GEOGCS d'un PROJCS...) sont ignorées.
fn authority_code(data: &[u8]) -> Option<Crs> {
    let (pos, marker) = AUTHORITY_MARKERS
        .iter()
        .flat_map(|m| memmem::find_iter(data, m).map(move |pos| (pos, *m)))
        .filter(|(pos, _)| nesting_depth(&data[..*pos]) == 1)
        .max_by_key(|(pos, _)| *pos)?;

    let rest = &data[pos + marker.len()..];
    let start = rest.iter().position(u8::is_ascii_digit)?;
    let digits: Vec<u8> = rest[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .copied()
        .collect();

    std::str::from_utf8(&digits)
        .ok()?
        .parse()
        .ok()
        .map(Crs::from_epsg)
}

/// Profondeur d'imbrication à la fin de `prefix` (hors chaînes entre guillemets)
fn nesting_depth(prefix: &[u8]) -> i32 {
    let mut depth = 0;
    let mut quoted = false;
    for &b in prefix {
        match b {
            b'"' => quoted = !quoted,
            b'[' | b'(' if !quoted => depth += 1,
            b']' | b')' if !quoted => depth -= 1,
            _ => {}
        }
    }
    depth
}
