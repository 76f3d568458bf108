//! Projection UTM (Universal Transverse Mercator)
//!
//! Séries de Krüger à l'ordre 6 (Karney 2011) : précision sub-millimétrique
//! dans tout le fuseau, aller et retour.
//!
//! Fuseaux utilisés:
//! - SIRGAS 2000 / UTM 18S à 25S (EPSG:31978 à 31985) - Brésil
//! - WGS 84 / UTM nord et sud (EPSG:326xx, 327xx)

use super::ellipsoid::Ellipsoid;
use super::Geographic;

/// Facteur d'échelle au méridien central
const K0: f64 = 0.9996;
/// False easting
const FALSE_EASTING: f64 = 500000.0;
/// False northing de l'hémisphère sud
const FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Paramètres d'un fuseau UTM pré-calculés
#[derive(Debug, Clone, Copy)]
pub struct UtmProjection {
    /// Longitude du méridien central (radians)
    lon0: f64,
    false_northing: f64,
    /// Première excentricité
    e: f64,
    /// Rayon rectifiant multiplié par k0
    k0_a: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
}

impl UtmProjection {
    pub fn new(zone: u32, south: bool, ellipsoid: Ellipsoid) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1983433.0 * n6 / 1935360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167603.0 * n6 / 181440.0,
            49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0 + 6601661.0 * n6 / 7257600.0,
            34729.0 * n5 / 80640.0 - 3418889.0 * n6 / 1995840.0,
            212378941.0 * n6 / 319334400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1118711.0 * n6 / 3870720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0 - 830251.0 * n6 / 7257600.0,
            4583.0 * n5 / 161280.0 - 108847.0 * n6 / 3991680.0,
            20648693.0 * n6 / 638668800.0,
        ];

        Self {
            lon0: central_meridian(zone),
            false_northing: if south { FALSE_NORTHING_SOUTH } else { 0.0 },
            e: ellipsoid.e(),
            k0_a: K0 * rectifying,
            alpha,
            beta,
        }
    }

    /// Géographique -> UTM (mètres)
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let lam = geo.lon - self.lon0;
        let tau_p = conformal_tan(geo.lat.tan(), self.e);

        let xi_p = tau_p.atan2(lam.cos());
        let eta_p = (lam.sin() / tau_p.hypot(lam.cos())).asinh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (
            FALSE_EASTING + self.k0_a * eta,
            self.false_northing + self.k0_a * xi,
        )
    }

    /// UTM (mètres) -> géographique
    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let xi = (y - self.false_northing) / self.k0_a;
        let eta = (x - FALSE_EASTING) / self.k0_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let tau_p = xi_p.sin() / eta_p.sinh().hypot(xi_p.cos());
        let lam = eta_p.sinh().atan2(xi_p.cos());
        let tau = geodetic_tan(tau_p, self.e);

        Geographic::new(self.lon0 + lam, tau.atan())
    }
}

/// Longitude du méridien central d'un fuseau (radians)
fn central_meridian(zone: u32) -> f64 {
    (zone as f64 * 6.0 - 183.0).to_radians()
}

/// tan(latitude conforme) depuis tan(latitude géodésique)
fn conformal_tan(tau: f64, e: f64) -> f64 {
    let sigma = (e * (e * tau / tau.hypot(1.0)).atanh()).sinh();
    tau * sigma.hypot(1.0) - sigma * tau.hypot(1.0)
}

/// Inverse de [`conformal_tan`] par Newton
fn geodetic_tan(tau_p: f64, e: f64) -> f64 {
    let one_minus_e2 = 1.0 - e * e;
    let mut tau = tau_p;

    for _ in 0..10 {
        let tau_i = conformal_tan(tau, e);
        let delta = (tau_p - tau_i) * (1.0 + one_minus_e2 * tau * tau)
            / (one_minus_e2 * tau_i.hypot(1.0) * tau.hypot(1.0));
        tau += delta;

        if !(delta.abs() >= 1e-15 * tau.abs().max(1.0)) {
            break;
        }
    }
    tau
}
