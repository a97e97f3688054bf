//! Transverse Mercator projection on an ellipsoid
//!
//! Krüger series carried to sixth order in the third flattening, as given by
//! Karney, "Transverse Mercator with an accuracy of a few nanometers" (2011).
//! Within a few thousand kilometers of the central meridian the series is
//! accurate to well below a millimeter, which covers UTM zones and the
//! plane-rectangular systems.

use crate::core::Ellipsoid;

const ORDER: usize = 6;

/// Result of a forward projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TmPoint {
    /// Easting relative to the central meridian (m)
    pub x: f64,
    /// Northing relative to the equator (m)
    pub y: f64,
    /// Meridian convergence (radians): bearing of grid north clockwise from
    /// true north
    pub convergence: f64,
}

/// Transverse Mercator projection with a fixed ellipsoid and scale factor
#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    eccentricity: f64,
    eccentricity_squared: f64,
    /// k0 times the rectifying radius
    scaled_radius: f64,
    alpha: [f64; ORDER],
    beta: [f64; ORDER],
}

impl TransverseMercator {
    pub fn new(ellipsoid: Ellipsoid, scale_factor: f64) -> Self {
        let n = ellipsoid.third_flattening();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying_radius = ellipsoid.semi_major_axis / (1.0 + n)
            * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        let eccentricity_squared = ellipsoid.eccentricity_squared();

        Self {
            eccentricity: eccentricity_squared.sqrt(),
            eccentricity_squared,
            scaled_radius: scale_factor * rectifying_radius,
            alpha,
            beta,
        }
    }

    /// Project latitude/longitude (degrees) about `central_meridian` (degrees)
    pub fn forward(&self, central_meridian: f64, latitude: f64, longitude: f64) -> TmPoint {
        let phi = latitude.to_radians();
        let lambda = normalize_degrees(longitude - central_meridian).to_radians();
        let e = self.eccentricity;

        // Conformal latitude, as its tangent
        let sin_phi = phi.sin();
        let tau_prime = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();

        let xi_prime = tau_prime.atan2(lambda.cos());
        let eta_prime = (lambda.sin() / (1.0 + tau_prime * tau_prime).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        let mut p = 1.0;
        let mut q = 0.0;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            let (sin, cos) = (k * xi_prime).sin_cos();
            let (sinh, cosh) = ((k * eta_prime).sinh(), (k * eta_prime).cosh());
            xi += alpha * sin * cosh;
            eta += alpha * cos * sinh;
            p += k * alpha * cos * cosh;
            q += k * alpha * sin * sinh;
        }

        let convergence = (tau_prime / (1.0 + tau_prime * tau_prime).sqrt() * lambda.tan()).atan()
            + q.atan2(p);

        TmPoint {
            x: self.scaled_radius * eta,
            y: self.scaled_radius * xi,
            convergence,
        }
    }

    /// Inverse projection, returning latitude/longitude in degrees
    pub fn reverse(&self, central_meridian: f64, x: f64, y: f64) -> (f64, f64) {
        let xi = y / self.scaled_radius;
        let eta = x / self.scaled_radius;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_prime.sinh();
        let cos_xi = xi_prime.cos();
        let tau_prime = xi_prime.sin() / (sinh_eta * sinh_eta + cos_xi * cos_xi).sqrt();
        let lambda = sinh_eta.atan2(cos_xi);

        let latitude = self.tau_from_conformal(tau_prime).atan().to_degrees();
        let longitude = normalize_degrees(central_meridian + lambda.to_degrees());
        (latitude, longitude)
    }

    /// Newton iteration recovering tan(latitude) from the conformal tangent
    fn tau_from_conformal(&self, tau_prime: f64) -> f64 {
        let e = self.eccentricity;
        let one_minus_e2 = 1.0 - self.eccentricity_squared;
        let mut tau = tau_prime;

        for _ in 0..5 {
            let tau_hypot = (1.0 + tau * tau).sqrt();
            let sigma = (e * (e * tau / tau_hypot).atanh()).sinh();
            let tau_i = tau * (1.0 + sigma * sigma).sqrt() - sigma * tau_hypot;
            let delta = (tau_prime - tau_i) / (1.0 + tau_i * tau_i).sqrt()
                * (1.0 + one_minus_e2 * tau * tau)
                / (one_minus_e2 * tau_hypot);
            tau += delta;
            if delta.abs() < 1e-15 * tau.abs().max(1.0) {
                break;
            }
        }
        tau
    }
}

/// Wrap an angle in degrees into [-180, 180)
pub(crate) fn normalize_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}
