// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gnomonic (tangent-plane) sky-to-detector coordinate conversion.

const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Converts RA/Dec to CCD pixel coordinates for a fixed plate scale and
/// reference pixel, re-centred on a pointing that can be updated cheaply
/// (one call per attitude sample) without reconstructing the whole thing.
#[derive(Clone, Copy, Debug)]
pub struct CoordConv {
    x_platescale: f64,
    y_platescale: f64,
    x_ref: f64,
    y_ref: f64,
    rad2xpix: f64,
    rad2ypix: f64,

    ra0: f64,
    sindec0: f64,
    cosdec0: f64,
    rsin: f64,
    rcos: f64,
}

impl CoordConv {
    pub fn new(x_platescale: f64, y_platescale: f64, x_ref: f64, y_ref: f64) -> Self {
        Self {
            x_platescale,
            y_platescale,
            x_ref,
            y_ref,
            rad2xpix: 1.0 / (x_platescale * (DEG2RAD / 3600.0)),
            rad2ypix: 1.0 / (y_platescale * (DEG2RAD / 3600.0)),
            ra0: 0.0,
            sindec0: 0.0,
            cosdec0: 0.0,
            rsin: 0.0,
            rcos: 0.0,
        }
    }

    /// Re-centre the tangent plane on a new pointing (RA/Dec/roll, all
    /// degrees). Cheap: called once per attitude sample processed.
    pub fn update_pointing(&mut self, ra0: f64, dec0: f64, roll0: f64) {
        self.ra0 = ra0;
        self.sindec0 = (dec0 * DEG2RAD).sin();
        self.cosdec0 = (dec0 * DEG2RAD).cos();
        let rtheta = (roll0 - 90.0) * DEG2RAD;
        self.rsin = rtheta.sin();
        self.rcos = rtheta.cos();
    }

    /// Project a sky position (RA/Dec, degrees) onto CCD pixel coordinates
    /// for the current pointing.
    pub fn radec2ccd(&self, ra: f64, dec: f64) -> (f64, f64) {
        let diffra = (ra - self.ra0) * DEG2RAD;
        let dsinra = diffra.sin();
        let dcosra = diffra.cos();
        let sindec = (dec * DEG2RAD).sin();
        let cosdec = (dec * DEG2RAD).cos();

        let d1s = dsinra * cosdec;
        let dh = -cosdec * dcosra;
        let d1c = self.sindec0 * sindec - dh * self.cosdec0;
        let dx = d1s.atan2(d1c);

        let d2s = dh * self.sindec0 + self.cosdec0 * sindec;
        let d2c = (1.0 - d2s * d2s).sqrt();
        let dy = -d2s.atan2(d2c);

        let rx = dx * self.rcos - dy * self.rsin;
        let ry = dx * self.rsin + dy * self.rcos;

        let ccdx = rx * self.rad2xpix + self.x_ref;
        let ccdy = ry * self.rad2ypix + self.y_ref;
        (ccdx, ccdy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pointing_centre_maps_to_reference_pixel() {
        let mut cc = CoordConv::new(9.6, 9.6, 192.0, 192.0);
        cc.update_pointing(123.4, -45.6, 0.0);
        let (x, y) = cc.radec2ccd(123.4, -45.6);
        assert_abs_diff_eq!(x, 192.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 192.0, epsilon = 1e-6);
    }

    #[test]
    fn small_offset_scales_with_platescale() {
        let mut cc = CoordConv::new(9.6, 9.6, 192.0, 192.0);
        cc.update_pointing(0.0, 0.0, 90.0);
        let (x, _y) = cc.radec2ccd(1.0 / 3600.0, 0.0);
        // one platescale-arcsec step east should move roughly one pixel
        assert!((x - 192.0).abs() < 2.0);
    }
}
