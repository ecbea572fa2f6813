// ctl-core/src/units.rs

use uom::si::f64::{Angle as UomAngle, Ratio as UomRatio};

pub type Angle = UomAngle;
pub type Ratio = UomRatio;

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn rad2deg(v: f64) -> f64 {
    use uom::si::angle::degree;
    rad(v).get::<degree>()
}

#[inline]
pub fn deg2rad(v: f64) -> f64 {
    use uom::si::angle::radian;
    deg(v).get::<radian>()
}

/// Magnitude to decibels.
#[inline]
pub fn mag2db(mag: f64) -> f64 {
    20.0 * mag.log10()
}

/// Decibels to magnitude.
#[inline]
pub fn db2mag(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}
