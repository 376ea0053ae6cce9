//! The fractal algorithms the loopback engine can plot.

use brotview_core::{Complex, View};

/// Squared bailout radius. Large, so the fractional escape count is smooth.
const ESCAPE_RADIUS_SQ: f64 = 256.0 * 256.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// z := z² + c
    Original,
    /// z := z³ + c
    Mandel3,
    /// z := z² + c, with c taken as 1/z₀
    Mandeldrop,
    /// z := z³ + c, with c taken as 1/z₀
    Mandeldrop3,
}

impl Algorithm {
    pub const ALL: [Self; 4] = [
        Self::Original,
        Self::Mandel3,
        Self::Mandeldrop,
        Self::Mandeldrop3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Mandel3 => "mandel3",
            Self::Mandeldrop => "mandeldrop",
            Self::Mandeldrop3 => "mandeldrop3",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Original => "The original Mandelbrot set, z := z^2+c",
            Self::Mandel3 => "Mandelbrot^3, z := z^3+c",
            Self::Mandeldrop => "Mandeldrop (inverted set), z := z^2+c using 1/z0",
            Self::Mandeldrop3 => "Mandeldrop (inverted set), z := z^3+c using 1/z0",
        }
    }

    /// Look up an algorithm by name. Accepts the short aliases too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "original" | "m" | "m2" => Some(Self::Original),
            "mandel3" | "m3" => Some(Self::Mandel3),
            "mandeldrop" | "drop" => Some(Self::Mandeldrop),
            "mandeldrop3" | "drop3" => Some(Self::Mandeldrop3),
            _ => None,
        }
    }

    /// The whole plot for this algorithm: the engine's metadata reply.
    pub fn default_view(self) -> View {
        let (centre, axes) = match self {
            Self::Original | Self::Mandel3 => (Complex::new(-1.0, 0.0), Complex::new(4.0, 4.0)),
            Self::Mandeldrop => (Complex::new(1.25, 0.0), Complex::new(8.0, 8.0)),
            Self::Mandeldrop3 => (Complex::new(0.0, 0.0), Complex::new(6.0, 6.0)),
        };
        View {
            origin: centre - axes * 0.5,
            axes,
        }
    }

    fn cubic(self) -> bool {
        matches!(self, Self::Mandel3 | Self::Mandeldrop3)
    }

    /// Fractional escape count for `point`, or `None` if it did not escape
    /// within `max_iter` iterations.
    pub fn escape_count(self, point: Complex, max_iter: u32) -> Option<f64> {
        let c = match self {
            Self::Original => {
                if in_cardioid(point.re, point.im) || in_period2_bulb(point.re, point.im) {
                    return None;
                }
                point
            }
            Self::Mandel3 => point,
            Self::Mandeldrop | Self::Mandeldrop3 => invert(point)?,
        };

        let cubic = self.cubic();
        let mut z = c;
        for n in 0..max_iter {
            z = if cubic {
                let (re2, im2) = (z.re * z.re, z.im * z.im);
                Complex::new(z.re * re2 - 3.0 * z.re * im2 + c.re, 3.0 * z.im * re2 - z.im * im2 + c.im)
            } else {
                Complex::new(z.re * z.re - z.im * z.im + c.re, 2.0 * z.re * z.im + c.im)
            };
            let norm_sq = z.re * z.re + z.im * z.im;
            if norm_sq > ESCAPE_RADIUS_SQ {
                let degree: f64 = if cubic { 3.0 } else { 2.0 };
                let smooth = n as f64 + 1.0 - (0.5 * norm_sq.ln()).ln() / degree.ln();
                return Some(smooth.max(0.0));
            }
        }
        None
    }
}

/// 1/z, or `None` at the origin.
fn invert(z: Complex) -> Option<Complex> {
    let norm_sq = z.re * z.re + z.im * z.im;
    if norm_sq == 0.0 {
        return None;
    }
    Some(Complex::new(z.re / norm_sq, -z.im / norm_sq))
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}
