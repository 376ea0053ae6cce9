//! Colour maps from fractional escape counts to RGBA.

use std::f64::consts::PI;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Iterations per full hue cycle of the linear rainbow.
const LINEAR_RAINBOW_WRAP: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colourer {
    LinearRainbow,
    LogRainbow,
    Mandy,
    White,
}

impl Colourer {
    pub const ALL: [Self; 4] = [Self::LinearRainbow, Self::LogRainbow, Self::Mandy, Self::White];

    pub fn name(self) -> &'static str {
        match self {
            Self::LinearRainbow => "linear-rainbow",
            Self::LogRainbow => "log-rainbow",
            Self::Mandy => "mandy",
            Self::White => "white",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::LinearRainbow => "A continuous cycle around the HSV cone",
            Self::LogRainbow => "Hue cycles with the logarithm of the escape count",
            Self::Mandy => "The colouring algorithm from mandy by rjk",
            Self::White => "Test colourer that always outputs white pixels",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Colour for a fractional escape count; `None` means the point is
    /// inside the set.
    pub fn colour(self, escape: Option<f64>) -> [u8; 4] {
        match (self, escape) {
            (Self::White, _) => WHITE,
            (_, None) => BLACK,
            (Self::LinearRainbow, Some(iters)) => {
                let tau = (iters / LINEAR_RAINBOW_WRAP).fract();
                hsv_to_rgba((0.5 + tau) * 360.0, 1.0, 1.0)
            }
            (Self::LogRainbow, Some(iters)) => {
                hsv_to_rgba(60.0 * (iters.max(1e-9).ln() + 0.5), 1.0, 1.0)
            }
            (Self::Mandy, Some(iters)) => {
                let c = 2.0 * PI * iters.sqrt();
                [
                    (((c / 5.0).cos() + 1.0) * 127.0) as u8,
                    (((c / 7.0).cos() + 1.0) * 127.0) as u8,
                    (((c / 11.0).cos() + 1.0) * 127.0) as u8,
                    255,
                ]
            }
        }
    }
}

/// HSV to opaque RGBA. `hue` is in degrees and wraps.
fn hsv_to_rgba(hue: f64, saturation: f64, value: f64) -> [u8; 4] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for c in Colourer::ALL {
            assert_eq!(Colourer::from_name(c.name()), Some(c));
        }
        assert_eq!(Colourer::from_name("sepia"), None);
    }

    #[test]
    fn interior_is_black_except_white() {
        for c in [Colourer::LinearRainbow, Colourer::LogRainbow, Colourer::Mandy] {
            assert_eq!(c.colour(None), BLACK);
        }
        assert_eq!(Colourer::White.colour(None), WHITE);
        assert_eq!(Colourer::White.colour(Some(3.0)), WHITE);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgba(0.0, 1.0, 1.0), [255, 0, 0, 255]);
        assert_eq!(hsv_to_rgba(120.0, 1.0, 1.0), [0, 255, 0, 255]);
        assert_eq!(hsv_to_rgba(240.0, 1.0, 1.0), [0, 0, 255, 255]);
        assert_eq!(hsv_to_rgba(360.0, 1.0, 1.0), [255, 0, 0, 255]);
        assert_eq!(hsv_to_rgba(-120.0, 1.0, 1.0), [0, 0, 255, 255]);
    }

    #[test]
    fn linear_rainbow_cycles() {
        let a = Colourer::LinearRainbow.colour(Some(1.0));
        let b = Colourer::LinearRainbow.colour(Some(1.0 + LINEAR_RAINBOW_WRAP));
        assert_eq!(a, b);
        assert_ne!(a, Colourer::LinearRainbow.colour(Some(9.0)));
    }
}
