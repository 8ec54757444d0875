use crate::foundation::error::{TexError, TexResult};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Largest edge length accepted anywhere a pixel buffer gets allocated.
pub const MAX_DIM: u32 = 16_384;

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// `#rrggbb`, the form every emitted paint attribute uses.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Square output edge length in pixels. Every operator works in a `0..res` user space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Resolution(u32);

impl Resolution {
    pub fn new(px: u32) -> TexResult<Self> {
        if px == 0 {
            return Err(TexError::validation("resolution must be > 0"));
        }
        if px > MAX_DIM {
            return Err(TexError::validation(format!(
                "resolution {px} exceeds maximum {MAX_DIM}"
            )));
        }
        Ok(Self(px))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn center(self) -> Point {
        let c = self.as_f64() / 2.0;
        Point::new(c, c)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(512)
    }
}

impl TryFrom<u32> for Resolution {
    type Error = TexError;

    fn try_from(px: u32) -> TexResult<Self> {
        Self::new(px)
    }
}

impl From<Resolution> for u32 {
    fn from(r: Resolution) -> u32 {
        r.0
    }
}

/// Square export sizes offered by the editor. The compiler itself accepts any [`Resolution`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportResolution {
    Px512,
    Px1024,
    Px2048,
    Px4096,
}

impl ExportResolution {
    pub const ALL: [ExportResolution; 4] = [
        ExportResolution::Px512,
        ExportResolution::Px1024,
        ExportResolution::Px2048,
        ExportResolution::Px4096,
    ];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Px512 => 512,
            Self::Px1024 => 1024,
            Self::Px2048 => 2048,
            Self::Px4096 => 4096,
        }
    }

    pub fn resolution(self) -> Resolution {
        Resolution(self.pixels())
    }
}

impl TryFrom<u32> for ExportResolution {
    type Error = TexError;

    fn try_from(px: u32) -> TexResult<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.pixels() == px)
            .ok_or_else(|| {
                TexError::validation(format!(
                    "unsupported export resolution {px} (expected 512, 1024, 2048 or 4096)"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_hex_is_lowercase_and_padded() {
        assert_eq!(Rgb::new(255, 0, 10).to_hex(), "#ff000a");
        assert_eq!(Rgb::gray(5).to_hex(), "#050505");
    }

    #[test]
    fn resolution_rejects_zero_and_oversize() {
        assert!(Resolution::new(0).is_err());
        assert!(Resolution::new(MAX_DIM + 1).is_err());
        assert_eq!(Resolution::new(64).unwrap().center(), Point::new(32.0, 32.0));
    }

    #[test]
    fn resolution_serde_validates() {
        let r: Resolution = serde_json::from_str("1024").unwrap();
        assert_eq!(r.get(), 1024);
        assert!(serde_json::from_str::<Resolution>("0").is_err());
    }

    #[test]
    fn export_resolutions_are_the_four_square_sizes() {
        let px: Vec<u32> = ExportResolution::ALL.iter().map(|r| r.pixels()).collect();
        assert_eq!(px, vec![512, 1024, 2048, 4096]);
        assert_eq!(
            ExportResolution::try_from(2048).unwrap(),
            ExportResolution::Px2048
        );
        assert!(ExportResolution::try_from(300).is_err());
    }
}
