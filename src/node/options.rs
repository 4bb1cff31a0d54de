use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resolution class of the generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::OneK, ImageSize::TwoK, ImageSize::FourK];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown image size '{s}' (expected 1K, 2K or 4K)"))
    }
}

/// Output aspect ratio. `Auto` leaves the choice to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    Auto,
    Ratio(u8, u8),
}

impl AspectRatio {
    pub const SUPPORTED: [(u8, u8); 10] = [
        (1, 1),
        (2, 3),
        (3, 2),
        (3, 4),
        (4, 3),
        (4, 5),
        (5, 4),
        (9, 16),
        (16, 9),
        (21, 9),
    ];

    /// Every accepted value, `AUTO` first.
    pub fn choices() -> Vec<String> {
        std::iter::once(AspectRatio::Auto)
            .chain(Self::SUPPORTED.iter().map(|&(w, h)| AspectRatio::Ratio(w, h)))
            .map(|r| r.to_string())
            .collect()
    }

    /// The value sent to the API, or `None` for `Auto`.
    pub fn api_value(&self) -> Option<String> {
        match self {
            AspectRatio::Auto => None,
            ratio => Some(ratio.to_string()),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Auto => f.write_str("AUTO"),
            AspectRatio::Ratio(w, h) => write!(f, "{w}:{h}"),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(AspectRatio::Auto);
        }
        let parsed = s
            .split_once(':')
            .and_then(|(w, h)| Some((w.trim().parse::<u8>().ok()?, h.trim().parse::<u8>().ok()?)));
        match parsed {
            Some(pair) if Self::SUPPORTED.contains(&pair) => Ok(AspectRatio::Ratio(pair.0, pair.1)),
            _ => Err(format!("unsupported aspect ratio '{s}'")),
        }
    }
}

impl Serialize for AspectRatio {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size_parses_case_insensitively() {
        assert_eq!("2k".parse::<ImageSize>().unwrap(), ImageSize::TwoK);
        assert_eq!("4K".parse::<ImageSize>().unwrap(), ImageSize::FourK);
        assert!("8K".parse::<ImageSize>().is_err());
        assert_eq!(ImageSize::default().to_string(), "1K");
    }

    #[test]
    fn aspect_ratio_accepts_only_supported_pairs() {
        assert_eq!("AUTO".parse::<AspectRatio>().unwrap(), AspectRatio::Auto);
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Ratio(16, 9));
        assert!("7:3".parse::<AspectRatio>().is_err());
        assert!("wide".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn auto_has_no_api_value() {
        assert_eq!(AspectRatio::Auto.api_value(), None);
        assert_eq!(AspectRatio::Ratio(21, 9).api_value().as_deref(), Some("21:9"));
    }

    #[test]
    fn choices_list_auto_first() {
        let choices = AspectRatio::choices();
        assert_eq!(choices.len(), 11);
        assert_eq!(choices[0], "AUTO");
        assert_eq!(choices[10], "21:9");
    }

    #[test]
    fn serde_uses_display_strings() {
        let json = serde_json::to_string(&(ImageSize::TwoK, AspectRatio::Ratio(3, 4))).unwrap();
        assert_eq!(json, r#"["2K","3:4"]"#);
        let back: (ImageSize, AspectRatio) = serde_json::from_str(&json).unwrap();
        assert_eq!(back, (ImageSize::TwoK, AspectRatio::Ratio(3, 4)));
    }
}
