use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{value} is not a known {kind}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Adds `ALL`, `name()` and a case insensitive `FromStr` to a fieldless enum.
macro_rules! named_options {
    ($TypeName: ident, $kind: literal, { $($Variant: ident => $name: literal),+ $(,)? }) => {
        impl $TypeName {
            pub const ALL: &'static [$TypeName] = &[$($TypeName::$Variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $($TypeName::$Variant => $name),+
                }
            }
        }

        impl FromStr for $TypeName {
            type Err = UnknownOption;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_lowercase();
                $TypeName::ALL
                    .iter()
                    .copied()
                    .find(|option| option.name() == normalized)
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: value.to_owned(),
                    })
            }
        }
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

named_options!(ExportFormat, "format", { Png => "png", Jpeg => "jpg" });

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        self.name()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportQuality {
    Standard,
    #[default]
    High,
    Ultra,
}

named_options!(ExportQuality, "quality", { Standard => "standard", High => "high", Ultra => "ultra" });

impl ExportQuality {
    pub fn dpi(&self) -> u32 {
        match self {
            ExportQuality::Standard => 72,
            ExportQuality::High => 150,
            ExportQuality::Ultra => 300,
        }
    }

    /// Device pixels per layout pixel.
    pub fn scale(&self) -> f64 {
        f64::from(self.dpi()) / 72.0
    }

    pub fn jpeg_quality(&self) -> u8 {
        match self {
            ExportQuality::Standard => 80,
            ExportQuality::High => 90,
            ExportQuality::Ultra => 100,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportSize {
    #[default]
    Social,
    Story,
    Post,
    Custom,
}

named_options!(ExportSize, "size", { Social => "social", Story => "story", Post => "post", Custom => "custom" });

impl ExportSize {
    /// Layout size before quality scaling.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ExportSize::Social => (1200, 630),
            ExportSize::Story => (1080, 1920),
            ExportSize::Post => (1080, 1080),
            ExportSize::Custom => (1920, 1080),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportStyle {
    #[default]
    Light,
    Dark,
    Satellite,
    Outdoors,
}

named_options!(ExportStyle, "style", { Light => "light", Dark => "dark", Satellite => "satellite", Outdoors => "outdoors" });

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportTheme {
    #[default]
    Modern,
    Vintage,
    /// No journey line.
    Minimal,
}

named_options!(ExportTheme, "theme", { Modern => "modern", Vintage => "vintage", Minimal => "minimal" });

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub quality: ExportQuality,
    pub size: ExportSize,
    pub style: ExportStyle,
    pub theme: ExportTheme,
    pub show_stats: bool,
    pub show_title: bool,
    /// Short place names under the markers. The minimal theme never shows them.
    pub show_labels: bool,
    pub show_watermark: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            quality: ExportQuality::default(),
            size: ExportSize::default(),
            style: ExportStyle::default(),
            theme: ExportTheme::default(),
            show_stats: true,
            show_title: true,
            show_labels: true,
            show_watermark: true,
        }
    }
}

impl ExportOptions {
    /// Final image size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let (width, height) = self.size.dimensions();
        let scale = self.quality.scale();
        (
            (f64::from(width) * scale).round() as u32,
            (f64::from(height) * scale).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportFormat, ExportOptions, ExportQuality, ExportSize, UnknownOption};
    use rstest::rstest;

    #[rstest]
    #[case(ExportSize::Social, ExportQuality::Standard, (1200, 630))]
    #[case(ExportSize::Post, ExportQuality::High, (2250, 2250))]
    #[case(ExportSize::Story, ExportQuality::Ultra, (4500, 8000))]
    fn test_pixel_size_scales_with_dpi(
        #[case] size: ExportSize,
        #[case] quality: ExportQuality,
        #[case] expected: (u32, u32),
    ) {
        let options = ExportOptions {
            size,
            quality,
            ..ExportOptions::default()
        };
        assert_eq!(options.pixel_size(), expected);
    }

    #[test]
    fn test_options_parse_by_name() {
        assert_eq!(" JPG ".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert_eq!(
            "tiff".parse::<ExportFormat>(),
            Err(UnknownOption {
                kind: "format",
                value: "tiff".to_string()
            })
        );
        assert_eq!("ultra".parse::<ExportQuality>(), Ok(ExportQuality::Ultra));
    }
}
