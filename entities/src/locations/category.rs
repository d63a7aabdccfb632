use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0} is not a known category")]
pub struct UnknownCategory(pub String);

/// The fixed set of tags a location can carry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Category {
    #[default]
    General,
    Historical,
    Food,
    Nature,
    Beach,
    Urban,
    Entertainment,
    Shopping,
    Accommodation,
    Photo,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::General,
        Category::Historical,
        Category::Food,
        Category::Nature,
        Category::Beach,
        Category::Urban,
        Category::Entertainment,
        Category::Shopping,
        Category::Accommodation,
        Category::Photo,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Historical => "historical",
            Category::Food => "food",
            Category::Nature => "nature",
            Category::Beach => "beach",
            Category::Urban => "urban",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Accommodation => "accommodation",
            Category::Photo => "photo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Historical => "Historical",
            Category::Food => "Food & Dining",
            Category::Nature => "Nature",
            Category::Beach => "Beach",
            Category::Urban => "Urban",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Accommodation => "Hotels",
            Category::Photo => "Photo Spot",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::General => "📍",
            Category::Historical => "🏛️",
            Category::Food => "🍽️",
            Category::Nature => "🏞️",
            Category::Beach => "🏖️",
            Category::Urban => "🏙️",
            Category::Entertainment => "🎭",
            Category::Shopping => "🛍️",
            Category::Accommodation => "🏨",
            Category::Photo => "📸",
        }
    }

    /// Marker colour as RGB.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Category::General => [0x6b, 0x72, 0x80],
            Category::Historical => [0xf5, 0x9e, 0x0b],
            Category::Food => [0xef, 0x44, 0x44],
            Category::Nature => [0x10, 0xb9, 0x81],
            Category::Beach => [0x3b, 0x82, 0xf6],
            Category::Urban => [0x8b, 0x5c, 0xf6],
            Category::Entertainment => [0xec, 0x48, 0x99],
            Category::Shopping => [0x63, 0x66, 0xf1],
            Category::Accommodation => [0x05, 0x96, 0x69],
            Category::Photo => [0xf5, 0x9e, 0x0b],
        }
    }

    pub fn hex_color(&self) -> String {
        let [r, g, b] = self.color();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Resolves a stored tag for display. Missing or unknown tags are shown as
    /// `General`.
    pub fn from_stored(tag: Option<&str>) -> Category {
        tag.and_then(|tag| tag.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.id() == normalized)
            .ok_or_else(|| UnknownCategory(value.to_owned()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
