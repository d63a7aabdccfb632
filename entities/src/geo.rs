use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoordinatesError {
    #[error("latitude {0} must be between -90 and 90")]
    Latitude(f64),
    #[error("longitude {0} must be between -180 and 180")]
    Longitude(f64),
}

/// A WGS84 point. Always within the valid latitude/longitude ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Axis aligned box in degrees. Antimeridian crossing is not handled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn around<'a, I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Coordinates>,
    {
        points.into_iter().fold(None, |bounds, point| {
            let (lat, lng) = (point.latitude(), point.longitude());
            Some(match bounds {
                None => Bounds {
                    north: lat,
                    south: lat,
                    east: lng,
                    west: lng,
                },
                Some(b) => Bounds {
                    north: b.north.max(lat),
                    south: b.south.min(lat),
                    east: b.east.max(lng),
                    west: b.west.min(lng),
                },
            })
        })
    }

    pub fn latitude_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn longitude_span(&self) -> f64 {
        self.east - self.west
    }

    /// Grows every side by `ratio` of the span on that axis.
    pub fn padded(&self, ratio: f64) -> Bounds {
        let lat_padding = self.latitude_span() * ratio;
        let lng_padding = self.longitude_span() * ratio;
        Bounds {
            north: self.north + lat_padding,
            south: self.south - lat_padding,
            east: self.east + lng_padding,
            west: self.west - lng_padding,
        }
    }

    /// Widens any axis narrower than `min_span` degrees around its middle, so a
    /// single point still produces a usable box.
    pub fn with_min_span(&self, min_span: f64) -> Bounds {
        let mut bounds = *self;
        if bounds.latitude_span() < min_span {
            let middle = (bounds.north + bounds.south) / 2.0;
            bounds.north = middle + min_span / 2.0;
            bounds.south = middle - min_span / 2.0;
        }
        if bounds.longitude_span() < min_span {
            let middle = (bounds.east + bounds.west) / 2.0;
            bounds.east = middle + min_span / 2.0;
            bounds.west = middle - min_span / 2.0;
        }
        bounds
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.latitude())
            && (self.west..=self.east).contains(&point.longitude())
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}
