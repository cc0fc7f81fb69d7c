use serde::{Deserialize, Serialize};

/// WGS84 ellipsoid constants
const WGS84_SEMI_MAJOR_AXIS: f64 = 6378137.0;
const WGS84_FLATTENING: f64 = 1.0 / 298.257223563;

/// Represents a geodetic position: longitude/latitude in degrees plus a
/// height in meters above the ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    /// Creates a new Cartographic position
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    /// Creates a Cartographic position on the ellipsoid surface
    pub fn from_degrees(longitude: f64, latitude: f64) -> Self {
        Self::new(longitude, latitude, 0.0)
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Converts to earth-centered, earth-fixed cartesian coordinates
    pub fn to_cartesian(&self) -> Cartesian3 {
        Cartesian3::from_degrees(self.longitude, self.latitude, self.height)
    }
}

impl Default for Cartographic {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// An earth-centered, earth-fixed cartesian point in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a Cartesian3 from geodetic degrees and a height in meters,
    /// using the WGS84 ellipsoid
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        let lon = longitude.to_radians();
        let lat = latitude.to_radians();
        let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
        let n = WGS84_SEMI_MAJOR_AXIS / (1.0 - e2 * lat.sin().powi(2)).sqrt();

        Self {
            x: (n + height) * lat.cos() * lon.cos(),
            y: (n + height) * lat.cos() * lon.sin(),
            z: (n * (1.0 - e2) + height) * lat.sin(),
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(&self, other: &Cartesian3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Default for Cartesian3 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
