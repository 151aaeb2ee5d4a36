//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Inclusive day range measured in days after sowing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DasRange {
    pub start: u32,
    pub end: u32,
}

impl DasRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, das: u32) -> bool {
        das >= self.start && das <= self.end
    }

    /// Number of days covered, both ends included; zero when inverted
    pub fn len(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Districts with known coordinates, (name, latitude, longitude) in
/// ten-thousandths of a degree.
const DISTRICTS: &[(&str, i64, i64)] = &[
    // Punjab
    ("Lahore", 315204, 743587),
    ("Multan", 301978, 714711),
    ("Faisalabad", 314181, 730789),
    ("Gujranwala", 321877, 741945),
    ("Rawalpindi", 336007, 730679),
    // Sindh
    ("Karachi", 248607, 670011),
    ("Hyderabad", 253969, 683578),
    ("Sukkur", 277052, 688574),
    ("Larkana", 275604, 682267),
    // Khyber Pakhtunkhwa
    ("Peshawar", 339920, 714800),
    ("Mardan", 341983, 720450),
    ("Abbottabad", 341688, 732215),
    ("Swat", 347795, 723624),
    // Balochistan
    ("Quetta", 301798, 669750),
    ("Gwadar", 251214, 623254),
    ("Turbat", 260026, 630500),
    ("Khuzdar", 277384, 666434),
];

/// Look up the coordinates of a district (case-insensitive)
pub fn district_coordinates(district: &str) -> Option<GpsCoordinates> {
    let key = district.trim();
    DISTRICTS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, lat, lon)| GpsCoordinates::new(Decimal::new(*lat, 4), Decimal::new(*lon, 4)))
}

/// Names of all supported districts
pub fn supported_districts() -> Vec<&'static str> {
    DISTRICTS.iter().map(|(name, _, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_lookup_is_case_insensitive() {
        let coords = district_coordinates(" faisalabad ").unwrap();
        assert_eq!(coords.latitude, Decimal::new(314181, 4));
        assert_eq!(coords.longitude, Decimal::new(730789, 4));
        assert!(district_coordinates("Atlantis").is_none());
    }

    #[test]
    fn test_das_range() {
        let range = DasRange::new(15, 35);
        assert!(range.contains(15));
        assert!(range.contains(35));
        assert!(!range.contains(36));
        assert_eq!(range.len(), 21);
        assert!(!range.is_empty());

        assert_eq!(DasRange::new(7, 7).len(), 1);
        let inverted = DasRange::new(10, 9);
        assert!(inverted.is_empty());
        assert_eq!(inverted.len(), 0);
    }

    #[test]
    fn test_supported_districts_resolve() {
        let districts = supported_districts();
        assert_eq!(districts.len(), DISTRICTS.len());
        assert!(districts.iter().all(|d| district_coordinates(d).is_some()));
    }
}
