use crate::color::Rgb;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Colour used for districts without a palette entry
pub const FALLBACK_COLOR: Rgb = Rgb::from_u32(0x8b5cf6);

/// Doctors per district, in display order
pub const DOCTOR_COUNTS: [(&str, u32); 11] = [
    ("Panjgur", 1),
    ("Nushki", 1),
    ("Ziarat", 1),
    ("Khuzdar", 1),
    ("Quetta", 14),
    ("Dera Murad Jamali", 1),
    ("Kharan", 2),
    ("Naseerabad", 2),
    ("Sibbi", 1),
    ("Chaman", 2),
    ("Kech", 1),
];

/// Approximate district centroids (lon, lat)
pub const DISTRICT_COORDINATES: [(&str, (f64, f64)); 11] = [
    ("Quetta", (66.975, 30.183)),
    ("Panjgur", (64.095, 26.97)),
    ("Nushki", (66.022, 29.552)),
    ("Ziarat", (67.726, 30.382)),
    ("Khuzdar", (66.611, 27.8118)),
    ("Dera Murad Jamali", (68.225, 28.55)),
    ("Kharan", (65.415, 28.584)),
    ("Naseerabad", (67.916, 28.277)),
    ("Sibbi", (67.878, 29.543)),
    ("Chaman", (66.452, 30.923)),
    ("Kech", (63.05, 26.2)),
];

pub const DISTRICT_COLORS: [(&str, Rgb); 11] = [
    ("Panjgur", Rgb::from_u32(0xe57373)),
    ("Nushki", Rgb::from_u32(0xba68c8)),
    ("Ziarat", Rgb::from_u32(0x64b5f6)),
    ("Khuzdar", Rgb::from_u32(0xffd54f)),
    ("Quetta", Rgb::from_u32(0x81c784)),
    ("Dera Murad Jamali", Rgb::from_u32(0x4dd0e1)),
    ("Kharan", Rgb::from_u32(0xf06292)),
    ("Naseerabad", Rgb::from_u32(0x9575cd)),
    ("Sibbi", Rgb::from_u32(0xffb74d)),
    ("Chaman", Rgb::from_u32(0xaed581)),
    ("Kech", Rgb::from_u32(0x4fc3f7)),
];

/// One row of the district table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistrictRecord {
    pub name: String,
    pub doctors: u32,
    /// (lon, lat); districts without one get no marker
    #[serde(default)]
    pub coordinate: Option<(f64, f64)>,
    #[serde(default)]
    pub color: Option<Rgb>,
}

impl DistrictRecord {
    pub fn new(name: &str, doctors: u32) -> Self {
        Self {
            name: name.to_string(),
            doctors,
            coordinate: None,
            color: None,
        }
    }

    pub fn at(mut self, lon: f64, lat: f64) -> Self {
        self.coordinate = Some((lon, lat));
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Palette colour, or the fallback when none was assigned
    pub fn color_or_fallback(&self) -> Rgb {
        self.color.unwrap_or(FALLBACK_COLOR)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("district table is empty")]
    Empty,
    #[error("district {0:?} appears more than once")]
    DuplicateDistrict(String),
}

/// Immutable district table, unique by name
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictTable {
    records: Vec<DistrictRecord>,
    max_doctors: u32,
}

impl DistrictTable {
    pub fn new(records: Vec<DistrictRecord>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(TableError::DuplicateDistrict(record.name.clone()));
            }
        }
        let max_doctors = records
            .iter()
            .map(|r| r.doctors)
            .max()
            .ok_or(TableError::Empty)?;

        Ok(Self {
            records,
            max_doctors,
        })
    }

    /// The built-in Balochistan table, joining counts with coordinates and colours by name
    pub fn builtin() -> Self {
        let records: Vec<DistrictRecord> = DOCTOR_COUNTS
            .iter()
            .map(|&(name, doctors)| DistrictRecord {
                name: name.to_string(),
                doctors,
                coordinate: lookup(&DISTRICT_COORDINATES, name),
                color: lookup(&DISTRICT_COLORS, name),
            })
            .collect();
        let max_doctors = records.iter().map(|r| r.doctors).max().unwrap_or(0);

        Self {
            records,
            max_doctors,
        }
    }

    pub fn records(&self) -> &[DistrictRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&DistrictRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_doctors(&self) -> u32 {
        self.max_doctors
    }

    pub fn total_doctors(&self) -> u64 {
        self.records.iter().map(|r| r.doctors as u64).sum()
    }
}

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_totals() {
        let table = DistrictTable::builtin();
        assert_eq!(table.len(), 11);
        assert_eq!(table.total_doctors(), 27);
        assert_eq!(table.max_doctors(), 14);
        assert_eq!(table.get("Quetta").map(|r| r.doctors), Some(14));
    }

    #[test]
    fn test_builtin_joins_every_district() {
        let table = DistrictTable::builtin();
        for record in table.records() {
            assert!(record.coordinate.is_some(), "{} has no coordinate", record.name);
            assert!(record.color.is_some(), "{} has no colour", record.name);
        }
        assert_eq!(table.records()[0].name, "Panjgur");
        assert_eq!(table.get("Kech").and_then(|r| r.coordinate), Some((63.05, 26.2)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = DistrictTable::new(vec![
            DistrictRecord::new("Quetta", 1),
            DistrictRecord::new("Quetta", 2),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateDistrict("Quetta".into()));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(DistrictTable::new(Vec::new()).unwrap_err(), TableError::Empty);
    }

    #[test]
    fn test_fallback_color() {
        let record = DistrictRecord::new("Awaran", 3);
        assert_eq!(record.color_or_fallback(), FALLBACK_COLOR);
        let record = record.with_color(Rgb(1, 2, 3));
        assert_eq!(record.color_or_fallback(), Rgb(1, 2, 3));
    }
}
