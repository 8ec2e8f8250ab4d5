use geojson::{Feature, GeoJson, Value};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use thiserror::Error;
use tracing::{debug, info};

/// A geographic ring (sequence of lon/lat coordinates)
pub type Ring = Vec<(f64, f64)>;

/// Property keys tried, in order, for a feature's district name
const NAME_KEYS: [&str; 6] = ["name", "NAME", "district", "DISTRICT", "NAME_3", "ADM2_EN"];

/// One polygon: exterior ring followed by holes
pub type PolygonRings = Vec<Ring>;

/// A district boundary from the overlay file
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: Option<String>,
    pub polygons: Vec<PolygonRings>,
}

/// Parsed boundary overlay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryData {
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryData {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Every ring of every polygon, for outline drawing
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.features.iter().flat_map(|f| f.polygons.iter().flatten())
    }

    pub fn polygons(&self) -> impl Iterator<Item = &PolygonRings> {
        self.features.iter().flat_map(|f| f.polygons.iter())
    }

    /// Boundary feature whose name matches `district` (case-insensitive)
    pub fn find(&self, district: &str) -> Option<&BoundaryFeature> {
        self.features.iter().find(|f| {
            f.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(district))
        })
    }
}

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("failed to read boundary file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("boundary file is not valid GeoJSON")]
    Parse(#[from] simd_json::Error),
    #[error("boundary GeoJSON must be a FeatureCollection")]
    NotFeatureCollection,
}

/// Read and parse a boundary GeoJSON file
pub fn load_boundary(path: &Path) -> Result<BoundaryData, BoundaryError> {
    let mut bytes = fs::read(path).map_err(|source| BoundaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_boundary(&mut bytes)?;
    info!(path = %path.display(), features = data.features.len(), "loaded district boundaries");
    Ok(data)
}

/// Parse boundary GeoJSON; the buffer is used as simd-json scratch space
pub fn parse_boundary(bytes: &mut [u8]) -> Result<BoundaryData, BoundaryError> {
    let geojson: GeoJson = simd_json::serde::from_slice(bytes)?;

    let GeoJson::FeatureCollection(fc) = geojson else {
        return Err(BoundaryError::NotFeatureCollection);
    };

    let features: Vec<BoundaryFeature> = fc
        .features
        .into_par_iter()
        .filter_map(boundary_feature)
        .collect();

    Ok(BoundaryData { features })
}

/// Start loading in the background; the receiver yields exactly one result
pub fn spawn_boundary_load(path: PathBuf) -> Receiver<Result<BoundaryData, BoundaryError>> {
    let (tx, rx) = mpsc::channel();
    rayon::spawn(move || {
        let result = load_boundary(&path);
        // Receiver is gone if the map was unmounted meanwhile
        if tx.send(result).is_err() {
            debug!("boundary load finished after unmount, result dropped");
        }
    });
    rx
}

fn boundary_feature(feature: Feature) -> Option<BoundaryFeature> {
    let name = feature.properties.as_ref().and_then(|props| {
        NAME_KEYS
            .iter()
            .find_map(|key| props.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
    });

    let mut polygons = Vec::new();
    collect_polygons(&feature.geometry?.value, &mut polygons);
    if polygons.is_empty() {
        return None;
    }
    Some(BoundaryFeature { name, polygons })
}

fn collect_polygons(value: &Value, out: &mut Vec<PolygonRings>) {
    let to_ring = |coords: &Vec<Vec<f64>>| -> Ring {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match value {
        Value::Polygon(rings) => out.push(rings.iter().map(to_ring).collect()),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(to_ring).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(&g.value, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NAME_3": "Quetta" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[66.5, 29.8], [67.4, 29.8], [67.4, 30.6], [66.5, 30.6], [66.5, 29.8]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[62.0, 25.5], [64.0, 25.5], [64.0, 27.0], [62.0, 25.5]]],
                        [[[64.5, 26.0], [65.0, 26.0], [65.0, 26.5], [64.5, 26.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Gwadar port" },
                "geometry": { "type": "Point", "coordinates": [62.3, 25.1] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let mut bytes = SAMPLE.as_bytes().to_vec();
        let data = parse_boundary(&mut bytes).unwrap();

        // Point feature carries no polygon and is dropped
        assert_eq!(data.features.len(), 2);
        assert_eq!(data.polygons().count(), 3);
        assert_eq!(data.rings().count(), 3);
        assert_eq!(data.find("quetta").map(|f| f.polygons.len()), Some(1));
        assert!(data.find("Kech").is_none());
    }

    #[test]
    fn test_rejects_bare_geometry() {
        let mut bytes = br#"{"type":"Point","coordinates":[1.0,2.0]}"#.to_vec();
        assert!(matches!(
            parse_boundary(&mut bytes),
            Err(BoundaryError::NotFeatureCollection)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        let mut bytes = b"<html>not found</html>".to_vec();
        assert!(matches!(parse_boundary(&mut bytes), Err(BoundaryError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_boundary(&dir.path().join("Balochistan.geojson")).unwrap_err();
        assert!(matches!(err, BoundaryError::Io { .. }));
    }

    #[test]
    fn test_background_load_delivers_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let rx = spawn_boundary_load(file.path().to_path_buf());
        let data = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(data.features.len(), 2);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
