use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SatelliteCategory {
    SpaceStation,
    EarthObservation,
    Communication,
    Cubesat,
    Weather,
    #[serde(other)]
    Other,
}

impl SatelliteCategory {
    /// 3D model the globe loads for this kind of satellite.
    pub fn model_file(&self) -> &'static str {
        match self {
            SatelliteCategory::SpaceStation => "ISS.dae",
            SatelliteCategory::Cubesat => "cubesat.dae",
            SatelliteCategory::Communication => "communicationSat.dae",
            SatelliteCategory::EarthObservation => "earthObservationSat.dae",
            SatelliteCategory::Weather | SatelliteCategory::Other => "genericSat.dae",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SatelliteEntry {
    pub norad_id: String,
    pub name: String,
    pub category: SatelliteCategory,
    /// Render scale for the 3D model.
    pub scale: f64,
}

impl SatelliteEntry {
    fn new(name: &str, norad_id: &str, category: SatelliteCategory, scale: f64) -> Self {
        Self {
            norad_id: norad_id.to_string(),
            name: name.to_string(),
            category,
            scale,
        }
    }

    pub fn model_file(&self) -> &'static str {
        self.category.model_file()
    }
}

pub const DEFAULT_SATELLITE: &str = "25544";

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<SatelliteEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        use SatelliteCategory::*;

        Self::new(vec![
            SatelliteEntry::new("ISS (ZARYA)", "25544", SpaceStation, 2e6),
            SatelliteEntry::new("LANDSAT 9", "49260", EarthObservation, 500.0),
            SatelliteEntry::new("AISSAT 2", "40075", Communication, 150_000.0),
            SatelliteEntry::new("SWISSCUBE", "35932", Cubesat, 100_000.0),
            SatelliteEntry::new("NOAA 19", "33591", Weather, 15_000.0),
            SatelliteEntry::new("NOAA 18", "28654", Weather, 15_000.0),
            SatelliteEntry::new("NOAA 15", "25338", Weather, 15_000.0),
            SatelliteEntry::new("ISS (NAUKA)", "49044", SpaceStation, 2e6),
            SatelliteEntry::new("ZHUHAI-1 02 (CAS-4B)", "42759", EarthObservation, 500.0),
            SatelliteEntry::new("ITASAT", "43786", Cubesat, 100_000.0),
            SatelliteEntry::new("NORSAT 3", "47814", Communication, 150_000.0),
            SatelliteEntry::new("NORSAT 2", "42826", Communication, 150_000.0),
            SatelliteEntry::new("CENTAURI-1", "43809", Cubesat, 100_000.0),
            SatelliteEntry::new("AISSAT 1", "36799", Communication, 150_000.0),
            SatelliteEntry::new("CENTAURI-3 (TYVAK-0210)", "47874", Cubesat, 100_000.0),
            SatelliteEntry::new("ROBUSTA 1B", "42792", Cubesat, 100_000.0),
            SatelliteEntry::new("KKS-1 (KISEKI)", "33499", Cubesat, 100_000.0),
            SatelliteEntry::new("NORSAT 1", "42825", Communication, 150_000.0),
            SatelliteEntry::new("PROXIMA I", "42925", Cubesat, 100_000.0),
            SatelliteEntry::new("PROXIMA II", "42926", Cubesat, 100_000.0),
        ])
    }
}

impl Catalog {
    pub fn new(entries: Vec<SatelliteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SatelliteEntry] {
        &self.entries
    }

    pub fn find(&self, norad_id: &str) -> Option<&SatelliteEntry> {
        self.entries.iter().find(|e| e.norad_id == norad_id.trim())
    }

    /// The ISS when listed, otherwise the first entry.
    pub fn default_satellite(&self) -> Option<&SatelliteEntry> {
        self.find(DEFAULT_SATELLITE).or_else(|| self.entries.first())
    }
}
