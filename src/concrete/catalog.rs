//! Material and bar catalogs
//!
//! Catalog tables are plain input data. The constructors here only ship the
//! commercial CA-50 / CA-60 bars and the usual concrete classes as defaults.

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};

/// Bar surface, sets the bond coefficient η1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceType {
    Plain,
    Carved,
    #[default]
    Ribbed,
}

/// One commercial bar size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSize {
    pub diameter_mm: f64,
    /// Nominal cross-section area (cm²)
    pub area_cm2: f64,
    /// Price per metre of bar
    pub cost_per_m: f64,
}

impl BarSize {
    pub fn new(diameter_mm: f64, area_cm2: f64, cost_per_m: f64) -> Self {
        Self {
            diameter_mm,
            area_cm2,
            cost_per_m,
        }
    }

    /// Diameter in cm
    pub fn diameter(&self) -> f64 {
        self.diameter_mm / 10.0
    }
}

/// Commercial diameters with their areas and prices per 12 m bar
const COMMERCIAL_BARS: [(f64, f64, f64); 8] = [
    (6.3, 0.315, 15.39),
    (8.0, 0.5, 24.69),
    (10.0, 0.8, 36.89),
    (12.5, 1.25, 54.79),
    (16.0, 2.0, 89.79),
    (20.0, 3.15, 140.29),
    (25.0, 5.0, 219.09),
    (32.0, 8.0, 402.39),
];

const COMMERCIAL_BAR_LENGTH: f64 = 12.0;

fn commercial_sizes() -> Vec<BarSize> {
    COMMERCIAL_BARS
        .iter()
        .map(|&(diameter, area, price)| BarSize::new(diameter, area, price / COMMERCIAL_BAR_LENGTH))
        .collect()
}

fn check_sizes(bars: &[BarSize]) -> BeamResult<()> {
    if bars.is_empty() {
        return Err(BeamError::InvalidInput("bar catalog is empty".to_string()));
    }
    for bar in bars {
        if !(bar.diameter_mm > 0.0 && bar.area_cm2 > 0.0 && bar.cost_per_m >= 0.0) {
            return Err(BeamError::InvalidInput(format!("invalid bar size {:?}", bar)));
        }
    }
    Ok(())
}

/// Longitudinal bars available for a design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SteelBarCatalogRecord")]
pub struct SteelBarCatalog {
    /// Ordered by diameter
    pub bars: Vec<BarSize>,
    /// Characteristic yield strength (kN/cm²)
    pub fyk: f64,
    /// Elastic modulus (kN/cm²)
    pub es: f64,
    pub surface: SurfaceType,
}

impl SteelBarCatalog {
    pub fn new(mut bars: Vec<BarSize>, fyk: f64, es: f64, surface: SurfaceType) -> BeamResult<Self> {
        check_sizes(&bars)?;
        if fyk <= 0.0 || es <= 0.0 {
            return Err(BeamError::InvalidInput(format!(
                "steel needs positive fyk and Es, got {} and {}",
                fyk, es
            )));
        }
        bars.sort_by(|a, b| a.diameter_mm.total_cmp(&b.diameter_mm));
        Ok(Self { bars, fyk, es, surface })
    }

    /// Ribbed CA-50 bars, 6.3 to 32 mm
    pub fn ca50() -> Self {
        Self {
            bars: commercial_sizes(),
            fyk: 50.0,
            es: 21000.0,
            surface: SurfaceType::Ribbed,
        }
    }

    /// Same bars restricted to the given diameters (mm)
    pub fn subset(&self, diameters_mm: &[f64]) -> BeamResult<Self> {
        let bars: Vec<BarSize> = self
            .bars
            .iter()
            .filter(|bar| diameters_mm.iter().any(|&d| (d - bar.diameter_mm).abs() < 1e-9))
            .copied()
            .collect();
        if bars.len() != diameters_mm.len() {
            return Err(BeamError::InvalidInput(format!(
                "diameters {:?} are not all in the catalog",
                diameters_mm
            )));
        }
        Ok(Self { bars, ..self.clone() })
    }

    /// Design yield strength fyd
    pub fn fyd(&self, gamma_s: f64) -> f64 {
        self.fyk / gamma_s
    }

    pub fn diameters_mm(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.diameter_mm).collect()
    }
}

/// Unchecked wire form of [`SteelBarCatalog`]
#[derive(Deserialize)]
struct SteelBarCatalogRecord {
    bars: Vec<BarSize>,
    fyk: f64,
    es: f64,
    #[serde(default)]
    surface: SurfaceType,
}

impl TryFrom<SteelBarCatalogRecord> for SteelBarCatalog {
    type Error = BeamError;

    fn try_from(record: SteelBarCatalogRecord) -> BeamResult<Self> {
        Self::new(record.bars, record.fyk, record.es, record.surface)
    }
}

impl Default for SteelBarCatalog {
    fn default() -> Self {
        Self::ca50()
    }
}

/// Stirrup bars and the spacing grid they are placed on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StirrupCatalogRecord")]
pub struct StirrupCatalog {
    pub bars: Vec<BarSize>,
    /// Characteristic yield strength (kN/cm²)
    pub fywk: f64,
    /// Spacings are multiples of this (cm)
    pub spacing_increment: f64,
}

impl StirrupCatalog {
    pub fn new(mut bars: Vec<BarSize>, fywk: f64, spacing_increment: f64) -> BeamResult<Self> {
        check_sizes(&bars)?;
        if fywk <= 0.0 || spacing_increment <= 0.0 {
            return Err(BeamError::InvalidInput(format!(
                "stirrups need positive fywk and spacing increment, got {} and {}",
                fywk, spacing_increment
            )));
        }
        bars.sort_by(|a, b| a.diameter_mm.total_cmp(&b.diameter_mm));
        Ok(Self {
            bars,
            fywk,
            spacing_increment,
        })
    }

    /// CA-50 stirrups 6.3 to 12.5 mm on a 5 cm grid
    pub fn standard() -> Self {
        Self {
            bars: commercial_sizes()
                .into_iter()
                .filter(|bar| bar.diameter_mm <= 12.5)
                .collect(),
            fywk: 50.0,
            spacing_increment: 5.0,
        }
    }

    pub fn subset(&self, diameters_mm: &[f64]) -> BeamResult<Self> {
        let bars: Vec<BarSize> = self
            .bars
            .iter()
            .filter(|bar| diameters_mm.iter().any(|&d| (d - bar.diameter_mm).abs() < 1e-9))
            .copied()
            .collect();
        if bars.len() != diameters_mm.len() {
            return Err(BeamError::InvalidInput(format!(
                "stirrup diameters {:?} are not all in the catalog",
                diameters_mm
            )));
        }
        Ok(Self { bars, ..self.clone() })
    }

    pub fn diameters_mm(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.diameter_mm).collect()
    }
}

/// Unchecked wire form of [`StirrupCatalog`]
#[derive(Deserialize)]
struct StirrupCatalogRecord {
    bars: Vec<BarSize>,
    fywk: f64,
    spacing_increment: f64,
}

impl TryFrom<StirrupCatalogRecord> for StirrupCatalog {
    type Error = BeamError;

    fn try_from(record: StirrupCatalogRecord) -> BeamResult<Self> {
        Self::new(record.bars, record.fywk, record.spacing_increment)
    }
}

impl Default for StirrupCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// A concrete strength class and its price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteClass {
    /// Characteristic strength (MPa)
    pub fck: f64,
    pub cost_per_m3: f64,
}

impl ConcreteClass {
    pub fn new(fck: f64, cost_per_m3: f64) -> Self {
        Self { fck, cost_per_m3 }
    }

    /// C25 to C40 at market prices
    pub fn standard() -> Vec<ConcreteClass> {
        vec![
            ConcreteClass::new(25.0, 331.65),
            ConcreteClass::new(30.0, 353.30),
            ConcreteClass::new(35.0, 373.21),
            ConcreteClass::new(40.0, 385.36),
        ]
    }
}

impl std::fmt::Display for ConcreteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.fck)
    }
}

/// Everything a design search can pick from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableMaterials {
    pub concrete_classes: Vec<ConcreteClass>,
    pub long_bars: SteelBarCatalog,
    pub stirrups: StirrupCatalog,
}

impl Default for AvailableMaterials {
    fn default() -> Self {
        Self {
            concrete_classes: ConcreteClass::standard(),
            long_bars: SteelBarCatalog::ca50(),
            stirrups: StirrupCatalog::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deserialize_validates_catalogs() {
        let json = r#"{"bars": [{"diameter_mm": 8.0, "area_cm2": 0.503, "cost_per_m": 2.0}], "fywk": 50.0, "spacing_increment": 0.0}"#;
        let err = serde_json::from_str::<StirrupCatalog>(json).unwrap_err();
        assert!(err.to_string().contains("spacing increment"));

        let json = r#"{"bars": [], "fyk": 50.0, "es": 21000.0}"#;
        assert!(serde_json::from_str::<SteelBarCatalog>(json).is_err());

        let catalog = SteelBarCatalog::ca50();
        let back: SteelBarCatalog = serde_json::from_str(&serde_json::to_string(&catalog).unwrap()).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_ca50_prices_per_metre() {
        let catalog = SteelBarCatalog::ca50();
        assert_eq!(catalog.bars.len(), 8);
        assert_relative_eq!(catalog.bars[2].cost_per_m, 36.89 / 12.0);
        assert_relative_eq!(catalog.bars[2].diameter(), 1.0);
        assert_relative_eq!(catalog.fyd(1.15), 50.0 / 1.15);
    }

    #[test]
    fn test_subset() {
        let catalog = SteelBarCatalog::ca50();
        let subset = catalog.subset(&[10.0, 16.0]).unwrap();
        assert_eq!(subset.diameters_mm(), vec![10.0, 16.0]);
        assert!(catalog.subset(&[11.0]).is_err());
    }

    #[test]
    fn test_stirrup_catalog() {
        let stirrups = StirrupCatalog::standard();
        assert_eq!(stirrups.diameters_mm(), vec![6.3, 8.0, 10.0, 12.5]);
        assert!(StirrupCatalog::new(vec![], 50.0, 5.0).is_err());
    }

    #[test]
    fn test_catalog_sorted_on_construction() {
        let catalog = SteelBarCatalog::new(
            vec![BarSize::new(16.0, 2.0, 7.0), BarSize::new(8.0, 0.5, 2.0)],
            50.0,
            21000.0,
            SurfaceType::Ribbed,
        )
        .unwrap();
        assert_eq!(catalog.diameters_mm(), vec![8.0, 16.0]);
    }
}
