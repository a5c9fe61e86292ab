//! Itemised cost of a design

use serde::{Deserialize, Serialize};

use super::beam::ConcreteBeam;
use super::long_steel::LongSteelBar;
use super::transv_steel::TransvSteelSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostCategory {
    Concrete,
    LongitudinalBar,
    TransverseBar,
}

/// One line of the cost table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub category: CostCategory,
    pub cost: f64,
    pub quantity: f64,
    /// Unit of `quantity` ("m3" or "m")
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub items: Vec<CostItem>,
    pub concrete: f64,
    pub longitudinal: f64,
    pub transverse: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn new(beam: &ConcreteBeam, long_bars: &[LongSteelBar], transverse: &[TransvSteelSegment]) -> Self {
        let mut items = Vec::new();
        let cost_per_m3 = beam.concrete_class().cost_per_m3;

        for element in beam.beam().user_elements() {
            let volume = element.section.area() * element.length() / 1e6;
            items.push(CostItem {
                category: CostCategory::Concrete,
                cost: volume * cost_per_m3,
                quantity: volume,
                unit: "m3".to_string(),
                description: format!(
                    "{} between {:.2} m and {:.2} m",
                    beam.concrete_class(),
                    element.x_begin / 100.0,
                    element.x_end / 100.0
                ),
            });
        }

        for bar in long_bars {
            items.push(CostItem {
                category: CostCategory::LongitudinalBar,
                cost: bar.cost,
                quantity: bar.total_length() / 100.0,
                unit: "m".to_string(),
                description: format!(
                    "{} x {} mm ({}) between {:.2} m and {:.2} m",
                    bar.count,
                    bar.diameter * 10.0,
                    bar.face,
                    bar.x_begin / 100.0,
                    bar.x_end / 100.0
                ),
            });
        }

        for segment in transverse {
            items.push(CostItem {
                category: CostCategory::TransverseBar,
                cost: segment.cost,
                quantity: segment.count as f64 * segment.stirrup_length / 100.0,
                unit: "m".to_string(),
                description: format!(
                    "{} stirrups {} mm every {} cm between {:.2} m and {:.2} m",
                    segment.count,
                    segment.diameter * 10.0,
                    segment.spacing,
                    segment.x_begin / 100.0,
                    segment.x_end / 100.0
                ),
            });
        }

        let subtotal = |category| {
            items
                .iter()
                .filter(|item: &&CostItem| item.category == category)
                .map(|item| item.cost)
                .sum::<f64>()
        };
        let concrete = subtotal(CostCategory::Concrete);
        let longitudinal = subtotal(CostCategory::LongitudinalBar);
        let transverse = subtotal(CostCategory::TransverseBar);

        Self {
            items,
            concrete,
            longitudinal,
            transverse,
            total: concrete + longitudinal + transverse,
        }
    }

    /// Quantity of one category, in its unit
    pub fn quantity(&self, category: CostCategory) -> f64 {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .map(|item| item.quantity)
            .sum()
    }
}
