use rust_decimal::Decimal;

use super::configuration::PhaseSettings;
use super::{checked_product, round_money, round_percentage};
use crate::domain::estimate::{PhaseCost, PriceRange};
use crate::errors::EstimateError;

pub const DISCOVERY_PHASE: &str = "discovery";
pub const DEPLOYMENT_PHASE: &str = "Deployment";

pub trait PhaseAllocator: Send + Sync {
    fn calculate_phases(
        &self,
        total: PriceRange,
        discovery_factor: Decimal,
    ) -> Result<Vec<PhaseCost>, EstimateError>;
}

/// Splits totals by the configured base percentages.
///
/// Discovery takes `factor - 1` off the top, the base phases share what is
/// left, and `Deployment` absorbs whatever rounding leaves over so the
/// percentages always add up to exactly one.
#[derive(Clone, Debug, Default)]
pub struct ConfiguredPhaseAllocator {
    settings: PhaseSettings,
}

impl ConfiguredPhaseAllocator {
    pub fn new(settings: PhaseSettings) -> Self {
        Self { settings }
    }

    /// Phase names with their share of the total, in emission order.
    pub fn phase_percentages(&self, discovery_factor: Decimal) -> Vec<(String, Decimal)> {
        let discovery = discovery_factor - Decimal::ONE;
        let remaining = Decimal::ONE - discovery;

        let mut percentages = Vec::with_capacity(self.settings.base_percentages.len() + 2);
        percentages.push((DISCOVERY_PHASE.to_string(), round_percentage(discovery)));
        for (phase, base) in &self.settings.base_percentages {
            percentages.push((phase.clone(), round_percentage(*base * remaining)));
        }

        let allocated: Decimal = percentages.iter().map(|(_, percentage)| *percentage).sum();
        let deployment = round_percentage(Decimal::ONE - allocated);
        percentages.push((DEPLOYMENT_PHASE.to_string(), deployment));
        percentages
    }
}

impl PhaseAllocator for ConfiguredPhaseAllocator {
    fn calculate_phases(
        &self,
        total: PriceRange,
        discovery_factor: Decimal,
    ) -> Result<Vec<PhaseCost>, EstimateError> {
        self.phase_percentages(discovery_factor)
            .into_iter()
            .map(|(phase, percentage)| {
                let low = checked_product("phase cost", &[total.low, percentage])?;
                let high = checked_product("phase cost", &[total.high, percentage])?;
                Ok(PhaseCost { phase, percentage, low: round_money(low), high: round_money(high) })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ConfiguredPhaseAllocator, PhaseAllocator, DEPLOYMENT_PHASE, DISCOVERY_PHASE};
    use crate::domain::estimate::PriceRange;
    use crate::pricing::configuration::PhaseSettings;

    fn range(low: i64, high: i64) -> PriceRange {
        PriceRange { low: Decimal::from(low), high: Decimal::from(high) }
    }

    #[test]
    fn no_discovery_leaves_base_phases_untouched() {
        let phases = ConfiguredPhaseAllocator::default()
            .calculate_phases(range(22972, 34459), Decimal::ONE)
            .expect("phases should compute");

        let names: Vec<&str> = phases.iter().map(|phase| phase.phase.as_str()).collect();
        assert_eq!(
            names,
            [DISCOVERY_PHASE, "project_management", "design", "build", "qa", DEPLOYMENT_PHASE]
        );

        assert_eq!(phases[0].low, Decimal::ZERO);
        assert_eq!((phases[1].low, phases[1].high), (Decimal::from(3446), Decimal::from(5169)));
        assert_eq!((phases[3].low, phases[3].high), (Decimal::from(12635), Decimal::from(18952)));
        assert_eq!(phases[5].percentage, Decimal::new(5, 2));
        assert_eq!((phases[5].low, phases[5].high), (Decimal::from(1149), Decimal::from(1723)));
    }

    #[test]
    fn discovery_scales_the_remaining_space() {
        let allocator = ConfiguredPhaseAllocator::default();
        let percentages = allocator.phase_percentages(Decimal::new(105, 2));

        let expected = [
            (DISCOVERY_PHASE, Decimal::new(5, 2)),
            ("project_management", Decimal::new(143, 3)),
            ("design", Decimal::new(95, 3)),
            ("build", Decimal::new(523, 3)),
            ("qa", Decimal::new(143, 3)),
            (DEPLOYMENT_PHASE, Decimal::new(46, 3)),
        ];
        for ((name, percentage), (expected_name, expected_percentage)) in
            percentages.iter().zip(expected)
        {
            assert_eq!(name, expected_name);
            assert_eq!(*percentage, expected_percentage);
        }
    }

    #[test]
    fn remaining_space_uses_the_unrounded_discovery_share() {
        let allocator = ConfiguredPhaseAllocator::default();
        let percentages = allocator.phase_percentages(Decimal::new(10005, 4));

        // 0.0005 rounds to 0.001, but build still sees 0.55 * 0.9995 = 0.549725
        assert_eq!(percentages[0], (DISCOVERY_PHASE.to_string(), Decimal::new(1, 3)));
        assert_eq!(percentages[3], ("build".to_string(), Decimal::new(550, 3)));

        let total: Decimal = percentages.iter().map(|(_, percentage)| *percentage).sum();
        assert_eq!(total, Decimal::ONE);
    }

    #[test]
    fn percentages_always_sum_to_one() {
        let allocator = ConfiguredPhaseAllocator::default();
        for hundredths in 100..=140 {
            let factor = Decimal::new(hundredths, 2);
            let total: Decimal =
                allocator.phase_percentages(factor).iter().map(|(_, percentage)| *percentage).sum();
            assert_eq!(total, Decimal::ONE, "discovery factor {factor}");
        }
    }

    #[test]
    fn configured_phase_order_is_kept() {
        let allocator = ConfiguredPhaseAllocator::new(PhaseSettings {
            base_percentages: vec![
                ("build".to_string(), Decimal::new(60, 2)),
                ("strategy".to_string(), Decimal::new(20, 2)),
                ("qa".to_string(), Decimal::new(15, 2)),
            ],
        });

        let phases =
            allocator.calculate_phases(range(1000, 2000), Decimal::ONE).expect("phases");
        let names: Vec<&str> = phases.iter().map(|phase| phase.phase.as_str()).collect();
        assert_eq!(names, [DISCOVERY_PHASE, "build", "strategy", "qa", DEPLOYMENT_PHASE]);
    }

    #[test]
    fn each_bound_is_rounded_independently() {
        let phases = ConfiguredPhaseAllocator::default()
            .calculate_phases(range(999, 1001), Decimal::new(105, 2))
            .expect("phases");

        // 999 * 0.143 = 142.857 and 1001 * 0.143 = 143.143
        let management = &phases[1];
        assert_eq!(management.low, Decimal::from(143));
        assert_eq!(management.high, Decimal::from(143));

        let low_total: Decimal = phases.iter().map(|phase| phase.low).sum();
        assert!((low_total - Decimal::from(999)).abs() <= Decimal::from(3));
    }
}
