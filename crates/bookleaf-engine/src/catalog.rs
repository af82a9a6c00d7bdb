//! Starter species catalog seeded into a fresh store.

use rust_decimal::Decimal;

use bookleaf_types::{PlantSpecies, SpeciesId};

/// Raw catalog row: name, description, growth rate (hundredths), max level,
/// water interval days, boost (thousandths), base cost, unlock level.
type SpeciesRow = (&'static str, &'static str, i64, u32, u32, i64, u64, u32);

const STARTERS: [SpeciesRow; 6] = [
    ("Pothos", "Forgiving trailing vine for a first shelf.", 125, 10, 3, 50, 100, 1),
    ("Succulent", "Stores water in its leaves and shrugs off a missed week.", 75, 8, 7, 40, 150, 1),
    ("Fern", "Loves humidity and a reader who checks in daily.", 150, 12, 2, 75, 250, 2),
    ("Snake Plant", "Slow and steady, hard to kill.", 60, 15, 10, 60, 400, 4),
    ("Bonsai", "Rewards patience with a large boost.", 50, 20, 4, 150, 800, 8),
    ("Orchid", "Seasonal bloom, not currently in the shop.", 100, 10, 5, 100, 600, 6),
];

/// The species every new reader can browse.
///
/// The orchid is listed but not available for purchase.
pub fn starter_catalog() -> Vec<PlantSpecies> {
    STARTERS
        .iter()
        .map(
            |&(name, description, growth, max_level, interval, boost, base_cost, unlock_level)| {
                PlantSpecies {
                    id: SpeciesId::new(),
                    name: name.to_owned(),
                    description: description.to_owned(),
                    growth_rate: Decimal::new(growth, 2),
                    max_level,
                    water_interval_days: interval,
                    xp_boost_percentage: Decimal::new(boost, 3),
                    base_cost,
                    unlock_level,
                    is_available: name != "Orchid",
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_species_is_well_formed() {
        for species in starter_catalog() {
            assert!(species.growth_rate > Decimal::ZERO, "{}", species.name);
            assert!(species.max_level > 0, "{}", species.name);
            assert!(species.water_interval_days > 0, "{}", species.name);
            assert!(species.xp_boost_percentage >= Decimal::ZERO, "{}", species.name);
            assert!(species.xp_boost_percentage <= Decimal::ONE, "{}", species.name);
            assert!(species.unlock_level >= 1, "{}", species.name);
        }
    }

    #[test]
    fn something_is_buyable_at_level_one() {
        let catalog = starter_catalog();
        assert!(
            catalog
                .iter()
                .any(|s| s.is_available && s.unlock_level == 1 && s.base_cost <= 100)
        );
    }

    #[test]
    fn orchid_is_not_for_sale() {
        let catalog = starter_catalog();
        let orchid = catalog.iter().find(|s| s.name == "Orchid");
        assert_eq!(orchid.map(|s| s.is_available), Some(false));
    }
}
