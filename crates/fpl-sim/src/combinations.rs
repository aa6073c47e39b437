//! Forced-chip schedule enumeration for sensitivity sweeps.

use fpl_core::{Chip, Gameweek};
use std::collections::BTreeMap;

/// Cartesian product of candidate gameweeks per chip, keeping only
/// schedules where no two chips land on the same gameweek. A chip with no
/// candidates is simply left unscheduled.
pub fn chip_combinations(
    candidates: &BTreeMap<Chip, Vec<Gameweek>>,
) -> Vec<BTreeMap<Chip, Gameweek>> {
    let chips: Vec<(Chip, &Vec<Gameweek>)> = candidates
        .iter()
        .filter(|(_, gws)| !gws.is_empty())
        .map(|(chip, gws)| (*chip, gws))
        .collect();

    let mut out = Vec::new();
    let mut current: BTreeMap<Chip, Gameweek> = BTreeMap::new();
    expand(&chips, 0, &mut current, &mut out);
    out
}

fn expand(
    chips: &[(Chip, &Vec<Gameweek>)],
    depth: usize,
    current: &mut BTreeMap<Chip, Gameweek>,
    out: &mut Vec<BTreeMap<Chip, Gameweek>>,
) {
    if depth == chips.len() {
        out.push(current.clone());
        return;
    }
    let (chip, gws) = chips[depth];
    for &gw in gws {
        if current.values().any(|&used| used == gw) {
            continue;
        }
        current.insert(chip, gw);
        expand(chips, depth + 1, current, out);
        current.remove(&chip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_non_conflicting_schedules() {
        let mut candidates = BTreeMap::new();
        candidates.insert(Chip::Wildcard, vec![4, 5]);
        candidates.insert(Chip::BenchBoost, vec![5, 6]);

        let combos = chip_combinations(&candidates);
        // 2x2 minus the (5, 5) clash.
        assert_eq!(combos.len(), 3);
        assert!(combos
            .iter()
            .all(|c| c[&Chip::Wildcard] != c[&Chip::BenchBoost]));
    }

    #[test]
    fn empty_candidate_lists_are_skipped() {
        let mut candidates = BTreeMap::new();
        candidates.insert(Chip::Wildcard, vec![4]);
        candidates.insert(Chip::FreeHit, vec![]);

        let combos = chip_combinations(&candidates);
        assert_eq!(combos.len(), 1);
        assert!(!combos[0].contains_key(&Chip::FreeHit));
    }

    #[test]
    fn no_candidates_yields_the_empty_schedule() {
        let combos = chip_combinations(&BTreeMap::new());
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }
}
