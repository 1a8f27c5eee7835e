//! Exchange generation: the best subset of the rack to return to the
//! bag, judged purely by the leave kept behind.

use crate::{
    engine::leave_map::LeaveMap,
    equity::Equity,
    game::{
        play::Exchange,
        rack::{Rack, RACK_SIZE},
        tile::{Tile, ALPHABET_SIZE},
    },
};

/// Finds the exchange with the most valuable leave. Exchanges are only
/// legal while the bag holds a full rack's worth of tiles, and only
/// meaningful when a leave evaluator is loaded.
pub(crate) fn best_exchange(
    leave_map: &mut LeaveMap,
    rack: &Rack,
    bag_count: usize,
    has_evaluator: bool,
) -> Option<Exchange> {
    if !has_evaluator || bag_count < RACK_SIZE || rack.is_empty() {
        return None;
    }

    let mut scratch = rack.clone();
    let mut exchanged = Vec::with_capacity(RACK_SIZE);
    let mut best: Option<(Equity, Vec<Tile>)> = None;

    recurse(leave_map, &mut scratch, 0, &mut exchanged, &mut best);
    debug_assert_eq!(&scratch, rack);

    best.map(|(equity, tiles)| Exchange { tiles, equity })
}

/// Walks every distinct subset of the rack in canonical order, tracking
/// the exchanged tiles in the leave map's played bitmap so the kept
/// leave is a single lookup. Ties keep the earliest subset enumerated.
fn recurse(
    leave_map: &mut LeaveMap,
    rack: &mut Rack,
    start_slot: usize,
    exchanged: &mut Vec<Tile>,
    best: &mut Option<(Equity, Vec<Tile>)>,
) {
    if !exchanged.is_empty() {
        let value = leave_map.current_leave();
        let better = match best {
            Some((best_value, _)) => value > *best_value,
            None => true,
        };
        if better {
            *best = Some((value, exchanged.clone()));
        }
    }

    for slot in start_slot..ALPHABET_SIZE {
        if rack.counts()[slot] > 0 {
            let tile = Tile::from_slot(slot);
            rack.remove(tile).expect("slot count checked above");
            leave_map.take(slot, rack.counts()[slot] as usize);
            exchanged.push(tile);

            recurse(leave_map, rack, slot, exchanged, best);

            exchanged.pop();
            leave_map.restore(slot, rack.counts()[slot] as usize);
            rack.add(tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::tile::Letter, lexicon::KlvBuilder};

    fn rack(letters: &str) -> Rack {
        letters
            .chars()
            .map(|ch| match ch {
                '?' => Tile::blank(),
                _ => Tile::Letter(Letter::new(ch).unwrap()),
            })
            .collect()
    }

    #[test]
    fn keeps_the_best_leave() {
        // leaves: keeping A is good, keeping Q is bad.
        let mut builder = KlvBuilder::new();
        builder.insert("A", Equity::from_eighths(10));
        builder.insert("Q", Equity::from_eighths(-40));
        builder.insert("AQ", Equity::from_eighths(-30));
        let klv = builder.build();

        let rack = rack("AQ");
        let mut map = LeaveMap::new(Some(&klv), &rack);

        let exchange = best_exchange(&mut map, &rack, 90, true).unwrap();
        // exchanging Q keeps A, the best available leave.
        assert_eq!(exchange.tiles, vec![Tile::Letter(Letter::new('Q').unwrap())]);
        assert_eq!(exchange.equity.eighths(), 10);
    }

    #[test]
    fn unavailable_without_bag_or_evaluator() {
        let rack = rack("AQ");
        let mut map = LeaveMap::new(None, &rack);

        assert!(best_exchange(&mut map, &rack, RACK_SIZE - 1, true).is_none());
        assert!(best_exchange(&mut map, &rack, 90, false).is_none());
        assert!(best_exchange(&mut map, &Rack::new(), 90, true).is_none());
    }

    #[test]
    fn exchanging_everything_is_considered() {
        // every leave is poisoned, so the whole rack goes back.
        let mut builder = KlvBuilder::new();
        builder.insert("Q", Equity::from_eighths(-40));
        builder.insert("V", Equity::from_eighths(-28));
        builder.insert("QV", Equity::from_eighths(-70));
        let klv = builder.build();

        let rack = rack("QV");
        let mut map = LeaveMap::new(Some(&klv), &rack);

        let exchange = best_exchange(&mut map, &rack, 80, true).unwrap();
        assert_eq!(exchange.tiles.len(), 2);
        assert_eq!(exchange.equity, Equity::ZERO);
    }
}
