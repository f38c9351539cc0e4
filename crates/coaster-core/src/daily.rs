use crate::catalog::Catalog;
use crate::day::{day_key, DaySchedule};
use crate::error::{ProvisionError, StoreError};
use crate::generator::Generator;
use crate::puzzle::Puzzle;
use crate::rules::RuleSet;
use crate::store::PuzzleStore;
use chrono::NaiveDate;
use rand::Rng;

/// Return the stored puzzle for `day`, generating and storing one if needed.
///
/// When a concurrent writer creates the day's puzzle first, its puzzle wins and
/// is returned instead of ours.
pub fn provision_daily<P, C, R>(
    store: &P,
    catalog: &C,
    rules: &RuleSet,
    generator: &mut Generator<R>,
    schedule: &DaySchedule,
    day: NaiveDate,
) -> Result<Puzzle, ProvisionError>
where
    P: PuzzleStore + ?Sized,
    C: Catalog + ?Sized,
    R: Rng,
{
    let key = day_key(day);
    if let Some(existing) = store.get_puzzle(&key)? {
        tracing::debug!(day = %key, number = existing.number, "puzzle already provisioned");
        return Ok(existing);
    }

    let puzzle = generator.generate(catalog, rules, schedule.number_for(day), day)?;

    match store.create_puzzle(&key, &puzzle) {
        Ok(()) => {
            tracing::info!(
                day = %key,
                number = puzzle.number,
                groups = puzzle.groups.len(),
                backend = store.backend_name(),
                "provisioned daily puzzle"
            );
            Ok(puzzle)
        }
        Err(StoreError::AlreadyExists(_)) => {
            tracing::info!(day = %key, "lost the create race, using the stored puzzle");
            store.get_puzzle(&key)?.ok_or(ProvisionError::Vanished(key))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Item, MemoryCatalog, Quality};
    use crate::rules::{MatchOp, Rule};
    use crate::store::MemoryStore;

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new(Quality::Manufacturer, MatchOp::Equals, ["B&M"], "Manufacturer", "By %replace%."),
            Rule::new(Quality::MaterialType, MatchOp::Equals, ["Wood"], "Material", "%replace% track."),
        ])
    }

    fn catalog() -> MemoryCatalog {
        let mut items = Vec::new();
        for i in 0..4 {
            items.push(Item::new(format!("b{i}"), format!("Bolliger {i}")).with(Quality::Manufacturer, "B&M"));
            items.push(Item::new(format!("w{i}"), format!("Woodie {i}")).with(Quality::MaterialType, "Wood"));
        }
        MemoryCatalog::new(items)
    }

    fn schedule() -> DaySchedule {
        DaySchedule::new(6, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn test_provision_creates_once() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

        let first = provision_daily(&store, &catalog(), &rules(), &mut Generator::with_seed(1), &schedule(), day).unwrap();
        assert_eq!(first.number, 10);
        assert_eq!(first.groups.len(), 2);

        let second = provision_daily(&store, &catalog(), &rules(), &mut Generator::with_seed(2), &schedule(), day).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.puzzle_count(), 1);
    }

    /// Simulates another writer creating the puzzle between our read and write.
    struct RacingStore {
        inner: MemoryStore,
        winner: Puzzle,
    }

    impl PuzzleStore for RacingStore {
        fn get_puzzle(&self, key: &str) -> Result<Option<Puzzle>, StoreError> {
            self.inner.get_puzzle(key)
        }

        fn create_puzzle(&self, key: &str, puzzle: &Puzzle) -> Result<(), StoreError> {
            self.inner.create_puzzle(key, &self.winner)?;
            self.inner.create_puzzle(key, puzzle)
        }

        fn backend_name(&self) -> &'static str {
            "Racing"
        }
    }

    #[test]
    fn test_losing_race_returns_winner() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let winner = Puzzle {
            number: 99,
            created: day,
            groups: Vec::new(),
        };
        let store = RacingStore {
            inner: MemoryStore::new(),
            winner: winner.clone(),
        };

        let got = provision_daily(&store, &catalog(), &rules(), &mut Generator::with_seed(4), &schedule(), day).unwrap();
        assert_eq!(got, winner);
    }

    #[test]
    fn test_store_outage_is_an_error() {
        let store = MemoryStore::new();
        store.set_available(false);
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        let result = provision_daily(&store, &catalog(), &rules(), &mut Generator::with_seed(4), &schedule(), day);
        assert!(matches!(result, Err(ProvisionError::Store(StoreError::Unavailable(_)))));
    }
}
