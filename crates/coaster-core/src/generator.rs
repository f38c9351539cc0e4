use crate::catalog::{Catalog, Item};
use crate::error::{CatalogError, GenerateError};
use crate::puzzle::{CategoryColor, Group, Puzzle, GROUP_COUNT, GROUP_SIZE};
use crate::rules::{RuleSet, RuleValue};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration for puzzle generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Rule switches allowed inside one viable-set search
    pub max_search_depth: usize,
    /// Failed slot attempts tolerated across the whole puzzle
    pub max_slot_retries: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_search_depth: 500,
            max_slot_retries: 50,
        }
    }
}

/// Why a viable-set search came back empty-handed
#[derive(Debug, Error)]
enum SearchFailure {
    #[error("no rule with an unused category remains")]
    RulesExhausted,
    #[error("search depth bound {0} reached")]
    DepthExceeded(usize),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Outcome of a successful viable-set search. The search may have switched
/// rules on the way, so it reports what it settled on.
struct Placement {
    rule_index: usize,
    value: RuleValue,
    candidates: Vec<Item>,
}

/// Connections puzzle generator
pub struct Generator<R: Rng = StdRng> {
    config: GeneratorConfig,
    rng: R,
}

impl Default for Generator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<StdRng> {
    /// Create a new generator with default configuration
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Generator<R> {
    /// Create a generator drawing from a caller-supplied random source
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a puzzle numbered `number`.
    ///
    /// Search failures shrink the puzzle rather than failing it; check
    /// [`Puzzle::is_degraded`]. Only catalog errors are returned as `Err`.
    pub fn generate<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        rules: &RuleSet,
        number: u32,
        created: NaiveDate,
    ) -> Result<Puzzle, GenerateError> {
        let mut groups: Vec<Group> = Vec::with_capacity(GROUP_COUNT);
        let mut used_names: HashSet<String> = HashSet::new();
        let mut failures = 0;

        while groups.len() < GROUP_COUNT {
            let Some((rule_index, value)) = self.pick_candidate(rules, &groups, None) else {
                tracing::warn!(
                    groups = groups.len(),
                    "rule set exhausted before the puzzle was full"
                );
                break;
            };

            match self.viable_set(catalog, rules, rule_index, value, &groups, &used_names, 0) {
                Ok(placement) => {
                    let items: Vec<Item> = placement
                        .candidates
                        .choose_multiple(&mut self.rng, GROUP_SIZE)
                        .cloned()
                        .collect();
                    used_names.extend(items.iter().map(|i| i.name.clone()));

                    let rule = rules.rules()[placement.rule_index].clone();
                    tracing::debug!(
                        slot = groups.len(),
                        category = %rule.category,
                        value = %placement.value,
                        pool = placement.candidates.len(),
                        "placed group"
                    );
                    groups.push(Group {
                        rule,
                        value: placement.value,
                        items,
                        color: CategoryColor::for_slot(groups.len()),
                    });
                }
                Err(SearchFailure::Catalog(err)) => return Err(err.into()),
                Err(SearchFailure::RulesExhausted) => {
                    tracing::warn!(
                        groups = groups.len(),
                        "rule set exhausted during search"
                    );
                    break;
                }
                Err(failure) => {
                    failures += 1;
                    tracing::debug!(slot = groups.len(), failures, %failure, "slot attempt failed");
                    if failures >= self.config.max_slot_retries {
                        tracing::warn!(
                            groups = groups.len(),
                            retries = failures,
                            "slot retry budget exhausted"
                        );
                        break;
                    }
                }
            }
        }

        let puzzle = Puzzle {
            number,
            created,
            groups,
        };
        if puzzle.is_degraded() {
            tracing::warn!(
                number,
                groups = puzzle.groups.len(),
                "generated a degraded puzzle"
            );
        } else {
            tracing::info!(number, "generated puzzle");
        }
        Ok(puzzle)
    }

    /// Find at least [`GROUP_SIZE`] items that satisfy the candidate rule and no
    /// placed group's rule, switching to another rule when the pool is too small.
    #[allow(clippy::too_many_arguments)]
    fn viable_set<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        rules: &RuleSet,
        rule_index: usize,
        value: RuleValue,
        placed: &[Group],
        used_names: &HashSet<String>,
        depth: usize,
    ) -> Result<Placement, SearchFailure> {
        if depth >= self.config.max_search_depth {
            return Err(SearchFailure::DepthExceeded(depth));
        }

        let rule = &rules.rules()[rule_index];

        // A placed item that satisfies this rule would belong to two groups.
        let overlaps_placed = placed
            .iter()
            .flat_map(|g| g.items.iter())
            .any(|item| rule.matches(item, &value));

        let candidates = if overlaps_placed {
            Vec::new()
        } else {
            let mut seen: HashSet<String> = HashSet::new();
            catalog
                .find_items(rule.quality, rule.operator, &value)?
                .into_iter()
                .filter(|item| !used_names.contains(&item.name))
                .filter(|item| placed.iter().all(|g| g.rule.excludes(item, &g.value)))
                .filter(|item| seen.insert(item.name.clone()))
                .collect::<Vec<_>>()
        };

        if candidates.len() >= GROUP_SIZE {
            return Ok(Placement {
                rule_index,
                value,
                candidates,
            });
        }

        tracing::trace!(
            depth,
            category = %rule.category,
            value = %value,
            pool = candidates.len(),
            overlaps_placed,
            "candidate not viable"
        );

        let (next_index, next_value) = self
            .pick_candidate(rules, placed, Some(rule_index))
            .ok_or(SearchFailure::RulesExhausted)?;
        self.viable_set(
            catalog,
            rules,
            next_index,
            next_value,
            placed,
            used_names,
            depth + 1,
        )
    }

    /// Draw a rule whose category is unused, then one of its values.
    ///
    /// `avoid` is skipped when any other rule is available.
    fn pick_candidate(
        &mut self,
        rules: &RuleSet,
        placed: &[Group],
        avoid: Option<usize>,
    ) -> Option<(usize, RuleValue)> {
        let used: HashSet<&str> = placed.iter().map(|g| g.category()).collect();
        let mut available: Vec<usize> = rules
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.values.is_empty() && !used.contains(r.category.as_str()))
            .map(|(i, _)| i)
            .collect();

        if let Some(avoid) = avoid {
            if available.len() > 1 {
                available.retain(|&i| i != avoid);
            }
        }

        let index = *available.choose(&mut self.rng)?;
        let value = rules.rules()[index].values.choose(&mut self.rng)?.clone();
        Some((index, value))
    }
}
