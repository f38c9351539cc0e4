//! Single-player session state machine
//!
//! A [`Session`] owns one day's progress: the shuffled board, solved groups,
//! mistakes, hints and the shareable summary. Every mutation is written back to
//! the [`SessionStore`] as one JSON blob keyed by the active day, and rendering
//! reads a [`ViewModel`] derived from the state rather than the state itself.

use crate::catalog::Item;
use crate::day::day_key;
use crate::error::SessionError;
use crate::puzzle::{CategoryColor, Group, Puzzle, GROUP_SIZE};
use crate::store::{PuzzleStore, SessionStore};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mistakes allowed before the puzzle is lost
pub const STARTING_MISTAKES: u8 = 5;
/// Number of hint buttons
pub const HINT_SLOTS: usize = 3;

const LOST_ROW: &str = "⬛⬛⬛⬛\n";

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    AwaitingFetch,
    InProgress,
    Won,
    Lost,
    /// The day's puzzle could not be fetched
    Unavailable,
}

impl Phase {
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// Persisted per-day progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Day key, `YYYY-MM-DD`
    pub date: String,
    /// Solved groups in discovery order
    pub solved_groups: Vec<Group>,
    /// Every puzzle item, shuffled once when the session is created
    pub board: Vec<Item>,
    pub puzzle_groups: Vec<Group>,
    pub mistakes_remaining: u8,
    pub hint1: bool,
    pub hint2: bool,
    pub hint3: bool,
    pub finished: bool,
    pub summary: String,
    #[serde(default)]
    pub puzzle_number: u32,
}

impl SessionState {
    /// Fresh state for a puzzle, with the board shuffled by `rng`
    pub fn fresh<R: Rng + ?Sized>(key: &str, puzzle: &Puzzle, rng: &mut R) -> Self {
        let mut board: Vec<Item> = puzzle.items().cloned().collect();
        board.shuffle(rng);

        Self {
            date: key.to_string(),
            solved_groups: Vec::new(),
            board,
            puzzle_groups: puzzle.groups.clone(),
            mistakes_remaining: STARTING_MISTAKES,
            hint1: false,
            hint2: false,
            hint3: false,
            finished: false,
            summary: format!("Coaster Connections #{}\n", puzzle.number),
            puzzle_number: puzzle.number,
        }
    }

    pub fn hints(&self) -> [bool; HINT_SLOTS] {
        [self.hint1, self.hint2, self.hint3]
    }

    fn hint_mut(&mut self, slot: usize) -> Option<&mut bool> {
        match slot {
            0 => Some(&mut self.hint1),
            1 => Some(&mut self.hint2),
            2 => Some(&mut self.hint3),
            _ => None,
        }
    }

    pub fn hints_used(&self) -> usize {
        self.hints().iter().filter(|&&h| h).count()
    }

    pub fn mistakes_made(&self) -> u8 {
        STARTING_MISTAKES.saturating_sub(self.mistakes_remaining)
    }

    pub fn is_solved(&self, group: &Group) -> bool {
        self.solved_groups.iter().any(|g| g == group)
    }

    /// Unsolved groups in puzzle order
    pub fn unsolved_groups(&self) -> impl Iterator<Item = &Group> {
        self.puzzle_groups.iter().filter(|g| !self.is_solved(g))
    }

    /// Board items not yet covered by a solved group, in board order
    pub fn unsolved_items(&self) -> impl Iterator<Item = &Item> {
        self.board
            .iter()
            .filter(|item| !self.solved_groups.iter().any(|g| g.contains_name(&item.name)))
    }

    fn score_line(&self) -> String {
        format!(
            "Mistakes: {} | Hints Used: {}",
            self.mistakes_made(),
            self.hints_used()
        )
    }

    fn phase(&self) -> Phase {
        if !self.finished {
            Phase::InProgress
        } else if self.mistakes_remaining == 0 {
            Phase::Lost
        } else {
            Phase::Won
        }
    }
}

/// Result of a submitted guess
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    Correct {
        group: Group,
        /// True when this group finished the puzzle
        won: bool,
    },
    Incorrect {
        /// The four names that were rejected
        rejected: Vec<String>,
        mistakes_remaining: u8,
        /// True when this guess used the last mistake
        lost: bool,
    },
}

/// A solved row shown above the board
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedRow {
    pub category: String,
    pub explanation: String,
    pub color: CategoryColor,
    pub names: Vec<String>,
}

/// One board tile
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub item: Item,
    pub selected: bool,
}

/// One hint button
#[derive(Debug, Clone, PartialEq)]
pub struct HintView {
    pub slot: usize,
    /// Whether the button can be pressed now
    pub available: bool,
    pub revealed: bool,
    /// Category of the hinted group, once revealed
    pub label: Option<String>,
}

/// Everything a front end needs to draw the session
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub phase: Phase,
    pub puzzle_number: u32,
    pub solved: Vec<SolvedRow>,
    pub board: Vec<Tile>,
    pub mistakes_remaining: u8,
    pub hints: Vec<HintView>,
    pub can_submit: bool,
    pub finished: bool,
    pub summary: String,
}

/// One player's session for one day
pub struct Session<S: SessionStore> {
    store: S,
    phase: Phase,
    state: Option<SessionState>,
    selection: Vec<String>,
}

impl<S: SessionStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            phase: Phase::NotStarted,
            state: None,
            selection: Vec::new(),
        }
    }

    /// Load the session for `day`, starting a fresh one from the day's puzzle
    /// when nothing usable is stored.
    ///
    /// On error the session is left in [`Phase::Unavailable`].
    pub fn load<P, R>(&mut self, day: NaiveDate, puzzles: &P, rng: &mut R) -> Result<(), SessionError>
    where
        P: PuzzleStore + ?Sized,
        R: Rng + ?Sized,
    {
        let key = day_key(day);
        self.phase = Phase::AwaitingFetch;
        self.selection.clear();

        if let Some(state) = self.restore(&key) {
            tracing::info!(day = %key, solved = state.solved_groups.len(), "restored session");
            self.phase = state.phase();
            self.state = Some(state);
            return Ok(());
        }

        let puzzle = match puzzles.get_puzzle(&key) {
            Ok(Some(puzzle)) if puzzle.groups.is_empty() => {
                Err(SessionError::EmptyPuzzle { day: key.clone() })
            }
            Ok(Some(puzzle)) => Ok(puzzle),
            Ok(None) => Err(SessionError::NoPuzzle { day: key.clone() }),
            Err(source) => Err(SessionError::Store {
                day: key.clone(),
                source,
            }),
        };

        let puzzle = match puzzle {
            Ok(puzzle) => puzzle,
            Err(err) => {
                tracing::error!(day = %key, error = %err, "puzzle unavailable");
                self.phase = Phase::Unavailable;
                self.state = None;
                return Err(err);
            }
        };

        if puzzle.is_degraded() {
            tracing::warn!(day = %key, groups = puzzle.groups.len(), "starting a degraded puzzle");
        }

        self.state = Some(SessionState::fresh(&key, &puzzle, rng));
        self.phase = Phase::InProgress;
        // Persist now so the shuffled board survives a reload.
        self.persist();
        tracing::info!(day = %key, number = puzzle.number, "started new session");
        Ok(())
    }

    /// Stored state for `key`, if present, parseable and dated for that day
    fn restore(&self, key: &str) -> Option<SessionState> {
        let blob = match self.store.load_session(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(day = %key, error = %err, "session store unreadable, starting fresh");
                return None;
            }
        };

        let mut state: SessionState = match serde_json::from_str(&blob) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(day = %key, error = %err, "discarding corrupt session");
                return None;
            }
        };

        if state.date != key {
            tracing::debug!(day = %key, stored = %state.date, "discarding session from another day");
            return None;
        }
        if state.puzzle_groups.is_empty() {
            tracing::warn!(day = %key, "discarding session without puzzle groups");
            return None;
        }

        state.mistakes_remaining = state.mistakes_remaining.min(STARTING_MISTAKES);
        Some(state)
    }

    fn persist(&self) {
        let Some(state) = &self.state else {
            return;
        };
        let blob = match serde_json::to_string(state) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::error!(day = %state.date, error = %err, "failed to serialize session");
                return;
            }
        };
        if let Err(err) = self.store.save_session(&state.date, &blob) {
            tracing::error!(
                day = %state.date,
                backend = self.store.backend_name(),
                error = %err,
                "failed to persist session"
            );
        }
    }

    fn in_progress_state(&self) -> Option<&SessionState> {
        match self.phase {
            Phase::InProgress => self.state.as_ref(),
            _ => None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.iter().any(|s| s == name)
    }

    /// Toggle `name` in the selection. Returns true if the selection changed.
    pub fn select_item(&mut self, name: &str) -> bool {
        let Some(state) = self.in_progress_state() else {
            return false;
        };

        if let Some(pos) = self.selection.iter().position(|s| s == name) {
            self.selection.remove(pos);
            return true;
        }

        let on_board = state.unsolved_items().any(|item| item.name == name);
        if !on_board || self.selection.len() >= GROUP_SIZE {
            return false;
        }
        self.selection.push(name.to_string());
        true
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    pub fn can_submit(&self) -> bool {
        self.in_progress_state().is_some() && self.selection.len() == GROUP_SIZE
    }

    /// Check the current selection against the unsolved groups.
    ///
    /// Returns `None` when submitting is disabled.
    pub fn submit(&mut self) -> Option<GuessOutcome> {
        if !self.can_submit() {
            return None;
        }
        let selection = std::mem::take(&mut self.selection);
        let state = self.state.as_mut()?;

        let hit = state
            .unsolved_groups()
            .find(|g| g.matches_names(&selection))
            .cloned();

        let outcome = match hit {
            Some(group) => {
                let glyph = group.color.glyph().to_string().repeat(GROUP_SIZE);
                state.summary.push_str(&glyph);
                state.summary.push('\n');
                state.solved_groups.push(group.clone());

                let won = state.unsolved_groups().next().is_none();
                if won {
                    state.finished = true;
                    let line = state.score_line();
                    state.summary.push_str(&line);
                    self.phase = Phase::Won;
                }
                tracing::debug!(category = %group.category(), won, "correct guess");
                GuessOutcome::Correct { group, won }
            }
            None => {
                state.mistakes_remaining = state.mistakes_remaining.saturating_sub(1);
                let lost = state.mistakes_remaining == 0;
                if lost {
                    let remaining: Vec<Group> = state.unsolved_groups().cloned().collect();
                    for group in remaining {
                        state.summary.push_str(LOST_ROW);
                        state.solved_groups.push(group);
                    }
                    state.finished = true;
                    let line = state.score_line();
                    state.summary.push_str(&line);
                    self.phase = Phase::Lost;
                }
                tracing::debug!(mistakes_remaining = state.mistakes_remaining, lost, "incorrect guess");
                GuessOutcome::Incorrect {
                    rejected: selection,
                    mistakes_remaining: state.mistakes_remaining,
                    lost,
                }
            }
        };

        self.persist();
        Some(outcome)
    }

    /// Whether hint `slot` may be revealed now
    pub fn can_reveal_hint(&self, slot: usize) -> bool {
        let Some(state) = self.in_progress_state() else {
            return false;
        };
        if slot >= HINT_SLOTS || state.hints()[slot] {
            return false;
        }
        // Hint i unlocks once mistakes remaining drop to 3 - i.
        let unlocked = usize::from(state.mistakes_remaining) + slot <= HINT_SLOTS;
        unlocked && state.unsolved_groups().nth(slot).is_some()
    }

    /// Reveal hint `slot`. Returns the hinted group's category.
    pub fn reveal_hint(&mut self, slot: usize) -> Option<String> {
        if !self.can_reveal_hint(slot) {
            return None;
        }
        let state = self.state.as_mut()?;
        *state.hint_mut(slot)? = true;
        let label = state.unsolved_groups().nth(slot)?.category().to_string();
        tracing::debug!(slot, category = %label, "revealed hint");
        self.persist();
        Some(label)
    }

    pub fn hints_used(&self) -> usize {
        self.state.as_ref().map_or(0, SessionState::hints_used)
    }

    pub fn mistakes_remaining(&self) -> u8 {
        self.state.as_ref().map_or(STARTING_MISTAKES, |s| s.mistakes_remaining)
    }

    pub fn mistakes_made(&self) -> u8 {
        self.state.as_ref().map_or(0, SessionState::mistakes_made)
    }

    pub fn unsolved_groups(&self) -> Vec<&Group> {
        self.state
            .as_ref()
            .map(|s| s.unsolved_groups().collect())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.summary.as_str())
    }

    /// Snapshot for rendering
    pub fn view(&self) -> ViewModel {
        let Some(state) = &self.state else {
            return ViewModel {
                phase: self.phase,
                puzzle_number: 0,
                solved: Vec::new(),
                board: Vec::new(),
                mistakes_remaining: STARTING_MISTAKES,
                hints: Vec::new(),
                can_submit: false,
                finished: false,
                summary: String::new(),
            };
        };

        let solved = state
            .solved_groups
            .iter()
            .map(|g| SolvedRow {
                category: g.category().to_string(),
                explanation: g.explanation(),
                color: g.color,
                names: g.names().into_iter().map(str::to_string).collect(),
            })
            .collect();

        let board = state
            .unsolved_items()
            .map(|item| Tile {
                item: item.clone(),
                selected: self.is_selected(&item.name),
            })
            .collect();

        let flags = state.hints();
        let hints = (0..HINT_SLOTS)
            .map(|slot| HintView {
                slot,
                available: self.can_reveal_hint(slot),
                revealed: flags[slot],
                label: flags[slot]
                    .then(|| state.unsolved_groups().nth(slot))
                    .flatten()
                    .map(|g| g.category().to_string()),
            })
            .collect();

        ViewModel {
            phase: self.phase,
            puzzle_number: state.puzzle_number,
            solved,
            board,
            mistakes_remaining: state.mistakes_remaining,
            hints,
            can_submit: self.can_submit(),
            finished: state.finished,
            summary: state.summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Quality;
    use crate::rules::{MatchOp, Rule};
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CATEGORIES: [&str; 4] = ["Manufacturer", "Country", "Seating Type", "Model"];

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
    }

    fn group(slot: usize) -> Group {
        let category = CATEGORIES[slot];
        Group {
            rule: Rule::new(Quality::Manufacturer, MatchOp::Equals, ["X"], category, "All %replace%."),
            value: format!("value {slot}").into(),
            items: (0..GROUP_SIZE)
                .map(|i| Item::new(format!("{slot}-{i}"), format!("G{slot} Coaster {i}")))
                .collect(),
            color: CategoryColor::for_slot(slot),
        }
    }

    fn puzzle_with(groups: usize) -> Puzzle {
        Puzzle {
            number: 42,
            created: day(),
            groups: (0..groups).map(group).collect(),
        }
    }

    fn puzzles_with(groups: usize) -> MemoryStore {
        let store = MemoryStore::new();
        store.create_puzzle(&day_key(day()), &puzzle_with(groups)).unwrap();
        store
    }

    fn names(slot: usize) -> Vec<String> {
        (0..GROUP_SIZE).map(|i| format!("G{slot} Coaster {i}")).collect()
    }

    fn started(groups: usize) -> Session<MemoryStore> {
        let mut session = Session::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(7);
        session.load(day(), &puzzles_with(groups), &mut rng).unwrap();
        session
    }

    fn select_all(session: &mut Session<MemoryStore>, names: &[String]) {
        for name in names {
            assert!(session.select_item(name), "could not select {name}");
        }
    }

    /// Three names from the first group and one from the third.
    fn wrong_guess() -> Vec<String> {
        let mut guess = names(0)[..3].to_vec();
        guess.push(names(2)[0].clone());
        guess
    }

    #[test]
    fn test_new_session_is_not_started() {
        let session = Session::new(MemoryStore::new());
        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(session.summary().is_none());
        assert_eq!(session.view().board.len(), 0);
    }

    #[test]
    fn test_fresh_session() {
        let session = started(4);
        assert_eq!(session.phase(), Phase::InProgress);

        let state = session.state().unwrap();
        assert_eq!(state.date, "2025-08-20");
        assert_eq!(state.mistakes_remaining, STARTING_MISTAKES);
        assert_eq!(state.board.len(), 16);
        assert_eq!(state.hints(), [false; HINT_SLOTS]);
        assert_eq!(state.summary, "Coaster Connections #42\n");
        assert_eq!(state.puzzle_number, 42);

        // Persisted right away so the board layout is stable.
        let blob = session.store().load_session("2025-08-20").unwrap();
        assert!(blob.is_some());
    }

    #[test]
    fn test_selection_capacity_and_toggle() {
        let mut session = started(4);
        let all = names(0);
        select_all(&mut session, &all);
        assert!(session.can_submit());

        assert!(!session.select_item(&names(1)[0]));
        assert_eq!(session.selection().len(), 4);

        assert!(session.select_item(&all[2]));
        assert!(!session.is_selected(&all[2]));
        assert!(!session.can_submit());
        assert!(session.submit().is_none());

        assert!(!session.select_item("Not A Coaster"));
        session.deselect_all();
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_correct_guess_costs_nothing() {
        let mut session = started(4);
        select_all(&mut session, &names(2));

        let outcome = session.submit().unwrap();
        match outcome {
            GuessOutcome::Correct { group, won } => {
                assert_eq!(group.category(), "Seating Type");
                assert!(!won);
            }
            other => panic!("expected correct guess, got {other:?}"),
        }
        assert_eq!(session.mistakes_remaining(), STARTING_MISTAKES);
        assert!(session.selection().is_empty());

        let view = session.view();
        assert_eq!(view.solved.len(), 1);
        assert_eq!(view.board.len(), 12);
        assert_eq!(view.summary, "Coaster Connections #42\n🟦🟦🟦🟦\n");

        // Solved names are off the board.
        assert!(!session.select_item(&names(2)[0]));
    }

    #[test]
    fn test_incorrect_guess_costs_one() {
        let mut session = started(4);
        let guess = wrong_guess();
        select_all(&mut session, &guess);

        let outcome = session.submit().unwrap();
        assert_eq!(
            outcome,
            GuessOutcome::Incorrect {
                rejected: guess,
                mistakes_remaining: 4,
                lost: false,
            }
        );
        assert!(session.unsolved_groups().len() == 4);
        assert!(session.selection().is_empty());
        assert_eq!(session.summary(), Some("Coaster Connections #42\n"));
    }

    #[test]
    fn test_win_keeps_mistakes() {
        let mut session = started(4);
        select_all(&mut session, &wrong_guess());
        session.submit();

        for slot in [3, 0, 1, 2] {
            select_all(&mut session, &names(slot));
            let outcome = session.submit().unwrap();
            assert!(matches!(outcome, GuessOutcome::Correct { won, .. } if won == (slot == 2)));
        }

        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(session.mistakes_remaining(), 4);
        assert_eq!(
            session.summary().unwrap(),
            "Coaster Connections #42\n🟪🟪🟪🟪\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟦🟦🟦\nMistakes: 1 | Hints Used: 0"
        );

        let view = session.view();
        assert!(view.finished);
        assert!(view.board.is_empty());
        assert_eq!(view.solved[0].category, "Model");

        // Terminal: nothing else can change the state.
        assert!(!session.select_item(&names(0)[0]));
        assert!(!session.can_reveal_hint(0));
    }

    #[test]
    fn test_correct_then_misses_until_lost() {
        let mut session = started(4);
        select_all(&mut session, &names(1));
        session.submit();

        for expected in (0..STARTING_MISTAKES).rev() {
            select_all(&mut session, &wrong_guess());
            let outcome = session.submit().unwrap();
            assert!(matches!(
                outcome,
                GuessOutcome::Incorrect { mistakes_remaining, lost, .. }
                    if mistakes_remaining == expected && lost == (expected == 0)
            ));
        }

        assert_eq!(session.phase(), Phase::Lost);
        let state = session.state().unwrap();
        assert!(state.finished);
        assert_eq!(state.solved_groups.len(), 4);
        // Remaining groups are revealed in puzzle order after the one that was found.
        let order: Vec<&str> = state.solved_groups.iter().map(|g| g.category()).collect();
        assert_eq!(order, ["Country", "Manufacturer", "Seating Type", "Model"]);
        assert_eq!(
            state.summary,
            "Coaster Connections #42\n🟩🟩🟩🟩\n⬛⬛⬛⬛\n⬛⬛⬛⬛\n⬛⬛⬛⬛\nMistakes: 5 | Hints Used: 0"
        );
        assert!(session.submit().is_none());
    }

    #[test]
    fn test_hint_thresholds() {
        let mut session = started(4);
        assert!((0..HINT_SLOTS).all(|slot| !session.can_reveal_hint(slot)));

        select_all(&mut session, &wrong_guess());
        session.submit();
        select_all(&mut session, &wrong_guess());
        session.submit();
        // Three mistakes left: only the first hint is open.
        assert!(session.can_reveal_hint(0));
        assert!(!session.can_reveal_hint(1));

        assert_eq!(session.reveal_hint(0).as_deref(), Some("Manufacturer"));
        assert!(!session.can_reveal_hint(0));
        assert!(session.reveal_hint(0).is_none());

        select_all(&mut session, &wrong_guess());
        session.submit();
        assert!(session.can_reveal_hint(1));
        assert!(!session.can_reveal_hint(2));

        select_all(&mut session, &wrong_guess());
        session.submit();
        assert!(session.can_reveal_hint(2));
        assert_eq!(session.reveal_hint(2).as_deref(), Some("Seating Type"));
        assert_eq!(session.hints_used(), 2);
        assert!(!session.can_reveal_hint(HINT_SLOTS));

        let hints = session.view().hints;
        assert_eq!(hints[0].label.as_deref(), Some("Manufacturer"));
        assert!(hints[1].available);
        assert_eq!(hints[1].label, None);
    }

    #[test]
    fn test_hint_needs_an_unsolved_group() {
        let mut session = started(2);
        let mut mixed = names(0)[..2].to_vec();
        mixed.extend_from_slice(&names(1)[..2]);
        for _ in 0..4 {
            select_all(&mut session, &mixed);
            session.submit();
        }
        assert_eq!(session.mistakes_remaining(), 1);
        assert!(session.can_reveal_hint(1));
        assert!(!session.can_reveal_hint(2));
    }

    #[test]
    fn test_degraded_puzzle_wins_early() {
        let mut session = started(2);
        assert_eq!(session.state().unwrap().board.len(), 8);

        select_all(&mut session, &names(0));
        session.submit();
        select_all(&mut session, &names(1));
        let outcome = session.submit().unwrap();
        assert!(matches!(outcome, GuessOutcome::Correct { won: true, .. }));
        assert_eq!(session.phase(), Phase::Won);
    }

    #[test]
    fn test_reload_gives_identical_view() {
        let mut session = started(4);
        select_all(&mut session, &names(3));
        session.submit();
        select_all(&mut session, &wrong_guess());
        session.submit();
        let before = session.view();

        let store = session.into_store();
        let mut reloaded = Session::new(store);
        let mut rng = StdRng::seed_from_u64(999);
        // An empty puzzle store proves nothing is refetched.
        reloaded.load(day(), &MemoryStore::new(), &mut rng).unwrap();

        assert_eq!(reloaded.view(), before);
        assert_eq!(reloaded.phase(), Phase::InProgress);
    }

    #[test]
    fn test_reload_finished_session() {
        let mut session = started(4);
        for _ in 0..STARTING_MISTAKES {
            select_all(&mut session, &wrong_guess());
            session.submit();
        }
        let store = session.into_store();

        let mut reloaded = Session::new(store);
        reloaded
            .load(day(), &MemoryStore::new(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(reloaded.phase(), Phase::Lost);
        assert!(reloaded.view().finished);
    }

    #[test]
    fn test_corrupt_blob_starts_fresh() {
        let store = MemoryStore::new();
        store.save_session("2025-08-20", "{ not json").unwrap();

        let mut session = Session::new(store);
        session
            .load(day(), &puzzles_with(4), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.mistakes_remaining(), STARTING_MISTAKES);
        assert_eq!(session.state().unwrap().board.len(), 16);
    }

    #[test]
    fn test_blob_for_other_day_is_ignored() {
        let mut session = started(4);
        select_all(&mut session, &wrong_guess());
        session.submit();
        let store = session.into_store();

        let blob = store.load_session("2025-08-20").unwrap().unwrap();
        let moved = blob.replace("\"date\":\"2025-08-20\"", "\"date\":\"2025-08-19\"");
        store.save_session("2025-08-20", &moved).unwrap();

        let mut session = Session::new(store);
        session
            .load(day(), &puzzles_with(4), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(session.mistakes_remaining(), STARTING_MISTAKES);
    }

    #[test]
    fn test_blob_uses_camel_case_keys() {
        let session = started(4);
        let blob = session.store().load_session("2025-08-20").unwrap().unwrap();
        for key in [
            "\"date\"",
            "\"solvedGroups\"",
            "\"board\"",
            "\"puzzleGroups\"",
            "\"mistakesRemaining\"",
            "\"hint1\"",
            "\"hint3\"",
            "\"finished\"",
            "\"summary\"",
        ] {
            assert!(blob.contains(key), "blob is missing {key}");
        }
    }

    #[test]
    fn test_missing_puzzle_is_unavailable() {
        let mut session = Session::new(MemoryStore::new());
        let result = session.load(day(), &MemoryStore::new(), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(SessionError::NoPuzzle { .. })));
        assert_eq!(session.phase(), Phase::Unavailable);
        assert!(!session.select_item("anything"));
    }

    #[test]
    fn test_empty_puzzle_is_unavailable() {
        let mut session = Session::new(MemoryStore::new());
        let result = session.load(day(), &puzzles_with(0), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(SessionError::EmptyPuzzle { .. })));
        assert_eq!(session.phase(), Phase::Unavailable);
    }

    #[test]
    fn test_puzzle_store_outage_is_unavailable() {
        let puzzles = puzzles_with(4);
        puzzles.set_available(false);
        let mut session = Session::new(MemoryStore::new());
        let result = session.load(day(), &puzzles, &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(SessionError::Store { .. })));
        assert_eq!(session.phase(), Phase::Unavailable);
    }

    #[test]
    fn test_session_store_outage_keeps_playing() {
        let mut session = started(4);
        session.store().set_available(false);

        select_all(&mut session, &names(0));
        let outcome = session.submit();
        assert!(matches!(outcome, Some(GuessOutcome::Correct { .. })));
        assert_eq!(session.view().solved.len(), 1);
    }
}
