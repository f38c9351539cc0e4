use crate::config::ThemeName;
use crate::theme::Theme;
use coaster_core::{GuessOutcome, Phase, Session, SessionStore, ViewModel, GROUP_SIZE, HINT_SLOTS};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Duration;

/// Tiles per board row
pub const BOARD_COLUMNS: usize = GROUP_SIZE;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Board and controls
    Playing,
    /// Stat card for the tile under the cursor
    Detail,
    /// Win/loss banner and the shareable summary
    Result,
}

/// The main application state
pub struct App<S: SessionStore> {
    pub session: Session<S>,
    /// Index into the unsolved board
    pub cursor: usize,
    pub theme: Theme,
    theme_name: ThemeName,
    /// Message to display
    pub message: Option<String>,
    /// Message timer
    message_timer: u32,
    pub screen_state: ScreenState,
    /// Names from the last rejected guess, flashed briefly
    pub rejected: Vec<String>,
    rejected_timer: u32,
}

impl<S: SessionStore> App<S> {
    pub fn new(session: Session<S>, theme_name: ThemeName) -> Self {
        let screen_state = if session.phase().is_finished() {
            ScreenState::Result
        } else {
            ScreenState::Playing
        };
        Self {
            session,
            cursor: 0,
            theme: Theme::named(theme_name),
            theme_name,
            message: None,
            message_timer: 0,
            screen_state,
            rejected: Vec::new(),
            rejected_timer: 0,
        }
    }

    pub fn get_tick_rate(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
        if self.rejected_timer > 0 {
            self.rejected_timer -= 1;
            if self.rejected_timer == 0 {
                self.rejected.clear();
            }
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms poll
    }

    pub fn view(&self) -> ViewModel {
        self.session.view()
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.session.phase() == Phase::Unavailable {
            return match key.code {
                KeyCode::Char('q') | KeyCode::Esc => AppAction::Quit,
                _ => AppAction::Continue,
            };
        }

        match self.screen_state {
            ScreenState::Playing => self.handle_game_key(key),
            ScreenState::Detail => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q')) {
                    self.screen_state = ScreenState::Playing;
                }
                AppAction::Continue
            }
            ScreenState::Result => match key.code {
                KeyCode::Char('q') => AppAction::Quit,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('s') => {
                    self.screen_state = ScreenState::Playing;
                    AppAction::Continue
                }
                _ => AppAction::Continue,
            },
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),

            KeyCode::Char(' ') => self.toggle_at_cursor(),
            KeyCode::Enter => self.submit(),
            KeyCode::Char('d') => {
                self.session.deselect_all();
            }

            KeyCode::Char(c @ '1'..='3') => {
                let slot = c as usize - '1' as usize;
                self.reveal_hint(slot);
            }

            KeyCode::Char('i') => {
                if self.tile_name_at_cursor().is_some() {
                    self.screen_state = ScreenState::Detail;
                }
            }
            KeyCode::Char('s') => {
                if self.session.phase().is_finished() {
                    self.screen_state = ScreenState::Result;
                } else {
                    self.show_message("Finish the puzzle to see your result");
                }
            }
            KeyCode::Char('t') => {
                self.theme_name = match self.theme_name {
                    ThemeName::Dark => ThemeName::Light,
                    ThemeName::Light => ThemeName::Dark,
                };
                self.theme = Theme::named(self.theme_name);
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn board_len(&self) -> usize {
        self.session
            .state()
            .map_or(0, |state| state.unsolved_items().count())
    }

    fn move_cursor(&mut self, row_delta: i32, col_delta: i32) {
        let len = self.board_len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let rows = len.div_ceil(BOARD_COLUMNS) as i32;
        let row = (self.cursor / BOARD_COLUMNS) as i32;
        let col = (self.cursor % BOARD_COLUMNS) as i32;

        let new_row = (row + row_delta).clamp(0, rows - 1) as usize;
        let new_col = (col + col_delta).clamp(0, BOARD_COLUMNS as i32 - 1) as usize;
        self.cursor = (new_row * BOARD_COLUMNS + new_col).min(len - 1);
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.board_len().saturating_sub(1));
    }

    /// Name of the unsolved tile under the cursor
    pub fn tile_name_at_cursor(&self) -> Option<String> {
        self.session
            .state()?
            .unsolved_items()
            .nth(self.cursor)
            .map(|item| item.name.clone())
    }

    fn toggle_at_cursor(&mut self) {
        let Some(name) = self.tile_name_at_cursor() else {
            return;
        };
        if !self.session.select_item(&name) && !self.session.is_selected(&name) {
            self.show_message(&format!("You can only pick {GROUP_SIZE}"));
        }
    }

    fn submit(&mut self) {
        if !self.session.can_submit() {
            self.show_message(&format!("Select {GROUP_SIZE} coasters first"));
            return;
        }
        match self.session.submit() {
            Some(GuessOutcome::Correct { group, won }) => {
                self.clamp_cursor();
                if won {
                    self.screen_state = ScreenState::Result;
                    self.show_message("You Won!");
                } else {
                    self.show_message(&format!("{}: {}", group.category(), group.explanation()));
                }
            }
            Some(GuessOutcome::Incorrect {
                rejected,
                mistakes_remaining,
                lost,
            }) => {
                self.rejected = rejected;
                self.rejected_timer = 4;
                if lost {
                    self.clamp_cursor();
                    self.screen_state = ScreenState::Result;
                    self.show_message("You Lost!");
                } else {
                    self.show_message(&format!(
                        "Not a group! {} {} left",
                        mistakes_remaining,
                        if mistakes_remaining == 1 { "mistake" } else { "mistakes" }
                    ));
                }
            }
            None => {}
        }
    }

    fn reveal_hint(&mut self, slot: usize) {
        if slot >= HINT_SLOTS {
            return;
        }
        match self.session.reveal_hint(slot) {
            Some(label) => self.show_message(&format!("Hint {}: {}", slot + 1, label)),
            None => {
                let revealed = self
                    .session
                    .state()
                    .is_some_and(|state| state.hints()[slot]);
                if revealed {
                    self.show_message("Hint already revealed");
                } else {
                    self.show_message(&format!(
                        "Hint {} unlocks at {} mistakes left",
                        slot + 1,
                        HINT_SLOTS - slot
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use coaster_core::{
        day_key, CategoryColor, Group, Item, MatchOp, MemoryStore, Puzzle, PuzzleStore, Quality, Rule,
    };
    use crossterm::event::KeyModifiers;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn press(app: &mut App<MemoryStore>, code: KeyCode) -> AppAction {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn puzzle() -> Puzzle {
        let categories = ["Park", "Country", "Model", "Inversions"];
        Puzzle {
            number: 12,
            created: NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
            groups: (0..4)
                .map(|slot| Group {
                    rule: Rule::new(Quality::ParkName, MatchOp::Equals, ["P"], categories[slot], "%replace%"),
                    value: "P".into(),
                    items: (0..4)
                        .map(|i| Item::new(format!("{slot}{i}"), format!("Ride {slot}-{i}")))
                        .collect(),
                    color: CategoryColor::for_slot(slot),
                })
                .collect(),
        }
    }

    fn app() -> App<MemoryStore> {
        let day = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        let puzzles = MemoryStore::new();
        puzzles.create_puzzle(&day_key(day), &puzzle()).unwrap();

        let mut session = Session::new(MemoryStore::new());
        session
            .load(day, &puzzles, &mut StdRng::seed_from_u64(5))
            .unwrap();
        App::new(session, ThemeName::Dark)
    }

    /// Move the cursor onto `name` and press space.
    fn pick(app: &mut App<MemoryStore>, name: &str) {
        let index = app
            .view()
            .board
            .iter()
            .position(|t| t.item.name == name)
            .unwrap();
        app.cursor = index;
        press(app, KeyCode::Char(' '));
    }

    fn group_names(slot: usize) -> Vec<String> {
        (0..4).map(|i| format!("Ride {slot}-{i}")).collect()
    }

    #[test]
    fn test_cursor_stays_on_board() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.cursor, 0);

        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.cursor, 15);

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.cursor, 11);
    }

    #[test]
    fn test_space_toggles_selection() {
        let mut app = app();
        let name = app.tile_name_at_cursor().unwrap();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.session.is_selected(&name));
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.session.is_selected(&name));

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('d'));
        assert!(app.session.selection().is_empty());
    }

    #[test]
    fn test_submit_needs_four() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.message.as_deref(), Some("Select 4 coasters first"));
        assert_eq!(app.session.mistakes_remaining(), 5);
    }

    #[test]
    fn test_correct_group_shrinks_board() {
        let mut app = app();
        for name in group_names(1) {
            pick(&mut app, &name);
        }
        app.cursor = 15;
        press(&mut app, KeyCode::Enter);

        let view = app.view();
        assert_eq!(view.solved.len(), 1);
        assert_eq!(view.board.len(), 12);
        assert_eq!(app.cursor, 11);
        assert!(app.message.as_deref().unwrap().starts_with("Country"));
    }

    #[test]
    fn test_wrong_guess_flashes_and_expires() {
        let mut app = app();
        let mut guess = group_names(0)[..3].to_vec();
        guess.push(group_names(3)[0].clone());
        for name in &guess {
            pick(&mut app, name);
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.rejected.len(), 4);
        assert_eq!(app.message.as_deref(), Some("Not a group! 4 mistakes left"));
        for _ in 0..4 {
            app.tick();
        }
        assert!(app.rejected.is_empty());
    }

    #[test]
    fn test_hint_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.message.as_deref(), Some("Hint 1 unlocks at 3 mistakes left"));

        let mut guess = group_names(0)[..2].to_vec();
        guess.extend(group_names(2)[..2].iter().cloned());
        for _ in 0..2 {
            for name in &guess {
                pick(&mut app, name);
            }
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.message.as_deref(), Some("Hint 1: Park"));
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.message.as_deref(), Some("Hint already revealed"));
    }

    #[test]
    fn test_win_shows_result() {
        let mut app = app();
        for slot in 0..4 {
            for name in group_names(slot) {
                pick(&mut app, &name);
            }
            press(&mut app, KeyCode::Enter);
        }
        assert_eq!(app.screen_state, ScreenState::Result);
        assert_eq!(app.session.phase(), Phase::Won);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen_state, ScreenState::Playing);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen_state, ScreenState::Result);
        assert!(matches!(press(&mut app, KeyCode::Char('q')), AppAction::Quit));
    }

    #[test]
    fn test_detail_screen() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.screen_state, ScreenState::Detail);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen_state, ScreenState::Playing);
    }

    #[test]
    fn test_unavailable_only_quits() {
        let mut session = Session::new(MemoryStore::new());
        let day = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        let _ = session.load(day, &MemoryStore::new(), &mut StdRng::seed_from_u64(1));
        let mut app = App::new(session, ThemeName::Light);

        assert!(matches!(press(&mut app, KeyCode::Char(' ')), AppAction::Continue));
        assert!(matches!(press(&mut app, KeyCode::Char('q')), AppAction::Quit));
    }
}
