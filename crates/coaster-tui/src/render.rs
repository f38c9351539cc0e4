use crate::app::{App, ScreenState, BOARD_COLUMNS};
use coaster_core::{Phase, SessionStore, ViewModel, STARTING_MISTAKES};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io;

/// Characters per tile, borders excluded
const TILE_WIDTH: usize = 18;
/// Board width: four tiles plus single-space gaps
const BOARD_WIDTH: u16 = (TILE_WIDTH as u16 + 1) * BOARD_COLUMNS as u16 - 1;

pub fn render<S: SessionStore>(stdout: &mut io::Stdout, app: &App<S>) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;
    let view = app.view();

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    if view.phase == Phase::Unavailable {
        render_unavailable(stdout, app, term_width, term_height)?;
    } else {
        match app.screen_state {
            ScreenState::Playing => render_game_screen(stdout, app, &view, term_width, term_height)?,
            ScreenState::Detail => render_detail(stdout, app, term_width, term_height)?,
            ScreenState::Result => render_result(stdout, app, &view, term_width, term_height)?,
        }
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn render_game_screen<S: SessionStore>(
    stdout: &mut io::Stdout,
    app: &App<S>,
    view: &ViewModel,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let x = term_width.saturating_sub(BOARD_WIDTH) / 2;
    let mut y = if term_height > 28 { 2 } else { 1 };

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print(format!("═══ COASTER CONNECTIONS #{} ═══", view.puzzle_number)),
        MoveTo(x, y + 1),
        SetForegroundColor(theme.info),
        Print("Create four groups of four!")
    )?;
    y += 3;

    // Solved rows, one line of color per group
    for row in &view.solved {
        let bg = theme.group_color(row.color);
        let title = pad(&row.category.to_uppercase(), BOARD_WIDTH as usize);
        let names = pad(&row.names.join(", "), BOARD_WIDTH as usize);
        execute!(
            stdout,
            MoveTo(x, y),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.solved_fg),
            Print(title),
            MoveTo(x, y + 1),
            Print(names),
            SetBackgroundColor(theme.bg)
        )?;
        y += 3;
    }

    // Unsolved tiles
    for (i, tile) in view.board.iter().enumerate() {
        let col = (i % BOARD_COLUMNS) as u16;
        let row = (i / BOARD_COLUMNS) as u16;
        let tx = x + col * (TILE_WIDTH as u16 + 1);
        let ty = y + row * 3;

        let flashing = app.rejected.contains(&tile.item.name);
        let bg = if tile.selected {
            theme.selected_bg
        } else {
            theme.tile_bg
        };
        let fg = if flashing { theme.error } else { theme.fg };
        let edge = if i == app.cursor { theme.cursor } else { bg };

        execute!(
            stdout,
            MoveTo(tx, ty),
            SetBackgroundColor(bg),
            SetForegroundColor(edge),
            Print(if i == app.cursor { "▔".repeat(TILE_WIDTH) } else { " ".repeat(TILE_WIDTH) }),
            MoveTo(tx, ty + 1),
            SetForegroundColor(fg),
            Print(center(&tile.item.name, TILE_WIDTH)),
            SetBackgroundColor(theme.bg)
        )?;
    }
    let rows = view.board.len().div_ceil(BOARD_COLUMNS) as u16;
    y += rows * 3 + 1;

    // Mistakes
    let dots: String = (0..STARTING_MISTAKES)
        .map(|i| if i < view.mistakes_remaining { "● " } else { "○ " })
        .collect();
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.info),
        Print("Mistakes Remaining: "),
        SetForegroundColor(theme.mistake),
        Print(dots)
    )?;
    y += 2;

    // Hints
    for hint in &view.hints {
        let (text, color) = match (&hint.label, hint.available) {
            (Some(label), _) => (label.clone(), theme.success),
            (None, true) => ("press to reveal".to_string(), theme.key),
            (None, false) => ("locked".to_string(), theme.info),
        };
        execute!(
            stdout,
            MoveTo(x + hint.slot as u16 * 26, y),
            SetForegroundColor(theme.key),
            Print(format!("[{}] ", hint.slot + 1)),
            SetForegroundColor(color),
            Print(format!("Hint: {}", truncate(&text, 18)))
        )?;
    }
    y += 2;

    render_controls(stdout, app, x, y)
}

fn render_controls<S: SessionStore>(
    stdout: &mut io::Stdout,
    app: &App<S>,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Space", "Select"),
        ("Enter", "Submit"),
        ("d", "Deselect all"),
        ("1-3", "Hint"),
        ("i", "Coaster info"),
        ("s", "Result"),
        ("t", "Theme"),
        ("q", "Quit"),
    ];

    // Three columns of three
    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        let cx = x + (col as u16) * 26;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_detail<S: SessionStore>(
    stdout: &mut io::Stdout,
    app: &App<S>,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let Some(item) = app.tile_name_at_cursor().and_then(|name| {
        app.session
            .state()
            .and_then(|state| state.board.iter().find(|i| i.name == name).cloned())
    }) else {
        return Ok(());
    };

    let lines = item.stat_lines();
    let box_width: u16 = 48;
    let box_height = lines.len() as u16 + 5;
    let x = term_width.saturating_sub(box_width) / 2;
    let y = term_height.saturating_sub(box_height) / 2;

    execute!(
        stdout,
        MoveTo(x + 2, y + 1),
        SetForegroundColor(theme.key),
        Print(truncate(&item.name, box_width as usize - 4))
    )?;
    for (i, line) in lines.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x + 2, y + 3 + i as u16),
            SetForegroundColor(theme.fg),
            Print(truncate(line, box_width as usize - 4))
        )?;
    }
    execute!(
        stdout,
        MoveTo(x + 2, y + box_height),
        SetForegroundColor(theme.info),
        Print("Esc to return")
    )?;
    Ok(())
}

fn render_result<S: SessionStore>(
    stdout: &mut io::Stdout,
    app: &App<S>,
    view: &ViewModel,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let (title, color) = match view.phase {
        Phase::Won => ("You Won!", theme.success),
        Phase::Lost => ("You Lost!", theme.error),
        _ => ("Keep going!", theme.info),
    };

    let lines: Vec<&str> = view.summary.lines().collect();
    let box_height = lines.len() as u16 + 6 + view.solved.len() as u16;
    let x = term_width.saturating_sub(BOARD_WIDTH) / 2;
    let mut y = term_height.saturating_sub(box_height) / 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(color),
        Print(title)
    )?;
    y += 2;

    for row in &view.solved {
        execute!(
            stdout,
            MoveTo(x, y),
            SetForegroundColor(theme.group_color(row.color)),
            Print(truncate(&row.explanation, BOARD_WIDTH as usize))
        )?;
        y += 1;
    }
    y += 1;

    for line in lines {
        execute!(stdout, MoveTo(x, y), SetForegroundColor(theme.fg), Print(line))?;
        y += 1;
    }

    execute!(
        stdout,
        MoveTo(x, y + 1),
        SetForegroundColor(theme.info),
        Print("Run `coasters share` to print this result. Esc: board  q: quit")
    )?;
    Ok(())
}

fn render_unavailable<S: SessionStore>(
    stdout: &mut io::Stdout,
    app: &App<S>,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let text = "Oh no! Today's puzzle is unavailable.";
    let x = term_width.saturating_sub(text.len() as u16) / 2;
    let y = term_height / 2;
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.error),
        Print(text),
        MoveTo(x, y + 2),
        SetForegroundColor(theme.info),
        Print("Check the log file for details. Press q to quit.")
    )?;
    Ok(())
}

fn render_message<S: SessionStore>(
    stdout: &mut io::Stdout,
    app: &App<S>,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(Color::White),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

/// Cut `text` to at most `width` characters, marking the cut with `…`
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let fill = width.saturating_sub(text.chars().count());
    format!("{}{}", text, " ".repeat(fill))
}

fn center(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let fill = width.saturating_sub(text.chars().count());
    let left = fill / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
}
