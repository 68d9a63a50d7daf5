use core::fmt::Write;
use core::time::Duration;
use demine_core::{CellView, Completion, GameState, StatusSnapshot};

/// Three-digit counter display, clamped like a seven-segment panel.
pub fn format_counter(num: i64) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}.{:01}", secs / 60, secs % 60, elapsed.subsec_millis() / 100)
}

pub const fn glyph(cell: CellView) -> char {
    match cell {
        CellView::Hidden => '#',
        CellView::Flagged => 'F',
        CellView::Revealed(0) => '.',
        CellView::Revealed(count) => (b'0' + count) as char,
        CellView::Mine => '*',
        CellView::Exploded => 'X',
        CellView::IncorrectFlag => '!',
    }
}

const fn state_label(state: GameState) -> &'static str {
    match state {
        GameState::NotStarted => "ready",
        GameState::InProgress => "playing",
        GameState::Won => "cleared!",
        GameState::Lost => "boom",
    }
}

/// Plain-text board: a counter line, then a grid with x along the top and y down the side.
pub fn render_board(snapshot: &StatusSnapshot) -> String {
    let (width, height) = snapshot.size;
    let elapsed_secs = snapshot.elapsed.map_or(0, |elapsed| elapsed.as_secs());
    let cell_width = width.saturating_sub(1).max(height.saturating_sub(1)).to_string().len();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "mines {}  time {}  {}",
        format_counter(snapshot.mines_left.into()),
        format_counter(elapsed_secs.try_into().unwrap_or(i64::MAX)),
        state_label(snapshot.state)
    );

    let _ = write!(out, "{:cell_width$} ", "");
    for x in 0..width {
        let _ = write!(out, " {x:>cell_width$}");
    }
    out.push('\n');

    for y in 0..height {
        let _ = write!(out, "{y:>cell_width$} ");
        for x in 0..width {
            let cell = snapshot.cell((x, y)).unwrap_or_default();
            let _ = write!(out, " {:>cell_width$}", glyph(cell));
        }
        out.push('\n');
    }
    out
}

pub fn render_scores(mines: u16, records: &[Completion]) -> String {
    if records.is_empty() {
        return format!("No records yet for {mines} mines\n");
    }

    let mut out = format!("Best times for {mines} mines:\n");
    for (rank, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:>9}  {}x{}  {}",
            rank + 1,
            format_elapsed(record.elapsed),
            record.size.0,
            record.size.1,
            record.finished_at.format("%Y-%m-%d %H:%M")
        );
    }
    out
}
