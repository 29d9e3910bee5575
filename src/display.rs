//! Rendering layer — all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! world coordinates into terminal cells and state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use shooting_gallery::entities::{Bullet, Enemy, GalleryState, GameStatus};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_AMMO: Color = Color::Cyan;
const C_HUD_STATS: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_BULLET: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

/// Terminal size in cells.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    /// Map a world position (origin at centre, y up) onto a cell inside the
    /// border.  Columns `1..cols-1`, rows `2..rows-2`.
    fn cell(&self, state: &GalleryState, x: i32, y: i32) -> (u16, u16) {
        let config = &state.config;
        let inner_w = i64::from(self.cols.saturating_sub(2).max(1));
        let inner_h = i64::from(self.rows.saturating_sub(4).max(1));

        let col = i64::from(x - config.min_x()) * inner_w / i64::from(config.arena_width);
        let row = i64::from(config.max_y() - y) * inner_h / i64::from(config.arena_height);

        (
            (col.clamp(0, inner_w - 1) + 1) as u16,
            (row.clamp(0, inner_h - 1) + 2) as u16,
        )
    }

    /// Width in cells of something `world_width` units wide; at least one.
    fn span(&self, state: &GalleryState, world_width: i32) -> u16 {
        let inner_w = i32::from(self.cols.saturating_sub(2));
        (world_width * inner_w / state.config.arena_width).max(1) as u16
    }

    /// Height in cells of something `world_height` units tall; at least one.
    fn tall(&self, state: &GalleryState, world_height: i32) -> u16 {
        let inner_h = i32::from(self.rows.saturating_sub(4));
        (world_height * inner_h / state.config.arena_height).max(1) as u16
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GalleryState, view: Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;

    for enemy in &state.enemies {
        draw_enemy(out, state, view, enemy)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, state, view, bullet)?;
    }
    draw_player(out, state, view)?;

    match state.status {
        GameStatus::Playing => {
            draw_ammo_panel(out, state)?;
            draw_stats_panel(out, state, view)?;
            draw_controls_hint(out, view)?;
        }
        GameStatus::RoundFinished => draw_round_over(out, state, view)?,
        GameStatus::Closed => draw_goodbye(out, state, view)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1 — top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2 — bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── Overlay panels (row 0) ────────────────────────────────────────────────────

fn draw_ammo_panel<W: Write>(out: &mut W, state: &GalleryState) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_AMMO))?;
    out.queue(Print(format!("Bullets: {}", state.player.ammo)))?;
    Ok(())
}

fn draw_stats_panel<W: Write>(
    out: &mut W,
    state: &GalleryState,
    view: Viewport,
) -> std::io::Result<()> {
    let stats = format!("Round: {}   Score: {}", state.game.round, state.game.score);
    let x = view
        .cols
        .saturating_sub(stats.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(x, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STATS))?;
    out.queue(Print(&stats))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GalleryState, view: Viewport) -> std::io::Result<()> {
    // Centred on the player's x:  /▲▲▲\  over as many  /|||\  rows as it is tall
    let p = &state.player;
    let height = state.config.player_height;
    let (col, top) = view.cell(state, p.x, p.y + height / 2);
    let span = view.span(state, state.config.player_width).max(3);
    let left = col.saturating_sub(span / 2).max(1);
    let inner = span as usize - 2;

    out.queue(style::SetForegroundColor(C_PLAYER))?;
    for i in 0..view.tall(state, height) {
        let fill = if i == 0 { "▲" } else { "|" };
        out.queue(cursor::MoveTo(left, top + i))?;
        out.queue(Print(format!("/{}\\", fill.repeat(inner))))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(
    out: &mut W,
    state: &GalleryState,
    view: Viewport,
    enemy: &Enemy,
) -> std::io::Result<()> {
    // Centred on the enemy's x:  <▼▼>
    let (col, top) = view.cell(state, enemy.x, enemy.y + enemy.height / 2);
    let span = view.span(state, enemy.width).max(3);
    let sprite = format!("<{}>", "▼".repeat(span as usize - 2));
    let left = col.saturating_sub(span / 2).max(1);

    out.queue(style::SetForegroundColor(C_ENEMY))?;
    for i in 0..view.tall(state, enemy.height) {
        out.queue(cursor::MoveTo(left, top + i))?;
        out.queue(Print(&sprite))?;
    }
    Ok(())
}

fn draw_bullet<W: Write>(
    out: &mut W,
    state: &GalleryState,
    view: Viewport,
    bullet: &Bullet,
) -> std::io::Result<()> {
    let (col, row) = view.cell(state, bullet.x, bullet.y);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_BULLET))?;
    out.queue(Print("║"))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── End-of-round and goodbye overlays ─────────────────────────────────────────

fn draw_round_over<W: Write>(
    out: &mut W,
    state: &GalleryState,
    view: Viewport,
) -> std::io::Result<()> {
    let title = format!("║   ROUND {:<3} OVER   ║", state.game.round);
    let score_line = format!("Final Score: {}", state.game.score);
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        (&title, Color::Red),
        ("╚════════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        ("ENTER - Next Round   C - Close Game", Color::White),
    ];
    draw_centered(out, view, lines)
}

fn draw_goodbye<W: Write>(out: &mut W, state: &GalleryState, view: Viewport) -> std::io::Result<()> {
    let message = format!(
        "You have finished the game. Your score is: {}",
        state.game.score
    );
    let lines: &[(&str, Color)] = &[
        (&message, Color::Yellow),
        ("Press any key to exit", Color::White),
    ];
    draw_centered(out, view, lines)
}

fn draw_centered<W: Write>(
    out: &mut W,
    view: Viewport,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
