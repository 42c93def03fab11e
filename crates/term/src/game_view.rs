//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Color, Position};

const BOARD_BG: Rgb = Rgb::new(24, 26, 36);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

/// Frontend state drawn on top of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub cursor: Option<Position>,
    pub grabbed: Option<Position>,
    pub hint: Option<Position>,
    /// Balloons popping this frame
    pub flash: Vec<Position>,
    /// Stored balance, when a store is attached
    pub balance: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// A lightweight terminal renderer for the balloon board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 compensates for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Board origin plus frame size, in terminal cells.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into an existing framebuffer, reused across frames.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        overlay: &Overlay,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).glyph(' '));

        let board_w = snap.cols as u16 * self.cell_w;
        let board_h = snap.rows as u16 * self.cell_h;
        let w = board_w + 2;
        let h = board_h + 2;
        let frame = Frame {
            x: viewport.width.saturating_sub(w + PANEL_WIDTH) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(h) / 2,
                AnchorY::Top => 0,
            },
            w,
            h,
        };

        fb.fill_rect(frame.x + 1, frame.y + 1, board_w, board_h, ' ', CellStyle::new(BOARD_BG, BOARD_BG));
        draw_border(fb, frame, CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG));

        for row in 0..snap.rows {
            for col in 0..snap.cols {
                let pos = Position::new(row, col);
                self.draw_balloon(fb, frame, pos, snap.cell(row, col), overlay);
            }
        }

        self.draw_side_panel(fb, snap, overlay, adapter, viewport, frame);

        if snap.game_over {
            draw_overlay_text(fb, frame, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, overlay: &Overlay, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, overlay, None, viewport, &mut fb);
        fb
    }

    /// Terminal coordinates of a board cell's top-left corner.
    pub fn cell_origin(&self, snap: &GameSnapshot, viewport: Viewport, pos: Position) -> (u16, u16) {
        let w = snap.cols as u16 * self.cell_w + 2;
        let h = snap.rows as u16 * self.cell_h + 2;
        let x = viewport.width.saturating_sub(w + PANEL_WIDTH) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(h) / 2,
            AnchorY::Top => 0,
        };
        (
            x + 1 + pos.col as u16 * self.cell_w,
            y + 1 + pos.row as u16 * self.cell_h,
        )
    }

    fn draw_balloon(&self, fb: &mut FrameBuffer, frame: Frame, pos: Position, cell: Option<Color>, overlay: &Overlay) {
        let bg = if overlay.grabbed == Some(pos) {
            Rgb::new(120, 100, 30)
        } else if overlay.cursor == Some(pos) {
            Rgb::new(70, 74, 96)
        } else if overlay.hint == Some(pos) {
            Rgb::new(30, 70, 50)
        } else {
            BOARD_BG
        };

        let (ch, style) = if overlay.flash.contains(&pos) {
            ('✸', CellStyle::new(Rgb::new(255, 255, 255), bg).bold())
        } else {
            match cell {
                Some(color) => ('●', CellStyle::new(balloon_rgb(color), bg).bold()),
                None => ('·', CellStyle::new(Rgb::new(90, 90, 100), bg).dim()),
            }
        };

        let px = frame.x + 1 + pos.col as u16 * self.cell_w;
        let py = frame.y + 1 + pos.row as u16 * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
        fb.put_char(px + (self.cell_w - 1) / 2, py + (self.cell_h - 1) / 2, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        overlay: &Overlay,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        frame: Frame,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();

        let mut y = frame.y;
        fb.put_str(panel_x, y, "MODE", label);
        fb.put_str(panel_x, y + 1, snap.mode.as_str(), value);
        y += 3;

        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u32(panel_x, y + 1, snap.score, value);
        if let Some(last) = snap.last_turn.as_ref().filter(|t| t.score_delta > 0) {
            let x = fb.put_str(panel_x, y + 2, "+", dim);
            fb.put_u32(x, y + 2, last.score_delta, dim);
        }
        y += 4;

        fb.put_str(panel_x, y, "TURNS", label);
        fb.put_u32(panel_x, y + 1, snap.turn, value);
        y += 3;

        if let Some(balance) = overlay.balance {
            fb.put_str(panel_x, y, "BALANCE", label);
            fb.put_u64(panel_x, y + 1, balance, value);
            y += 3;
        }

        fb.put_str(panel_x, y, "AI", label);
        match adapter.filter(|a| a.enabled) {
            Some(st) => {
                let x = fb.put_str(panel_x, y + 1, "ON ", value);
                let x = fb.put_u32(x, y + 1, st.client_count as u32, value);
                fb.put_str(x, y + 1, " clients", dim);
                let x = fb.put_str(panel_x, y + 2, "CTRL ", value);
                match st.controller_id {
                    Some(id) => fb.put_u64(x, y + 2, id as u64, value),
                    None => fb.put_str(x, y + 2, "-", value),
                };
            }
            None => {
                fb.put_str(panel_x, y + 1, "OFF", value);
            }
        }
    }
}

const PANEL_WIDTH: u16 = 14;

fn draw_border(fb: &mut FrameBuffer, f: Frame, style: CellStyle) {
    if f.w < 2 || f.h < 2 {
        return;
    }

    fb.put_char(f.x, f.y, '┌', style);
    fb.put_char(f.x + f.w - 1, f.y, '┐', style);
    fb.put_char(f.x, f.y + f.h - 1, '└', style);
    fb.put_char(f.x + f.w - 1, f.y + f.h - 1, '┘', style);

    for dx in 1..f.w - 1 {
        fb.put_char(f.x + dx, f.y, '─', style);
        fb.put_char(f.x + dx, f.y + f.h - 1, '─', style);
    }
    for dy in 1..f.h - 1 {
        fb.put_char(f.x, f.y + dy, '│', style);
        fb.put_char(f.x + f.w - 1, f.y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, f: Frame, text: &str) {
    let mid_y = f.y.saturating_add(f.h / 2);
    let text_w = text.chars().count() as u16;
    let x = f.x.saturating_add(f.w.saturating_sub(text_w) / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
    fb.put_str(x, mid_y, text, style);
}

fn balloon_rgb(color: Color) -> Rgb {
    match color {
        Color::Red => Rgb::new(230, 70, 70),
        Color::Green => Rgb::new(90, 200, 110),
        Color::Blue => Rgb::new(80, 130, 235),
        Color::Yellow => Rgb::new(240, 210, 70),
        Color::Purple => Rgb::new(185, 105, 225),
        Color::Orange => Rgb::new(250, 150, 50),
    }
}

/// Copy of `snap` with `a` and `b` exchanged, for flashing a swap before it settles.
pub fn preview_swap(snap: &GameSnapshot, a: Position, b: Position) -> GameSnapshot {
    let mut out = snap.clone();
    let cols = snap.cols as usize;
    let ia = a.row as usize * cols + a.col as usize;
    let ib = b.row as usize * cols + b.col as usize;
    if ia < out.cells.len() && ib < out.cells.len() {
        out.cells.swap(ia, ib);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_grid, GameState, ScriptedColors, SessionConfig};
    use crate::types::GameMode;

    fn snapshot(text: &str, mode: GameMode) -> GameSnapshot {
        let grid = parse_grid(text).unwrap();
        let config = SessionConfig::for_mode(mode).with_size(grid.rows(), grid.cols());
        GameState::with_grid(config, grid, ScriptedColors::new(vec![Color::Red])).snapshot()
    }

    #[test]
    fn renders_balloons_and_empty_cells() {
        let snap = snapshot("rg.\nbyp\nogr", GameMode::Tap);
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let vp = Viewport::new(40, 10);
        let fb = view.render(&snap, &Overlay::default(), vp);

        let (x, y) = view.cell_origin(&snap, vp, Position::new(0, 0));
        assert_eq!(fb.get(x, y).unwrap().ch, '●');
        assert_eq!(fb.get(x, y).unwrap().style.fg, balloon_rgb(Color::Red));

        let (x, y) = view.cell_origin(&snap, vp, Position::new(0, 2));
        assert_eq!(fb.get(x, y).unwrap().ch, '·');
        assert_eq!(fb.get(x - 1, y - 1).unwrap().ch, '─');
    }

    #[test]
    fn flash_and_cursor_overlays() {
        let snap = snapshot("rrg\nbyp\nogr", GameMode::Tap);
        let view = GameView::default();
        let vp = Viewport::new(40, 12);
        let overlay = Overlay {
            cursor: Some(Position::new(2, 2)),
            flash: vec![Position::new(0, 0), Position::new(0, 1)],
            ..Overlay::default()
        };
        let fb = view.render(&snap, &overlay, vp);

        let (x, y) = view.cell_origin(&snap, vp, Position::new(0, 1));
        assert_eq!(fb.get(x, y).unwrap().ch, '✸');
        let (x, y) = view.cell_origin(&snap, vp, Position::new(2, 2));
        assert_ne!(fb.get(x, y).unwrap().style.bg, BOARD_BG);
    }

    #[test]
    fn side_panel_and_game_over() {
        let snap = snapshot("rgb\ngbr\nbrg", GameMode::Tap);
        assert!(snap.game_over);
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let vp = Viewport::new(40, 16);
        let overlay = Overlay {
            balance: Some(1250),
            ..Overlay::default()
        };
        let fb = view.render(&snap, &overlay, vp);

        let text: Vec<String> = (0..vp.height).map(|y| fb.row_text(y)).collect();
        assert!(text.iter().any(|l| l.contains("MODE")));
        assert!(text.iter().any(|l| l.contains("tap")));
        assert!(text.iter().any(|l| l.contains("1250")));
        assert!(text.iter().any(|l| l.contains("OFF")));
        assert!(text.iter().any(|l| l.contains("GAME OVER")));
    }

    #[test]
    fn preview_swap_exchanges_cells() {
        let snap = snapshot("rgb\nbyp\nogr", GameMode::Swap);
        let swapped = preview_swap(&snap, Position::new(0, 0), Position::new(0, 1));
        assert_eq!(swapped.cell(0, 0), Some(Color::Green));
        assert_eq!(swapped.cell(0, 1), Some(Color::Red));
        assert_eq!(snap.cell(0, 0), Some(Color::Red));
    }
}
