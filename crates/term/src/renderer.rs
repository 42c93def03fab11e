//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Frames are diffed against the previous one and only changed runs are
//! written, so an idle board costs nothing to redraw.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer<W: Write = io::Stdout> {
    out: W,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Raw mode plus alternate screen. Pair with [`TerminalRenderer::exit`].
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Default for TerminalRenderer<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            last: None,
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    /// Force the next draw to be a full redraw (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers keep one `FrameBuffer` and pass it in every frame; the renderer
    /// diffs against the previous frame and hands the old buffer back through
    /// `fb` so nothing is cloned.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, &mut self.buf)?;
                prev
            }
            Some(mut prev) => {
                encode_full_into(fb, &mut self.buf)?;
                prev.resize(fb.width(), fb.height());
                prev
            }
            None => {
                encode_full_into(fb, &mut self.buf)?;
                FrameBuffer::new(fb.width(), fb.height())
            }
        };
        self.flush_buf()?;

        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut current_style: Option<CellStyle> = None;
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            let glyph = fb.get(x, y).unwrap_or_default();
            if current_style != Some(glyph.style) {
                apply_style_into(out, glyph.style)?;
                current_style = Some(glyph.style);
            }
            out.queue(Print(glyph.ch))?;
        }
        if y + 1 < fb.height() {
            out.queue(Print("\r\n"))?;
        }
    }

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Encode only the runs that changed between `prev` and `next`.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut current_style: Option<CellStyle> = None;

    for_each_changed_run(prev, next, |x, y, len| {
        out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let glyph = next.get(x + dx, y).unwrap_or_default();
            if current_style != Some(glyph.style) {
                apply_style_into(out, glyph.style)?;
                current_style = Some(glyph.style);
            }
            out.queue(Print(glyph.ch))?;
        }
        Ok(())
    })?;

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        for y in 0..next.height() {
            f(0, y, next.width())?;
        }
        return Ok(());
    }

    let w = next.width();
    for y in 0..next.height() {
        let mut x = 0;
        while x < w {
            if prev.get(x, y) == next.get(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            x += 1;
            while x < w && prev.get(x, y) != next.get(x, y) {
                x += 1;
            }
            f(start, y, x - start)?;
        }
    }

    Ok(())
}
