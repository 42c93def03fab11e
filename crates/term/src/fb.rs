//! Framebuffer and style types for terminal rendering.

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Minimal per-glyph styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl CellStyle {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            dim: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn glyph(self, ch: char) -> Glyph {
        Glyph { ch, style: self }
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0))
    }
}

/// One terminal character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Glyph {
    fn default() -> Self {
        CellStyle::default().glyph(' ')
    }
}

/// 2D framebuffer of styled glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            glyphs: vec![Glyph::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize, keeping the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.glyphs.resize(len, Glyph::default());
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        self.idx(x, y).map(|i| self.glyphs[i])
    }

    pub fn set(&mut self, x: u16, y: u16, glyph: Glyph) {
        if let Some(i) = self.idx(x, y) {
            self.glyphs[i] = glyph;
        }
    }

    pub fn clear(&mut self, glyph: Glyph) {
        self.glyphs.fill(glyph);
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) {
        self.set(x, y, style.glyph(ch));
    }

    /// Write `s` left to right, clipped at the right edge. Returns the x after the last char.
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.put_char(cx, y, ch, style);
            cx += 1;
        }
        cx
    }

    /// Decimal without allocating.
    pub fn put_u64(&mut self, x: u16, y: u16, value: u64, style: CellStyle) -> u16 {
        let mut digits = [0u8; 20];
        let mut n = value;
        let mut len = 0;
        loop {
            digits[len] = b'0' + (n % 10) as u8;
            len += 1;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        let mut cx = x;
        for &d in digits[..len].iter().rev() {
            self.put_char(cx, y, d as char, style);
            cx = cx.saturating_add(1);
        }
        cx
    }

    pub fn put_u32(&mut self, x: u16, y: u16, value: u32, style: CellStyle) -> u16 {
        self.put_u64(x, y, value as u64, style)
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        for dy in 0..h {
            for dx in 0..w {
                self.put_char(x.saturating_add(dx), y.saturating_add(dy), ch, style);
            }
        }
    }

    /// Row `y` as a plain string (styles dropped).
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|g| g.ch)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        let end = fb.put_str(2, 0, "abc", CellStyle::default());
        assert_eq!(end, 4);
        assert_eq!(fb.row_text(0), "  ab");
    }

    #[test]
    fn put_u64_writes_digits() {
        let mut fb = FrameBuffer::new(8, 1);
        fb.put_u64(0, 0, 0, CellStyle::default());
        fb.put_u64(2, 0, 12045, CellStyle::default());
        assert_eq!(fb.row_text(0), "0 12045 ");
    }

    #[test]
    fn resize_keeps_dimensions_consistent() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.resize(5, 4);
        assert_eq!(fb.glyphs().len(), 20);
        assert_eq!(fb.get(4, 3), Some(Glyph::default()));
        assert_eq!(fb.get(5, 0), None);
    }
}
