//! RNG module - color sources for board generation and refill
//!
//! The engine never reaches for a global generator. Every session owns its
//! source, so a seed reproduces a whole game and tests can script refills.

use crate::types::Color;

/// Anything that can hand out balloon colors
pub trait ColorSource {
    fn next_color(&mut self) -> Color;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate a value in `[0, max)` using the high bits.
    ///
    /// The low bits of an LCG cycle with short periods, so `% max` on the raw
    /// state would repeat colors in a visible pattern.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (((self.next_u32() >> 16) as u64 * max as u64) >> 16) as u32
    }
}

impl ColorSource for SimpleRng {
    fn next_color(&mut self) -> Color {
        Color::ALL[self.next_range(Color::COUNT as u32) as usize]
    }
}

/// Replays a fixed color sequence, cycling when it runs out
#[derive(Debug, Clone)]
pub struct ScriptedColors {
    colors: Vec<Color>,
    next: usize,
}

impl ScriptedColors {
    /// Panics on an empty script; a source must always produce a color.
    pub fn new(colors: Vec<Color>) -> Self {
        assert!(!colors.is_empty(), "scripted color source needs at least one color");
        Self { colors, next: 0 }
    }

    /// Number of colors drawn so far
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl ColorSource for ScriptedColors {
    fn next_color(&mut self) -> Color {
        let color = self.colors[self.next % self.colors.len()];
        self.next += 1;
        color
    }
}

impl<S: ColorSource + ?Sized> ColorSource for &mut S {
    fn next_color(&mut self) -> Color {
        (**self).next_color()
    }
}

impl<S: ColorSource + ?Sized> ColorSource for Box<S> {
    fn next_color(&mut self) -> Color {
        (**self).next_color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        let mut a = SimpleRng::new(0);
        let mut b = SimpleRng::new(1);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_range_stays_in_bounds() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..1000 {
            assert!(rng.next_range(6) < 6);
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_every_color_appears() {
        let mut rng = SimpleRng::new(42);
        let mut seen = [0usize; Color::COUNT];
        for _ in 0..600 {
            let c = rng.next_color();
            seen[(c.code() - 1) as usize] += 1;
        }
        for (i, count) in seen.iter().enumerate() {
            assert!(*count > 50, "color {} drawn only {} times", i, count);
        }
    }

    #[test]
    fn test_scripted_colors_cycle() {
        let mut src = ScriptedColors::new(vec![Color::Red, Color::Blue]);
        assert_eq!(src.next_color(), Color::Red);
        assert_eq!(src.next_color(), Color::Blue);
        assert_eq!(src.next_color(), Color::Red);
        assert_eq!(src.drawn(), 3);
    }
}
