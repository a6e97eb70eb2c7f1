use serde::{Deserialize, Serialize};

/// Opaque RGB color, the result of averaging a block.
///
/// # Example
/// ```
/// use em_core::color::Rgb;
/// let c = Rgb::new(10, 20, 30);
/// assert_eq!(c.to_string(), "rgb(10,20,30)");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build a color from its three channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance in RGB space.
    ///
    /// Exact in integers, so it orders candidates without floating point ties.
    ///
    /// # Example
    /// ```
    /// use em_core::color::Rgb;
    /// assert_eq!(Rgb::new(0, 0, 0).distance_sq(Rgb::new(1, 2, 2)), 9);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn distance_sq(self, other: Self) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance in RGB space.
    ///
    /// # Example
    /// ```
    /// use em_core::color::Rgb;
    /// let d = Rgb::new(0, 0, 0).distance(Rgb::new(3, 4, 0));
    /// assert!((d - 5.0).abs() < f64::EPSILON);
    /// ```
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        f64::from(self.distance_sq(other)).sqrt()
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Divide a channel sum by a pixel count, rounding half away from zero.
///
/// `count` must be non-zero.
///
/// # Example
/// ```
/// use em_core::color::rounded_mean;
/// assert_eq!(rounded_mean(5, 2), 3);
/// assert_eq!(rounded_mean(510, 4), 128);
/// ```
#[inline(always)]
#[must_use]
pub fn rounded_mean(sum: u64, count: u64) -> u8 {
    debug_assert!(count > 0, "rounded_mean with zero count");
    ((sum + count / 2) / count).min(255) as u8
}
