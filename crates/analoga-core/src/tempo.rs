//! Tempo-synced note divisions.
//!
//! A division is expressed in beats (quarter notes). A tempo-synced LFO
//! completes one cycle per division, so its rate is `bpm / 60 / beats`.
//!
//! [`SyncDivision::label`] returns the text shown on the selector, which
//! counts divisions of the beat rate rather than note lengths: "1/4" runs one
//! cycle every four beats.

/// Sync divisions, in parameter index order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncDivision {
    /// One beat.
    Quarter,
    /// Two beats.
    Half,
    /// One 4/4 bar.
    #[default]
    Whole,
    /// Two bars.
    TwoBars,
    /// Four bars.
    FourBars,
    /// One and a half beats.
    DottedQuarter,
    /// Three beats.
    DottedHalf,
}

impl SyncDivision {
    /// All divisions in parameter index order.
    pub const ALL: [Self; 7] = [
        Self::Quarter,
        Self::Half,
        Self::Whole,
        Self::TwoBars,
        Self::FourBars,
        Self::DottedQuarter,
        Self::DottedHalf,
    ];

    /// Division for a parameter index; out-of-range indices clamp.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.clamp(0, Self::ALL.len() as i32 - 1) as usize]
    }

    /// Length in beats.
    pub fn beats(self) -> f32 {
        match self {
            Self::Quarter => 1.0,
            Self::Half => 2.0,
            Self::Whole => 4.0,
            Self::TwoBars => 8.0,
            Self::FourBars => 16.0,
            Self::DottedQuarter => 1.5,
            Self::DottedHalf => 3.0,
        }
    }

    /// Cycle rate in Hz at `bpm`.
    ///
    /// ```rust
    /// use analoga_core::SyncDivision;
    ///
    /// assert!((SyncDivision::Half.to_hz(120.0) - 1.0).abs() < 1e-6);
    /// assert_eq!(SyncDivision::default(), SyncDivision::from_index(2));
    /// ```
    pub fn to_hz(self, bpm: f32) -> f32 {
        bpm / 60.0 / self.beats()
    }

    /// Length in seconds at `bpm`.
    pub fn to_seconds(self, bpm: f32) -> f32 {
        self.beats() * 60.0 / bpm
    }

    /// Selector label, in index order `1/1 1/2 1/4 1/8 1/16 1/4. 1/8.`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Quarter => "1/1",
            Self::Half => "1/2",
            Self::Whole => "1/4",
            Self::TwoBars => "1/8",
            Self::FourBars => "1/16",
            Self::DottedQuarter => "1/4.",
            Self::DottedHalf => "1/8.",
        }
    }

    /// Parameter index of this division.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Length of one beat in seconds.
#[inline]
pub fn beat_seconds(bpm: f32) -> f32 {
    60.0 / bpm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_order_matches_beats() {
        let beats: [f32; 7] = SyncDivision::ALL.map(SyncDivision::beats);
        assert_eq!(beats, [1.0, 2.0, 4.0, 8.0, 16.0, 1.5, 3.0]);
    }

    #[test]
    fn default_is_index_two() {
        assert_eq!(SyncDivision::default().index(), 2);
        assert_eq!(SyncDivision::default().label(), "1/4");
    }

    #[test]
    fn index_clamps() {
        assert_eq!(SyncDivision::from_index(-1), SyncDivision::Quarter);
        assert_eq!(SyncDivision::from_index(42), SyncDivision::DottedHalf);
    }

    #[test]
    fn rate_and_length_are_reciprocal() {
        for d in SyncDivision::ALL {
            let product = d.to_hz(97.0) * d.to_seconds(97.0);
            assert!((product - 1.0).abs() < 1e-5, "{}", d.label());
        }
        assert!((beat_seconds(120.0) - 0.5).abs() < 1e-6);
    }
}
