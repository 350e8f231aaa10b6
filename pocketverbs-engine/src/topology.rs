//! The six reverb algorithms as data.
//!
//! Every algorithm except Room runs the same serial walk (A..Z through the
//! first allpass stage, then A..Z through the second) and differs only in how
//! each line's output is smoothed before it feeds the next line: the width of
//! the moving average, and which line's newest tap leads that average.
//! Room is the odd one out and runs the lines in parallel.

use crate::params::Algorithm;
use crate::tank::LINE_COUNT;

/// Where an averaging step takes its newest sample from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lead {
    /// The line's own newest tap.
    Own,
    /// The newest tap of the line's entry in [`CROSSFEED`].
    Crossfeed,
    /// The newest tap of the mirrored line (A↔Z, B↔Y, …).
    Mirror,
}

impl Lead {
    /// Line whose newest tap leads the average for `line`.
    #[inline]
    pub fn source(self, line: usize) -> usize {
        match self {
            Lead::Own => line,
            Lead::Crossfeed => CROSSFEED[line],
            Lead::Mirror => LINE_COUNT - 1 - line,
        }
    }
}

/// Crossfeed wiring: from C onward every other line leads with the line two
/// positions earlier (C←A, E←C, …, Y←W).
pub const CROSSFEED: [usize; LINE_COUNT] = [
    0, 1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14, 17, 16, 19, 18, 21, 20, 23, 22, 25,
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Topology {
    /// Moving-average width after each allpass (2 or 3 taps).
    pub window: usize,
    pub first_lead: Lead,
    pub second_lead: Lead,
    /// Parallel lines summed with Room's weights instead of the serial walk.
    pub parallel: bool,
    /// Line A's stage-1 average takes its oldest term from line Z instead of
    /// its own history, closing a global loop.
    pub feedback: bool,
}

const CHAMBER: Topology = Topology {
    window: 3,
    first_lead: Lead::Crossfeed,
    second_lead: Lead::Crossfeed,
    parallel: false,
    feedback: false,
};

impl Topology {
    pub const fn of(algorithm: Algorithm) -> Topology {
        match algorithm {
            Algorithm::Chamber => CHAMBER,
            Algorithm::Spring => Topology { second_lead: Lead::Mirror, ..CHAMBER },
            Algorithm::Tiled => Topology { window: 2, ..CHAMBER },
            Algorithm::Room => Topology { parallel: true, ..CHAMBER },
            Algorithm::Stretch => Topology {
                window: 2,
                first_lead: Lead::Own,
                second_lead: Lead::Own,
                ..CHAMBER
            },
            Algorithm::Zarathustra => Topology { feedback: true, ..CHAMBER },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossfeed_only_looks_backwards() {
        for (line, &src) in CROSSFEED.iter().enumerate() {
            assert!(src <= line, "line {} leads from later line {}", line, src);
        }
        assert_eq!(CROSSFEED[2], 0, "C must lead from A");
    }

    #[test]
    fn mirror_pairs() {
        assert_eq!(Lead::Mirror.source(0), 25);
        assert_eq!(Lead::Mirror.source(1), 24);
        assert_eq!(Lead::Mirror.source(25), 0);
    }

    #[test]
    fn table_shapes() {
        assert_eq!(Topology::of(Algorithm::Chamber).window, 3);
        assert_eq!(Topology::of(Algorithm::Tiled).window, 2);
        assert_eq!(Topology::of(Algorithm::Stretch).first_lead, Lead::Own);
        assert_eq!(Topology::of(Algorithm::Spring).second_lead, Lead::Mirror);
        assert!(Topology::of(Algorithm::Room).parallel);
        assert!(Topology::of(Algorithm::Zarathustra).feedback);
        assert!(Algorithm::ALL
            .iter()
            .filter(|&&a| a != Algorithm::Zarathustra)
            .all(|&a| !Topology::of(a).feedback));
    }
}
