//! Geometric rock / paper / scissors classifier.
//!
//! The classifier compares fingertip heights only (`y`, growing downward),
//! so it is unaffected by horizontal mirroring.  It is a crude heuristic:
//! the rules overlap for some poses and many poses match none of them.
//! Evaluation is an ordered table, first match wins, so overlaps always
//! resolve the same way (a pose that satisfies both rock and scissors is
//! rock).

use hand_landmarks::{Finger, LandmarkFrame};

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// Discrete hand-shape classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    Rock,
    Paper,
    Scissors,
    /// No rule matched, or there was no hand.  Never resolvable.
    Unknown,
}

impl GestureLabel {
    pub fn name(self) -> &'static str {
        match self {
            GestureLabel::Rock     => "Rock",
            GestureLabel::Paper    => "Paper",
            GestureLabel::Scissors => "Scissors",
            GestureLabel::Unknown  => "Unknown",
        }
    }

    pub fn is_resolvable(self) -> bool {
        self != GestureLabel::Unknown
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rule table
// ════════════════════════════════════════════════════════════════════════════

/// Fingertip heights pulled out of a frame once per classification.
#[derive(Clone, Copy, Debug)]
struct TipHeights {
    thumb:  f32,
    index:  f32,
    middle: f32,
    ring:   f32,
    pinky:  f32,
}

impl TipHeights {
    fn of(frame: &LandmarkFrame) -> Self {
        TipHeights {
            thumb:  frame.tip(Finger::Thumb).y,
            index:  frame.tip(Finger::Index).y,
            middle: frame.tip(Finger::Middle).y,
            ring:   frame.tip(Finger::Ring).y,
            pinky:  frame.tip(Finger::Pinky).y,
        }
    }
}

type Rule = (GestureLabel, fn(&TipHeights) -> bool);

/// Evaluated top to bottom; the order is part of the behavior.
const RULES: [Rule; 3] = [
    (GestureLabel::Rock,     is_rock),
    (GestureLabel::Paper,    is_paper),
    (GestureLabel::Scissors, is_scissors),
];

/// Tips step strictly downward from thumb to pinky.
fn is_rock(t: &TipHeights) -> bool {
    t.thumb < t.index && t.index < t.middle && t.middle < t.ring && t.ring < t.pinky
}

/// Thumb tip below every other fingertip.
fn is_paper(t: &TipHeights) -> bool {
    t.thumb > t.index && t.thumb > t.middle && t.thumb > t.ring && t.thumb > t.pinky
}

/// Index and middle above the ring tip, pinky below it.
fn is_scissors(t: &TipHeights) -> bool {
    t.index < t.ring && t.middle < t.ring && t.pinky > t.ring
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify a possibly-absent frame.  An absent frame is `Unknown`.
pub fn classify(frame: Option<&LandmarkFrame>) -> GestureLabel {
    frame.map_or(GestureLabel::Unknown, classify_frame)
}

pub fn classify_frame(frame: &LandmarkFrame) -> GestureLabel {
    let tips = TipHeights::of(frame);
    RULES
        .iter()
        .find(|(_, matches)| matches(&tips))
        .map_or(GestureLabel::Unknown, |(label, _)| *label)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses;
    use hand_landmarks::Mirror;

    #[test]
    fn canonical_poses_classify() {
        assert_eq!(classify_frame(&poses::fist()),      GestureLabel::Rock);
        assert_eq!(classify_frame(&poses::open_palm()), GestureLabel::Paper);
        assert_eq!(classify_frame(&poses::scissors()),  GestureLabel::Scissors);
    }

    #[test]
    fn classification_is_deterministic() {
        for frame in [poses::fist(), poses::open_palm(), poses::scissors()] {
            let first = classify_frame(&frame);
            for _ in 0..50 {
                assert_eq!(classify_frame(&frame), first);
            }
        }
    }

    #[test]
    fn absent_frame_is_unknown() {
        assert_eq!(classify(None), GestureLabel::Unknown);
    }

    #[test]
    fn flat_hand_matches_nothing() {
        let frame = poses::with_tip_heights([0.4, 0.4, 0.4, 0.4, 0.4]);
        assert_eq!(classify_frame(&frame), GestureLabel::Unknown);
    }

    #[test]
    fn rock_wins_overlap_with_scissors() {
        // Satisfies both the rock chain and the scissors pattern.
        let tips = TipHeights { thumb: 0.30, index: 0.40, middle: 0.45, ring: 0.50, pinky: 0.60 };
        assert!(is_rock(&tips));
        assert!(is_scissors(&tips));
        let frame = poses::with_tip_heights([0.30, 0.40, 0.45, 0.50, 0.60]);
        assert_eq!(classify_frame(&frame), GestureLabel::Rock);
    }

    #[test]
    fn comparisons_are_strict() {
        // thumb == index breaks the rock chain, so scissors is next in line.
        let frame = poses::with_tip_heights([0.40, 0.40, 0.45, 0.50, 0.60]);
        assert_eq!(classify_frame(&frame), GestureLabel::Scissors);
        // thumb level with the lowest tip is not paper.
        let frame = poses::with_tip_heights([0.30, 0.20, 0.20, 0.30, 0.30]);
        assert_eq!(classify_frame(&frame), GestureLabel::Unknown);
    }

    #[test]
    fn mirroring_does_not_change_the_label() {
        for frame in [poses::fist(), poses::open_palm(), poses::scissors()] {
            assert_eq!(
                classify_frame(&Mirror::Horizontal.apply(&frame)),
                classify_frame(&frame)
            );
        }
    }
}
