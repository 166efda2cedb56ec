//! Cyclic-dominance match arbitration.

use std::fmt;
use std::sync::Arc;

use hand_landmarks::LandmarkFrame;
use tracing::debug;

use crate::collab::DisplaySink;
use crate::gesture::{classify, GestureLabel};

/// Result of one round, from the local participant's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    SelfWin,
    OpponentWin,
    Draw,
    /// A gesture was `Unknown` or a hand was missing.
    Indeterminate,
}

impl MatchOutcome {
    /// True for a verdict that should replace whatever is on screen.
    pub fn is_verdict(self) -> bool {
        self != MatchOutcome::Indeterminate
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchOutcome::SelfWin       => "You win!",
            MatchOutcome::OpponentWin   => "Opponent wins!",
            MatchOutcome::Draw          => "Draw",
            MatchOutcome::Indeterminate => "...",
        };
        f.write_str(s)
    }
}

/// Rock blunts scissors, paper covers rock, scissors cut paper.
fn beats(a: GestureLabel, b: GestureLabel) -> bool {
    matches!(
        (a, b),
        (GestureLabel::Rock,     GestureLabel::Scissors)
            | (GestureLabel::Paper,    GestureLabel::Rock)
            | (GestureLabel::Scissors, GestureLabel::Paper)
    )
}

/// Pure decision for a pair of labels.
pub fn decide(local: GestureLabel, remote: GestureLabel) -> MatchOutcome {
    if !local.is_resolvable() || !remote.is_resolvable() {
        MatchOutcome::Indeterminate
    } else if local == remote {
        MatchOutcome::Draw
    } else if beats(local, remote) {
        MatchOutcome::SelfWin
    } else {
        MatchOutcome::OpponentWin
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MatchArbiter
// ════════════════════════════════════════════════════════════════════════════

/// Decides rounds and reports every one of them to the display.
///
/// No throttling: each call produces exactly one `show_outcome`.
pub struct MatchArbiter {
    display: Arc<dyn DisplaySink>,
}

impl MatchArbiter {
    pub fn new(display: Arc<dyn DisplaySink>) -> Self {
        MatchArbiter { display }
    }

    pub fn arbitrate(&self, local: GestureLabel, remote: GestureLabel) -> MatchOutcome {
        let outcome = decide(local, remote);
        debug!(local = local.name(), remote = remote.name(), ?outcome, "round decided");
        self.display.show_outcome(outcome);
        outcome
    }

    /// Classify both (possibly absent) frames and arbitrate.
    pub fn arbitrate_frames(
        &self,
        local:  Option<&LandmarkFrame>,
        remote: Option<&LandmarkFrame>,
    ) -> MatchOutcome {
        self.arbitrate(classify(local), classify(remote))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Role;
    use crate::poses;
    use std::sync::Mutex;

    const CONCRETE: [GestureLabel; 3] =
        [GestureLabel::Rock, GestureLabel::Paper, GestureLabel::Scissors];

    #[derive(Default)]
    struct Outcomes(Mutex<Vec<MatchOutcome>>);

    impl DisplaySink for Outcomes {
        fn show_landmarks(&self, _frame: Option<&LandmarkFrame>, _role: Role) {}
        fn show_outcome(&self, outcome: MatchOutcome) {
            self.0.lock().unwrap().push(outcome);
        }
    }

    #[test]
    fn equal_labels_draw() {
        for x in CONCRETE {
            assert_eq!(decide(x, x), MatchOutcome::Draw);
        }
    }

    #[test]
    fn unknown_on_either_side_is_indeterminate() {
        for x in CONCRETE.iter().copied().chain([GestureLabel::Unknown]) {
            assert_eq!(decide(GestureLabel::Unknown, x), MatchOutcome::Indeterminate);
            assert_eq!(decide(x, GestureLabel::Unknown), MatchOutcome::Indeterminate);
        }
    }

    #[test]
    fn dominance_is_cyclic_and_antisymmetric() {
        for a in CONCRETE {
            for b in CONCRETE {
                if a == b { continue; }
                let ab = decide(a, b);
                let ba = decide(b, a);
                let pair = (ab, ba);
                assert!(
                    pair == (MatchOutcome::SelfWin, MatchOutcome::OpponentWin)
                        || pair == (MatchOutcome::OpponentWin, MatchOutcome::SelfWin),
                    "{a:?} vs {b:?} gave {pair:?}"
                );
            }
        }
    }

    #[test]
    fn rock_beats_scissors() {
        assert_eq!(decide(GestureLabel::Rock, GestureLabel::Scissors), MatchOutcome::SelfWin);
        assert_eq!(decide(GestureLabel::Scissors, GestureLabel::Rock), MatchOutcome::OpponentWin);
        assert_eq!(decide(GestureLabel::Paper, GestureLabel::Rock), MatchOutcome::SelfWin);
        assert_eq!(decide(GestureLabel::Scissors, GestureLabel::Paper), MatchOutcome::SelfWin);
    }

    #[test]
    fn every_arbitration_notifies_once() {
        let display = Arc::new(Outcomes::default());
        let arbiter = MatchArbiter::new(display.clone());
        arbiter.arbitrate(GestureLabel::Rock, GestureLabel::Rock);
        arbiter.arbitrate(GestureLabel::Rock, GestureLabel::Rock);
        arbiter.arbitrate(GestureLabel::Unknown, GestureLabel::Paper);
        assert_eq!(
            *display.0.lock().unwrap(),
            vec![MatchOutcome::Draw, MatchOutcome::Draw, MatchOutcome::Indeterminate]
        );
    }

    #[test]
    fn absent_remote_frame_is_indeterminate() {
        let display = Arc::new(Outcomes::default());
        let arbiter = MatchArbiter::new(display.clone());
        let fist = poses::fist();
        assert_eq!(arbiter.arbitrate_frames(Some(&fist), None), MatchOutcome::Indeterminate);
        assert_eq!(display.0.lock().unwrap().len(), 1);
    }
}
