//! Canonical synthetic hands.
//!
//! Used by the keyboard simulator and by tests.  Only the fingertip heights
//! matter to the classifier; the rest of the skeleton is laid out so the
//! hands also look plausible when drawn.

use hand_landmarks::{Finger, Landmark, LandmarkFrame, JOINT_COUNT};

use crate::gesture::GestureLabel;

const WRIST: (f32, f32) = (0.50, 0.85);

/// (base x, base y, tip x) per finger, thumb first.
const FINGER_LAYOUT: [(f32, f32, f32); 5] = [
    (0.40, 0.78, 0.30),
    (0.44, 0.62, 0.42),
    (0.50, 0.60, 0.50),
    (0.56, 0.62, 0.58),
    (0.61, 0.66, 0.65),
];

/// Build a hand from fingertip heights `[thumb, index, middle, ring, pinky]`.
pub fn with_tip_heights(tips: [f32; 5]) -> LandmarkFrame {
    let mut joints = [Landmark::default(); JOINT_COUNT];
    joints[0] = Landmark::new(WRIST.0, WRIST.1, 0.0);

    for (finger, (&(bx, by, tx), &ty)) in Finger::all().iter().zip(FINGER_LAYOUT.iter().zip(tips.iter())) {
        for (step, idx) in finger.joints().enumerate() {
            let t = step as f32 / 3.0;
            joints[idx] = Landmark::new(
                bx + (tx - bx) * t,
                by + (ty - by) * t,
                -0.02 * t,
            );
        }
        // Tips are placed exactly; the classifier's comparisons are strict.
        joints[finger.tip()] = Landmark::new(tx, ty, -0.02);
    }
    LandmarkFrame::new(joints)
}

/// Closed fist: tips step downward from thumb to pinky.
pub fn fist() -> LandmarkFrame {
    with_tip_heights([0.50, 0.55, 0.58, 0.61, 0.64])
}

/// Flat open hand: thumb tip sits below every fingertip.
pub fn open_palm() -> LandmarkFrame {
    with_tip_heights([0.62, 0.22, 0.18, 0.21, 0.30])
}

/// Index and middle up, ring and pinky folded.
pub fn scissors() -> LandmarkFrame {
    with_tip_heights([0.55, 0.20, 0.22, 0.58, 0.62])
}

/// The canonical hand for a label, if the label has one.
pub fn for_label(label: GestureLabel) -> Option<LandmarkFrame> {
    match label {
        GestureLabel::Rock     => Some(fist()),
        GestureLabel::Paper    => Some(open_palm()),
        GestureLabel::Scissors => Some(scissors()),
        GestureLabel::Unknown  => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classify_frame;

    #[test]
    fn for_label_round_trips_through_the_classifier() {
        for label in [GestureLabel::Rock, GestureLabel::Paper, GestureLabel::Scissors] {
            let frame = for_label(label).unwrap();
            assert_eq!(classify_frame(&frame), label);
        }
        assert!(for_label(GestureLabel::Unknown).is_none());
    }

    #[test]
    fn tip_heights_land_on_the_tips() {
        let frame = with_tip_heights([0.1, 0.2, 0.3, 0.4, 0.5]);
        assert!((frame.tip(Finger::Ring).y - 0.4).abs() < 1e-6);
        assert!((frame.tip(Finger::Thumb).y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn fist_tips_increase_thumb_to_pinky() {
        let f = fist();
        let ys: Vec<f32> = Finger::all().iter().map(|&d| f.tip(d).y).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }
}
