//! Fixed anatomical joint indices and the skeleton bone list.

/// Number of joints in a complete frame.
pub const JOINT_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Skeleton bones (parent, child) used for rendering.
pub const HAND_CONNECTIONS: [(usize, usize); 20] = [
    (WRIST, THUMB_CMC),  (THUMB_CMC, THUMB_MCP),   (THUMB_MCP, THUMB_IP),   (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),  (INDEX_MCP, INDEX_PIP),   (INDEX_PIP, INDEX_DIP),  (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP),   (RING_MCP, RING_PIP),     (RING_PIP, RING_DIP),    (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP),  (PINKY_MCP, PINKY_PIP),   (PINKY_PIP, PINKY_DIP),  (PINKY_DIP, PINKY_TIP),
];

/// The five digits, in landmark order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub fn all() -> [Finger; 5] {
        [Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
    }

    /// Index of this finger's first joint (CMC for the thumb, MCP otherwise).
    pub fn base(self) -> usize {
        1 + 4 * self as usize
    }

    /// Index of the fingertip.
    pub fn tip(self) -> usize {
        self.base() + 3
    }

    /// The four joint indices of this finger, base to tip.
    pub fn joints(self) -> std::ops::RangeInclusive<usize> {
        self.base()..=self.tip()
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "thumb",
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tips_match_named_constants() {
        assert_eq!(Finger::Thumb.tip(),  THUMB_TIP);
        assert_eq!(Finger::Index.tip(),  INDEX_TIP);
        assert_eq!(Finger::Middle.tip(), MIDDLE_TIP);
        assert_eq!(Finger::Ring.tip(),   RING_TIP);
        assert_eq!(Finger::Pinky.tip(),  PINKY_TIP);
    }

    #[test]
    fn fingers_cover_every_joint_but_the_wrist() {
        let mut seen: Vec<usize> = Finger::all().iter().flat_map(|f| f.joints()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..JOINT_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn every_joint_has_a_parent_bone() {
        for child in 1..JOINT_COUNT {
            assert!(HAND_CONNECTIONS.iter().any(|&(_, c)| c == child), "joint {child}");
        }
    }
}
