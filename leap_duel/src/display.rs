//! `ChannelDisplay`, a [`DisplaySink`] that queues state changes for the
//! render loop.
//!
//! The coordinator calls the sink from the producer and transport threads;
//! the window lives on the main thread.  Everything crosses over as a
//! [`DisplayEvent`] on an mpsc channel, so the visualizer only ever reads.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use duel_sync::{DisplaySink, MatchOutcome, Role};
use hand_landmarks::{HandObservation, LandmarkFrame};

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayEvent {
    /// Every hand from the latest local poll.
    LocalHands(Vec<HandObservation>),
    /// Primary frame for one side changed.  `None` = no hand.
    Landmarks { role: Role, frame: Option<LandmarkFrame> },
    Outcome(MatchOutcome),
    /// Registered identities on the relay, self included.
    Peers(Vec<String>),
}

pub struct ChannelDisplay {
    tx: Mutex<Sender<DisplayEvent>>,
}

impl ChannelDisplay {
    pub fn new() -> (Self, Receiver<DisplayEvent>) {
        let (tx, rx) = mpsc::channel();
        (ChannelDisplay { tx: Mutex::new(tx) }, rx)
    }

    /// Another producer on the same queue (the transport's peer-list hook).
    pub fn sender(&self) -> Sender<DisplayEvent> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, event: DisplayEvent) {
        // A closed window is not an error for the session.
        let _ = self.tx.lock().unwrap_or_else(PoisonError::into_inner).send(event);
    }
}

impl DisplaySink for ChannelDisplay {
    fn show_landmarks(&self, frame: Option<&LandmarkFrame>, role: Role) {
        self.push(DisplayEvent::Landmarks { role, frame: frame.copied() });
    }

    fn show_outcome(&self, outcome: MatchOutcome) {
        self.push(DisplayEvent::Outcome(outcome));
    }

    fn show_local_hands(&self, hands: &[HandObservation]) {
        self.push(DisplayEvent::LocalHands(hands.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_sync::poses;
    use hand_landmarks::Handedness;

    #[test]
    fn events_arrive_in_call_order() {
        let (display, rx) = ChannelDisplay::new();
        let fist = poses::fist();
        display.show_local_hands(&[HandObservation { side: Handedness::Right, frame: fist }]);
        display.show_landmarks(Some(&fist), Role::Local);
        display.show_landmarks(None, Role::Remote);
        display.show_outcome(MatchOutcome::Draw);
        display.sender().send(DisplayEvent::Peers(vec!["a".into()])).unwrap();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got, vec![
            DisplayEvent::LocalHands(vec![HandObservation { side: Handedness::Right, frame: fist }]),
            DisplayEvent::Landmarks { role: Role::Local, frame: Some(fist) },
            DisplayEvent::Landmarks { role: Role::Remote, frame: None },
            DisplayEvent::Outcome(MatchOutcome::Draw),
            DisplayEvent::Peers(vec!["a".into()]),
        ]);
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (display, rx) = ChannelDisplay::new();
        drop(rx);
        display.show_outcome(MatchOutcome::SelfWin);
    }
}
