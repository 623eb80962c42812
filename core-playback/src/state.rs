//! Playback state machine.
//!
//! Owns the current [`PlaybackState`] and at most one in-flight
//! [`TransitionIntent`]. Commands *begin* a transition before the engine call
//! is issued; the engine's own event stream later *confirms* it through
//! [`StateMachine::set_state`]. Errors *abort* the intent so that a late
//! acknowledgement of an abandoned command has nothing to confirm.

use core_runtime::PlaybackState;
use tracing::{debug, trace};

use crate::error::{PlaybackError, Result};

/// Returns whether `from -> to` is a legal transition. Same-state writes are
/// handled by the caller as no-ops.
pub fn transition_allowed(from: PlaybackState, to: PlaybackState) -> bool {
    use PlaybackState::*;

    match (from, to) {
        (Destroyed, _) => false,
        (_, Destroyed) => true,
        (Invalid, _) | (_, Invalid) => false,
        (_, Idle | Loading | Error) => true,
        (Loading, Ready | Playing) => true,
        // Pausing, seeking and buffering are reachable from anywhere once the
        // initial load has finished.
        (Loading, _) => false,
        (_, Paused | Seeking | Waiting) => true,
        _ => matches!(
            (from, to),
            (Ready | Paused | Waiting | Seeking | Ended, Playing)
                | (Ready | Playing | Paused | Waiting | Seeking, Ended)
        ),
    }
}

/// A command-initiated transition awaiting native acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionIntent {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

/// Identifies one `begin_transition` call. Suspended operations keep it to
/// check later whether their intent is still the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

#[derive(Debug)]
pub struct StateMachine {
    state: PlaybackState,
    pending: Option<(TransitionTicket, TransitionIntent)>,
    next_ticket: u64,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_in(&self, state: PlaybackState) -> bool {
        self.state == state
    }

    pub fn pending(&self) -> Option<TransitionIntent> {
        self.pending.map(|(_, intent)| intent)
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_transitioning_to(&self, state: PlaybackState) -> bool {
        self.pending().is_some_and(|intent| intent.to == state)
    }

    pub fn is_transitioning_from(&self, state: PlaybackState) -> bool {
        self.pending().is_some_and(|intent| intent.from == state)
    }

    /// `Destroyed`, or on the way there.
    pub fn is_destroying(&self) -> bool {
        self.is_in(PlaybackState::Destroyed) || self.is_transitioning_to(PlaybackState::Destroyed)
    }

    /// Whether `ticket` still identifies the pending intent.
    pub fn is_pending(&self, ticket: TransitionTicket) -> bool {
        self.pending.is_some_and(|(pending, _)| pending == ticket)
    }

    pub fn can_transition_to(&self, to: PlaybackState) -> bool {
        (to == self.state && !self.state.is_terminal()) || transition_allowed(self.state, to)
    }

    /// Marks the intent to move to `to`, replacing any unconfirmed one.
    pub fn begin_transition(&mut self, to: PlaybackState) -> Result<TransitionTicket> {
        if !self.can_transition_to(to) {
            return Err(self.rejection(to));
        }

        if let Some((_, previous)) = self.pending.take() {
            debug!(from = %previous.from, to = %previous.to, "Unconfirmed transition superseded");
        }

        let ticket = TransitionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some((
            ticket,
            TransitionIntent {
                from: self.state,
                to,
            },
        ));
        trace!(from = %self.state, %to, "Transition started");

        Ok(ticket)
    }

    /// Moves to `to`.
    ///
    /// A pending intent targeting `to` is confirmed and cleared. Entering a
    /// terminal state clears any intent; other writes leave it pending.
    /// Returns the change, or `None` when the state did not change.
    pub fn set_state(&mut self, to: PlaybackState) -> Result<Option<StateChange>> {
        let from = self.state;
        if from == to {
            if from.is_terminal() {
                return Ok(None);
            }
            self.confirm(to);
            return Ok(None);
        }

        if !transition_allowed(from, to) {
            return Err(self.rejection(to));
        }

        self.state = to;
        self.confirm(to);
        if to.is_terminal() {
            self.pending = None;
        }

        debug!(%from, %to, "State changed");
        Ok(Some(StateChange { from, to }))
    }

    /// Discards the pending intent, returning it.
    pub fn abort_transition(&mut self) -> Option<TransitionIntent> {
        let aborted = self.pending.take().map(|(_, intent)| intent);
        if let Some(intent) = aborted {
            debug!(from = %intent.from, to = %intent.to, "Transition aborted");
        }
        aborted
    }

    /// Marks construction as failed. Bypasses the transition table; only
    /// `Destroyed` can follow.
    pub fn invalidate(&mut self) -> Option<StateChange> {
        if self.state.is_terminal() {
            return None;
        }
        let from = self.state;
        self.state = PlaybackState::Invalid;
        self.pending = None;
        Some(StateChange {
            from,
            to: PlaybackState::Invalid,
        })
    }

    fn confirm(&mut self, to: PlaybackState) {
        if self.is_transitioning_to(to) {
            self.pending = None;
            trace!(%to, "Transition confirmed");
        }
    }

    fn rejection(&self, to: PlaybackState) -> PlaybackError {
        PlaybackError::InvalidTransition {
            from: self.state,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlaybackState::*;

    const ALL: [PlaybackState; 11] = [
        Idle, Loading, Ready, Playing, Paused, Waiting, Seeking, Ended, Error, Invalid, Destroyed,
    ];

    fn machine_in(state: PlaybackState) -> StateMachine {
        let mut machine = StateMachine::new();
        match state {
            Idle => {}
            Invalid => {
                machine.invalidate();
            }
            Ready | Playing => {
                machine.set_state(Loading).unwrap();
                machine.set_state(state).unwrap();
            }
            Paused | Waiting | Seeking | Ended => {
                machine.set_state(Loading).unwrap();
                machine.set_state(Playing).unwrap();
                machine.set_state(state).unwrap();
            }
            other => {
                machine.set_state(other).unwrap();
            }
        }
        assert_eq!(machine.state(), state);
        machine
    }

    #[test]
    fn destroyed_is_absorbing() {
        for to in ALL {
            assert!(!transition_allowed(Destroyed, to), "destroyed -> {}", to);
        }
        let mut machine = machine_in(Destroyed);
        assert!(machine.set_state(Playing).is_err());
        assert_eq!(machine.set_state(Destroyed).unwrap(), None);
        assert!(machine.begin_transition(Destroyed).is_err());
    }

    #[test]
    fn invalid_only_reaches_destroyed() {
        for to in ALL {
            assert_eq!(transition_allowed(Invalid, to), to == Destroyed, "invalid -> {}", to);
        }
    }

    #[test]
    fn destroyed_reachable_from_everywhere() {
        for from in ALL {
            let mut machine = machine_in(from);
            assert!(machine.begin_transition(Destroyed).is_ok() || from == Destroyed);
            machine.set_state(Destroyed).unwrap();
            assert_eq!(machine.state(), Destroyed);
            assert!(!machine.is_transitioning());
        }
    }

    #[test]
    fn seek_not_allowed_while_loading() {
        let mut machine = machine_in(Loading);
        let err = machine.begin_transition(Seeking).unwrap_err();
        assert!(matches!(
            err,
            PlaybackError::InvalidTransition {
                from: Loading,
                to: Seeking
            }
        ));
        assert!(!machine.is_transitioning());
    }

    #[test]
    fn begin_then_confirm() {
        let mut machine = machine_in(Paused);
        let ticket = machine.begin_transition(Playing).unwrap();

        assert!(machine.is_pending(ticket));
        assert!(machine.is_transitioning_to(Playing));
        assert!(machine.is_transitioning_from(Paused));

        let change = machine.set_state(Playing).unwrap();
        assert_eq!(change, Some(StateChange { from: Paused, to: Playing }));
        assert!(!machine.is_pending(ticket));
        assert!(!machine.is_transitioning());
    }

    #[test]
    fn unrelated_state_keeps_intent() {
        let mut machine = machine_in(Loading);
        machine.begin_transition(Idle).unwrap();

        machine.set_state(Ready).unwrap();
        assert!(machine.is_transitioning_from(Loading));

        machine.set_state(Idle).unwrap();
        assert!(!machine.is_transitioning());
    }

    #[test]
    fn abort_discards_intent() {
        let mut machine = machine_in(Ready);
        let ticket = machine.begin_transition(Playing).unwrap();

        let aborted = machine.abort_transition();
        assert_eq!(aborted, Some(TransitionIntent { from: Ready, to: Playing }));
        assert!(!machine.is_pending(ticket));
        assert_eq!(machine.abort_transition(), None);
    }

    #[test]
    fn new_intent_supersedes_old_ticket() {
        let mut machine = machine_in(Idle);
        let first = machine.begin_transition(Loading).unwrap();
        let second = machine.begin_transition(Loading).unwrap();

        assert_ne!(first, second);
        assert!(!machine.is_pending(first));
        assert!(machine.is_pending(second));
    }

    #[test]
    fn same_state_is_noop() {
        let mut machine = machine_in(Idle);
        machine.begin_transition(Idle).unwrap();
        assert_eq!(machine.set_state(Idle).unwrap(), None);
        assert!(!machine.is_transitioning());
    }

    #[test]
    fn ready_only_after_loading() {
        for from in ALL {
            assert_eq!(transition_allowed(from, Ready), from == Loading, "{} -> ready", from);
        }
    }

    #[test]
    fn buffering_pause_and_seek_only_blocked_by_loading() {
        for from in [Idle, Ready, Playing, Paused, Waiting, Seeking, Ended, Error] {
            for to in [Paused, Seeking, Waiting] {
                assert!(transition_allowed(from, to), "{} -> {}", from, to);
            }
        }
        for to in [Paused, Seeking, Waiting, Ended] {
            assert!(!transition_allowed(Loading, to), "loading -> {}", to);
        }
    }

    #[test]
    fn error_recovers_through_prepare_or_stop() {
        let machine = machine_in(Error);
        assert!(machine.can_transition_to(Loading));
        assert!(machine.can_transition_to(Idle));
        assert!(!machine.can_transition_to(Playing));
    }

    #[test]
    fn invalidate_clears_intent() {
        let mut machine = machine_in(Idle);
        machine.begin_transition(Loading).unwrap();

        assert_eq!(
            machine.invalidate(),
            Some(StateChange { from: Idle, to: Invalid })
        );
        assert!(!machine.is_transitioning());
        assert!(machine.set_state(Idle).is_err());
        assert_eq!(machine.invalidate(), None);
    }

    #[test]
    fn destroying_covers_pending_destroy() {
        let mut machine = machine_in(Playing);
        assert!(!machine.is_destroying());
        machine.begin_transition(Destroyed).unwrap();
        assert!(machine.is_destroying());
    }
}
