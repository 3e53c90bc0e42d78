//! Completion signal sink.
//!
//! Fired exactly once per countdown expiry, including expiries discovered
//! while catching up after a reload. What it does (sound, bell, desktop
//! notification) is up to the implementor.

use crate::timer::Completion;

pub trait Notifier {
    fn notify(&mut self, completion: &Completion);
}

/// Discards every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _completion: &Completion) {}
}

impl<F> Notifier for F
where
    F: FnMut(&Completion),
{
    fn notify(&mut self, completion: &Completion) {
        self(completion)
    }
}
