//! This module defines the per-collision event record passed through the
//! pre-selection pipeline, together with the typed store used to exchange
//! auxiliary per-event data (such as reconstruction hypotheses) with
//! upstream producers.

use crate::particle::{Electron, Jet, MissingEt, Muon, TopJet};

use std::{any::Any, collections::HashMap, marker::PhantomData, sync::Arc};

/// Typed handle to an entry of the event's auxiliary store
///
/// Handles are registered once at setup time and reused across events,
/// preserving the late-binding flexibility of a string lookup while keeping
/// the stored type checked at the access site.
///
pub struct Handle<T> {
    /// Registered entry name
    name: Arc<str>,

    /// Stored data type
    _marker: PhantomData<fn() -> T>,
}
//
impl<T> Handle<T> {
    /// Register a handle for a named auxiliary entry
    pub fn register(name: &str) -> Self {
        Self { name: name.into(), _marker: PhantomData }
    }

    /// Name this handle was registered under
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), _marker: PhantomData }
    }
}

/// Storage for a single collision event
///
/// Object collections are optional: which of them an event carries depends
/// on the upstream producer configuration, and several selections assert on
/// the collections they require. Collections are mutated in place by the
/// cleaners for the duration of one `process` call.
///
#[derive(Default)]
pub struct Event {
    /// Reconstructed muons, sorted by decreasing pt on delivery
    pub muons: Option<Vec<Muon>>,

    /// Reconstructed electrons, sorted by decreasing pt on delivery
    pub electrons: Option<Vec<Electron>>,

    /// Reconstructed small-radius jets
    pub jets: Option<Vec<Jet>>,

    /// Reconstructed large-radius top-jets
    pub topjets: Option<Vec<TopJet>>,

    /// Missing transverse energy
    pub met: Option<MissingEt>,

    /// Auxiliary per-event data keyed by registered handles
    extras: HashMap<Arc<str>, Box<dyn Any + Send>>,
}
//
impl Event {
    /// Build an event with no object collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an auxiliary entry under a registered handle
    pub fn set<T: Any + Send>(&mut self, handle: &Handle<T>, value: T) {
        self.extras.insert(handle.name.clone(), Box::new(value));
    }

    /// Look up an auxiliary entry by its registered handle
    ///
    /// Returns `None` if no producer filled the entry for this event, or if
    /// the entry was filled with a different type than the handle's.
    ///
    pub fn get<T: Any>(&self, handle: &Handle<T>) -> Option<&T> {
        self.extras.get(&handle.name).and_then(|b| b.downcast_ref::<T>())
    }
}

/// Externally-produced interpretation of an event, carrying named
/// discriminator scores
#[derive(Clone, Debug, Default)]
pub struct ReconstructionHypothesis {
    /// Discriminator scores, keyed by name, in insertion order
    discriminators: Vec<(String, f64)>,
}
//
impl ReconstructionHypothesis {
    /// Build a hypothesis with no discriminators
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or overwrite) a named discriminator score
    pub fn set_discriminator(&mut self, name: &str, value: f64) {
        match self.discriminators.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.discriminators.push((name.to_owned(), value)),
        }
    }

    /// Look up a discriminator score by name
    pub fn discriminator(&self, name: &str) -> Option<f64> {
        self.discriminators.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }
}

/// Select the hypothesis maximizing the named discriminator
///
/// Ties are broken in favor of the first-seen hypothesis; hypotheses which
/// do not carry the named discriminator are skipped. Returns `None` when no
/// candidate remains.
///
pub fn best_hypothesis<'hyp>(
    hyps: &'hyp [ReconstructionHypothesis],
    discriminator: &str,
) -> Option<&'hyp ReconstructionHypothesis> {
    let mut best: Option<(&ReconstructionHypothesis, f64)> = None;
    for hyp in hyps {
        if let Some(value) = hyp.discriminator(discriminator) {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((hyp, value)),
            }
        }
    }
    best.map(|(hyp, _)| hyp)
}
