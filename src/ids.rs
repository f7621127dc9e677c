//! Single-object Id predicates
//!
//! An Id is a stateless pass/fail rule over one reconstructed object, with
//! the whole event available for context (some externally-supplied Ids, such
//! as b-taggers, need event-level calibration data). Ids are the building
//! blocks handed to the cleaners and to the count-based selections.

use crate::{event::Event, momentum::Kinematic};

/// Pass/fail rule over a single reconstructed object
pub trait ObjectId<T> {
    /// Decide whether the object passes this Id
    fn accepts(&self, obj: &T, event: &Event) -> bool;
}

/// Boxed Id, the form in which the orchestrator owns its predicates
pub type BoxedId<T> = Box<dyn ObjectId<T> + Send + Sync>;

/// Id backed by a plain function, the form in which external predicates
/// (b-tag, lepton quality) are injected
pub struct FnId<F>(F);
//
impl<T, F> ObjectId<T> for FnId<F>
where
    F: Fn(&T, &Event) -> bool,
{
    fn accepts(&self, obj: &T, event: &Event) -> bool {
        (self.0)(obj, event)
    }
}

/// Wrap a function or closure into an Id
pub fn id_fn<T, F: Fn(&T, &Event) -> bool>(f: F) -> FnId<F> {
    FnId(f)
}

/// Kinematic window cut: `pt > ptmin && |eta| < etamax`, strict on both sides
#[derive(Clone, Copy, Debug)]
pub struct PtEtaCut {
    /// Minimum transverse momentum (GeV, exclusive)
    pub ptmin: f64,

    /// Maximum absolute pseudorapidity (exclusive)
    pub etamax: f64,
}
//
impl PtEtaCut {
    /// Set up a kinematic window cut
    pub fn new(ptmin: f64, etamax: f64) -> Self {
        Self { ptmin, etamax }
    }
}

impl<T: Kinematic> ObjectId<T> for PtEtaCut {
    fn accepts(&self, obj: &T, _event: &Event) -> bool {
        obj.pt() > self.ptmin && obj.eta().abs() < self.etamax
    }
}

/// Logical AND of several Ids, evaluated left to right with short-circuiting
pub struct AndId<T> {
    /// Component Ids, in evaluation order
    ids: Vec<BoxedId<T>>,
}
//
impl<T> AndId<T> {
    /// Combine two Ids
    pub fn of(
        first: impl ObjectId<T> + Send + Sync + 'static,
        second: impl ObjectId<T> + Send + Sync + 'static,
    ) -> Self {
        Self { ids: vec![Box::new(first), Box::new(second)] }
    }

    /// Append a further Id, keeping evaluation order
    pub fn and(mut self, next: impl ObjectId<T> + Send + Sync + 'static) -> Self {
        self.ids.push(Box::new(next));
        self
    }
}

impl<T> ObjectId<T> for AndId<T> {
    fn accepts(&self, obj: &T, event: &Event) -> bool {
        self.ids.iter().all(|id| id.accepts(obj, event))
    }
}
