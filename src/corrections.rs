//! Jet energy correction boundary
//!
//! The actual correction factors come from an external calibration service;
//! this module only fixes the contract the orchestrator relies on (in-place,
//! deterministic, infallible) and provides the trivial implementations used
//! for wiring and testing.

use crate::{event::Event, particle::Jet};

/// In-place per-jet energy-scale adjustment
///
/// Which collection a corrector touches is the implementation's concern:
/// the orchestrator owns one corrector for jets and one for top-jets.
///
pub trait Corrector: Send + Sync {
    /// Apply the correction to the event's objects
    fn correct(&self, event: &mut Event);
}

/// Identity correction, for setups without a calibration source
pub struct NoCorrection;
//
impl Corrector for NoCorrection {
    fn correct(&self, _event: &mut Event) {}
}

/// Scale a single jet's momentum and energy by a common factor
fn scale_jet(jet: &mut Jet, factor: f64) {
    jet.kin.pt *= factor;
    jet.kin.energy *= factor;
}

/// Uniform energy-scale correction of the jet collection
pub struct JetScaleCorrector {
    /// Multiplicative scale factor
    factor: f64,
}
//
impl JetScaleCorrector {
    /// Set up a uniform jet energy-scale correction
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Corrector for JetScaleCorrector {
    fn correct(&self, event: &mut Event) {
        if let Some(jets) = event.jets.as_mut() {
            for jet in jets {
                scale_jet(jet, self.factor);
            }
        }
    }
}

/// Uniform energy-scale correction of the top-jet collection
///
/// Sub-jets are scaled along with their parent, keeping the constituents
/// consistent with the large-radius jet.
///
pub struct TopJetScaleCorrector {
    /// Multiplicative scale factor
    factor: f64,
}
//
impl TopJetScaleCorrector {
    /// Set up a uniform top-jet energy-scale correction
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Corrector for TopJetScaleCorrector {
    fn correct(&self, event: &mut Event) {
        if let Some(topjets) = event.topjets.as_mut() {
            for topjet in topjets {
                topjet.kin.pt *= self.factor;
                topjet.kin.energy *= self.factor;
                for subjet in &mut topjet.subjets {
                    scale_jet(subjet, self.factor);
                }
            }
        }
    }
}
