//! Object cleaners: in-place collection filters
//!
//! Each cleaner replaces one typed collection of the event by the
//! subsequence of elements passing its Id predicate, preserving relative
//! order. The jet-lepton and top-jet-lepton cleaners instead remove objects
//! overlapping a surviving lepton within a configured ΔR radius; in the
//! pipeline they run before the plain kinematic cleaners, so overlap removal
//! happens prior to the pt/eta cut.

use crate::{
    event::Event,
    ids::{BoxedId, ObjectId},
    momentum::{delta_r, Kinematic},
    particle::{Electron, Jet, Muon, TopJet},
};

/// Default ΔR radius for jet-lepton overlap removal
pub const JET_LEPTON_DRMAX: f64 = 0.4;

/// Default ΔR radius for top-jet-lepton overlap removal
pub const TOPJET_LEPTON_DRMAX: f64 = 0.8;

/// True if the object lies within `drmax` of any lepton in the event
fn near_any_lepton(obj: &dyn Kinematic, event: &Event, drmax: f64) -> bool {
    let near_muon = event
        .muons
        .as_deref()
        .map_or(false, |muons| muons.iter().any(|m| delta_r(obj, m) < drmax));
    let near_electron = event
        .electrons
        .as_deref()
        .map_or(false, |eles| eles.iter().any(|e| delta_r(obj, e) < drmax));
    near_muon || near_electron
}

/// In-place muon collection filter
pub struct MuonCleaner {
    /// Id each retained muon must satisfy
    id: BoxedId<Muon>,
}
//
impl MuonCleaner {
    /// Set up a muon cleaner from an Id predicate
    pub fn new(id: impl ObjectId<Muon> + Send + Sync + 'static) -> Self {
        Self { id: Box::new(id) }
    }

    /// Remove the muons failing the Id, preserving relative order
    pub fn clean(&self, event: &mut Event) {
        if let Some(mut muons) = event.muons.take() {
            muons.retain(|m| self.id.accepts(m, event));
            event.muons = Some(muons);
        }
    }
}

/// In-place electron collection filter
pub struct ElectronCleaner {
    /// Id each retained electron must satisfy
    id: BoxedId<Electron>,
}
//
impl ElectronCleaner {
    /// Set up an electron cleaner from an Id predicate
    pub fn new(id: impl ObjectId<Electron> + Send + Sync + 'static) -> Self {
        Self { id: Box::new(id) }
    }

    /// Remove the electrons failing the Id, preserving relative order
    pub fn clean(&self, event: &mut Event) {
        if let Some(mut electrons) = event.electrons.take() {
            electrons.retain(|e| self.id.accepts(e, event));
            event.electrons = Some(electrons);
        }
    }
}

/// In-place jet collection filter
pub struct JetCleaner {
    /// Id each retained jet must satisfy
    id: BoxedId<Jet>,
}
//
impl JetCleaner {
    /// Set up a jet cleaner from an Id predicate
    pub fn new(id: impl ObjectId<Jet> + Send + Sync + 'static) -> Self {
        Self { id: Box::new(id) }
    }

    /// Remove the jets failing the Id, preserving relative order
    pub fn clean(&self, event: &mut Event) {
        if let Some(mut jets) = event.jets.take() {
            jets.retain(|j| self.id.accepts(j, event));
            event.jets = Some(jets);
        }
    }
}

/// In-place top-jet collection filter
pub struct TopJetCleaner {
    /// Id each retained top-jet must satisfy
    id: BoxedId<TopJet>,
}
//
impl TopJetCleaner {
    /// Set up a top-jet cleaner from an Id predicate
    pub fn new(id: impl ObjectId<TopJet> + Send + Sync + 'static) -> Self {
        Self { id: Box::new(id) }
    }

    /// Remove the top-jets failing the Id, preserving relative order
    pub fn clean(&self, event: &mut Event) {
        if let Some(mut topjets) = event.topjets.take() {
            topjets.retain(|t| self.id.accepts(t, event));
            event.topjets = Some(topjets);
        }
    }
}

/// Removes jets overlapping a surviving lepton within a ΔR radius
pub struct JetLeptonCleaner {
    /// Overlap radius below which a jet is dropped
    drmax: f64,
}
//
impl JetLeptonCleaner {
    /// Set up a jet-lepton overlap cleaner (radius defaults to 0.4)
    pub fn new(drmax: f64) -> Self {
        Self { drmax }
    }

    /// Remove the jets within `drmax` of any muon or electron
    pub fn clean(&self, event: &mut Event) {
        if let Some(mut jets) = event.jets.take() {
            jets.retain(|j| !near_any_lepton(j, event, self.drmax));
            event.jets = Some(jets);
        }
    }
}

/// Removes top-jets overlapping a surviving lepton within a ΔR radius
pub struct TopJetLeptonCleaner {
    /// Overlap radius below which a top-jet is dropped
    drmax: f64,
}
//
impl TopJetLeptonCleaner {
    /// Set up a top-jet-lepton overlap cleaner (radius defaults to 0.8)
    pub fn new(drmax: f64) -> Self {
        Self { drmax }
    }

    /// Remove the top-jets within `drmax` of any muon or electron
    pub fn clean(&self, event: &mut Event) {
        if let Some(mut topjets) = event.topjets.take() {
            topjets.retain(|t| !near_any_lepton(t, event, self.drmax));
            event.topjets = Some(topjets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ids::PtEtaCut, particle::Particle};

    fn jet(pt: f64, eta: f64, phi: f64) -> Jet {
        Jet { kin: Particle::massless(pt, eta, phi), btag: 0. }
    }

    fn muon(pt: f64, eta: f64, phi: f64) -> Muon {
        Muon { kin: Particle::massless(pt, eta, phi) }
    }

    #[test]
    fn kinematic_cleaning_preserves_order_and_is_idempotent() {
        let cleaner = JetCleaner::new(PtEtaCut::new(30., 2.4));
        let mut event = Event::new();
        event.jets = Some(vec![
            jet(80., 0., 0.),
            jet(10., 0., 1.), // fails pt
            jet(40., 3.0, 2.), // fails eta
            jet(35., -1., 3.),
        ]);

        cleaner.clean(&mut event);
        let pts: Vec<f64> = event.jets.as_ref().unwrap().iter().map(|j| j.kin.pt).collect();
        assert_eq!(pts, vec![80., 35.]);

        // Re-cleaning an already-cleaned collection removes nothing further
        let before = event.jets.clone();
        cleaner.clean(&mut event);
        assert_eq!(event.jets, before);
    }

    #[test]
    fn cleaning_an_absent_collection_is_a_no_op() {
        let cleaner = JetCleaner::new(PtEtaCut::new(30., 2.4));
        let mut event = Event::new();
        cleaner.clean(&mut event);
        assert!(event.jets.is_none());
    }

    #[test]
    fn lepton_overlap_cleaning_drops_only_nearby_jets() {
        let cleaner = JetLeptonCleaner::new(JET_LEPTON_DRMAX);
        let mut event = Event::new();
        event.muons = Some(vec![muon(100., 0., 0.)]);
        event.jets = Some(vec![
            jet(50., 0., 0.3),  // ΔR 0.3 from the muon: dropped
            jet(60., 0., 2.0),  // far away: kept
            jet(70., 1.5, 0.),  // far in eta: kept
        ]);

        cleaner.clean(&mut event);
        let pts: Vec<f64> = event.jets.as_ref().unwrap().iter().map(|j| j.kin.pt).collect();
        assert_eq!(pts, vec![60., 70.]);
    }

    #[test]
    fn overlap_cleaning_without_leptons_keeps_everything() {
        let cleaner = TopJetLeptonCleaner::new(TOPJET_LEPTON_DRMAX);
        let mut event = Event::new();
        event.topjets = Some(vec![TopJet { kin: Particle::massless(250., 0., 0.), subjets: vec![] }]);
        cleaner.clean(&mut event);
        assert_eq!(event.topjets.as_ref().unwrap().len(), 1);
    }
}
