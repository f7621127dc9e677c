//! Event-level selections
//!
//! A selection is a stateless pass/fail rule over the whole event. Each cut
//! lives in its own type; the orchestrator composes them with plain boolean
//! logic, so no selection depends on another's outcome except through the
//! event it reads.
//!
//! Preconditions follow two regimes, preserved from the original analysis:
//! collections a selection structurally requires are enforced with `assert!`
//! (a correctly configured producer chain never trips them), while
//! per-event cardinality surprises (wrong lepton count, empty jet list) are
//! soft failures that log a warning and reject the event.

use crate::{
    event::{best_hypothesis, Event, Handle, ReconstructionHypothesis},
    ids::{BoxedId, ObjectId},
    momentum::{delta_phi, delta_r, drmin_ptrel, Kinematic},
    particle::{Electron, Jet, Muon, TopJet},
};

use std::f64::consts::PI;

use tracing::warn;

/// Azimuthal hemisphere boundary used by the b-tag count selections
const TWO_PI_THIRD: f64 = 2. * PI / 3.;

/// Whole-event pass/fail rule
pub trait Selection {
    /// Decide whether the event passes this selection
    fn passes(&self, event: &Event) -> bool;
}

/// True iff `n` lies in `[min, max]`, with `None` meaning unbounded above
fn in_range(n: usize, min: usize, max: Option<usize>) -> bool {
    n >= min && max.map_or(true, |max| n <= max)
}

/// Count the elements of an optional collection passing an optional Id
fn count_passing<T>(
    objects: Option<&[T]>,
    id: Option<&BoxedId<T>>,
    event: &Event,
) -> usize {
    let objects = objects.unwrap_or(&[]);
    match id {
        Some(id) => objects.iter().filter(|obj| id.accepts(obj, event)).count(),
        None => objects.len(),
    }
}

/// Generates one N-object count selection type
///
/// Passes iff the number of objects in the collection satisfying the
/// optional Id lies in `[min, max]`; an absent collection counts as empty.
///
macro_rules! n_object_selection {
    ($(#[$doc:meta])* $name:ident, $object:ty, $collection:ident) => {
        $(#[$doc])*
        pub struct $name {
            /// Minimum accepted count (inclusive)
            min: usize,

            /// Maximum accepted count (inclusive), unbounded if `None`
            max: Option<usize>,

            /// Optional Id each counted object must satisfy
            id: Option<BoxedId<$object>>,
        }
        //
        impl $name {
            /// Set up the count selection without an object Id
            pub fn new(min: usize, max: Option<usize>) -> Self {
                Self { min, max, id: None }
            }

            /// Restrict the count to objects passing the given Id
            pub fn with_id(mut self, id: impl ObjectId<$object> + Send + Sync + 'static) -> Self {
                self.id = Some(Box::new(id));
                self
            }
        }

        impl Selection for $name {
            fn passes(&self, event: &Event) -> bool {
                let n = count_passing(event.$collection.as_deref(), self.id.as_ref(), event);
                in_range(n, self.min, self.max)
            }
        }
    };
}

n_object_selection!(
    /// Muon count selection
    NMuonSelection, Muon, muons
);
n_object_selection!(
    /// Electron count selection
    NElectronSelection, Electron, electrons
);
n_object_selection!(
    /// Jet count selection
    NJetSelection, Jet, jets
);
n_object_selection!(
    /// Top-jet count selection
    NTopJetSelection, TopJet, topjets
);

/// Cut on HTlep = leading-lepton pt + MET
///
/// Requires at least one lepton collection and MET to be present (hard
/// precondition); an absent collection contributes a leading pt of zero.
///
pub struct HtLepCut {
    /// Lower bound (exclusive)
    min_htlep: f64,

    /// Upper bound (exclusive)
    max_htlep: f64,
}
//
impl HtLepCut {
    /// Set up an HTlep window cut
    pub fn new(min_htlep: f64, max_htlep: f64) -> Self {
        Self { min_htlep, max_htlep }
    }
}

impl Selection for HtLepCut {
    fn passes(&self, event: &Event) -> bool {
        assert!(
            event.muons.is_some() || event.electrons.is_some(),
            "HtLepCut requires a lepton collection"
        );
        let met = event.met.as_ref().expect("HtLepCut requires MET");

        let mut plep_pt: f64 = 0.;
        if let Some(electrons) = &event.electrons {
            for ele in electrons {
                plep_pt = plep_pt.max(ele.pt());
            }
        }
        if let Some(muons) = &event.muons {
            for muo in muons {
                plep_pt = plep_pt.max(muo.pt());
            }
        }

        let htlep = plep_pt + met.pt;
        htlep > self.min_htlep && htlep < self.max_htlep
    }
}

/// Cut on the missing transverse energy magnitude
pub struct MetCut {
    /// Lower bound (exclusive)
    min_met: f64,

    /// Upper bound (exclusive)
    max_met: f64,
}
//
impl MetCut {
    /// Set up a MET window cut
    pub fn new(min_met: f64, max_met: f64) -> Self {
        Self { min_met, max_met }
    }
}

impl Selection for MetCut {
    fn passes(&self, event: &Event) -> bool {
        let met = event.met.as_ref().expect("MetCut requires MET").pt;
        met > self.min_met && met < self.max_met
    }
}

/// 2D lepton-isolation cut
///
/// For the presumed single lepton (the leading muon if any muon survives,
/// else the leading electron), passes iff the minimum ΔR to any jet exceeds
/// `min_deltar` OR the pTrel to the closest jet exceeds `min_ptrel` —
/// either condition alone suffices.
///
/// Requires the muon, electron and jet collections to be present, and at
/// least one lepton among them (hard precondition).
///
pub struct TwoDCut {
    /// ΔR isolation threshold
    min_deltar: f64,

    /// pTrel threshold (GeV)
    min_ptrel: f64,
}
//
impl TwoDCut {
    /// Set up a 2D isolation cut
    pub fn new(min_deltar: f64, min_ptrel: f64) -> Self {
        Self { min_deltar, min_ptrel }
    }
}

impl Selection for TwoDCut {
    fn passes(&self, event: &Event) -> bool {
        let muons = event.muons.as_deref().expect("TwoDCut requires the muon collection");
        let electrons = event
            .electrons
            .as_deref()
            .expect("TwoDCut requires the electron collection");
        let jets = event.jets.as_deref().expect("TwoDCut requires the jet collection");

        let (drmin, ptrel) = if let Some(muon) = muons.first() {
            drmin_ptrel(muon, jets)
        } else {
            drmin_ptrel(&electrons[0], jets)
        };

        drmin > self.min_deltar || ptrel > self.min_ptrel
    }
}

/// Triangular MET cuts against the lepton and the leading jet
///
/// Both azimuthal separations must fall within the MET-scaled band
/// `||Δφ| - a| < (a/b) · met_pt`. Events with a lepton count other than one,
/// or with no jets, are rejected with a warning.
///
pub struct TriangularCuts {
    /// Band center (radians)
    a: f64,

    /// Band slope divisor
    b: f64,
}
//
impl TriangularCuts {
    /// Set up triangular cuts, rejecting a null slope divisor
    pub fn new(a: f64, b: f64) -> crate::Result<Self> {
        if b == 0. {
            return Err(crate::Error::BadParameter(
                "TriangularCuts: parameter 'b' must not be null".to_owned(),
            ));
        }
        Ok(Self { a, b })
    }

    /// Band test for one object against MET
    fn in_band(&self, met: &dyn Kinematic, obj: &dyn Kinematic, met_pt: f64) -> bool {
        (delta_phi(met, obj) - self.a).abs() < self.a / self.b * met_pt
    }
}

impl Selection for TriangularCuts {
    fn passes(&self, event: &Event) -> bool {
        assert!(
            event.muons.is_some() || event.electrons.is_some(),
            "TriangularCuts requires a lepton collection"
        );
        let met = event.met.as_ref().expect("TriangularCuts requires MET");
        let jets = event.jets.as_deref().expect("TriangularCuts requires the jet collection");

        let muons = event.muons.as_deref().unwrap_or(&[]);
        let electrons = event.electrons.as_deref().unwrap_or(&[]);
        if muons.len() + electrons.len() != 1 {
            warn!(
                nmuons = muons.len(),
                nelectrons = electrons.len(),
                "TriangularCuts: unexpected number of leptons in the event (!=1), rejecting"
            );
            return false;
        }
        if jets.is_empty() {
            warn!("TriangularCuts: no jets in the event, rejecting");
            return false;
        }

        // The single charged lepton, whichever flavor it has
        let lepton: &dyn Kinematic = match muons.first() {
            Some(muon) => muon,
            None => &electrons[0],
        };

        // 1st entry in the jet collection (should be the pt-leading jet)
        let jet: &dyn Kinematic = &jets[0];

        self.in_band(met, lepton, met.pt) && self.in_band(met, jet, met.pt)
    }
}

/// Top-tag event selection
///
/// Passes iff some top-jet satisfies the top-tag Id and lies further than
/// `min_dr_jet_toptag` from at least one jet: the double loop short-circuits
/// on the first such pair.
///
pub struct TopTagEventSelection {
    /// Top-tag Id a candidate top-jet must satisfy
    topjet_id: BoxedId<TopJet>,

    /// Minimum ΔR between the tagged top-jet and a jet
    min_dr_jet_toptag: f64,
}
//
impl TopTagEventSelection {
    /// Set up a top-tag event selection
    pub fn new(
        topjet_id: impl ObjectId<TopJet> + Send + Sync + 'static,
        min_dr_jet_toptag: f64,
    ) -> Self {
        Self { topjet_id: Box::new(topjet_id), min_dr_jet_toptag }
    }
}

impl Selection for TopTagEventSelection {
    fn passes(&self, event: &Event) -> bool {
        let topjets = event
            .topjets
            .as_deref()
            .expect("TopTagEventSelection requires the top-jet collection");
        let jets = event
            .jets
            .as_deref()
            .expect("TopTagEventSelection requires the jet collection");

        for topjet in topjets {
            if !self.topjet_id.accepts(topjet, event) {
                continue;
            }
            for jet in jets {
                if delta_r(jet, topjet) > self.min_dr_jet_toptag {
                    return true;
                }
            }
        }
        false
    }
}

/// Cut on the best reconstruction hypothesis' discriminator value
///
/// The hypothesis sequence is looked up from the event through a registered
/// handle; "best" is the hypothesis maximizing the named discriminator. An
/// event without hypotheses is rejected.
///
pub struct HypothesisDiscriminatorCut {
    /// Lower bound (inclusive)
    min_discr: f64,

    /// Upper bound (inclusive)
    max_discr: f64,

    /// Name of the discriminator to cut on
    discriminator_name: String,

    /// Handle to the externally-produced hypothesis sequence
    hyps: Handle<Vec<ReconstructionHypothesis>>,
}
//
impl HypothesisDiscriminatorCut {
    /// Set up a discriminator cut reading hypotheses stored under `hyps_name`
    pub fn new(min_discr: f64, max_discr: f64, discriminator_name: &str, hyps_name: &str) -> Self {
        Self {
            min_discr,
            max_discr,
            discriminator_name: discriminator_name.to_owned(),
            hyps: Handle::register(hyps_name),
        }
    }
}

impl Selection for HypothesisDiscriminatorCut {
    fn passes(&self, event: &Event) -> bool {
        let hyps = match event.get(&self.hyps) {
            Some(hyps) => hyps,
            None => return false,
        };
        let hyp = match best_hypothesis(hyps, &self.discriminator_name) {
            Some(hyp) => hyp,
            None => return false,
        };

        // The best hypothesis carries the discriminator by construction
        let value = hyp.discriminator(&self.discriminator_name).unwrap_or(f64::NEG_INFINITY);
        value >= self.min_discr && value <= self.max_discr
    }
}

/// Count of b-tagged jets in the muon hemisphere
///
/// A jet counts iff it passes the external b-tag Id, its azimuthal
/// separation from the (assumed single) muon is below 2π/3, and it passes
/// the pt/eta window. A muon count other than one is logged but processing
/// proceeds with the leading muon.
///
pub struct NMuonBTagSelection {
    /// Minimum accepted tag count (inclusive)
    min_nbtag: usize,

    /// Maximum accepted tag count (inclusive), unbounded if `None`
    max_nbtag: Option<usize>,

    /// External b-tag Id
    btag: BoxedId<Jet>,

    /// Minimum counted-jet pt (GeV, exclusive)
    ptmin: f64,

    /// Maximum counted-jet |eta| (exclusive)
    etamax: f64,
}
//
impl NMuonBTagSelection {
    /// Set up a muon-hemisphere b-tag count selection
    pub fn new(
        min_nbtag: usize,
        max_nbtag: Option<usize>,
        btag: impl ObjectId<Jet> + Send + Sync + 'static,
        ptmin: f64,
        etamax: f64,
    ) -> Self {
        Self { min_nbtag, max_nbtag, btag: Box::new(btag), ptmin, etamax }
    }
}

impl Selection for NMuonBTagSelection {
    fn passes(&self, event: &Event) -> bool {
        let jets = event.jets.as_deref().expect("NMuonBTagSelection requires the jet collection");
        let muons =
            event.muons.as_deref().expect("NMuonBTagSelection requires the muon collection");
        assert!(!muons.is_empty(), "NMuonBTagSelection requires at least one muon");
        if muons.len() != 1 {
            warn!(nmuons = muons.len(), "NMuonBTagSelection: unexpected muon count, using the leading muon");
        }

        let muon = &muons[0];
        let mut nbtag = 0;
        for jet in jets {
            let tagged = self.btag.accepts(jet, event);
            let dphi = delta_phi(jet, muon);
            if tagged && dphi < TWO_PI_THIRD && jet.pt() > self.ptmin && jet.eta().abs() < self.etamax
            {
                nbtag += 1;
            }
        }

        in_range(nbtag, self.min_nbtag, self.max_nbtag)
    }
}

/// Count of top-jets in the muon hemisphere with a b-tagged sub-jet
///
/// A top-jet counts iff it lies within 2π/3 in azimuth of the (assumed
/// single) muon, passes the pt/eta window, and any of its sub-jets passes
/// the external sub-b-tag Id. Same muon-count diagnostic as
/// [`NMuonBTagSelection`].
///
pub struct SubBTagSelection {
    /// Minimum accepted tag count (inclusive)
    min_nsubbtag: usize,

    /// Maximum accepted tag count (inclusive), unbounded if `None`
    max_nsubbtag: Option<usize>,

    /// External sub-b-tag Id applied to sub-jets
    subbtag: BoxedId<Jet>,

    /// Minimum counted-top-jet pt (GeV, exclusive)
    ptsubmin: f64,

    /// Maximum counted-top-jet |eta| (exclusive)
    etasubmax: f64,
}
//
impl SubBTagSelection {
    /// Set up a muon-hemisphere sub-b-tag count selection
    pub fn new(
        min_nsubbtag: usize,
        max_nsubbtag: Option<usize>,
        subbtag: impl ObjectId<Jet> + Send + Sync + 'static,
        ptsubmin: f64,
        etasubmax: f64,
    ) -> Self {
        Self { min_nsubbtag, max_nsubbtag, subbtag: Box::new(subbtag), ptsubmin, etasubmax }
    }
}

impl Selection for SubBTagSelection {
    fn passes(&self, event: &Event) -> bool {
        let topjets =
            event.topjets.as_deref().expect("SubBTagSelection requires the top-jet collection");
        let muons = event.muons.as_deref().expect("SubBTagSelection requires the muon collection");
        assert!(!muons.is_empty(), "SubBTagSelection requires at least one muon");
        if muons.len() != 1 {
            warn!(nmuons = muons.len(), "SubBTagSelection: unexpected muon count, using the leading muon");
        }

        let muon = &muons[0];
        let mut nsubbtag = 0;
        for topjet in topjets {
            let dphi = delta_phi(topjet, muon);
            if dphi < TWO_PI_THIRD
                && topjet.pt() > self.ptsubmin
                && topjet.eta().abs() < self.etasubmax
                && topjet.subjets.iter().any(|sub| self.subbtag.accepts(sub, event))
            {
                nsubbtag += 1;
            }
        }

        in_range(nsubbtag, self.min_nsubbtag, self.max_nsubbtag)
    }
}
