//! Pre-selection orchestrator
//!
//! Owns one instance of each cleaner, corrector and selection, and applies
//! them in a fixed order with early exits:
//!
//! * input diagnostics
//! * lepton cleaning, then the channel-gated lepton predicate (early exit)
//! * snapshot of the uncleaned jets and top-jets
//! * jet/top-jet correction and cleaning, then the jet predicate (early exit)
//! * restore of the snapshot, sorted by decreasing pt
//! * output diagnostics
//!
//! The central contract: the accept decision is made on cleaned and
//! corrected objects, but an accepted event leaves with its pre-cleaning jet
//! and top-jet collections, replaced wholesale (never merged) and re-sorted.
//! Cleaning is a decision aid, not a mutation meant to survive acceptance.

use crate::{
    cleaners::{
        ElectronCleaner, JetCleaner, JetLeptonCleaner, MuonCleaner, TopJetCleaner,
        TopJetLeptonCleaner, JET_LEPTON_DRMAX, TOPJET_LEPTON_DRMAX,
    },
    config::{Channel, ConfigSource},
    corrections::{Corrector, NoCorrection},
    error::Result,
    event::Event,
    ids::PtEtaCut,
    particle::{sort_by_pt, Jet, TopJet},
    selections::{NElectronSelection, NJetSelection, NMuonSelection, NTopJetSelection, Selection},
};

/// Default muon kinematic window (pt, |eta|)
pub const MUON_PT_ETA: (f64, f64) = (45., 2.1);

/// Default electron kinematic window (pt, |eta|)
pub const ELECTRON_PT_ETA: (f64, f64) = (50., 2.5);

/// Default jet kinematic window (pt, |eta|)
pub const JET_PT_ETA: (f64, f64) = (30., 2.4);

/// Default top-jet kinematic window (pt, |eta|)
pub const TOPJET_PT_ETA: (f64, f64) = (200., 2.4);

/// Diagnostics recorder called at the two pipeline checkpoints
///
/// Sinks observe the event (histograms, dumps); they never affect the
/// accept/reject decision.
///
pub trait EventSink {
    /// Record the event's current content
    fn fill(&mut self, event: &Event);
}

/// Deep copy of the jet and top-jet collections, taken before jet-stage
/// correction and cleaning
///
/// The snapshot is scoped to a single `process` call: it is either restored
/// into the event on acceptance or dropped on rejection, and can never leak
/// across calls.
///
struct JetSnapshot {
    /// Pre-cleaning jets (absent if the event carried no jet collection)
    jets: Option<Vec<Jet>>,

    /// Pre-cleaning top-jets
    topjets: Option<Vec<TopJet>>,
}
//
impl JetSnapshot {
    /// Begin the jet-decision stage by copying the current collections
    fn take(event: &Event) -> Self {
        Self { jets: event.jets.clone(), topjets: event.topjets.clone() }
    }

    /// Commit: replace the event's collections wholesale, sorted by pt
    fn restore(self, event: &mut Event) {
        event.jets = self.jets.map(|mut jets| {
            sort_by_pt(&mut jets);
            jets
        });
        event.topjets = self.topjets.map(|mut topjets| {
            sort_by_pt(&mut topjets);
            topjets
        });
    }
}

/// Event pre-selection for the boosted ttbar analysis
pub struct PreSelectionModule {
    /// Lepton-flavor mode gating the lepton-stage predicate
    channel: Channel,

    /// Object cleaners, in pipeline order
    muo_cleaner: MuonCleaner,
    ele_cleaner: ElectronCleaner,
    jetlepton_cleaner: JetLeptonCleaner,
    jet_cleaner: JetCleaner,
    topjetlepton_cleaner: TopJetLeptonCleaner,
    topjet_cleaner: TopJetCleaner,

    /// External energy-scale corrections
    jet_corrector: Box<dyn Corrector>,
    topjet_corrector: Box<dyn Corrector>,

    /// Count selections backing the lepton- and jet-stage predicates
    muo1_sel: NMuonSelection,
    ele1_sel: NElectronSelection,
    jet1_sel: NJetSelection,
    jet2_sel: NJetSelection,
    topjet1_sel: NTopJetSelection,

    /// Diagnostics recorded on the raw input event
    input_sinks: Vec<Box<dyn EventSink + Send>>,

    /// Diagnostics recorded on accepted events, after the restore
    output_sinks: Vec<Box<dyn EventSink + Send>>,
}
//
impl PreSelectionModule {
    /// Set up the pre-selection from a configuration source
    ///
    /// Fails fast on a malformed channel value; every cleaner and selection
    /// starts from the analysis' default kinematic windows.
    ///
    pub fn new(cfg: &dyn ConfigSource) -> Result<Self> {
        let channel = Channel::from_config(cfg)?;

        Ok(Self {
            channel,

            muo_cleaner: MuonCleaner::new(PtEtaCut::new(MUON_PT_ETA.0, MUON_PT_ETA.1)),
            ele_cleaner: ElectronCleaner::new(PtEtaCut::new(ELECTRON_PT_ETA.0, ELECTRON_PT_ETA.1)),
            jetlepton_cleaner: JetLeptonCleaner::new(JET_LEPTON_DRMAX),
            jet_cleaner: JetCleaner::new(PtEtaCut::new(JET_PT_ETA.0, JET_PT_ETA.1)),
            topjetlepton_cleaner: TopJetLeptonCleaner::new(TOPJET_LEPTON_DRMAX),
            topjet_cleaner: TopJetCleaner::new(PtEtaCut::new(TOPJET_PT_ETA.0, TOPJET_PT_ETA.1)),

            jet_corrector: Box::new(NoCorrection),
            topjet_corrector: Box::new(NoCorrection),

            muo1_sel: NMuonSelection::new(1, None),
            ele1_sel: NElectronSelection::new(1, None),
            jet1_sel: NJetSelection::new(1, None),
            jet2_sel: NJetSelection::new(2, None),
            topjet1_sel: NTopJetSelection::new(1, None),

            input_sinks: Vec::new(),
            output_sinks: Vec::new(),
        })
    }

    /// Replace the muon cleaner (e.g. to compose an external quality Id)
    pub fn with_muon_cleaner(mut self, cleaner: MuonCleaner) -> Self {
        self.muo_cleaner = cleaner;
        self
    }

    /// Replace the electron cleaner
    pub fn with_electron_cleaner(mut self, cleaner: ElectronCleaner) -> Self {
        self.ele_cleaner = cleaner;
        self
    }

    /// Install an external jet energy-scale correction
    pub fn with_jet_corrector(mut self, corrector: impl Corrector + 'static) -> Self {
        self.jet_corrector = Box::new(corrector);
        self
    }

    /// Install an external top-jet energy-scale correction
    pub fn with_topjet_corrector(mut self, corrector: impl Corrector + 'static) -> Self {
        self.topjet_corrector = Box::new(corrector);
        self
    }

    /// Register a diagnostics sink for the raw input checkpoint
    pub fn add_input_sink(&mut self, sink: impl EventSink + Send + 'static) {
        self.input_sinks.push(Box::new(sink));
    }

    /// Register a diagnostics sink for the post-acceptance checkpoint
    pub fn add_output_sink(&mut self, sink: impl EventSink + Send + 'static) {
        self.output_sinks.push(Box::new(sink));
    }

    /// Decide whether the event enters the analysis
    ///
    /// Accepted events leave with their pre-cleaning jet and top-jet
    /// collections, sorted by decreasing pt; the lepton collections stay
    /// cleaned. Rejected events are left in whatever cleaning stage the
    /// pipeline reached when it exited.
    ///
    pub fn process(&mut self, event: &mut Event) -> bool {
        // Dump input content
        for sink in &mut self.input_sinks {
            sink.fill(event);
        }

        // ### LEPTON CLEANING ###
        self.muo_cleaner.clean(event);
        self.ele_cleaner.clean(event);

        // ### LEPTON PRE-SELECTION ###
        let pass_lep = match self.channel {
            Channel::Lepton => self.muo1_sel.passes(event) || self.ele1_sel.passes(event),
            Channel::Muon => self.muo1_sel.passes(event),
            Channel::Electron => self.ele1_sel.passes(event),
        };

        // Exit if the lepton selection fails, otherwise proceed to jets
        if !pass_lep {
            return false;
        }

        // Keep the jets *before cleaning*, to be stored if the event is
        // accepted (the snapshot is dropped on rejection)
        let snapshot = JetSnapshot::take(event);

        // ### JET CLEANING ###
        self.jet_corrector.correct(event);
        self.jetlepton_cleaner.clean(event);
        self.jet_cleaner.clean(event);
        self.topjet_corrector.correct(event);
        self.topjetlepton_cleaner.clean(event);
        self.topjet_cleaner.clean(event);

        // ### JET PRE-SELECTION ###
        let pass_jet = self.jet2_sel.passes(event)
            || (self.jet1_sel.passes(event) && self.topjet1_sel.passes(event));

        // Exit if the jet pre-selection fails
        if !pass_jet {
            return false;
        }

        // Store the pre-cleaning jets, sorted by pt
        snapshot.restore(event);

        // Dump output content
        for sink in &mut self.output_sinks {
            sink.fill(event);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::KeyValueConfig,
        corrections::JetScaleCorrector,
        particle::{Muon, Particle},
    };

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    /// Sink counting how many times it was filled
    struct CountingSink(Arc<AtomicUsize>);

    impl EventSink for CountingSink {
        fn fill(&mut self, _event: &Event) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn muon(pt: f64) -> Muon {
        Muon { kin: Particle::massless(pt, 0., 0.) }
    }

    fn jet(pt: f64, eta: f64, phi: f64) -> Jet {
        Jet { kin: Particle::massless(pt, eta, phi), btag: 0. }
    }

    fn module(channel: &str) -> PreSelectionModule {
        let cfg = KeyValueConfig::new().with("channel", channel);
        PreSelectionModule::new(&cfg).unwrap()
    }

    fn lepton_plus_jets_event() -> Event {
        let mut event = Event::new();
        event.muons = Some(vec![muon(100.)]);
        event.electrons = Some(vec![]);
        event.jets = Some(vec![jet(80., 0., 2.0), jet(50., 0., -2.0)]);
        event.topjets = Some(vec![]);
        event
    }

    #[test]
    fn bad_channel_is_rejected_at_construction() {
        let cfg = KeyValueConfig::new().with("channel", "dilepton");
        assert!(PreSelectionModule::new(&cfg).is_err());
    }

    #[test]
    fn lepton_stage_failure_skips_all_jet_work() {
        // A corrector that would double the jet pt if it ever ran
        let mut module = module("muon").with_jet_corrector(JetScaleCorrector::new(2.));

        let mut event = Event::new();
        event.muons = Some(vec![]);
        event.electrons = Some(vec![]);
        event.jets = Some(vec![jet(80., 0., 0.)]);
        event.topjets = Some(vec![]);

        assert!(!module.process(&mut event));
        // No correction, no cleaning: the jet stage never ran
        assert_eq!(event.jets.as_ref().unwrap()[0].kin.pt, 80.);
    }

    #[test]
    fn electron_channel_ignores_muons() {
        let mut module = module("electron");
        let mut event = lepton_plus_jets_event();
        assert!(!module.process(&mut event));
    }

    #[test]
    fn sinks_fire_only_at_their_checkpoints() {
        let inputs = Arc::new(AtomicUsize::new(0));
        let outputs = Arc::new(AtomicUsize::new(0));
        let mut module = module("muon");
        module.add_input_sink(CountingSink(inputs.clone()));
        module.add_output_sink(CountingSink(outputs.clone()));

        // Accepted event: both checkpoints fire
        let mut event = lepton_plus_jets_event();
        assert!(module.process(&mut event));
        assert_eq!(inputs.load(Ordering::Relaxed), 1);
        assert_eq!(outputs.load(Ordering::Relaxed), 1);

        // Rejected event: only the input checkpoint fires
        let mut rejected = Event::new();
        rejected.muons = Some(vec![]);
        rejected.electrons = Some(vec![]);
        assert!(!module.process(&mut rejected));
        assert_eq!(inputs.load(Ordering::Relaxed), 2);
        assert_eq!(outputs.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn acceptance_restores_and_sorts_the_original_jets() {
        let mut module = module("muon");
        let mut event = Event::new();
        event.muons = Some(vec![muon(100.)]);
        event.electrons = Some(vec![]);
        // Unsorted, with one jet that fails the kinematic cleaning
        event.jets = Some(vec![jet(10., 0., 2.0), jet(80., 0., -2.0), jet(50., 0., 1.0)]);
        event.topjets = Some(vec![]);

        assert!(module.process(&mut event));
        let pts: Vec<f64> = event.jets.as_ref().unwrap().iter().map(|j| j.kin.pt).collect();
        // All three original jets are back, in decreasing-pt order
        assert_eq!(pts, vec![80., 50., 10.]);
    }

    #[test]
    fn decision_uses_the_corrected_jets() {
        // Two jets just below the cleaning threshold: rejected without
        // correction, accepted once a +20% energy scale lifts them above it
        let mut event = Event::new();
        event.muons = Some(vec![muon(100.)]);
        event.electrons = Some(vec![]);
        event.jets = Some(vec![jet(28., 0., 2.0), jet(27., 0., -2.0)]);
        event.topjets = Some(vec![]);

        let mut plain = module("muon");
        let mut scaled = module("muon").with_jet_corrector(JetScaleCorrector::new(1.2));

        let mut for_plain = Event::new();
        for_plain.muons = Some(vec![muon(100.)]);
        for_plain.electrons = Some(vec![]);
        for_plain.jets = event.jets.clone();
        for_plain.topjets = Some(vec![]);

        assert!(!plain.process(&mut for_plain));
        assert!(scaled.process(&mut event));
        // And the accepted event still carries the *uncorrected* jets
        let pts: Vec<f64> = event.jets.as_ref().unwrap().iter().map(|j| j.kin.pt).collect();
        assert_eq!(pts, vec![28., 27.]);
    }
}
