//! End-to-end checks of the pre-selection pipeline's documented contract

use ttbar_presel::{
    event::{Handle, ReconstructionHypothesis},
    momentum::Kinematic,
    particle::{Electron, Jet, Muon, Particle, TopJet},
    selections::{HypothesisDiscriminatorCut, Selection},
    Event, KeyValueConfig, PreSelectionModule,
};

fn muon(pt: f64, eta: f64, phi: f64) -> Muon {
    Muon { kin: Particle::massless(pt, eta, phi) }
}

fn electron(pt: f64, eta: f64, phi: f64) -> Electron {
    Electron { kin: Particle::massless(pt, eta, phi) }
}

fn jet(pt: f64, eta: f64, phi: f64) -> Jet {
    Jet { kin: Particle::massless(pt, eta, phi), btag: 0. }
}

fn topjet(pt: f64, eta: f64, phi: f64) -> TopJet {
    TopJet { kin: Particle::massless(pt, eta, phi), subjets: vec![] }
}

fn module(channel: &str) -> PreSelectionModule {
    let cfg = KeyValueConfig::new().with("channel", channel);
    PreSelectionModule::new(&cfg).unwrap()
}

#[test]
fn lepton_channel_rejects_events_without_any_lepton() {
    let mut module = module("lepton");
    let mut event = Event::new();
    event.muons = Some(vec![]);
    event.electrons = Some(vec![]);
    event.jets = Some(vec![jet(80., 0., 0.), jet(60., 0., 2.)]);
    event.topjets = Some(vec![]);

    assert!(!module.process(&mut event));
}

#[test]
fn muon_channel_acceptance_is_independent_of_electrons() {
    // Same jets, same muon; electron content varies
    for electrons in [vec![], vec![electron(120., 0., 1.)]] {
        let mut module = module("muon");
        let mut event = Event::new();
        event.muons = Some(vec![muon(100., 0., 0.)]);
        event.electrons = Some(electrons);
        event.jets = Some(vec![jet(80., 0.5, 2.0), jet(60., -0.5, -2.0)]);
        event.topjets = Some(vec![]);

        assert!(module.process(&mut event));
    }

    // And without a cleaned muon the electron cannot rescue the event
    let mut module = module("muon");
    let mut event = Event::new();
    event.muons = Some(vec![]);
    event.electrons = Some(vec![electron(120., 0., 1.)]);
    event.jets = Some(vec![jet(80., 0.5, 2.0), jet(60., -0.5, -2.0)]);
    event.topjets = Some(vec![]);
    assert!(!module.process(&mut event));
}

#[test]
fn accepted_events_recover_all_precleaning_jets_sorted_by_pt() {
    // One muon; three jets, one of which sits within ΔR 0.3 of the muon and
    // is removed by lepton-overlap cleaning. The decision is made on the two
    // surviving jets, but the accepted event keeps all three originals.
    let mut module = module("muon");
    let mut event = Event::new();
    event.muons = Some(vec![muon(100., 0., 0.)]);
    event.electrons = Some(vec![]);
    event.jets = Some(vec![
        jet(35., 0., 0.3),  // overlaps the muon: invisible to the decision
        jet(80., 0.5, 2.0),
        jet(60., -0.5, -2.0),
    ]);
    event.topjets = Some(vec![]);

    assert!(module.process(&mut event));

    let jets = event.jets.as_ref().unwrap();
    assert_eq!(jets.len(), 3);
    let pts: Vec<f64> = jets.iter().map(|j| j.pt()).collect();
    assert_eq!(pts, vec![80., 60., 35.]);
}

#[test]
fn one_jet_plus_one_topjet_is_enough() {
    let mut module = module("muon");
    let mut event = Event::new();
    event.muons = Some(vec![muon(100., 0., 0.)]);
    event.electrons = Some(vec![]);
    event.jets = Some(vec![jet(80., 0.5, 2.0)]);
    event.topjets = Some(vec![topjet(300., 0., -2.0)]);

    assert!(module.process(&mut event));

    // A single jet without the top-jet fails the jet predicate
    let mut event = Event::new();
    event.muons = Some(vec![muon(100., 0., 0.)]);
    event.electrons = Some(vec![]);
    event.jets = Some(vec![jet(80., 0.5, 2.0)]);
    event.topjets = Some(vec![]);

    assert!(!module.process(&mut event));
}

#[test]
fn soft_leptons_do_not_open_the_lepton_gate() {
    // The muon cleaner removes everything below 45 GeV
    let mut module = module("lepton");
    let mut event = Event::new();
    event.muons = Some(vec![muon(20., 0., 0.)]);
    event.electrons = Some(vec![electron(30., 0., 1.)]);
    event.jets = Some(vec![jet(80., 0.5, 2.0), jet(60., -0.5, -2.0)]);
    event.topjets = Some(vec![]);

    assert!(!module.process(&mut event));
    assert!(event.muons.as_ref().unwrap().is_empty());
    assert!(event.electrons.as_ref().unwrap().is_empty());
}

#[test]
fn hypothesis_cut_reads_data_planted_by_an_upstream_producer() {
    // The hypothesis store travels with the event through the pipeline and
    // stays available to downstream selections after acceptance
    let mut module = module("muon");
    let mut event = Event::new();
    event.muons = Some(vec![muon(100., 0., 0.)]);
    event.electrons = Some(vec![]);
    event.jets = Some(vec![jet(80., 0.5, 2.0), jet(60., -0.5, -2.0)]);
    event.topjets = Some(vec![]);

    let handle = Handle::<Vec<ReconstructionHypothesis>>::register("TTbarHyps");
    let mut hyp = ReconstructionHypothesis::new();
    hyp.set_discriminator("Chi2", 3.2);
    event.set(&handle, vec![hyp]);

    assert!(module.process(&mut event));

    let cut = HypothesisDiscriminatorCut::new(0., 5., "Chi2", "TTbarHyps");
    assert!(cut.passes(&event));
    let veto = HypothesisDiscriminatorCut::new(4., 5., "Chi2", "TTbarHyps");
    assert!(!veto.passes(&event));
}
