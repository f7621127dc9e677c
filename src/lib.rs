//! Event pre-selection for a boosted top-quark-pair analysis
//!
//!
//! # Introduction (for the physicist)
//!
//! This crate selects collision events compatible with semi-leptonic ttbar
//! decays in the boosted regime: one charged lepton, and either two resolved
//! jets or one jet plus one large-radius top-jet. It consumes a per-event
//! record of reconstructed objects (muons, electrons, jets, top-jets,
//! missing transverse energy) and produces an accept/reject decision.
//!
//!
//! # Introduction (for the computing guy)
//!
//! The engine is a pipeline of object-cleaning transforms and composable
//! boolean predicates applied in a fixed order with early exits:
//!
//! * input diagnostics are recorded,
//! * leptons are cleaned and the channel-gated lepton predicate runs,
//! * the jet and top-jet collections are snapshotted,
//! * jets are corrected and cleaned and the jet predicate runs,
//! * on acceptance, the snapshot replaces the cleaned collections, sorted
//!   by decreasing transverse momentum, and output diagnostics run.
//!
//! The decision is made on cleaned objects, but accepted events keep their
//! pre-cleaning jets: cleaning is a decision aid, not a lasting mutation.
//!
//! Processing is single-threaded and synchronous: one [`process`] call
//! completes before the next begins, and components hold no per-event state
//! across calls.
//!
//! [`process`]: PreSelectionModule::process

#![warn(missing_docs)]

pub mod cleaners;
pub mod config;
pub mod corrections;
pub mod error;
pub mod event;
pub mod ids;
pub mod momentum;
pub mod particle;
pub mod presel;
pub mod selections;

pub use crate::{
    config::{Channel, ConfigSource, KeyValueConfig},
    error::{Error, Result},
    event::Event,
    presel::{EventSink, PreSelectionModule},
};
