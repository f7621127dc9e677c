//! This module defines the reconstructed physics objects carried by an event

use crate::momentum::Kinematic;

/// Kinematic core shared by all reconstructed particle types
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Transverse momentum (GeV)
    pub pt: f64,

    /// Pseudorapidity
    pub eta: f64,

    /// Azimuthal angle (radians)
    pub phi: f64,

    /// Energy (GeV)
    pub energy: f64,
}
//
impl Particle {
    /// Build a particle from its collider coordinates
    pub fn new(pt: f64, eta: f64, phi: f64, energy: f64) -> Self {
        Self { pt, eta, phi, energy }
    }

    /// Build a massless particle, deriving the energy from pt and eta
    pub fn massless(pt: f64, eta: f64, phi: f64) -> Self {
        Self::new(pt, eta, phi, pt * eta.cosh())
    }
}

impl Kinematic for Particle {
    fn pt(&self) -> f64 {
        self.pt
    }
    fn eta(&self) -> f64 {
        self.eta
    }
    fn phi(&self) -> f64 {
        self.phi
    }
    fn energy(&self) -> f64 {
        self.energy
    }
}

/// Forward the kinematic interface to an embedded [`Particle`] field
macro_rules! forward_kinematic {
    ($type:ty, $field:ident) => {
        impl Kinematic for $type {
            fn pt(&self) -> f64 {
                self.$field.pt
            }
            fn eta(&self) -> f64 {
                self.$field.eta
            }
            fn phi(&self) -> f64 {
                self.$field.phi
            }
            fn energy(&self) -> f64 {
                self.$field.energy
            }
        }
    };
}

/// Reconstructed muon
#[derive(Clone, Debug, PartialEq)]
pub struct Muon {
    /// Kinematics
    pub kin: Particle,
}
//
forward_kinematic!(Muon, kin);

/// Reconstructed electron
#[derive(Clone, Debug, PartialEq)]
pub struct Electron {
    /// Kinematics
    pub kin: Particle,
}
//
forward_kinematic!(Electron, kin);

/// Reconstructed small-radius jet
#[derive(Clone, Debug, PartialEq)]
pub struct Jet {
    /// Kinematics
    pub kin: Particle,

    /// b-tagging discriminator value
    pub btag: f64,
}
//
forward_kinematic!(Jet, kin);

/// Reconstructed large-radius jet with its sub-jet constituents
///
/// Used to tag boosted hadronic top-quark decays, where the three quarks
/// merge into a single large-radius jet.
///
#[derive(Clone, Debug, PartialEq)]
pub struct TopJet {
    /// Kinematics of the large-radius jet itself
    pub kin: Particle,

    /// Constituent sub-jets
    pub subjets: Vec<Jet>,
}
//
forward_kinematic!(TopJet, kin);

/// Missing transverse energy, one pseudo-object per event
#[derive(Clone, Debug, PartialEq)]
pub struct MissingEt {
    /// Magnitude of the missing transverse momentum (GeV)
    pub pt: f64,

    /// Azimuthal direction of the missing transverse momentum
    pub phi: f64,
}
//
impl Kinematic for MissingEt {
    fn pt(&self) -> f64 {
        self.pt
    }
    // MET is a purely transverse object
    fn eta(&self) -> f64 {
        0.
    }
    fn phi(&self) -> f64 {
        self.phi
    }
    fn energy(&self) -> f64 {
        self.pt
    }
}

/// Sort a collection of physics objects by decreasing transverse momentum
pub fn sort_by_pt<T: Kinematic>(objects: &mut [T]) {
    objects.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn massless_energy_matches_pt_cosh_eta() {
        let p = Particle::massless(100., 1.5, 0.);
        assert!((p.energy - 100. * 1.5f64.cosh()).abs() < 1e-9);
    }

    #[test]
    fn sorting_is_descending_in_pt() {
        let mut jets = vec![
            Jet { kin: Particle::massless(30., 0., 0.), btag: 0. },
            Jet { kin: Particle::massless(120., 0., 1.), btag: 0. },
            Jet { kin: Particle::massless(60., 0., 2.), btag: 0. },
        ];
        sort_by_pt(&mut jets);
        let pts: Vec<f64> = jets.iter().map(|j| j.kin.pt).collect();
        assert_eq!(pts, vec![120., 60., 30.]);
    }
}
