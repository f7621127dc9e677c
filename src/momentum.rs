//! This module implements the domain-specific 4-momentum and angular
//! kinematics logic shared by Id predicates, cleaners and selections.

use nalgebra::SVector;

use std::f64::consts::PI;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type FourMomentum = SVector<f64, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Common kinematic interface of every reconstructed physics object
///
/// Detector objects are stored in collider coordinates (transverse momentum,
/// pseudorapidity, azimuth); the cartesian 4-momentum is derived on demand.
///
pub trait Kinematic {
    /// Transverse momentum (GeV)
    fn pt(&self) -> f64;

    /// Pseudorapidity
    fn eta(&self) -> f64;

    /// Azimuthal angle (radians)
    fn phi(&self) -> f64;

    /// Energy (GeV)
    fn energy(&self) -> f64;

    /// Cartesian 4-momentum derived from the collider coordinates
    fn momentum(&self) -> FourMomentum {
        let (pt, eta, phi) = (self.pt(), self.eta(), self.phi());
        FourMomentum::from([pt * phi.cos(), pt * phi.sin(), pt * eta.sinh(), self.energy()])
    }
}

/// Azimuthal separation |Δφ|, folded into [0, π]
pub fn delta_phi(p1: &dyn Kinematic, p2: &dyn Kinematic) -> f64 {
    let mut dphi = (p1.phi() - p2.phi()).abs() % (2. * PI);
    if dphi > PI {
        dphi = 2. * PI - dphi;
    }
    dphi
}

/// Angular separation ΔR = √(Δη² + Δφ²)
pub fn delta_r(p1: &dyn Kinematic, p2: &dyn Kinematic) -> f64 {
    let deta = p1.eta() - p2.eta();
    let dphi = delta_phi(p1, p2);
    (deta * deta + dphi * dphi).sqrt()
}

/// Momentum of `part` transverse to the axis of `axis`
///
/// This is the |p⃗₁ × p⃗₂| / |p⃗₂| construction used by the lepton 2D
/// isolation cut, with the jet spatial momentum as the axis.
///
pub fn ptrel(part: &dyn Kinematic, axis: &dyn Kinematic) -> f64 {
    let p3 = part.momentum().fixed_rows::<3>(X).into_owned();
    let a3 = axis.momentum().fixed_rows::<3>(X).into_owned();
    let a_norm = a3.norm();
    if a_norm == 0. {
        return 0.;
    }
    p3.cross(&a3).norm() / a_norm
}

/// Minimum ΔR between `part` and any element of `others`, together with the
/// pTrel of `part` relative to the closest element
///
/// Returns `(f64::INFINITY, 0.)` when `others` is empty.
///
pub fn drmin_ptrel<T: Kinematic>(part: &dyn Kinematic, others: &[T]) -> (f64, f64) {
    let mut drmin = f64::INFINITY;
    let mut closest = None;
    for other in others {
        let dr = delta_r(part, other);
        if dr < drmin {
            drmin = dr;
            closest = Some(other);
        }
    }
    match closest {
        Some(other) => (drmin, ptrel(part, other)),
        None => (f64::INFINITY, 0.),
    }
}
