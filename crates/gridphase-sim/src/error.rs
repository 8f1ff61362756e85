// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use gridphase_geom::GeomError;
use thiserror::Error;

/// Error type for simulation configuration and stepping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Geometry or detector configuration was rejected.
    #[error(transparent)]
    Geom(#[from] GeomError),
    /// Tick length was negative or not finite.
    #[error("invalid delta time {0}: must be finite and >= 0")]
    InvalidDeltaTime(f64),
    /// Damping factor outside `(0, 1]`.
    #[error("invalid damping {0}: must be in (0, 1]")]
    InvalidDamping(f64),
    /// Gravity was not finite.
    #[error("invalid gravity {0}: must be finite")]
    InvalidGravity(f64),
    /// Arena bounds were not finite and positive.
    #[error("invalid bounds {width}x{height}: both must be finite and > 0")]
    InvalidBounds {
        /// Offending width.
        width: f64,
        /// Offending height.
        height: f64,
    },
    /// Reference height for potential energy was not finite.
    #[error("invalid reference height {0}: must be finite")]
    InvalidReferenceHeight(f64),
}
