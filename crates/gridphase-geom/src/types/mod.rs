// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types shared by the detectors, integrator, and harness.
//!
//! Overlap notes:
//! - Overlap is strict on all four edges. Rectangles that only touch along
//!   an edge or at a corner are not colliding.
//! - Coordinates are screen-style: `x,y` is the top-left corner and `y` grows
//!   downward.

#[doc = "Axis-aligned rectangles."]
pub mod aabb;
#[doc = "Dynamic and static physics objects."]
pub mod object;
#[doc = "Canonical collision pairs and detector output."]
pub mod pair;
