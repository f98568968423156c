#![warn(missing_docs)]

//! Native NURBS/BREP kernel model for the brepbridge interchange core.
//!
//! This crate plays the role of the host kernel the converters read from and
//! write into: NURBS curves and surfaces in the kernel's own knot convention
//! (end multiplicity = degree), a closed set of analytic curve variants, and
//! a boundary-representation topology arena with the editing primitives that
//! tolerance repair needs.
//!
//! # Key types
//!
//! - [`NurbsCurveData`] / [`NurbsSurfaceData`] — free-form geometry with
//!   De Boor evaluation, Boehm knot insertion, exact degree elevation, and
//!   interpolation-based rebuild
//! - [`Curve3`] / [`Curve2`] — tagged curve variants for model space and
//!   surface parameter space
//! - [`Brep`] — the topology arena (vertices, edges, trims, loops, faces)
//!   plus geometry tables and cached aggregate scalars
//!
//! Model builders ([`Brep::box_solid`], [`Brep::sphere_patch`]) produce fully
//! wired reference solids for tests and round-trip checks.

mod builders;
mod curve;
mod edit;
mod nurbs;
mod props;
mod topology;

pub use curve::{Curve2, Curve3};
pub use nurbs::{NurbsCurveData, NurbsSurfaceData, SurfaceAxis, SurfaceSide};
pub use topology::{
    Brep, Edge, EdgeKey, Face, FaceKey, IsoStatus, Loop, LoopKey, LoopKind, SolidOrientation,
    Trim, TrimKey, TrimKind, Vertex, VertexKey,
};
