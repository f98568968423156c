#![warn(missing_docs)]

//! BREP/NURBS encoder-decoder with topology reconstruction and tolerance
//! repair.
//!
//! This crate moves boundary-representation solids and surfaces between the
//! native kernel model (`brepbridge-kernel`) and the neutral interchange
//! schema (`brepbridge-schema`), translating the two kernels' knot-vector
//! conventions and healing geometry that violates the target's invariants.
//!
//! # Components
//!
//! - [`knots`] — pure knot-vector translation and degenerate-spacing
//!   detection
//! - [`curve`] / [`surface`] — per-entity conversion, including degree
//!   elevation and interior-multiplicity repair for NURBS curves
//! - [`topology`] — whole-graph conversion between the arena and the flat
//!   index-referenced arrays
//! - [`audit`] / [`repair`] — defect inspection and tolerance-based healing
//! - [`pipeline`] — the orchestrator: audit → repair → encode on export,
//!   validate → decode → repair on import
//!
//! Tolerances and units always arrive as an explicit
//! [`ToleranceContext`](brepbridge_math::ToleranceContext) — nothing reads
//! ambient document state, so independent breps may convert in parallel.
//!
//! # Example
//!
//! ```
//! use brepbridge_convert::pipeline::{export_brep, import_brep};
//! use brepbridge_kernel::Brep;
//! use brepbridge_math::ToleranceContext;
//!
//! let ctx = ToleranceContext::default();
//! let mut solid = Brep::box_solid(10.0, 10.0, 10.0);
//! let (neutral, report) = export_brep(&mut solid, &ctx).unwrap();
//! assert!(!report.has_errors());
//! let (restored, _) = import_brep(&neutral, &ctx).unwrap();
//! assert!(restored.is_closed);
//! ```

pub mod audit;
pub mod curve;
pub mod error;
pub mod knots;
pub mod pipeline;
pub mod repair;
pub mod report;
pub mod surface;
pub mod topology;

pub use audit::{audit as audit_brep, IssueFlags};
pub use curve::{decode_curve2, decode_curve3, encode_curve2, encode_curve3, CurveRole};
pub use error::ConvertError;
pub use pipeline::{export_brep, import_brep};
pub use repair::{repair as repair_brep, scale as scale_brep};
pub use report::{ConversionReport, EntityKind, ReportEntry, Severity};
pub use surface::{decode_surface, encode_surface};
pub use topology::{decode_brep, encode_brep};
