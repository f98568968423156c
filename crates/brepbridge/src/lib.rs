#![warn(missing_docs)]

//! High-level facade for the brepbridge interchange stack.
//!
//! Re-exports the math/context layer, the neutral schema, the native kernel
//! model, and the conversion pipeline, so hosts depend on one crate:
//!
//! ```
//! use brepbridge::{export_brep, import_brep, Brep, ToleranceContext};
//!
//! let ctx = ToleranceContext::default();
//! let mut solid = Brep::box_solid(10.0, 10.0, 10.0);
//! let (neutral, _report) = export_brep(&mut solid, &ctx).unwrap();
//! let (restored, _) = import_brep(&neutral, &ctx).unwrap();
//! assert!(restored.is_closed);
//! ```

pub use brepbridge_convert::{
    audit_brep, decode_brep, encode_brep, export_brep, import_brep, repair_brep, scale_brep,
    ConversionReport, ConvertError, CurveRole, EntityKind, IssueFlags, ReportEntry, Severity,
};
pub use brepbridge_kernel::{
    Brep, Curve2, Curve3, IsoStatus, LoopKind, NurbsCurveData, NurbsSurfaceData,
    SolidOrientation, SurfaceAxis, TrimKind,
};
pub use brepbridge_math::{
    BoundingBox, Interval, Point2, Point3, ToleranceContext, UnitSystem, Vec2, Vec3,
};
pub use brepbridge_schema::{NeutralBrep, NeutralCurve, NeutralSurface, SchemaError};
