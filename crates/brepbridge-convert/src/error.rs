//! Fatal conversion errors.
//!
//! Only contract violations and whole-object failures live here; per-entity
//! problems are recorded in the [`ConversionReport`](crate::ConversionReport)
//! and never abort a conversion.

use thiserror::Error;

use brepbridge_schema::SchemaError;

/// A failure that aborts the conversion of one brep.
///
/// The calling orchestrator reports the failure for this object and proceeds
/// to the next one in its batch; nothing cascades.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The neutral input violates the schema contract — a serializer bug
    /// upstream, not a geometry defect, so it is never swallowed.
    #[error("malformed neutral schema: {0}")]
    Schema(#[from] SchemaError),

    /// The brep was still invalid after repair. Carries the kernel's own
    /// validity diagnostics verbatim; the text is opaque and not reparsed.
    #[error("brep repair failed:\n{diagnostics}")]
    RepairFailed {
        /// Free-form diagnostic text from the kernel's validity checker.
        diagnostics: String,
    },

    /// The neutral brep declares a unit system this pipeline cannot map.
    #[error("unrecognized unit system: {0:?}")]
    UnknownUnits(String),

    /// Nothing to convert.
    #[error("brep has no faces")]
    EmptyBrep,
}
