//! The conversion orchestrator: audit → repair → encode on export, and
//! validate → decode → unit conversion → repair on import.
//!
//! Each call converts exactly one brep against an immutable tolerance/units
//! context. A failed object returns a structured error and the caller's batch
//! moves on — nothing cascades across objects, and this component never
//! opens or closes the host document's transactions.

use brepbridge_kernel::Brep;
use brepbridge_math::{ToleranceContext, UnitSystem};
use brepbridge_schema::NeutralBrep;
use tracing::{debug, info};

use crate::audit::audit;
use crate::error::ConvertError;
use crate::repair::{repair, scale};
use crate::report::{ConversionReport, EntityKind};
use crate::topology::{decode_brep, encode_brep};

/// How many audit/repair rounds export will run before accepting whatever
/// flags remain. Repair itself is single-pass; re-auditing until the flags
/// stabilize (or this bound is hit) catches the rare input that needs a
/// second pass.
const MAX_REPAIR_PASSES: usize = 3;

/// Export a native brep into the neutral schema.
///
/// The brep is audited and repaired in place first, so the caller's document
/// transaction wraps the whole call; aggregates are recomputed before
/// encoding. Returns the immutable neutral brep plus the conversion report.
pub fn export_brep(
    brep: &mut Brep,
    ctx: &ToleranceContext,
) -> Result<(NeutralBrep, ConversionReport), ConvertError> {
    if brep.face_count() == 0 {
        return Err(ConvertError::EmptyBrep);
    }
    let mut report = ConversionReport::new();

    let mut flags = audit(brep, ctx);
    let mut passes = 0;
    while !flags.is_empty() && passes < MAX_REPAIR_PASSES {
        passes += 1;
        info!(%flags, pass = passes, "repairing before export");
        report.info(
            EntityKind::Brep,
            None,
            format!("repair pass {passes}: {flags}"),
        );
        if !repair(brep, flags, ctx) {
            let diagnostics = brep
                .is_valid()
                .err()
                .unwrap_or_else(|| "validity checker returned no text".to_string());
            return Err(ConvertError::RepairFailed { diagnostics });
        }
        let next = audit(brep, ctx);
        if next == flags {
            // Stable flags will not improve with more passes.
            break;
        }
        flags = next;
    }
    if !flags.is_empty() {
        report.warning(
            EntityKind::Brep,
            None,
            format!("defects remain after repair: {flags}"),
        );
    }

    brep.compute_aggregates();
    let (neutral, encode_report) = encode_brep(brep, ctx);
    report.merge(encode_report);
    Ok((neutral, report))
}

/// Import a neutral brep into a native brep owned by the target document.
///
/// Validation failures are fatal contract errors. After decoding, geometry
/// converts into the target context's units, and a final repair pass cleans
/// up floating-point round-trip noise.
pub fn import_brep(
    neutral: &NeutralBrep,
    ctx: &ToleranceContext,
) -> Result<(Brep, ConversionReport), ConvertError> {
    let (mut brep, mut report) = decode_brep(neutral, ctx)?;

    let source_units = UnitSystem::from_name(&neutral.units)
        .ok_or_else(|| ConvertError::UnknownUnits(neutral.units.clone()))?;
    if source_units != ctx.units {
        let factor = source_units.conversion_factor(ctx.units);
        debug!(factor, "converting units");
        if !scale(&mut brep, factor, ctx) {
            report.warning(
                EntityKind::Brep,
                None,
                format!(
                    "unit conversion by {factor} would degenerate the model; kept {} coordinates",
                    neutral.units
                ),
            );
        }
    }

    let flags = audit(&brep, ctx);
    if !flags.is_empty() {
        report.info(
            EntityKind::Brep,
            None,
            format!("post-import repair: {flags}"),
        );
    }
    if !repair(&mut brep, flags, ctx) {
        let diagnostics = brep
            .is_valid()
            .err()
            .unwrap_or_else(|| "validity checker returned no text".to_string());
        return Err(ConvertError::RepairFailed { diagnostics });
    }

    Ok((brep, report))
}
