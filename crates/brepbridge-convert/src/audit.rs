//! Read-only defect inspection of a native brep.
//!
//! The auditor never mutates anything; it reports a bitset of issue flags
//! that the repair pass consumes. Edge tolerance defects are per-edge
//! measurements against the document tolerance; surface knot defects are
//! parameterizations too tight for a consumer to distinguish adjacent knots.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use brepbridge_kernel::Brep;
use brepbridge_math::ToleranceContext;

use crate::knots::{min_delta, KNOT_MIN_DELTA};

/// Bitset of defects found by [`audit`]. Flags are not mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueFlags(u8);

impl IssueFlags {
    /// No defects.
    pub const NOTHING: IssueFlags = IssueFlags(0);
    /// Some edge's fitting tolerance exceeds the document tolerance.
    pub const OUT_OF_TOLERANCE_EDGES: IssueFlags = IssueFlags(1);
    /// Some face surface has knot spacing below [`KNOT_MIN_DELTA`].
    pub const OUT_OF_TOLERANCE_SURFACE_KNOTS: IssueFlags = IssueFlags(1 << 1);

    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is set in `self`.
    pub fn contains(&self, other: IssueFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for IssueFlags {
    type Output = IssueFlags;
    fn bitor(self, rhs: IssueFlags) -> IssueFlags {
        IssueFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for IssueFlags {
    fn bitor_assign(&mut self, rhs: IssueFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for IssueFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Nothing");
        }
        let mut parts = Vec::new();
        if self.contains(IssueFlags::OUT_OF_TOLERANCE_EDGES) {
            parts.push("OutOfToleranceEdges");
        }
        if self.contains(IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS) {
            parts.push("OutOfToleranceSurfaceKnots");
        }
        write!(f, "{}", parts.join("|"))
    }
}

/// Inspect a brep for tolerance and knot-spacing defects.
///
/// Side-effect free; the brep is untouched.
pub fn audit(brep: &Brep, ctx: &ToleranceContext) -> IssueFlags {
    let mut flags = IssueFlags::NOTHING;

    for edge in brep.edges.values() {
        if edge.fit_tolerance > ctx.absolute {
            flags |= IssueFlags::OUT_OF_TOLERANCE_EDGES;
            break;
        }
    }

    for face in brep.faces.values() {
        let surface = &brep.surfaces[face.surface];
        if min_delta(&surface.knots_u) < KNOT_MIN_DELTA
            || min_delta(&surface.knots_v) < KNOT_MIN_DELTA
        {
            flags |= IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS;
            break;
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_box_audits_nothing() {
        let brep = Brep::box_solid(1.0, 1.0, 1.0);
        let flags = audit(&brep, &ToleranceContext::default());
        assert!(flags.is_empty());
        assert_eq!(format!("{flags}"), "Nothing");
    }

    #[test]
    fn lowering_tolerance_flips_exactly_the_edge_flag() {
        let mut brep = Brep::box_solid(1.0, 1.0, 1.0);
        let ek = brep.edge_order[0];
        brep.edges[ek].fit_tolerance = 1e-3;

        // Above the edge's fitting tolerance: clean.
        let loose = ToleranceContext::new(1e-2, 1e-2, Default::default());
        assert!(audit(&brep, &loose).is_empty());

        // Below it: exactly the edge flag, nothing else.
        let tight = ToleranceContext::new(1e-4, 1e-2, Default::default());
        let flags = audit(&brep, &tight);
        assert_eq!(flags, IssueFlags::OUT_OF_TOLERANCE_EDGES);
        assert!(!flags.contains(IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS));
    }

    #[test]
    fn tight_surface_knots_flagged() {
        let mut brep = Brep::box_solid(1.0, 1.0, 1.0);
        // Compress one face surface's u knots far below the threshold.
        let fk = brep.face_order[0];
        let si = brep.faces[fk].surface;
        brep.surfaces[si].knots_u = vec![0.0, 1e-7];
        let flags = audit(&brep, &ToleranceContext::default());
        assert_eq!(flags, IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS);
    }

    #[test]
    fn flags_combine() {
        let both = IssueFlags::OUT_OF_TOLERANCE_EDGES | IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS;
        assert!(both.contains(IssueFlags::OUT_OF_TOLERANCE_EDGES));
        assert!(both.contains(IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS));
        assert_eq!(format!("{both}"), "OutOfToleranceEdges|OutOfToleranceSurfaceKnots");
    }

    #[test]
    fn audit_does_not_mutate() {
        let brep = Brep::box_solid(2.0, 2.0, 2.0);
        let before_counts = (
            brep.vertex_count(),
            brep.edge_count(),
            brep.trim_count(),
            brep.volume,
        );
        let _ = audit(&brep, &ToleranceContext::default());
        assert_eq!(
            before_counts,
            (
                brep.vertex_count(),
                brep.edge_count(),
                brep.trim_count(),
                brep.volume
            )
        );
    }
}
