//! Per-object conversion reporting.
//!
//! Per-entity conversion failures are non-fatal: the offending entity is
//! skipped, an entry lands in the owning brep's report, and the conversion
//! continues. The report also carries informational entries such as the
//! positional deviation of rebuilt curves.

use tracing::{debug, warn};

/// How serious a report entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational, e.g. a measured rebuild deviation.
    Info,
    /// Something was preserved in a degraded form.
    Warning,
    /// An entity was skipped entirely.
    Error,
}

/// Which entity class an entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A vertex.
    Vertex,
    /// A 3D edge curve.
    Curve3d,
    /// A 2D trim curve.
    Curve2d,
    /// A surface.
    Surface,
    /// A face.
    Face,
    /// An edge.
    Edge,
    /// A loop.
    Loop,
    /// A trim.
    Trim,
    /// The brep as a whole.
    Brep,
}

/// One entry in a conversion report.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    /// Severity of the entry.
    pub severity: Severity,
    /// Entity class the entry refers to.
    pub entity: EntityKind,
    /// Index of the entity within its array, when applicable.
    pub index: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

/// The conversion report attached to one brep's encode or decode.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// All entries, in the order they were recorded.
    pub entries: Vec<ReportEntry>,
}

impl ConversionReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational entry.
    pub fn info(&mut self, entity: EntityKind, index: Option<usize>, message: impl Into<String>) {
        let message = message.into();
        debug!(?entity, index, %message, "conversion note");
        self.entries.push(ReportEntry {
            severity: Severity::Info,
            entity,
            index,
            message,
        });
    }

    /// Record a degraded-but-preserved entry.
    pub fn warning(
        &mut self,
        entity: EntityKind,
        index: Option<usize>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        warn!(?entity, index, %message, "conversion warning");
        self.entries.push(ReportEntry {
            severity: Severity::Warning,
            entity,
            index,
            message,
        });
    }

    /// Record a skipped entity.
    pub fn error(&mut self, entity: EntityKind, index: Option<usize>, message: impl Into<String>) {
        let message = message.into();
        warn!(?entity, index, %message, "entity skipped");
        self.entries.push(ReportEntry {
            severity: Severity::Error,
            entity,
            index,
            message,
        });
    }

    /// Whether any entity was skipped.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }

    /// Append another report's entries to this one.
    pub fn merge(&mut self, other: ConversionReport) {
        self.entries.extend(other.entries);
    }
}
