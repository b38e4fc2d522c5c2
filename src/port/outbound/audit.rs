//! Audit sink port.

use crate::domain::AuditRecord;
use crate::error::Result;

/// Append-only destination for terminal executions.
pub trait AuditSink: Send + Sync {
    /// Append one record.
    fn record(&self, record: &AuditRecord) -> Result<()>;
}

/// Discards every record.
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _record: &AuditRecord) -> Result<()> {
        Ok(())
    }
}
