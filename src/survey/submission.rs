use crate::errors::{Result, SurveyError};
use crate::survey::record::FinalizedRecord;

/// Receives finalized records.
pub trait SubmissionSink {
    fn submit(&mut self, record: &FinalizedRecord) -> Result<()>;
}

/// Sink that writes the record as JSON to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit(&mut self, record: &FinalizedRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        tracing::info!(
            id = %record.id,
            ignored_errors = record.ignored_errors,
            record = %json,
            "record submitted"
        );
        Ok(())
    }
}

/// Sink that keeps every record in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<FinalizedRecord>,
}

impl MemorySink {
    pub fn records(&self) -> &[FinalizedRecord] {
        &self.records
    }
}

impl SubmissionSink for MemorySink {
    fn submit(&mut self, record: &FinalizedRecord) -> Result<()> {
        if self.records.iter().any(|existing| existing.id == record.id) {
            return Err(SurveyError::Submission(format!(
                "record {} was already submitted",
                record.id
            )));
        }
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::record::AnswerRecord;

    #[test]
    fn memory_sink_rejects_duplicate_ids() {
        let record = FinalizedRecord::new(AnswerRecord::default(), false);
        let mut sink = MemorySink::default();
        sink.submit(&record).unwrap();
        assert!(matches!(sink.submit(&record), Err(SurveyError::Submission(_))));
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn log_sink_accepts_records() {
        let record = FinalizedRecord::new(AnswerRecord::default(), true);
        assert!(LogSink.submit(&record).is_ok());
    }
}
