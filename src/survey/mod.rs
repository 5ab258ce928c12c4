//! Questionnaire core: schema, answers, validation, session and summary.

pub mod items;
pub mod options;
pub mod path;
pub mod record;
pub mod schema;
pub mod session;
pub mod submission;
pub mod summary;
pub mod validation;

pub use items::{ItemList, RowId};
pub use path::{AssetField, DebtField, FieldKey, FieldPath};
pub use record::{AnswerRecord, AssetItem, DebtItem, FinalizedRecord};
pub use schema::{FieldKind, FieldSpec, SectionId, SECTION_COUNT};
pub use session::{
    AdvanceGate, FieldUpdate, NumericInputPolicy, SessionOptions, SubmitOutcome, SurveySession,
    Viewport,
};
pub use submission::{LogSink, MemorySink, SubmissionSink};
pub use summary::SummaryView;
pub use validation::{ErrorReport, ValidationFailure};
