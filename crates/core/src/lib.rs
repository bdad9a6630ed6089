pub mod record;
pub mod session;
pub mod stage;

pub use record::{merge, Field, FieldRecord, FieldUpdate, MergePolicy};
pub use session::{ExportError, Session, SessionId};
pub use stage::{FieldGroup, Stage, StageError};
