mod answer;
mod block;
mod form;
mod ids;
mod snapshot;

pub use answer::{Answer, FileHandle, PhoneParts};
pub use block::{Block, BlockDraft, BlockError, BlockKind, SpecialRole, presentation_order};
pub use form::{FormDefinition, FormError};
pub use ids::{BlockId, FormId, ParseIdError};
pub use snapshot::{ResponseSnapshot, SNAPSHOT_STORAGE_NAME};
