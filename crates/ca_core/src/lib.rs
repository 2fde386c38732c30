pub mod deadlines;
pub mod error;
pub mod models;
pub mod registry;
pub mod storage;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use models::{SummaryRequest, TextModel};
pub use registry::Registry;
pub use storage::{UpdateQuery, UpdateStorage};
pub use types::{Category, DeadlineEvent, NewUpdate, RawCandidate, Source, UpdateRecord};

pub mod prelude {
    pub use crate::{Category, Error, NewUpdate, Result, Source, TextModel, UpdateRecord, UpdateStorage};
}
