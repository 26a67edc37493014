pub mod types;
pub mod error;
pub mod cursor;
pub mod pool;
pub mod lut;
pub mod platform;
pub mod motion;
pub mod model;
pub mod effects;
pub mod language;
pub mod event;

pub use error::{EventError, Result};
pub use event::{Event, EventSource};
pub use language::EventLanguage;
pub use model::ModelData;
pub use platform::Platform;
