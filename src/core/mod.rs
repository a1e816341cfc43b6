pub mod alias;
pub mod buffer;
pub mod buffer_manager;
pub mod completion;
pub mod engine;
pub mod settings;

pub use alias::{AddressResolver, AliasError, AliasRecord};
pub use buffer::{BufferId, Cursor};
pub use completion::{CompleteRequest, CompleteResponse, Completion, FindStart};
pub use engine::{Engine, EngineAction, MessageKind};
pub use settings::Settings;
