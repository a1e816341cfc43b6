//! Logic core of a Neovim mail-composition plugin: address completion from a
//! mutt/neomutt alias file and a one-shot markdown toggle for message bodies.
//!
//! The host editor owns buffers, syntax and keymaps. It forwards its
//! completion callbacks and commands to an [`Engine`] and acts on what comes
//! back.
//!
//! The `mailcompose` binary only drives the line-based completion calls
//! ([`Engine::find_start`], [`Engine::complete_matches`],
//! [`Engine::complete_at`]). A host linking the library also gets the
//! buffer-addressed calls: it mirrors its buffers with
//! `BufferManager::attach`, `attach_file` and `detach`, then asks
//! [`Engine::find_start_in_buffer`] and [`Engine::toggle_markdown`] by id.
//!
//! ```
//! use mailcompose_core::{BufferId, Cursor, Engine, EngineAction, FindStart, Settings};
//!
//! let mut engine = Engine::with_settings(Settings::default());
//! let id = BufferId(7);
//! engine
//!     .buffer_manager
//!     .attach(id, "From: me@x.com\nTo: Bob <bob@x.com>, jo\n\nHi Bob,\n");
//!
//! assert_eq!(engine.find_start_in_buffer(id, Cursor::new(1, 23)), FindStart::Start(21));
//! assert_eq!(
//!     engine.toggle_markdown(id),
//!     EngineAction::EnableMarkdown { buffer: id, body_start: 3 }
//! );
//! assert_eq!(engine.toggle_markdown(id), EngineAction::None);
//!
//! assert!(engine.buffer_manager.detach(id).is_some());
//! assert!(engine.buffer_manager.is_empty());
//! ```

pub mod core;

pub use crate::core::{
    AddressResolver, AliasError, AliasRecord, BufferId, CompleteRequest, CompleteResponse,
    Completion, Cursor, Engine, EngineAction, FindStart, MessageKind, Settings,
};
