use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use super::buffer::{Buffer, BufferId};

/// Per-buffer plugin state.
#[derive(Debug)]
pub struct BufferState {
    pub buffer: Buffer,
    /// Path of the message file being composed, if any.
    pub file_path: Option<PathBuf>,
    /// Markdown highlighting has been layered over the body. Set once, never
    /// cleared.
    pub markdown_enabled: bool,
}

impl BufferState {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            file_path: None,
            markdown_enabled: false,
        }
    }

    pub fn with_file(buffer: Buffer, path: PathBuf) -> Self {
        Self {
            buffer,
            file_path: Some(path),
            markdown_enabled: false,
        }
    }

    /// Get the display name for this buffer (filename or "[No Name]").
    pub fn display_name(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[No Name]".to_string())
    }
}

/// Mail buffers the plugin has been attached to, keyed by the host's id.
#[derive(Debug, Default)]
pub struct BufferManager {
    buffers: HashMap<BufferId, BufferState>,
}

impl BufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to a buffer, mirroring `text`. Re-attaching an existing id only
    /// refreshes its text; the markdown flag survives.
    pub fn attach(&mut self, id: BufferId, text: &str) -> &mut BufferState {
        let state = self
            .buffers
            .entry(id)
            .or_insert_with(|| BufferState::new(Buffer::new(id)));
        state.buffer.set_text(text);
        state
    }

    /// Attach to a buffer backed by a message file on disk.
    pub fn attach_file(&mut self, id: BufferId, path: &Path) -> Result<&mut BufferState, io::Error> {
        let buffer = Buffer::from_file(id, path)?;
        let slot = self
            .buffers
            .entry(id)
            .or_insert_with(|| BufferState::new(Buffer::new(id)));
        let markdown_enabled = slot.markdown_enabled;
        *slot = BufferState::with_file(buffer, path.to_path_buf());
        slot.markdown_enabled = markdown_enabled;
        Ok(slot)
    }

    /// Forget a buffer, e.g. when the host wipes it.
    pub fn detach(&mut self, id: BufferId) -> Option<BufferState> {
        self.buffers.remove(&id)
    }

    pub fn get(&self, id: BufferId) -> Option<&BufferState> {
        self.buffers.get(&id)
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut BufferState> {
        self.buffers.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_attach_and_get() {
        let mut bm = BufferManager::new();
        bm.attach(BufferId(3), "To: bob");
        assert_eq!(bm.len(), 1);
        let state = bm.get(BufferId(3)).unwrap();
        assert_eq!(state.buffer.line_text(0).as_deref(), Some("To: bob"));
        assert!(!state.markdown_enabled);
        assert_eq!(state.display_name(), "[No Name]");
    }

    #[test]
    fn test_reattach_keeps_markdown_flag() {
        let mut bm = BufferManager::new();
        bm.attach(BufferId(1), "To: a").markdown_enabled = true;
        bm.attach(BufferId(1), "To: ab");
        let state = bm.get(BufferId(1)).unwrap();
        assert!(state.markdown_enabled);
        assert_eq!(state.buffer.line_text(0).as_deref(), Some("To: ab"));
    }

    #[test]
    fn test_attach_file() {
        let dir = std::env::temp_dir().join("mailcompose_bm_attach_file");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("neomutt-host-1000-1");
        fs::write(&path, "To: carol\n\nbody\n").unwrap();

        let mut bm = BufferManager::new();
        let state = bm.attach_file(BufferId(9), &path).unwrap();
        assert_eq!(state.display_name(), "neomutt-host-1000-1");
        assert_eq!(state.buffer.body_start(), 2);
    }

    #[test]
    fn test_attach_missing_file_errors() {
        let mut bm = BufferManager::new();
        let path = std::env::temp_dir().join("mailcompose_bm_missing/none");
        assert!(bm.attach_file(BufferId(1), &path).is_err());
        assert!(bm.is_empty());
    }

    #[test]
    fn test_detach() {
        let mut bm = BufferManager::new();
        bm.attach(BufferId(1), "");
        assert!(bm.detach(BufferId(1)).is_some());
        assert!(bm.get(BufferId(1)).is_none());
        assert!(bm.detach(BufferId(1)).is_none());
    }
}
