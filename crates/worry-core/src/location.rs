//! Location backends: the mutable "current fragment" and its change signal.

/// Where the router reads and writes the current fragment.
pub trait Location: Send {
    /// The raw fragment, e.g. `#/worry/abc`, or empty.
    fn fragment(&self) -> String;

    /// Point at `path`. Raises a change only when the fragment differs.
    fn set_fragment(&mut self, path: &str);

    /// Go to the previous entry in history, if there is one.
    fn back(&mut self);

    /// Returns true once per change since the last call, including once
    /// for the initial load.
    fn take_change(&mut self) -> bool;
}

/// In-process location with a history stack.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Vec<String>,
    pending_change: bool,
}

impl MemoryLocation {
    /// Start at an empty fragment.
    pub fn new() -> Self {
        Self {
            history: vec![String::new()],
            pending_change: true,
        }
    }

    /// Start deep-linked at `path`.
    pub fn at(path: &str) -> Self {
        Self {
            history: vec![to_fragment(path)],
            pending_change: true,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.history.last().cloned().unwrap_or_default()
    }

    fn set_fragment(&mut self, path: &str) {
        let fragment = to_fragment(path);
        if self.history.last() == Some(&fragment) {
            return;
        }
        self.history.push(fragment);
        self.pending_change = true;
    }

    fn back(&mut self) {
        if self.history.len() > 1 {
            self.history.pop();
            self.pending_change = true;
        }
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.pending_change)
    }
}

fn to_fragment(path: &str) -> String {
    if path.is_empty() || path.starts_with('#') {
        path.to_string()
    } else {
        format!("#{path}")
    }
}
