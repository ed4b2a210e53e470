/// Connectivity as reported by the most recent backend response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Online,
    Offline,
}

impl ConnectionMode {
    /// Maps the wire vocabulary onto the two-state indicator. Both sentinels
    /// the backend variants emit for a connected agent count as online;
    /// anything else is offline.
    pub fn from_wire(mode: &str) -> Self {
        match mode {
            "online" | "openai" => Self::Online,
            _ => Self::Offline,
        }
    }
}

/// Presentation state for the status pill: a label plus the color pairing
/// derived from [`ConnectionMode`]. No history is kept.
#[derive(Debug, Clone)]
pub struct StatusIndicator {
    label: String,
    mode: ConnectionMode,
}

impl StatusIndicator {
    pub fn new(label: impl Into<String>, mode: ConnectionMode) -> Self {
        Self {
            label: label.into(),
            mode,
        }
    }

    pub fn set(&mut self, label: impl Into<String>, mode: ConnectionMode) {
        self.label = label.into();
        self.mode = mode;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }
}
