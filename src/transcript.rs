/// Role tag attached to every bubble, used for styling and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Typing,
}

/// Handle returned by [`Transcript::append`]. Stable for the lifetime of the
/// bubble; only the typing placeholder is ever removed through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleId(u64);

#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    pub role: Role,
    pub text: String,
}

/// Ordered list of chat bubbles. Bubbles are immutable once appended; text is
/// kept verbatim and rendered as plain text.
#[derive(Debug, Default)]
pub struct Transcript {
    next_id: u64,
    bubbles: Vec<Bubble>,
}

impl Transcript {
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        self.bubbles.push(Bubble {
            id,
            role,
            text: text.into(),
        });
        id
    }

    pub fn remove(&mut self, id: BubbleId) {
        self.bubbles.retain(|bubble| bubble.id != id);
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }
}
