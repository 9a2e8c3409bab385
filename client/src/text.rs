/// Characters typed into the hidden text field that have not become a
/// sticker yet. Append-only until taken.
#[derive(Clone, Debug, Default)]
pub struct PendingText {
    buffer: String,
}

impl PendingText {
    pub fn push(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Empties the buffer. Whitespace-only input yields nothing.
    pub fn take(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.buffer);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_text_once() {
        let mut pending = PendingText::default();
        pending.push('H');
        pending.push('i');
        assert_eq!(pending.as_str(), "Hi");
        assert_eq!(pending.take().as_deref(), Some("Hi"));
        assert!(pending.is_empty());
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn blank_text_is_discarded() {
        let mut pending = PendingText::default();
        pending.push(' ');
        pending.push('\n');
        assert_eq!(pending.take(), None);
        assert!(pending.is_empty());
    }
}
