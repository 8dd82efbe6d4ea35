//! The rolling window of recently typed characters.

/// Bounded buffer of the most recently resolved characters.
///
/// After an append pushes the length past the configured maximum the oldest
/// character is dropped, so the length never exceeds `max + 1` and settles
/// back at `max`.
#[derive(Debug, Default)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Drop the last `amount` characters, as plain Backspace does.
    pub fn shorten_by(&mut self, amount: usize) {
        for _ in 0..amount {
            self.text.pop();
        }
    }

    /// Drop the oldest character if an append pushed us past `max`.
    pub fn trim_to(&mut self, max: usize) {
        if self.char_len() > max {
            let mut chars = self.text.chars();
            chars.next();
            self.text = chars.as_str().to_string();
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_never_exceeds_max_plus_one_and_settles_at_max() {
        let max = 5;
        let mut buffer = InputBuffer::new();
        for (i, c) in "abcdefghij".chars().enumerate() {
            buffer.push_str(&c.to_string());
            assert!(buffer.char_len() <= max + 1);
            buffer.trim_to(max);
            assert_eq!(buffer.char_len(), (i + 1).min(max));
        }
        assert_eq!(buffer.as_str(), "fghij");
    }

    #[test]
    fn shorten_removes_whole_characters() {
        let mut buffer = InputBuffer::new();
        buffer.push_str("naïve");
        buffer.shorten_by(1);
        assert_eq!(buffer.as_str(), "naïv");
        buffer.shorten_by(3);
        assert_eq!(buffer.as_str(), "n");
        // Shortening an empty buffer is a no-op
        buffer.shorten_by(5);
        assert_eq!(buffer.as_str(), "");
    }

    #[test]
    fn trim_drops_the_oldest_character() {
        let mut buffer = InputBuffer::new();
        buffer.push_str("éabc");
        buffer.trim_to(3);
        assert_eq!(buffer.as_str(), "abc");
    }

    #[test]
    fn clear_empties_regardless_of_content() {
        let mut buffer = InputBuffer::new();
        buffer.push_str("anything at all");
        buffer.clear();
        assert_eq!(buffer.as_str(), "");
        assert_eq!(buffer.char_len(), 0);
    }
}
