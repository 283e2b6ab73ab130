#[derive(Debug, Default)]
/// On screen message bookkeeping
///
/// Painting is the renderer's job, this only decides for how many presentations a message
/// stays up
pub struct OnScreenDisplay {
    message: String,
    presentations_left: u32,
}

impl OnScreenDisplay {
    pub fn show(&mut self, message: impl Into<String>, presentations: u32) {
        self.message = message.into();
        self.presentations_left = presentations;
    }

    /// Message for the presentation about to happen, if one is still up
    pub fn next_presentation(&mut self) -> Option<&str> {
        if self.presentations_left == 0 {
            return None;
        }

        self.presentations_left -= 1;
        Some(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires() {
        let mut osd = OnScreenDisplay::default();
        assert_eq!(osd.next_presentation(), None);

        osd.show("Filter ON", 2);
        assert_eq!(osd.next_presentation(), Some("Filter ON"));
        assert_eq!(osd.next_presentation(), Some("Filter ON"));
        assert_eq!(osd.next_presentation(), None);
    }

    #[test]
    fn newer_message_replaces_older() {
        let mut osd = OnScreenDisplay::default();

        osd.show("CRT mode 1", 5);
        osd.next_presentation();
        osd.show("CRT mode 2", 1);

        assert_eq!(osd.next_presentation(), Some("CRT mode 2"));
        assert_eq!(osd.next_presentation(), None);
    }
}
