//! The four panes of the main screen and the focus ring across them.

mod recipients;
mod search;
mod tree;
mod users;

pub use recipients::RecipientsPane;
pub use search::SearchPane;
pub use tree::TreePane;
pub use users::UsersPane;

use addrtree_core::RecipientKind;

/// Which pane (or recipient line) receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Search,
    #[default]
    Tree,
    Users,
    Field(RecipientKind),
}

impl Focus {
    /// Tab order.
    pub const RING: [Self; 6] = [
        Self::Search,
        Self::Tree,
        Self::Users,
        Self::Field(RecipientKind::To),
        Self::Field(RecipientKind::Cc),
        Self::Field(RecipientKind::Bcc),
    ];

    fn position(self) -> usize {
        Self::RING.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::RING[(self.position() + 1) % Self::RING.len()]
    }

    pub fn prev(self) -> Self {
        Self::RING[(self.position() + Self::RING.len() - 1) % Self::RING.len()]
    }

    /// Printable keys go into a text field rather than to shortcuts.
    pub fn is_text_entry(self) -> bool {
        matches!(self, Self::Search | Self::Field(_))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn focus_ring_wraps_both_ways() {
        assert_eq!(Focus::Field(RecipientKind::Bcc).next(), Focus::Search);
        assert_eq!(Focus::Search.prev(), Focus::Field(RecipientKind::Bcc));
        assert_eq!(Focus::Tree.next(), Focus::Users);
        assert_eq!(Focus::Users.next(), Focus::Field(RecipientKind::To));
    }

    #[test]
    fn only_text_fields_capture_typing() {
        assert!(Focus::Search.is_text_entry());
        assert!(Focus::Field(RecipientKind::Cc).is_text_entry());
        assert!(!Focus::Tree.is_text_entry());
        assert!(!Focus::Users.is_text_entry());
    }
}
