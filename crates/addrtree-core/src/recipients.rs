// ── Recipient fields ──
//
// Each field is a "; "-joined list of "Name <mail>" entries. Appending never
// duplicates an entry already present.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::model::User;

const SEPARATOR: &str = "; ";

/// `"DisplayName <mail>"`.
pub fn format_user(user: &User) -> String {
    format!("{} <{}>", user.display_name, user.mail)
}

/// Split a field on `;`, trimming and dropping empty entries.
pub fn parse_field(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Append the addressable `users` not already in `field`.
///
/// Returns the new field value, or `None` when nothing would change.
pub fn add_to_field(field: &str, users: &[User]) -> Option<String> {
    let mut entries = parse_field(field);
    let before = entries.len();

    for entry in users.iter().filter(|u| u.is_addressable()).map(format_user) {
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    (entries.len() > before).then(|| entries.join(SEPARATOR))
}

/// Which recipient line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum RecipientKind {
    To,
    Cc,
    Bcc,
}

/// The three recipient lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipients {
    pub to: String,
    pub cc: String,
    pub bcc: String,
}

impl Recipients {
    pub fn field(&self, kind: RecipientKind) -> &str {
        match kind {
            RecipientKind::To => &self.to,
            RecipientKind::Cc => &self.cc,
            RecipientKind::Bcc => &self.bcc,
        }
    }

    fn field_mut(&mut self, kind: RecipientKind) -> &mut String {
        match kind {
            RecipientKind::To => &mut self.to,
            RecipientKind::Cc => &mut self.cc,
            RecipientKind::Bcc => &mut self.bcc,
        }
    }

    /// Replace a field verbatim (manual edit).
    pub fn set(&mut self, kind: RecipientKind, value: impl Into<String>) {
        *self.field_mut(kind) = value.into();
    }

    /// Merge `users` into a field. Returns `true` if the field changed.
    pub fn add(&mut self, kind: RecipientKind, users: &[User]) -> bool {
        match add_to_field(self.field(kind), users) {
            Some(updated) => {
                *self.field_mut(kind) = updated;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// All three fields blank after trimming.
    pub fn is_empty(&self) -> bool {
        self.to.trim().is_empty() && self.cc.trim().is_empty() && self.bcc.trim().is_empty()
    }
}
