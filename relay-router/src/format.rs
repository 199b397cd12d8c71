//! Text formats the relay writes into the operator group.

use relay_core::EndUser;

/// Tag used for end users without a username.
pub const CUSTOMER_PLACEHOLDER: &str = "Customer";

/// Labels of the header block written in pattern mode. The extractor reads the id back through
/// `id_label` and strips every label line from operator replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardLabels {
    pub header: String,
    pub id_label: String,
    pub user_label: String,
    pub name_label: String,
}

impl Default for ForwardLabels {
    fn default() -> Self {
        Self {
            header: "📨 Customer message".to_string(),
            id_label: "ID:".to_string(),
            user_label: "User:".to_string(),
            name_label: "Name:".to_string(),
        }
    }
}

impl ForwardLabels {
    /// Header block identifying `user`, one label per line.
    pub fn header_block(&self, user: &EndUser) -> String {
        format!(
            "{}\n{} {}\n{} {}\n{} {}",
            self.header,
            self.id_label,
            user.id,
            self.user_label,
            user.handle_or(CUSTOMER_PLACEHOLDER),
            self.name_label,
            user.first_name.as_deref().unwrap_or("-"),
        )
    }

    /// Every label this format writes.
    pub fn all(&self) -> Vec<String> {
        vec![
            self.header.clone(),
            self.id_label.clone(),
            self.user_label.clone(),
            self.name_label.clone(),
        ]
    }
}

/// `"{tag}: {body}"` where tag is the user's handle or [`CUSTOMER_PLACEHOLDER`].
pub fn tagged_body(user: &EndUser, body: &str) -> String {
    format!("{}: {}", user.handle_or(CUSTOMER_PLACEHOLDER), body)
}

/// Name of the thread created for `user`.
pub fn thread_name(user: &EndUser) -> String {
    format!(
        "{} {} ({})",
        CUSTOMER_PLACEHOLDER,
        user.id,
        user.handle_or(CUSTOMER_PLACEHOLDER)
    )
}
