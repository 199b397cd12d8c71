//! Identity extraction for pattern mode.
//!
//! Operators reply to a forwarded message; the end user's id is read from the `ID:` line of the
//! *replied-to* text, and the label lines are stripped from the operator's own text.

use regex::Regex;
use relay_core::{EndUserId, InboundEvent, RelayError, Result};

use crate::format::ForwardLabels;

/// Recovers `(end user, cleaned body)` from an operator reply.
#[derive(Debug, Clone)]
pub struct IdentityExtractor {
    id_line: Regex,
    strip_labels: Vec<String>,
}

impl IdentityExtractor {
    /// `id_label` is the literal prefix of the id line (e.g. `ID:`); `strip_labels` are line prefixes
    /// removed from operator text.
    pub fn new(id_label: &str, strip_labels: Vec<String>) -> Result<Self> {
        let pattern = format!(
            r"(?m)^[ \t]*{}[ \t]*(\d+)[ \t]*\r?$",
            regex::escape(id_label.trim())
        );
        let id_line = Regex::new(&pattern)
            .map_err(|e| RelayError::Config(format!("invalid id label {:?}: {}", id_label, e)))?;
        let strip_labels = strip_labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(Self {
            id_line,
            strip_labels,
        })
    }

    /// Extractor matching the header written with `labels`.
    pub fn from_labels(labels: &ForwardLabels) -> Result<Self> {
        Self::new(&labels.id_label, labels.all())
    }

    /// Reads the end user from the replied-to message and cleans the operator's text.
    ///
    /// Fails with `UnresolvableIdentity` when the event is not a reply or the replied-to text has no
    /// numeric id line, and with `EmptyReply` when nothing is left after cleaning.
    pub fn extract(&self, event: &InboundEvent) -> Result<(EndUserId, String)> {
        let reply = event
            .reply_to
            .as_ref()
            .ok_or_else(|| RelayError::UnresolvableIdentity("message is not a reply".into()))?;
        let replied_text = reply.text.as_deref().ok_or_else(|| {
            RelayError::UnresolvableIdentity(format!(
                "replied-to message {} has no text",
                reply.message_id
            ))
        })?;
        let end_user = self.extract_id(replied_text).ok_or_else(|| {
            RelayError::UnresolvableIdentity(format!(
                "replied-to message {} has no id line",
                reply.message_id
            ))
        })?;

        let source = event
            .text_body()
            .or(event.caption.as_deref())
            .unwrap_or_default();
        let body = self.clean(source);
        if body.is_empty() {
            return Err(RelayError::EmptyReply { end_user });
        }
        Ok((end_user, body))
    }

    /// First id line in `text`. Ids that overflow are treated as missing.
    pub fn extract_id(&self, text: &str) -> Option<EndUserId> {
        self.id_line
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map(EndUserId)
    }

    /// Drops every line starting with a known label, then trims.
    pub fn clean(&self, text: &str) -> String {
        text.lines()
            .filter(|line| {
                let line = line.trim_start();
                !self.strip_labels.iter().any(|label| line.starts_with(label.as_str()))
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}
