//! Inbound router: classifies each event and dispatches it to the forwarder.
//!
//! Stateless between events; every decision depends only on the event and the correlation store.
//! Private messages: welcome once, resolve placement, forward text (and photo). Operator messages:
//! check group and sender, resolve the reply target, forward photo or text to the end user.

use correlation_store::CorrelationStore;
use relay_core::{
    Destination, InboundEvent, MessagingApi, RelayError, Result, RouteClass,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::extractor::IdentityExtractor;
use crate::format::{tagged_body, ForwardLabels};
use crate::forwarder::MessageForwarder;
use crate::strategy::{PatternBased, ReplyTargetResolver, RoutingMode, ThreadBased};
use crate::welcome::WelcomeGreeter;

/// Body placeholder for messages without text, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPlaceholder {
    Photo,
    Document,
    Unsupported,
}

impl MediaPlaceholder {
    pub fn for_event(event: &InboundEvent) -> Self {
        if event.has_photo() {
            MediaPlaceholder::Photo
        } else if event.has_document {
            MediaPlaceholder::Document
        } else {
            MediaPlaceholder::Unsupported
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            MediaPlaceholder::Photo => "[Photo]",
            MediaPlaceholder::Document => "[Document]",
            MediaPlaceholder::Unsupported => "[Unsupported message]",
        }
    }
}

/// Text if present and non-empty, else the media placeholder token.
pub fn normalize_body(event: &InboundEvent) -> String {
    match event.text_body() {
        Some(text) => text.to_string(),
        None => MediaPlaceholder::for_event(event).token().to_string(),
    }
}

/// Why an event produced no sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Channel posts, sender-less messages.
    NotRoutable,
    /// Group message from a chat other than the operator group.
    ForeignGroup,
    FromBot,
    /// No end user is correlated with the message.
    NoTarget,
    Unresolvable,
    EmptyReply,
    NothingToSend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Ignored(IgnoreReason),
    Delivered { sends: usize },
}

/// Settings the router is built from; read once at startup.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub operator_group_id: i64,
    pub mode: RoutingMode,
    pub welcome_template: Option<String>,
    /// Label prefixes stripped from operator replies in pattern mode; `None` uses the relay's own labels.
    pub fallback_labels: Option<Vec<String>>,
}

impl RouterSettings {
    pub fn new(operator_group_id: i64) -> Self {
        Self {
            operator_group_id,
            mode: RoutingMode::default(),
            welcome_template: None,
            fallback_labels: None,
        }
    }
}

pub struct InboundRouter {
    operator_group_id: i64,
    targets: Arc<dyn ReplyTargetResolver>,
    forwarder: MessageForwarder,
    greeter: WelcomeGreeter,
}

impl InboundRouter {
    pub fn new(
        operator_group_id: i64,
        api: Arc<dyn MessagingApi>,
        targets: Arc<dyn ReplyTargetResolver>,
        greeter: WelcomeGreeter,
    ) -> Self {
        Self {
            operator_group_id,
            targets,
            forwarder: MessageForwarder::new(api),
            greeter,
        }
    }

    /// Builds the router and its strategy from `settings`.
    pub fn from_settings(
        settings: &RouterSettings,
        api: Arc<dyn MessagingApi>,
        store: Arc<dyn CorrelationStore>,
    ) -> Result<Self> {
        let group_id = settings.operator_group_id;
        let targets: Arc<dyn ReplyTargetResolver> = match settings.mode {
            RoutingMode::Threads => Arc::new(ThreadBased::new(store, api.clone(), group_id)),
            RoutingMode::Pattern => {
                let labels = ForwardLabels::default();
                let strip = settings
                    .fallback_labels
                    .clone()
                    .unwrap_or_else(|| labels.all());
                let extractor = IdentityExtractor::new(&labels.id_label, strip)?;
                Arc::new(PatternBased::new(extractor, labels, group_id))
            }
        };
        info!(mode = %settings.mode, group_id, "Router configured");
        let greeter = WelcomeGreeter::new(api.clone(), settings.welcome_template.clone());
        Ok(Self::new(group_id, api, targets, greeter))
    }

    pub fn mode(&self) -> RoutingMode {
        self.targets.mode()
    }

    /// Routes one event. Silent routing misses come back as `Ignored`; real failures as `Err`.
    #[instrument(skip(self, event), fields(chat_id = event.chat_id, message_id = event.message_id))]
    pub async fn route(&self, event: &InboundEvent) -> Result<RouteOutcome> {
        match event.route_class() {
            RouteClass::Private => self.route_private(event).await,
            RouteClass::OperatorGroup => self.route_operator(event).await,
            RouteClass::Other => {
                debug!(chat_kind = ?event.chat_kind, "Not routable, acknowledged only");
                Ok(RouteOutcome::Ignored(IgnoreReason::NotRoutable))
            }
        }
    }

    async fn route_private(&self, event: &InboundEvent) -> Result<RouteOutcome> {
        let Some(user) = event.end_user() else {
            return Ok(RouteOutcome::Ignored(IgnoreReason::NotRoutable));
        };

        self.greeter.greet_once(&user).await;

        let placement = self.targets.placement(&user).await?;
        let tagged = tagged_body(&user, &normalize_body(event));
        let text = match &placement.header {
            Some(header) => format!("{}\n\n{}", header, tagged),
            None => tagged,
        };

        let destination = placement.destination;
        match event.largest_photo() {
            Some(photo) => {
                let (text_sent, photo_sent) = tokio::join!(
                    self.forwarder.send_text(&destination, &text),
                    self.forwarder.send_photo(
                        &destination,
                        &photo.file_id,
                        placement.header.as_deref()
                    ),
                );
                text_sent?;
                photo_sent?;
                Ok(RouteOutcome::Delivered { sends: 2 })
            }
            None => {
                self.forwarder.send_text(&destination, &text).await?;
                Ok(RouteOutcome::Delivered { sends: 1 })
            }
        }
    }

    async fn route_operator(&self, event: &InboundEvent) -> Result<RouteOutcome> {
        if event.chat_id != self.operator_group_id {
            debug!(
                expected = self.operator_group_id,
                "Group message from foreign chat, ignored"
            );
            return Ok(RouteOutcome::Ignored(IgnoreReason::ForeignGroup));
        }
        if event.sender_is_bot() {
            debug!("Message from bot, ignored");
            return Ok(RouteOutcome::Ignored(IgnoreReason::FromBot));
        }

        let target = match self.targets.resolve_reply_target(event).await {
            Ok(Some(target)) => target,
            Ok(None) => return Ok(RouteOutcome::Ignored(IgnoreReason::NoTarget)),
            Err(e) if e.is_silent() => {
                debug!(reason = %e, "Reply target not resolved, dropped");
                let reason = match e {
                    RelayError::EmptyReply { .. } => IgnoreReason::EmptyReply,
                    _ => IgnoreReason::Unresolvable,
                };
                return Ok(RouteOutcome::Ignored(reason));
            }
            Err(e) => return Err(e),
        };

        let destination = Destination::private(target.end_user);
        if let Some(photo) = event.largest_photo() {
            let caption = target.body.as_deref().unwrap_or_default();
            self.forwarder
                .send_photo(&destination, &photo.file_id, Some(caption))
                .await?;
            return Ok(RouteOutcome::Delivered { sends: 1 });
        }

        match target.body.as_deref().filter(|b| !b.is_empty()) {
            Some(body) => {
                self.forwarder.send_text(&destination, body).await?;
                Ok(RouteOutcome::Delivered { sends: 1 })
            }
            None => Ok(RouteOutcome::Ignored(IgnoreReason::NothingToSend)),
        }
    }
}
