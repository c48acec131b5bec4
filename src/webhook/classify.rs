use tracing::warn;

use super::extract::Node;
use crate::event::EventKind;

// Precedence order; the first key present wins.
const PRECEDENCE: [EventKind; 4] = [
    EventKind::OptIn,
    EventKind::Message,
    EventKind::Delivery,
    EventKind::Postback,
];

/// Decides which kind of messaging event `node` is.
///
/// The keys `optin`, `message`, `delivery` and `postback` are checked in that order
/// and the first one present wins. Messenger sends one of them per event; when a node
/// carries more than one, the shadowed kinds are reported with a warning and dropped.
/// A node with none of them is [`EventKind::Unknown`].
///
/// # Example
/// ```rust
/// use messenger_bot_rs::{EventKind, webhook::{classify, Node}};
///
/// let value = serde_json::json!({"message": {}, "postback": {}});
/// let node = Node::from_value(&value).unwrap();
/// assert_eq!(classify(node), EventKind::Message);
/// ```
pub fn classify(node: Node<'_>) -> EventKind {
    let mut present = PRECEDENCE
        .into_iter()
        .filter(|kind| kind.key().is_some_and(|key| node.contains(key)));

    let Some(kind) = present.next() else {
        return EventKind::Unknown;
    };

    let shadowed: Vec<EventKind> = present.collect();
    if !shadowed.is_empty() {
        warn!(
            chosen = %kind,
            ?shadowed,
            "ambiguous messaging event: more than one event key present"
        );
    }

    kind
}
