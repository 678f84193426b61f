//! Reject construction.
//!
//! Pure function from a refused message to the event describing it. The
//! topic depends on the message scope alone, so every boundary refusing
//! traffic for one scope converges on the same reflect channel.

use super::config::IngressConfig;
use serde_json::Value;
use shared_types::topics::reject_topic;
use shared_types::{
    BusMessage, ContractError, Meta, MessageType, Payload, RejectEvent, ScopeLevel,
    REJECT_WRONG_TYPE,
};

/// Scope stamped on rejects for messages that declare none.
pub const UNKNOWN_SCOPE: &str = "unknown";

/// Observed type recorded for headerless messages.
pub const OBSERVED_NONE: &str = "none";

/// Details key holding a declared scope that cannot be addressed.
pub const OBSERVED_SCOPE: &str = "observed_scope";

/// Build the reject event for `msg` refused on `topic`, together with the
/// topic it must be published on.
///
/// An empty scope counts as absent. A scope that is not a valid path
/// component is replaced by `house`/`unknown` and kept in the details under
/// [`OBSERVED_SCOPE`], so every refused message still yields a reject.
pub fn build_reject(
    config: &IngressConfig,
    topic: &str,
    msg: &BusMessage,
) -> Result<(String, RejectEvent), ContractError> {
    let mut details = Payload::new();

    let (level, declared) = msg.scope();
    let scope_level = level.unwrap_or(ScopeLevel::House);
    let declared = declared.filter(|scope| !scope.is_empty()).unwrap_or(UNKNOWN_SCOPE);
    let (scope_level, scope, reject_topic) = match reject_topic(scope_level, declared) {
        Ok(address) => (scope_level, declared.to_string(), address),
        Err(_) => {
            details.insert(OBSERVED_SCOPE.into(), Value::from(declared));
            (
                ScopeLevel::House,
                UNKNOWN_SCOPE.to_string(),
                reject_topic(ScopeLevel::House, UNKNOWN_SCOPE)?,
            )
        }
    };

    let observed = msg
        .message_type()
        .map_or(OBSERVED_NONE, |t| t.as_str());
    details.insert("observed_type".into(), Value::from(observed));
    details.insert("hint".into(), Value::from(config.hint.clone()));

    let meta = Meta::new(
        MessageType::RejectEvent,
        config.plane,
        msg.timestamp_ms().unwrap_or(0),
    )
    .with_correlation_id(msg.correlation_id().map(str::to_string))
    .with_source(config.publisher_id.clone());

    let event = RejectEvent {
        meta,
        reason: REJECT_WRONG_TYPE.to_string(),
        original_topic: topic.to_string(),
        publisher_id: msg.publisher_id().map(str::to_string),
        scope_level,
        scope,
        details,
    };
    Ok((reject_topic, event))
}
