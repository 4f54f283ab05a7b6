//! Command resolver
//!
//! Classifies an inbound event into an [`Intent`]. Button postbacks and typed
//! keywords map onto the same intents, so every button has a text fallback.

use crate::models::line_event::InboundKind;
use crate::state::{Field, Intent, Phase};

/// Keyword typed by the user
fn keyword_intent(text: &str) -> Option<Intent> {
    let intent = match text {
        "開始" => Intent::Start,
        "終了" => Intent::End,
        "追加" => Intent::AddEntry,
        "キャンセル" => Intent::Cancel,
        "種目" => Intent::Revisit(Field::Exercise),
        "重量" => Intent::Revisit(Field::Weight),
        "回数" => Intent::Revisit(Field::Reps),
        _ => return None,
    };
    Some(intent)
}

/// `action` value of a postback
fn action_intent(action: &str) -> Option<Intent> {
    let intent = match action {
        "start" => Intent::Start,
        "end" => Intent::End,
        "add" => Intent::AddEntry,
        "cancel" => Intent::Cancel,
        "exercise" => Intent::Revisit(Field::Exercise),
        "weight" => Intent::Revisit(Field::Weight),
        "count" | "reps" => Intent::Revisit(Field::Reps),
        _ => return None,
    };
    Some(intent)
}

/// Extract the `action` parameter from postback data such as `action=add&x=1`
pub fn postback_action(data: &str) -> Option<String> {
    url::form_urlencoded::parse(data.as_bytes())
        .find(|(key, _)| key == "action")
        .map(|(_, value)| value.trim().to_string())
}

/// Resolve the intent of an event given the user's current phase.
///
/// Keywords win over field input. Free text becomes field input only while
/// the phase expects a field; otherwise it is `Unknown`.
pub fn resolve_intent(kind: &InboundKind, phase: Phase) -> Intent {
    match kind {
        InboundKind::Postback { data } => postback_action(data)
            .and_then(|action| action_intent(&action))
            .unwrap_or(Intent::Unknown),
        InboundKind::Message { text: Some(text) } => {
            let text = text.trim();
            if let Some(intent) = keyword_intent(text) {
                return intent;
            }
            if phase.expected_field().is_some() && !text.is_empty() {
                Intent::ProvideField(text.to_string())
            } else {
                Intent::Unknown
            }
        }
        InboundKind::Message { text: None } | InboundKind::Follow => Intent::Unknown,
    }
}
