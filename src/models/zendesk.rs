use serde_json::Value;
use std::borrow::Cow;

use crate::error::RelayError;

/// What an inbound webhook body asks the relay to do.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    /// Endpoint check from the webhook platform; acknowledged, never forwarded.
    SettingsProbe,
    Ticket(ZendeskTicket),
    /// Raw `message` string, forwarded unmodified.
    Message(String),
}

impl InboundRequest {
    /// Classifies a parsed body. `settings` wins over `ticket`, which wins over `message`.
    pub fn classify(payload: &Value) -> Result<Self, RelayError> {
        let Some(object) = payload.as_object() else {
            return Err(RelayError::MissingField);
        };

        if object.contains_key("settings") {
            return Ok(Self::SettingsProbe);
        }

        if let Some(ticket) = object
            .get("ticket")
            .filter(|ticket| ticket.as_object().is_some_and(|fields| !fields.is_empty()))
        {
            return Ok(Self::Ticket(ZendeskTicket::from_value(ticket)));
        }

        match object.get("message").and_then(Value::as_str) {
            Some(message) if !message.is_empty() => Ok(Self::Message(message.to_string())),
            _ => Err(RelayError::MissingField),
        }
    }
}

/// One field pulled out of a ticket object.
///
/// `sources` are JSON pointers tried in order; the first one holding a usable
/// value wins, otherwise `default` is used.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub sources: &'static [&'static str],
    pub default: &'static str,
}

pub const TICKET_ID: FieldRule = FieldRule {
    sources: &["/id"],
    default: "Unknown",
};

pub const SUBJECT: FieldRule = FieldRule {
    sources: &["/subject"],
    default: "No Subject",
};

pub const STATUS: FieldRule = FieldRule {
    sources: &["/status"],
    default: "Unknown",
};

pub const PRIORITY: FieldRule = FieldRule {
    sources: &["/priority"],
    default: "Unknown",
};

pub const REQUESTER_EMAIL: FieldRule = FieldRule {
    sources: &["/requester/email"],
    default: "Unknown",
};

pub const BODY: FieldRule = FieldRule {
    sources: &["/latest_comment/body", "/description"],
    default: "No message provided",
};

impl FieldRule {
    pub fn resolve<'a>(&self, ticket: &'a Value) -> Cow<'a, str> {
        self.sources
            .iter()
            .filter_map(|pointer| ticket.pointer(pointer).and_then(render_scalar))
            .next()
            .unwrap_or(Cow::Borrowed(self.default))
    }
}

/// Strings must be non-blank; numbers and booleans are printed as-is.
fn render_scalar(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// The ticket fields the relay cares about, already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ZendeskTicket {
    pub id: String,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub requester_email: String,
    pub body: String,
}

impl ZendeskTicket {
    pub fn from_value(ticket: &Value) -> Self {
        let field = |rule: FieldRule| rule.resolve(ticket).into_owned();
        Self {
            id: field(TICKET_ID),
            subject: field(SUBJECT),
            status: field(STATUS),
            priority: field(PRIORITY),
            requester_email: field(REQUESTER_EMAIL),
            body: field(BODY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_key_is_a_probe_even_with_ticket() {
        let payload = json!({"settings": {}, "ticket": {"id": 1}});
        assert_eq!(
            InboundRequest::classify(&payload).unwrap(),
            InboundRequest::SettingsProbe
        );
    }

    #[test]
    fn ticket_takes_precedence_over_message() {
        let payload = json!({"ticket": {"id": 7}, "message": "hello"});
        match InboundRequest::classify(&payload).unwrap() {
            InboundRequest::Ticket(ticket) => assert_eq!(ticket.id, "7"),
            other => panic!("expected ticket, got {other:?}"),
        }
    }

    #[test]
    fn empty_ticket_falls_back_to_message() {
        let payload = json!({"ticket": {}, "message": "hello"});
        assert_eq!(
            InboundRequest::classify(&payload).unwrap(),
            InboundRequest::Message("hello".into())
        );
    }

    #[test]
    fn missing_or_empty_fields_are_rejected() {
        for payload in [
            json!({}),
            json!({"ticket": {}}),
            json!({"ticket": "not an object"}),
            json!({"message": ""}),
            json!({"message": 5}),
            json!([1, 2, 3]),
            json!("message"),
        ] {
            assert!(
                matches!(
                    InboundRequest::classify(&payload),
                    Err(RelayError::MissingField)
                ),
                "{payload} should be rejected"
            );
        }
    }

    #[test]
    fn absent_fields_get_placeholders() {
        let ticket = ZendeskTicket::from_value(&json!({"requester": {}}));
        assert_eq!(ticket.id, "Unknown");
        assert_eq!(ticket.subject, "No Subject");
        assert_eq!(ticket.status, "Unknown");
        assert_eq!(ticket.priority, "Unknown");
        assert_eq!(ticket.requester_email, "Unknown");
        assert_eq!(ticket.body, "No message provided");
    }

    #[test]
    fn latest_comment_beats_description() {
        let ticket = ZendeskTicket::from_value(&json!({
            "description": "original description",
            "latest_comment": {"body": "newest reply"}
        }));
        assert_eq!(ticket.body, "newest reply");
    }

    #[test]
    fn blank_comment_falls_back_to_description() {
        let ticket = ZendeskTicket::from_value(&json!({
            "description": "original description",
            "latest_comment": {"body": "  "}
        }));
        assert_eq!(ticket.body, "original description");
    }

    #[test]
    fn numeric_and_string_ids_both_render() {
        assert_eq!(ZendeskTicket::from_value(&json!({"id": 42})).id, "42");
        assert_eq!(ZendeskTicket::from_value(&json!({"id": "ZD-9"})).id, "ZD-9");
        assert_eq!(ZendeskTicket::from_value(&json!({"id": null})).id, "Unknown");
    }

    #[test]
    fn wrongly_shaped_nested_fields_default() {
        let ticket = ZendeskTicket::from_value(&json!({
            "requester": "someone@example.com",
            "latest_comment": ["body"],
            "subject": {"text": "nested"}
        }));
        assert_eq!(ticket.requester_email, "Unknown");
        assert_eq!(ticket.body, "No message provided");
        assert_eq!(ticket.subject, "No Subject");
    }
}
