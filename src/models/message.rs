use super::zendesk::ZendeskTicket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Ticket,
    Plain,
}

/// The text sent downstream for one accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    kind: MessageKind,
    text: String,
}

impl OutboundMessage {
    pub fn from_ticket(ticket: &ZendeskTicket) -> Self {
        let text = format!(
            "🎫 **New Ticket #{id}**\n\n\
             📌 **Subject:** {subject}\n\
             🔘 **Status:** {status}\n\
             ⚡ **Priority:** {priority}\n\
             👤 **Requester:** {requester}\n\n\
             💬 **Message:**\n{body}",
            id = ticket.id,
            subject = ticket.subject,
            status = ticket.status,
            priority = ticket.priority,
            requester = ticket.requester_email,
            body = ticket.body,
        );
        Self {
            kind: MessageKind::Ticket,
            text,
        }
    }

    pub fn plain(text: String) -> Self {
        Self {
            kind: MessageKind::Plain,
            text,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
