pub mod destination;
pub mod message;
pub mod telex;
pub mod zendesk;
