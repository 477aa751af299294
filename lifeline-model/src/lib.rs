//! Core data model definitions shared across Lifeline crates.

pub mod ids;
pub mod message;
pub mod rescuer;
pub mod status;
pub mod ticket;

pub use ids::{MessageId, RescuerId, TicketId};
pub use message::{ChatMessage, NewMessage};
pub use rescuer::{
    LoginRequest, NewRescuer, Rescuer, RescuerLocation, RescuerUpdate,
};
pub use status::{ParseStatusError, RescuerStatus, TicketStatus};
pub use ticket::{NewTicket, Ticket, TicketStatusView};
