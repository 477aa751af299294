pub mod chat_handlers;
pub mod rescuer_handlers;
pub mod ticket_handlers;
