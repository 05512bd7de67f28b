//! Conversation domain.
//!
//! - [`entities::ConversationTurn`] — one user, assistant or tool-result turn
//! - [`entities::Conversation`] — append-only history for one call
//! - [`response::AdapterResponse`] — normalized model output

pub mod entities;
pub mod response;
