//! Model to entity mappers
//!
//! `From<Model> for Entity` conversions for database rows. Friend rows go
//! through `TryFrom` because the status column is free text.

mod conversation;
mod friend;
mod message;
mod typing;
mod user;
