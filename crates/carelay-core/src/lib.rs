// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Carelay messaging client.
//!
//! This crate provides the error type, the domain entities shared by every
//! channel (schedules, templates, delivery history), and the wire-shape
//! helpers (listing normalization, history filters) the HTTP-facing crates
//! build on.

pub mod envelope;
pub mod error;
pub mod filter;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use envelope::decode_listing;
pub use error::CarelayError;
pub use filter::HistoryFilter;
pub use types::{
    ActionDispatch, ActionTrigger, ChannelKind, ChannelProfile, ConnectionStatus, DeliveryStatus,
    HistoryRecord, MessageDraft, MessageId, Recurrence, Schedule, ScheduleDraft, ScheduleId,
    SendReceipt, Template, TemplateDraft, TemplateId, TemplateTrigger,
};
