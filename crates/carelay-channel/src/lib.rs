// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel API facade for the clinic backend.
//!
//! One generic [`ChannelClient`] covers WhatsApp, Email, and SMS; the
//! channel-specific payload shapes live in profile data, not in per-channel
//! client types. [`ActionClient`] covers the action-trigger endpoints.

pub mod actions;
pub mod client;
pub mod payload;

pub use actions::ActionClient;
pub use client::ChannelClient;
