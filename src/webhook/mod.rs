//! Discovery webhook boundary
//!
//! The webhook is the system's only network collaborator: it accepts
//! `{ "input": … }` and answers with the canonical response schema
//! (text, job openings, optional audio with word timings).

mod client;
mod types;

pub use client::{WebhookClient, WebhookError};
pub use types::{AssistantReply, AudioAttachment, DiscoveryRequest, JobMatch, WebhookResponse};
