//! Lendline - Conversational Lending Assistant
//!
//! This crate implements the dialog orchestration engine that drives a
//! guided, multi-step lending conversation (onboarding, KYC, disbursement,
//! post-loan support) over an asynchronous messaging channel.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
