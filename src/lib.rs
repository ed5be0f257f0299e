//! odte-governor: Daily capital risk governor for 0DTE options strategies
//!
//! This library provides the core components for:
//! - Reverse-Fibonacci daily risk budget (RFib) with day lifecycle and history
//! - GoScore multi-factor trade admission scoring
//! - Admission gate combining trade quality with capital availability
//! - Guardrail audit of realized daily P&L
//! - Configuration, logging and metrics

pub mod cli;
pub mod config;
pub mod gate;
pub mod risk;
pub mod score;
pub mod telemetry;
