//! Route inbound text to a handler category and delegate to the reasoning
//! engine.
//!
//! Classification is a fixed, ordered keyword scan — deliberately simplistic.
//! The order is load-bearing: text matching several categories always
//! resolves to the earliest one in the table.

pub mod assistant;
pub mod classify;

pub use {
    assistant::Assistant,
    classify::{Category, classify},
};
