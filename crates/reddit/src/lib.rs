//! Reddit channel adapter.
//!
//! Polls each monitored subreddit for new submissions and comments, with
//! separate recency windows for the two kinds, and replies through the
//! matching native mechanism (top-level comment, comment reply, or private
//! message).

pub mod adapter;
pub mod client;
pub mod config;
pub mod format;

pub use {
    adapter::RedditAdapter,
    client::{Comment, HttpRedditClient, RedditClient, Submission},
    config::RedditConfig,
};
