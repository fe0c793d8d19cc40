//! Core types and trait definitions for the Anekanta debate engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the three pieces with real algorithmic content (the moderation scorer, the
//! vote aggregator and the argument tree builder) plus the [`store`] trait the
//! storage backends implement.

#![allow(async_fn_in_trait)]

pub mod activity;
pub mod argument;
pub mod comment;
pub mod debate;
pub mod error;
pub mod moderation;
pub mod reaction;
pub mod review;
pub mod service;
pub mod store;
pub mod tree;
pub mod user;
pub mod vote;

pub use error::{Classify, Error, ErrorClass, Result};
