//! Core types and trait definitions for the Cherry commerce entity store.
//!
//! Entities exist in two representations: the client shape handed to callers
//! ([`client`]) and the storage shape written by backends ([`persistent`]).
//! The [`mapper`] converts between them, following owner/document links
//! without looping on cycles. Document payloads never live in the relational
//! store; they are addressed through a [`content::ContentId`] and kept in a
//! [`content::ContentStore`].
//!
//! This crate is deliberately free of HTTP and database dependencies.

// Native `async fn` in traits; every trait method spells out its `Send` bound.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod client;
pub mod content;
pub mod document;
pub mod error;
pub mod graph;
pub mod identity;
pub mod mapper;
pub mod mime;
pub mod persistent;
pub mod service;
pub mod status;
pub mod store;

pub use error::{Error, Result, StatusClass};
