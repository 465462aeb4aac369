//! Data models for cached account progression.
//!
//! This module contains the domain structures the refresh, cache and scoring
//! layers operate on:
//!
//! - `BoundAccount`: the stored external-account credential for a user
//! - `EntitySummary`: lightweight per-character listing record
//! - `EntityDetail` and its parts: full per-character progression record
//! - `AccountSnapshot`: the user-level document written after a full refresh

pub mod account;
pub mod entity;

pub use account::{AccountSnapshot, BoundAccount};
pub use entity::{
    Accessory, EntityDetail, EntitySummary, Gear, ModelError, Skill, UnlockRank,
    ACCESSORY_SLOTS, UNLOCK_RANKS,
};
