//! Shared fixtures for marquee-core integration tests.

#![allow(dead_code)]

pub mod identity;
pub mod stores;
