//! Integration test crate for SceneCut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every scenecut library crate to verify they work together.

#[cfg(test)]
mod detection;

#[cfg(test)]
mod edl;
