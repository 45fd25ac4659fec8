//! reelprompt library crate.
//!
//! A terminal front end for a text-to-video backend: submit a prompt, watch a
//! progress bar, read the enhanced prompt and save the returned video.

pub mod backend;
pub mod cli;
pub mod config;
pub mod studio;
