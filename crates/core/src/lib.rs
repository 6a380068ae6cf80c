#![deny(warnings)]

pub mod asr;
pub mod audio;
pub mod classify;
pub mod config;
pub mod emotion;
pub mod features;
pub mod pipeline;
pub mod util;
