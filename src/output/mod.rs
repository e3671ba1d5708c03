//! Process output helpers

pub mod framing;

pub use framing::{extract_framed, frame_json, Frame};
