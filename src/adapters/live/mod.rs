//! Live adapters that call the real generation APIs.

pub mod gemini;
