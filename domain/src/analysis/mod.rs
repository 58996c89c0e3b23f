//! Response analysis: insights, decisions, blockers and confidence from answer text.

pub mod response_parser;

pub use response_parser::ResponseAnalysis;
