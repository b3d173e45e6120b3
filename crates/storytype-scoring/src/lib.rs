//! Storytype: Scoring context.
//!
//! Turns a sparse list of answers into one of the sixteen four-letter
//! personality codes. Scoring is a pure tally-and-compare rule: it never
//! fails and is independent of how the answers were collected.

pub mod domain;
