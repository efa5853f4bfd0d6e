//! Data model and pure helpers for the campaign link repair pipeline.
//!
//! Nothing in this crate performs I/O. URL handling, tokenization and
//! scoring are total functions so the network-facing crates can lean on them
//! without guarding against panics.

pub mod candidate;
pub mod error;
pub mod mode;
pub mod outcome;
pub mod platform;
pub mod record;
pub mod scorer;
pub mod text;
pub mod url;

pub use candidate::{Candidate, CandidateSource};
pub use error::ParseError;
pub use mode::{GathererKind, RepairMode};
pub use outcome::{Outcome, OutcomeCounts};
pub use platform::{PlatformParseError, VideoPlatform, VideoRef};
pub use record::CampaignRecord;
pub use scorer::{ScoreBreakdown, rank_candidates, score};
