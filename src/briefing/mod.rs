//! Audio briefing synthesis.
//!
//! Narration text is planned into chunks, each chunk is synthesized in turn,
//! and the results are assembled into an ordered playlist.

pub mod chapters;
pub mod pipeline;
pub mod planner;
pub mod playlist;
pub mod session;

pub use chapters::{Chapter, parse_chapters};
pub use pipeline::{BriefingPipeline, BriefingSettings};
pub use planner::{PlannerOptions, TextChunk, plan};
pub use playlist::{AudioSection, DeepDive, Playlist, PlaylistAssembler};
pub use session::LessonSession;
