pub mod analysis;
pub mod canon;
pub mod domain;
pub mod notes;
pub mod plan;
pub mod ports;
pub mod progress;
pub mod versions;

pub use analysis::{Analysis, AnalysisMode, AnalysisRequest, CrossReference};
pub use canon::{Book, ReadingBlock, CANON_CHAPTER_COUNT, CHRONOLOGICAL_BLOCKS};
pub use domain::{AuthSession, BibleVersion, NoteDraft, SavedNote, User, UserCredentials, Verse};
pub use notes::{HybridNoteStore, LocalNoteBackend, NoteListing, NoteWrite, StorageMode};
pub use plan::{
    generate_plan, group_into_eras, CompletedDays, DayPlanEntry, EraSection, ReadingItem,
    ReadingTarget, DEFAULT_TOTAL_DAYS,
};
pub use ports::{
    AccountRepository, CommentaryService, KeyValueStorage, NoteBackend, PortError, PortResult,
    ScriptureRepository, SessionProvider, SpeechService,
};
pub use progress::PlanProgressStore;
pub use versions::VersionCatalog;
