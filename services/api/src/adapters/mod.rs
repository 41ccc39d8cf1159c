pub mod commentary_llm;
pub mod db;
pub mod local_store;
pub mod tts;

pub use commentary_llm::OpenAiCommentaryAdapter;
pub use db::{DbAdapter, TokenSessionProvider};
pub use local_store::JsonFileStorage;
pub use tts::OpenAiSpeechAdapter;
