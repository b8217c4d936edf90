//! Shared data model for the novella workspace.
//!
//! These are the plain records exchanged between the storage backends, the
//! synchronisation core and the command line client. Nothing in this crate
//! performs I/O.

pub mod chapter;
pub mod field;
pub mod history;
pub mod key;
pub mod novel;
pub mod translator;

pub use chapter::{Chapter, TranslationSlot, TranslationState};
pub use field::Field;
pub use history::{NovelPatch, PatchEntry, TextChange, TocMergeHistoryEntry, TocTextChange};
pub use key::{ChapterKey, NovelKey};
pub use novel::{Glossary, Novel, NovelType, RemoteMetadata, TocItem};
pub use translator::{CountTarget, TranslationCounts, Translator, UnknownTranslator};
