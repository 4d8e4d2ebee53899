//! On-device shopping lists: a basket being built, archived past lists with
//! one-shot undo, reminders, and a first-run onboarding flag.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod history;
pub mod id;
pub mod logging;
pub mod model;
pub mod onboarding;
pub mod persist;
pub mod reminder;
pub mod share;
pub mod storage;
pub mod store;
pub mod undo;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BuildMode, Config};
pub use model::{Item, ItemDraft, List, ListEntry, Reminder, ShoppingState};
pub use onboarding::OnboardingStore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::ShoppingStore;
