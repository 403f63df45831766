pub mod cache;
pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod exif;
pub mod hasher;
pub mod library;
pub mod organizer;
pub mod renamer;
pub mod time_extractor;

pub use cache::{Cache, MediaRecord};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use counter::Counters;
pub use error::{PhotokeepError, Result};
pub use exif::MetadataReader;
pub use hasher::Hasher;
pub use library::{Library, ScannedFile};
pub use organizer::{MergeReport, Organizer, PlannedMove};
pub use renamer::Renamer;
pub use time_extractor::{FileNameTimeExtractor, MetadataTimeExtractor, TimeExtractor};
