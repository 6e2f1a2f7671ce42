//! Typed indexes, each serving one access pattern over one entity kind.
//! Secondary indexes hold ids only; entities live in the id tables of the
//! cache.

mod grouped;
mod history;
mod playback;
mod popularity;
mod prefix;
mod related;
mod sorted;

pub use grouped::GroupedIndex;
pub use history::HistoryIndex;
pub use playback::{PlaybackIndex, PlaybackSession};
pub use popularity::PopularityIndex;
pub use prefix::PrefixIndex;
pub use related::RelatedIndex;
pub use sorted::SortedIndex;
