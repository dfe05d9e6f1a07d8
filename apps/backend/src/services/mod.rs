//! Application services over the document store.

pub mod bans;
pub mod catalog;
pub mod moderation;
pub mod moderation_board;
pub mod paging;
pub mod submissions;

pub use bans::{BanAdded, BanList, BanRemoved};
pub use moderation::{ContentKind, Moderatable, Moderated};
pub use moderation_board::{BoardLoad, ModerationBoard};
pub use paging::{Fetch, Page, PagedQueryCursor, DEFAULT_PAGE_SIZE};
