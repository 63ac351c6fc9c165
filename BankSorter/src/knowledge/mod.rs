//! Wiki knowledge base
//!
//! The knowledge base is an offline snapshot of the community sound ID wiki:
//! one page per sound bank, each listing the Wwise source IDs of every named
//! sound in that bank. It is read-only input to the rename stage.

mod id_map;
mod store;

pub use id_map::{IdMap, build_id_map, build_id_map_from_markdown};
pub use store::{KnowledgeBase, KnowledgeBasePage, PageFormat};
