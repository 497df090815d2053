//! Boards Module
//!
//! - **`handlers`** - create a board, list personal or shared boards
//! - **`deep_link`** - share payloads for group boards
//!
//! A board is either private or a group board. The creator of a group
//! board becomes its first member in the same store write as the board.

/// HTTP handlers for `/board`
pub mod handlers;

/// Share deep links for group boards
pub mod deep_link;

pub use deep_link::share_payload;
pub use handlers::{create_board, list_boards};
