//! Tile service layer.
//!
//! This module locates pre-generated tiles of a source image and returns
//! their bytes unchanged.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ TileAddress
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! │  validate → relative_path → read bytes  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              ImageSource                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileAddress`]: `(image id, x, y, tile size)` with a pure path mapping
//! - [`TileService`]: validates, resolves and reads a tile
//! - [`TileResponse`]: tile bytes plus inferred content type
//!
//! # Example
//!
//! ```
//! use spacezoom::tile::{tile_relative_path, TileAddress};
//!
//! let address = TileAddress::new("m31.jpg", 4, 2);
//! assert_eq!(address.relative_path(), "m31/m31_tile_4_2.jpg");
//! assert_eq!(tile_relative_path("m31.jpg", 4, 2), address.relative_path());
//! ```

mod address;
mod service;

pub use address::{
    content_type_for, image_stem, tile_relative_path, TileAddress, DEFAULT_TILE_SIZE,
    MAX_TILE_SIZE, MIN_TILE_SIZE, TILE_EXTENSION,
};
pub use service::{TileResponse, TileService};
