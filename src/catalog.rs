//! The device-side media catalog: tracks, playlists, persistence, and the
//! reconciliation step that keeps it consistent with the file-level sync.

mod model;
mod reconcile;
mod store;

pub use model::*;
pub use reconcile::apply;
