//! Ingest for the FPL planner: projection CSVs, the authoritative player
//! list, and squad-state JSON.

pub mod merge;
pub mod players;
pub mod projections;
pub mod squad;

pub use merge::{merge_projections, AuthoritativePlayer};
pub use players::load_player_list;
pub use projections::{read_projection_csv, ProjectionSource};
pub use squad::load_squad_state;
