//! The initialization lattice: atoms ([`state::State`]), composite object
//! values ([`value::Value`]), and the path queries used to navigate them
//! (spec §3, §4.5).

pub mod paths;
pub mod state;
pub mod value;

pub use paths::{difference, initialized_paths, paths_view, Path, PathsView};
pub use state::State;
pub use value::Value;
