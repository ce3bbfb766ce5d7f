//! The built-in floor layouts. Each one only carves; stairs and spawns come from the pipeline.

mod bsp;
mod cellular;
mod circular;
mod concentric;
mod grid_tunnels;
mod rooms;
mod symmetric;
mod winding;

pub use bsp::BspRooms;
pub use cellular::CellularCaves;
pub use circular::CircularFloor;
pub use concentric::ConcentricRings;
pub use grid_tunnels::GridTunnels;
pub use rooms::RectangularRooms;
pub use symmetric::{SymmetricLayout, symmetry_center};
pub use winding::WindingTunnels;
