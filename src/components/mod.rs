mod albums;
mod done;
mod grid;

pub use albums::AlbumsScreen;
pub use done::DoneScreen;
pub use grid::GridScreen;

/// Logical width the picker grid is laid out against
pub const GRID_WIDTH: f64 = 406.0;
