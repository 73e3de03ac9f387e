pub mod builder;
pub mod table;
pub mod window;

pub use builder::TableRowBuilder;
pub use table::{reconstruct_from_table, summed_area_table, TableLookup};
pub use window::{rect_sum, window_sum, Corner, WindowBounds};
