pub mod map;
pub mod table;

pub use map::{render_html, to_geojson, write_geojson, write_map};
pub use table::{build_table, category_summary};
