pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, record, render_tree, success, tree, warn};
pub use table::records_table;
pub use theme::{theme, Theme};
