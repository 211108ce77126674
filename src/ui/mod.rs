pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    accent, dim, error, header, info, ingest_summary, serving, specs_dir, success, warn, written,
};
pub use progress::Spinner;
pub use table::{catalog_table, columns_table, TableListing};
pub use theme::{theme, Theme};
