//! Persistence: the `.ods` package and export formats.

pub mod csv;
pub mod md;
pub mod package;

pub use csv::write_csv;
pub use md::write_markdown;
pub use package::Package;
