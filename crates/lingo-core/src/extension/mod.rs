//! Extension traits for frequently used types.

mod toml_table;

pub use toml_table::TomlTableExt;
