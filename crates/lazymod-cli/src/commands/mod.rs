pub mod codegen;
pub mod declaration_check;
pub mod names;
pub mod probe_urls;
pub mod table;
