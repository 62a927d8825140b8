pub mod file_loader;

pub use file_loader::{read_bytes, read_file, FileKind};
