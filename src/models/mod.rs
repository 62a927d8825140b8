pub mod loaders;
pub mod quiz;
pub mod subject;
pub mod usage;

pub use loaders::{read_bytes, read_file, FileKind};
pub use quiz::{response_json_example, strip_code_fence, table_rows, McqItem, McqRow, Quiz};
pub use subject::{Subject, Tone};
pub use usage::TokenUsage;
