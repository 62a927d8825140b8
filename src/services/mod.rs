pub mod export_service;
pub mod generation_service;

pub use export_service::{rows_to_csv, ExportService, ExportedFiles, CSV_FILE_NAME, JSON_FILE_NAME};
pub use generation_service::{
    GenerationOutput, GenerationRequest, GenerationService, MAX_QUESTIONS, MIN_QUESTIONS,
};
