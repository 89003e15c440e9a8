pub mod extractor;
pub mod file_magic;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod validate;

pub use extractor::{SafeAssignmentIdI64, SafeClassIdI64, SafeFileId, SafeSubmissionIdI64};
pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
