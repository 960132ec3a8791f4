//! Exit code standardization for rds-rightsizer
//!
//! ## Exit Code Convention
//!
//! - `0` = Success (report written)
//! - `1` = User error (invalid arguments, instance not found)
//! - `2` = System error (AWS API failure, I/O, malformed price list)
//! - `3` = Configuration error (config parse or validation failure)

use crate::error::RightsizerError;

/// Standard exit codes for rds-rightsizer
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (AWS API failure, network error)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a RightsizerError to an appropriate exit code
pub fn exit_code_for_error(error: &RightsizerError) -> i32 {
    use RightsizerError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,

        Validation { .. } => codes::USER_ERROR,
        ResourceNotFound { .. } => codes::USER_ERROR,

        Rds(_) => codes::SYSTEM_ERROR,
        CloudWatch(_) => codes::SYSTEM_ERROR,
        Pricing(_) => codes::SYSTEM_ERROR,
        Catalog { .. } => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
        Csv(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error that reached `main`
///
/// Errors that did not originate in the library (e.g. runtime setup) are
/// reported as system errors.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<RightsizerError>()
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
