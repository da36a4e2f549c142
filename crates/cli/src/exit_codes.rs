//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `vbook` exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified, write failures)              |
//! | 2    | Usage error (bad args, missing input file, unconfirmed)  |
//! | 3    | Validation error (e.g. empty legal name)                 |
//! | 4    | Not found (no supplier with that id or name)             |
//! | 5    | Format error (missing columns, unreadable file or plan)  |
//! | 6    | Storage error (database failure)                         |
//! | 7    | Config error (settings file unreadable or invalid)       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant `From<...> for CliError` conversion

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file, or a destructive
/// command run without its confirmation.
pub const EXIT_USAGE: u8 = 2;

/// A required field is missing or empty.
pub const EXIT_VALIDATION: u8 = 3;

/// The referenced supplier does not exist.
pub const EXIT_NOT_FOUND: u8 = 4;

/// Uploaded file or plan file has the wrong shape.
pub const EXIT_FORMAT: u8 = 5;

/// The database could not be opened, read or written.
pub const EXIT_STORAGE: u8 = 6;

/// Settings file could not be read or holds an invalid value.
pub const EXIT_CONFIG: u8 = 7;
