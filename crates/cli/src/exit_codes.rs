//! CLI Exit Code Registry
//!
//! Single source of truth for `worksync` exit codes. Scripts that run the
//! sync on a schedule branch on these, so codes never change meaning.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                         |
//! |------|-----------|-----------------------------------------------------|
//! | 0    | Universal | Success                                             |
//! | 2    | Universal | CLI usage error (bad args, no person given)         |
//! | 3    | Universal | I/O error (missing file, unwritable output)         |
//! | 4    | Universal | Input parse error (bad workbook or travel log)      |
//! | 10   | sync      | Invalid config (TOML or validation failure)         |
//! | 11   | sync      | Person not found in any month's attendance sheet    |
//!
//! clap reports its own argument errors with code 2.
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Update the table above
//! 3. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-9)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// An input file was readable but its contents could not be parsed.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Sync (10-19)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_SYNC_INVALID_CONFIG: u8 = 10;

/// No month's attendance sheet lists the person. Output is still written
/// (an empty array) so the failure is visible but not destructive.
pub const EXIT_SYNC_PERSON_NOT_FOUND: u8 = 11;
