//! The UID-prefix delegator (§4.5): `UID <cmd>` must dispatch through the
//! inner command's `UidHandle` capability, or fail with "Command
//! unsupported with UID" (§8 property 7). `UID EXPUNGE` carries the
//! additional UIDPLUS gate (§4.5, §8 scenario S6).

use crate::command::Command;
use crate::error::CommandError;

/// Command names that implement the `UidHandle` capability, mirroring
/// the Go source's `UidHandler` interface
/// (`examples/original_source/server/cmd_selected.go`).
const UID_CAPABLE: &[&str] = &["EXPUNGE", "SEARCH", "FETCH", "STORE", "COPY"];

/// Checks that `command_name` may legally be prefixed with `UID`, before
/// the specific field parser even runs. Returns `BAD "Command
/// unsupported with UID"` for anything else.
pub fn check_uid_capable(command_name: &str) -> Result<(), CommandError> {
    if UID_CAPABLE.contains(&command_name.to_ascii_uppercase().as_str()) {
        Ok(())
    } else {
        Err(CommandError::UidUnsupported)
    }
}

/// `UID EXPUNGE` additionally requires the backend to have advertised
/// UIDPLUS, and a non-empty sequence set (plain EXPUNGE takes none).
pub fn check_uid_expunge(cmd: &Command, has_uidplus: bool) -> Result<(), CommandError> {
    match cmd {
        Command::Expunge { uid_sequence_set: Some(set) } => {
            if !has_uidplus {
                return Err(CommandError::UnknownCommand);
            }
            if set.is_empty() {
                return Err(CommandError::NotEnoughArguments);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
