// crates/repbridge-receiver/src/access.rs
//
// Access controller: pause gate and admin authorization.
//
// Plain predicates over a ProgramState snapshot. The mutations run inside
// the store's atomic state update.

use repbridge_core::error::RepBridgeError;
use repbridge_core::identity::AccountId;
use repbridge_core::state::ProgramState;

/// Fail with `SystemPaused` if message handling is suspended.
pub fn require_not_paused(state: &ProgramState) -> Result<(), RepBridgeError> {
    if state.paused {
        return Err(RepBridgeError::SystemPaused);
    }
    Ok(())
}

/// Fail with `Unauthorized` unless `caller` is the stored admin.
pub fn require_admin(state: &ProgramState, caller: &AccountId) -> Result<(), RepBridgeError> {
    if state.admin != *caller {
        return Err(RepBridgeError::Unauthorized);
    }
    Ok(())
}

/// Set the pause flag on behalf of `caller`.
///
/// Setting the current value again is a successful no-op.
pub fn set_paused(
    state: &mut ProgramState,
    caller: &AccountId,
    value: bool,
) -> Result<(), RepBridgeError> {
    require_admin(state, caller)?;
    state.paused = value;
    Ok(())
}

/// Record the `issued_at` of a signed admin request.
///
/// Fails with `Unauthorized` unless `issued_at` is later than every signed
/// request applied before it, so a captured request cannot be applied twice.
pub fn consume_admin_signature(
    state: &mut ProgramState,
    issued_at: i64,
) -> Result<(), RepBridgeError> {
    if issued_at <= state.last_admin_issued_at {
        return Err(RepBridgeError::Unauthorized);
    }
    state.last_admin_issued_at = issued_at;
    Ok(())
}
