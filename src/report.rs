//! Caller-side reporting: turn a result into a value or nothing, logging
//! what went wrong in user-facing terms.

use crate::error::Result;
use crate::translate::translate;
use tracing::error;

/// Unwrap `result`, or log its translated outcome and return `None`.
pub fn notify<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            let outcome = translate(&e);
            error!(operation, error = %e, "{}", outcome.message());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    #[test]
    fn test_notify() {
        assert_eq!(notify("getCount", Ok(3u64)), Some(3));
        assert_eq!(notify::<u64>("registerAddress", Err(RegistryError::NoWallet)), None);
    }
}
