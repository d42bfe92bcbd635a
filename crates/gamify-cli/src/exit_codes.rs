//! Process exit codes. Scripts branch on these, so they are part of the
//! public contract.

use gamify_core::GamifyErrorKind;

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2; // storage, config or setup failure
pub const VALIDATION: i32 = 3;
pub const NOT_FOUND: i32 = 4;
pub const CONFLICT: i32 = 5;
pub const AUTHORIZATION: i32 = 6;
pub const INSUFFICIENT_BALANCE: i32 = 7;

pub fn for_kind(kind: GamifyErrorKind) -> i32 {
    match kind {
        GamifyErrorKind::Validation => VALIDATION,
        GamifyErrorKind::NotFound => NOT_FOUND,
        GamifyErrorKind::Conflict => CONFLICT,
        GamifyErrorKind::Authorization => AUTHORIZATION,
        GamifyErrorKind::InsufficientBalance => INSUFFICIENT_BALANCE,
        GamifyErrorKind::Database | GamifyErrorKind::Config => INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_kinds_have_distinct_codes() {
        let codes = [
            for_kind(GamifyErrorKind::Validation),
            for_kind(GamifyErrorKind::NotFound),
            for_kind(GamifyErrorKind::Conflict),
            for_kind(GamifyErrorKind::Authorization),
            for_kind(GamifyErrorKind::InsufficientBalance),
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
        assert!(!codes.contains(&SUCCESS));
        assert!(!codes.contains(&INTERNAL_ERROR));
    }

    #[test]
    fn storage_failures_are_internal() {
        assert_eq!(for_kind(GamifyErrorKind::Database), INTERNAL_ERROR);
        assert_eq!(for_kind(GamifyErrorKind::Config), INTERNAL_ERROR);
    }
}
