// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons` module
//!
//! Reason codes are used as metric label values and must stay stable.

#[cfg(test)]
mod tests {
    use crate::status_reasons::*;
    use std::collections::HashSet;

    const ALL_REASONS: &[&str] = &[
        REASON_PROVIDER_BAD_REQUEST,
        REASON_PROVIDER_AUTH_FAILED,
        REASON_ZONE_NOT_FOUND,
        REASON_RECORD_CONFLICT,
        REASON_RATE_LIMITED,
        REASON_PROVIDER_UNAVAILABLE,
        REASON_PROVIDER_API_ERROR,
        REASON_UNREACHABLE,
        REASON_TIMEOUT,
        REASON_DECODE_FAILED,
        REASON_UNEXPECTED_STATUS,
        REASON_WORKLOAD_NOT_FOUND,
        REASON_SUBSCRIBE_FAILED,
        REASON_EVENT_STREAM_CLOSED,
        REASON_PUBLIC_ADDRESS_UNSET,
        REASON_RECORD_CREATE_FAILED,
    ];

    #[test]
    fn test_reasons_are_unique() {
        let unique: HashSet<&str> = ALL_REASONS.iter().copied().collect();
        assert_eq!(unique.len(), ALL_REASONS.len());
    }

    #[test]
    fn test_reasons_are_camel_case() {
        for reason in ALL_REASONS {
            assert!(
                reason.chars().next().is_some_and(char::is_uppercase),
                "{reason} should start with an uppercase letter"
            );
            assert!(
                reason.chars().all(char::is_alphanumeric),
                "{reason} should contain only letters and digits"
            );
        }
    }

    #[test]
    fn test_provider_reason_values() {
        assert_eq!(REASON_PROVIDER_AUTH_FAILED, "ProviderAuthFailed");
        assert_eq!(REASON_RATE_LIMITED, "RateLimited");
        assert_eq!(REASON_PUBLIC_ADDRESS_UNSET, "PublicAddressUnset");
    }
}
