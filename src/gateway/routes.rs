// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Route classification
//!
//! Four static fragment lists, each giving a predicate over the request
//! path. Matching is substring containment, except for `pre_2fa` which
//! matches by suffix.

use serde::{Deserialize, Serialize};

const OPEN_ENDPOINTS: &[&str] = &[
    "/auth/v1/login",
    "/auth/v1/forgotpassword",
    "/auth/v1/refresh-token",
    "/auth/v1/generate-mobile-token",
    "common/v1/preAnnouncement",
    "common/v1/getApplyUrl",
    "common/v1/publickey",
    "common/v1/getSecretKeyRSA",
    "common/v1/fpx/getFpxId",
    "common/v1/eproc/getEprocId",
    "common/v1/consent/getConsentId",
    "common/v1/rtp/getRtpId",
    "/rcas/",
    "/v3/api-docs/",
    "/utility/",
    "/dropdown/",
    "/v3/",
    "/swagger-ui/",
    "/error/",
    "/actuator/",
    "/rsa/",
    "common/v1/secret-questions/retrieve",
    "common/v1/secret-questions/retrieveAll",
    "common/v1/secret-questions/validate",
    "common/v1/secret-questions/initialize",
    "common/v1/int/secret-questions/setup",
    "common/v1/int/secret-questions/retrieve",
    "common/v1/int/secret-questions/retrieveAll",
    "common/v1/int/secret-questions/validate",
    "common/v1/int/secret-questions/getAll",
    "common/v1/int/secret-questions/initialize",
    "portal/v1/sso-user",
];

const DOWNTIME_WHITELIST_ENDPOINTS: &[&str] = &[
    "common/v1/preAnnouncement",
    "common/v1/getApplyUrl",
    "common/v1/publickey",
    "common/v1/getSecretKeyRSA",
    "common/v1/fpx/getFpxId",
    "common/v1/eproc/getEprocId",
    "common/v1/consent/getConsentId",
    "common/v1/rtp/getRtpId",
    "/auth/v1/refresh-token",
    "/auth/v1/generate-mobile-token",
    "/v3/api-docs/",
    "/v3/",
    "/swagger-ui/",
    "common/v1/int/secret-questions/setup",
    "common/v1/int/secret-questions/retrieve",
    "common/v1/int/secret-questions/retrieveAll",
    "common/v1/int/secret-questions/validate",
    "common/v1/int/secret-questions/getAll",
    "common/v1/int/secret-questions/initialize",
    "prelogin/announcements",
    "prelogin/recommended",
];

const TEMPORARY_ENDPOINTS: &[&str] = &["/auth/v1/loginWithQuestion"];

const PRE_2FA_ENDPOINTS: &[&str] = &[
    "/v1/secret-questions/retrieve",
    "/v1/change-password",
    "/v1/generatePush",
    "/common/v1/secret-questions/validate",
    "/v1/pushStatus",
    "/v1/validateSecure2uCode",
    "/v1/valHardtokenSerialNo",
    "/v1/valHardtokenOtp",
    "/v1/session-timeout/log",
    "/v1/registration-incomplete/log",
    "/v1/refresh-token",
    "/v1/rsa-analyze",
];

/// Route fragment lists
///
/// Deserializes from a `[routes]` config table; any list left out keeps
/// its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePolicy {
    pub open: Vec<String>,
    pub downtime_whitelist: Vec<String>,
    pub temporary: Vec<String>,
    pub pre_2fa: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            open: to_owned(OPEN_ENDPOINTS),
            downtime_whitelist: to_owned(DOWNTIME_WHITELIST_ENDPOINTS),
            temporary: to_owned(TEMPORARY_ENDPOINTS),
            pre_2fa: to_owned(PRE_2FA_ENDPOINTS),
        }
    }
}

impl RoutePolicy {
    /// Secured unless an open fragment occurs in the path
    pub fn is_secured(&self, path: &str) -> bool {
        !self.open.iter().any(|fragment| path.contains(fragment.as_str()))
    }

    /// Subject to maintenance downtime unless a whitelisted fragment occurs
    /// in the path
    pub fn is_bypass_downtime(&self, path: &str) -> bool {
        !self
            .downtime_whitelist
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }

    pub fn is_temporary(&self, path: &str) -> bool {
        self.temporary.iter().any(|fragment| path.contains(fragment.as_str()))
    }

    /// Suffix match, stricter than the other predicates
    pub fn is_pre_2fa(&self, path: &str) -> bool {
        self.pre_2fa.iter().any(|fragment| path.ends_with(fragment.as_str()))
    }
}

fn to_owned(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|s| s.to_string()).collect()
}
