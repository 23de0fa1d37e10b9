//! Phone OTP API types.
//!
//! The backend sends a one-time numeric code to a phone number and later
//! confirms it; the client gates address entry behind this round trip.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Request body for `POST /mobile-otp/send-otp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub phone_number: CompactString,
}

/// Request body for `POST /mobile-otp/verify-otp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: CompactString,
    pub otp: CompactString,
}
