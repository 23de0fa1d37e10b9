//! Phone-verification state machine.
//!
//! A new delivery address may only be entered once its phone number has
//! been proven by OTP; the verified number is then frozen into the form.
//! Editing an existing address skips verification entirely: a number that
//! was verified at creation time is trusted on later edits.  That asymmetry
//! is a deliberate policy, not an accident.
//!
//! The machine is transient, scoped to one add/edit UI session, and never
//! persisted.

use async_trait::async_trait;
use compact_str::CompactString;

use martkit_sdk::client::{ApiError, ShopperClient};
use martkit_sdk::objects::otp::{SendOtpRequest, VerifyOtpRequest};

use crate::error::StoreError;

/// The OTP endpoints the machine needs.
#[async_trait]
pub trait OtpApi: Send + Sync {
    async fn send_otp(&self, req: &SendOtpRequest) -> Result<(), ApiError>;
    async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<(), ApiError>;
}

#[async_trait]
impl OtpApi for ShopperClient {
    async fn send_otp(&self, req: &SendOtpRequest) -> Result<(), ApiError> {
        ShopperClient::send_otp(self, req).await
    }

    async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<(), ApiError> {
        ShopperClient::verify_otp(self, req).await
    }
}

/// Where the add/edit-address session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    /// Waiting for a phone number.
    CollectingPhone,
    /// An OTP was dispatched to `phone`; waiting for the code.
    AwaitingOtp { phone: CompactString },
    /// Phone is verified (or trusted, for edits) and frozen; the address
    /// form is editable.
    EditingForm { phone: CompactString },
}

/// Short-lived gatekeeper for the address form.
pub struct PhoneVerification<A> {
    api: A,
    state: VerificationState,
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

impl<A: OtpApi> PhoneVerification<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: VerificationState::CollectingPhone,
        }
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    /// The frozen phone number, once the form is editable.
    pub fn verified_phone(&self) -> Option<&str> {
        match &self.state {
            VerificationState::EditingForm { phone } => Some(phone),
            _ => None,
        }
    }

    /// Dispatch an OTP to `phone`.
    ///
    /// The number must be exactly 10 digits; anything else fails client-side
    /// with no network call and no state change.  Valid resends from
    /// `AwaitingOtp` are allowed (a new number may be entered).
    pub async fn send_code(&mut self, phone: &str) -> Result<(), StoreError> {
        if matches!(self.state, VerificationState::EditingForm { .. }) {
            return Err(StoreError::validation("phone number is already verified"));
        }
        if !is_valid_phone(phone) {
            return Err(StoreError::validation(
                "enter a valid 10-digit phone number",
            ));
        }

        self.api
            .send_otp(&SendOtpRequest {
                phone_number: phone.into(),
            })
            .await?;
        tracing::debug!("otp dispatched");
        self.state = VerificationState::AwaitingOtp {
            phone: phone.into(),
        };
        Ok(())
    }

    /// Confirm the dispatched code.
    ///
    /// On success the phone is frozen and the form opens.  A failed
    /// verification stays at `AwaitingOtp` with the phone preserved so the
    /// shopper can retry the code without re-entering the number.
    pub async fn verify_code(&mut self, code: &str) -> Result<(), StoreError> {
        let phone = match &self.state {
            VerificationState::AwaitingOtp { phone } => phone.clone(),
            _ => return Err(StoreError::validation("request a code first")),
        };
        if code.trim().is_empty() {
            return Err(StoreError::validation("enter the code you received"));
        }

        self.api
            .verify_otp(&VerifyOtpRequest {
                phone_number: phone.clone(),
                otp: code.trim().into(),
            })
            .await?;

        self.state = VerificationState::EditingForm { phone };
        Ok(())
    }

    /// Open the form directly for an existing address, skipping
    /// verification.  The number was verified when the address was created.
    pub fn begin_edit(&mut self, phone: &str) {
        self.state = VerificationState::EditingForm {
            phone: phone.into(),
        };
    }

    /// Back to the initial state, after a successful submit or a dismissed
    /// form.
    pub fn reset(&mut self) {
        self.state = VerificationState::CollectingPhone;
    }
}
