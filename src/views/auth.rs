//! Login, registration and OTP verification.

use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::guard::{redirect_if_authenticated, Route};
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, User, VerifyOtpRequest};

/// Where the registration form goes after a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterStep {
    /// An OTP was sent; continue with [`verify_otp`].
    AwaitingOtp { user_id: Uuid },
    /// The account exists but no OTP went out; stay on the form.
    OtpNotSent { user_id: Uuid },
}

/// Mount check for the login and register views.
pub async fn mount(state: &AppState) -> Option<Route> {
    redirect_if_authenticated(&state.session, state.navigator.as_ref()).await
}

async fn complete_sign_in(state: &AppState, response: AuthResponse) -> AppResult<User> {
    state
        .session
        .sign_in(&response.access_token, response.user.clone())
        .await?;
    state.navigator.navigate(Route::Dashboard);
    Ok(response.user)
}

pub async fn login(state: &AppState, request: LoginRequest) -> AppResult<User> {
    request.validate()?;
    let response = state.client.login(&request).await?;
    complete_sign_in(state, response).await
}

pub async fn register(state: &AppState, request: RegisterRequest) -> AppResult<RegisterStep> {
    request.validate()?;
    let response = state.client.register(&request).await?;
    let user_id = response.user.id;

    tracing::info!(%user_id, otp_send = response.otp_send, "registered");
    Ok(if response.otp_send {
        RegisterStep::AwaitingOtp { user_id }
    } else {
        RegisterStep::OtpNotSent { user_id }
    })
}

/// Verifies the OTP and signs in once the server reports the user verified.
///
/// Returns `None` when the server accepted the call but the user is still
/// unverified; the session is left untouched in that case.
pub async fn verify_otp(state: &AppState, request: VerifyOtpRequest) -> AppResult<Option<User>> {
    request.validate()?;
    let response = state.client.verify_otp(&request).await?;
    if !response.user.is_verified {
        tracing::info!(user_id = %request.user_id, "otp accepted but user not verified");
        return Ok(None);
    }
    complete_sign_in(state, response).await.map(Some)
}

/// Signs out, drops cached entities and returns to the login view.
pub async fn logout(state: &AppState) -> AppResult<bool> {
    let signed_out = state.session.sign_out().await?;
    state.cache.clear().await;
    if signed_out {
        state.navigator.navigate(Route::Login);
    }
    Ok(signed_out)
}
