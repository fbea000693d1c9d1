mod common;
use tonic::Code;
use crate::common::{error_code, start};


#[tokio::test]
async fn test_wrong_codes_block_the_account_for_an_hour() {
    let ctx = start(&["123456"]).await;
    ctx.register("Asha", "a@x.com", "password1").await.unwrap();

    let response = ctx.request_reset("a@x.com").await.unwrap();
    assert_eq!(response.expires_in_seconds, 300);
    assert_eq!(ctx.mailbox.last_otp("a@x.com").as_deref(), Some("123456"));

    let status = ctx.verify_otp("a@x.com", "000000").await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "Invalid OTP. You have 2 attempt(s) remaining");
    assert_eq!(error_code(status), 2002 /* InvalidOtp */);

    let status = ctx.verify_otp("a@x.com", "000000").await.unwrap_err();
    assert_eq!(status.message(), "Invalid OTP. You have 1 attempt(s) remaining");

    let status = ctx.verify_otp("a@x.com", "000000").await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "Maximum attempts (3) reached. Account blocked for 1 hours");
    assert_eq!(error_code(status), 2003 /* MaxAttemptsReached */);

    // Verification is refused while blocked, even with the right code.
    ctx.set_time("2024-03-01T12:04:00Z").await;
    let status = ctx.verify_otp("a@x.com", "123456").await.unwrap_err();
    assert_eq!(status.code(), Code::ResourceExhausted);
    assert_eq!(status.message(), "Too many attempts. Try again after 56 minutes");
    assert_eq!(error_code(status), 2000 /* TooManyAttempts */);

    // No new OTP is issued either.
    ctx.set_time("2024-03-01T12:20:00Z").await;
    let status = ctx.request_reset("a@x.com").await.unwrap_err();
    assert_eq!(status.code(), Code::ResourceExhausted);
    assert_eq!(status.message(), "Too many attempts. Try again after 40 minutes");
    assert_eq!(error_code(status), 2000 /* TooManyAttempts */);
    assert_eq!(ctx.mailbox.otp_count(), 1);

    // Once the hour is up the user can start again.
    ctx.set_time("2024-03-01T13:00:00Z").await;
    ctx.request_reset("a@x.com").await.unwrap();
    assert_eq!(ctx.mailbox.otp_count(), 2);
}


#[tokio::test]
async fn test_verified_otp_authorises_a_single_reset() {
    let ctx = start(&["123456"]).await;
    ctx.register("Asha", "a@x.com", "password1").await.unwrap();

    ctx.request_reset("a@x.com").await.unwrap();
    let response = ctx.verify_otp("a@x.com", "123456").await.unwrap();
    assert_eq!(response.message, "OTP verified successfully");

    ctx.complete_reset("a@x.com", "new-password").await.unwrap();

    // The new password works, the old one doesn't.
    ctx.login("a@x.com", "new-password").await.unwrap();
    let status = ctx.login("a@x.com", "password1").await.unwrap_err();
    assert_eq!(error_code(status), 1001 /* InvalidCredentials */);

    // The OTP was consumed.
    let status = ctx.complete_reset("a@x.com", "another-password").await.unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
    assert_eq!(status.message(), "Please verify OTP first");
    assert_eq!(error_code(status), 2004 /* VerificationRequired */);
}


#[tokio::test]
async fn test_expired_otp_is_never_accepted() {
    let ctx = start(&["123456"]).await;
    ctx.register("Asha", "a@x.com", "password1").await.unwrap();
    ctx.request_reset("a@x.com").await.unwrap();

    ctx.set_time("2024-03-01T12:05:00Z").await;
    let status = ctx.verify_otp("a@x.com", "123456").await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "OTP expired or invalid");
    assert_eq!(error_code(status), 2001 /* InvalidOrExpiredOtp */);
}


#[tokio::test]
async fn test_only_the_latest_otp_is_valid() {
    let ctx = start(&["111111", "222222"]).await;
    ctx.register("Asha", "a@x.com", "password1").await.unwrap();

    ctx.request_reset("a@x.com").await.unwrap();
    ctx.request_reset("a@x.com").await.unwrap();

    let status = ctx.verify_otp("a@x.com", "111111").await.unwrap_err();
    assert_eq!(error_code(status), 2002 /* InvalidOtp */);
    ctx.verify_otp("a@x.com", "222222").await.unwrap();
}


#[tokio::test]
async fn test_google_accounts_cannot_reset() {
    let ctx = start(&["123456"]).await;
    ctx.google_sign_in("valid-token").await.unwrap();

    for status in vec![
        ctx.request_reset("ravi@example.com").await.unwrap_err(),
        ctx.verify_otp("ravi@example.com", "123456").await.unwrap_err(),
        ctx.complete_reset("ravi@example.com", "new-password").await.unwrap_err(),
    ] {
        assert_eq!(status.code(), Code::FailedPrecondition);
        assert_eq!(error_code(status), 1002 /* UnsupportedAuthMethod */);
    }
}


#[tokio::test]
async fn test_unknown_email() {
    let ctx = start(&["123456"]).await;

    let status = ctx.request_reset("nobody@x.com").await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(error_code(status), 1003 /* UserNotFound */);

    let status = ctx.complete_reset("nobody@x.com", "new-password").await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(error_code(status), 1003 /* UserNotFound */);
    assert_eq!(ctx.mailbox.otp_count(), 0);
}
