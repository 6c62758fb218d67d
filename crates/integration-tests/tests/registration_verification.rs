//! Registration verification flows over email and SMS.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use amaz_core::VerificationChannel;
use amaz_integration_tests::TestContext;
use amaz_storefront::notify::SentNotification;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn last_code(ctx: &TestContext) -> String {
    ctx.channel
        .last_verification_code()
        .expect("a code was dispatched")
}

#[tokio::test(start_paused = true)]
async fn email_registration_happy_path() {
    let ctx = TestContext::new(epoch());

    ctx.verification
        .send_code(VerificationChannel::Email, "New.User@Amaz.Demo")
        .await
        .expect("dispatch succeeds");

    let code = last_code(&ctx);
    assert!(ctx.verification.verify_code("new.user@amaz.demo", &code));
    assert_eq!(ctx.verification.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn sms_code_is_dispatched_over_sms() {
    let ctx = TestContext::new(epoch());

    ctx.verification
        .send_code(VerificationChannel::Sms, "+221770000000")
        .await
        .expect("dispatch succeeds");

    assert!(matches!(
        ctx.channel.sent().first(),
        Some(SentNotification::VerificationCode {
            channel: VerificationChannel::Sms,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn wrong_guess_then_correct_code_before_expiry() {
    let ctx = TestContext::new(epoch());
    ctx.verification
        .send_code(VerificationChannel::Email, "user@amaz.demo")
        .await
        .expect("dispatch succeeds");
    let code = last_code(&ctx);
    let wrong = if code == "111111" { "222222" } else { "111111" };

    assert!(!ctx.verification.verify_code("user@amaz.demo", wrong));

    // Nine minutes later the original code still works.
    tokio::time::advance(Duration::from_secs(9 * 60)).await;
    assert!(ctx.verification.verify_code("user@amaz.demo", &code));
}

#[tokio::test(start_paused = true)]
async fn code_expires_after_ten_minutes() {
    let ctx = TestContext::new(epoch());
    ctx.verification
        .send_code(VerificationChannel::Email, "user@amaz.demo")
        .await
        .expect("dispatch succeeds");
    let code = last_code(&ctx);

    tokio::time::advance(Duration::from_secs(11 * 60)).await;

    // Correct code, too late: fails and purges the entry.
    assert!(!ctx.verification.verify_code("user@amaz.demo", &code));
    assert_eq!(ctx.verification.pending_count(), 0);
    assert!(!ctx.verification.verify_code("user@amaz.demo", &code));
}

#[tokio::test(start_paused = true)]
async fn expired_code_recovers_with_a_resend() {
    let ctx = TestContext::new(epoch());
    ctx.verification
        .send_code(VerificationChannel::Email, "user@amaz.demo")
        .await
        .expect("dispatch succeeds");
    let stale = last_code(&ctx);

    tokio::time::advance(Duration::from_secs(11 * 60)).await;
    assert!(!ctx.verification.verify_code("user@amaz.demo", &stale));

    ctx.verification
        .send_code(VerificationChannel::Email, "user@amaz.demo")
        .await
        .expect("dispatch succeeds");
    let fresh = last_code(&ctx);
    assert!(ctx.verification.verify_code("user@amaz.demo", &fresh));
}
