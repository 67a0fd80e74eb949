mod common;

use anyhow::Result;
use common::{location, Browser};
use reqwest::StatusCode;

#[tokio::test]
async fn registration_errors_rerender_the_form() -> Result<()> {
    let browser = Browser::new().await?;

    let res = browser
        .post(
            "/users/register",
            &[("name", ""), ("email", "someone@example.edu"), ("password", "abc"), ("password2", "abd")],
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let html = res.text().await?;
    assert!(html.contains("Name is required"));
    assert!(html.contains("Passwords do not match"));
    assert!(html.contains("Password must be at least 4 characters"));
    assert!(html.contains(r#"value="someone@example.edu""#));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let first = Browser::new().await?;
    let email = first.sign_up("Asha").await?;

    let second = Browser::new().await?;
    let res = second
        .post(
            "/users/register",
            &[("name", "Asha Again"), ("email", email.as_str()), ("password", "pass1234"), ("password2", "pass1234")],
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("Email already registered"));
    Ok(())
}

#[tokio::test]
async fn registration_notice_appears_on_login_page() -> Result<()> {
    let browser = Browser::new().await?;
    let email = format!("ravi-{}@example.edu", uuid::Uuid::new_v4().simple());

    let res = browser
        .post(
            "/users/register",
            &[("name", "Ravi"), ("email", email.as_str()), ("password", "pass1234"), ("password2", "pass1234")],
        )
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/login");

    let html = browser.get_text("/users/login").await?;
    assert!(html.contains("You are now registered and can log in"));
    Ok(())
}

#[tokio::test]
async fn wrong_password_fails_login() -> Result<()> {
    let browser = Browser::new().await?;
    let email = browser.sign_up("Meera").await?;
    browser.get("/users/logout").await?;

    let res = browser
        .post("/users/login", &[("email", email.as_str()), ("password", "wrong-password")])
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/login");

    let html = browser.get_text("/users/login").await?;
    assert!(html.contains("Invalid email or password"));
    Ok(())
}

#[tokio::test]
async fn unknown_email_fails_login() -> Result<()> {
    let browser = Browser::new().await?;

    let res = browser
        .post("/users/login", &[("email", "nobody@example.edu"), ("password", "pass1234")])
        .await?;
    assert_eq!(location(&res), "/users/login");
    Ok(())
}

#[tokio::test]
async fn login_shows_welcome_and_logout_ends_the_session() -> Result<()> {
    let browser = Browser::new().await?;
    browser.sign_up("Kiran").await?;

    let html = browser.get_text("/").await?;
    assert!(html.contains("You are now logged in"));
    assert!(html.contains("Kiran"));

    let res = browser.get("/users/logout").await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/login");
    assert!(browser.get_text("/users/login").await?.contains("You are logged out"));

    let res = browser.select_year("2023-2024").await?;
    assert_eq!(location(&res), "/");
    assert!(browser.get_text("/").await?.contains("Not Authorized"));
    Ok(())
}
