//! Browser-driven portal login.
//!
//! Navigates the login page, types credentials at human speed, solves the
//! check-code challenge when one is shown, submits, and harvests the
//! resulting cookies into a [`SessionData`].

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::captcha::CaptchaResolver;
use crate::config::ResolvedConfig;
use crate::credentials::{Credentials, SessionData};

use super::capture::{crop_screenshot, CropBox};
use super::{clear_field, element_geometry, launch_browser, pause, type_like_human};

/// Log in to the portal and capture session cookies.
///
/// Returns `Ok(None)` when the captcha could not be resolved; the session
/// is left unset and the caller retries from scratch.
pub async fn login(
    config: &ResolvedConfig,
    credentials: &Credentials,
    resolver: &dyn CaptchaResolver,
) -> Result<Option<SessionData>> {
    let (browser, mut handler) = launch_browser(config.portal.headless).await?;
    let handler_task = tokio::spawn(async move { while (handler.next().await).is_some() {} });

    let result = drive_login(&browser, config, credentials, resolver).await;

    drop(browser);
    handler_task.abort();

    result
}

async fn drive_login(
    browser: &Browser,
    config: &ResolvedConfig,
    credentials: &Credentials,
    resolver: &dyn CaptchaResolver,
) -> Result<Option<SessionData>> {
    let selectors = &config.portal.login_selectors;

    let page = browser.new_page("about:blank").await?;
    page.goto(config.portal.login_url.as_str())
        .await
        .with_context(|| format!("Failed to open login page: {}", config.portal.login_url))?;

    if let Some(tab) = &selectors.method_tab {
        let tab_element = page
            .find_element(tab.as_str())
            .await
            .with_context(|| format!("Login page has no method tab: {tab}"))?;
        tab_element.click().await?;
        pause(300, 800).await;
    }

    clear_field(&page, &selectors.username_input).await?;
    let username = page
        .find_element(selectors.username_input.as_str())
        .await
        .context("Login page has no username field")?;
    username.click().await?;
    type_like_human(&username, &credentials.account).await?;
    pause(300, 800).await;

    let password = page
        .find_element(selectors.password_input.as_str())
        .await
        .context("Login page has no password field")?;
    password.click().await?;
    type_like_human(&password, credentials.password.expose_secret()).await?;
    pause(200, 800).await;

    if !solve_challenge(&page, config, resolver).await? {
        return Ok(None);
    }

    pause(200, 600).await;
    let submit = page
        .find_element(selectors.submit_button.as_str())
        .await
        .context("Login page has no submit button")?;
    submit.click().await?;
    pause(700, 1300).await;

    let cookies = page
        .get_cookies()
        .await
        .context("Failed to read cookies after login")?;
    let session =
        SessionData::from_browser_cookies(cookies.into_iter().map(|c| (c.name, c.value)));

    info!(cookies = session.cookies.len(), "new session created");
    Ok(Some(session))
}

/// Detect and answer the check-code challenge.
///
/// Presence is decided by the challenge image's on-page position: the
/// portal parks it at x = 0 when no code is required. Returns `false`
/// when a challenge was shown but could not be resolved.
async fn solve_challenge(
    page: &Page,
    config: &ResolvedConfig,
    resolver: &dyn CaptchaResolver,
) -> Result<bool> {
    let selectors = &config.portal.login_selectors;

    let geometry = match element_geometry(page, &selectors.captcha_image).await? {
        Some(geometry) if geometry.x != 0.0 => geometry,
        _ => {
            info!("no check code needed for this login");
            return Ok(true);
        }
    };

    std::fs::create_dir_all(&config.artifact_dir).with_context(|| {
        format!(
            "Failed to create artifact dir: {}",
            config.artifact_dir.display()
        )
    })?;

    let screenshot = config.screenshot_path();
    let captcha = config.captcha_path();

    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build(),
        &screenshot,
    )
    .await
    .context("Failed to capture login screenshot")?;

    crop_screenshot(&screenshot, &captcha, CropBox::from_geometry(&geometry))?;

    let answer = match resolver.resolve(&captcha).await {
        Ok(Some(code)) if !code.is_empty() => code,
        Ok(_) => {
            warn!("check code left unresolved; aborting this login");
            return Ok(false);
        }
        Err(err) => {
            warn!(error = %err, "check code resolution failed; aborting this login");
            return Ok(false);
        }
    };

    let input = page
        .find_element(selectors.captcha_input.as_str())
        .await
        .context("Login page has no check-code field")?;
    input.click().await?;
    type_like_human(&input, &answer).await?;

    Ok(true)
}
