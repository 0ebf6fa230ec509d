//! Browser driver adapter.
//!
//! Launches a Chromium instance over the DevTools protocol and provides
//! the page-level helpers the login flow needs: element geometry lookup,
//! field clearing, and human-paced typing.

pub mod capture;
pub mod login;

pub use login::login;

use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::{Element, Page};
use rand::Rng;
use serde::Deserialize;

/// On-page position and size of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Launch the automation browser.
pub async fn launch_browser(headless: bool) -> Result<(Browser, chromiumoxide::handler::Handler)> {
    let chrome_path = find_chrome()
        .context("Chrome/Chromium not found. Install Chrome or Chromium to log in.")?;

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .viewport(None)
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--no-first-run")
        .arg("--no-default-browser-check");

    if !headless {
        builder = builder.with_head();
    }

    let config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to configure browser: {e}"))?;

    let (browser, handler) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    Ok((browser, handler))
}

/// Read an element's bounding rect by evaluating a DOM query in the page.
///
/// Returns `None` when the selector matches nothing.
pub async fn element_geometry(page: &Page, selector: &str) -> Result<Option<ElementGeometry>> {
    let quoted = serde_json::to_string(selector).context("Failed to encode selector")?;
    let js = format!(
        r#"(() => {{
            const el = document.querySelector({quoted});
            if (!el) return "";
            const r = el.getBoundingClientRect();
            return JSON.stringify({{ x: r.x, y: r.y, width: r.width, height: r.height }});
        }})()"#
    );

    let raw: String = page
        .evaluate(js.as_str())
        .await
        .with_context(|| format!("Failed to query geometry of {selector}"))?
        .into_value()
        .context("Geometry evaluation returned a non-string")?;

    if raw.is_empty() {
        return Ok(None);
    }

    let geometry = serde_json::from_str(&raw)
        .with_context(|| format!("Unexpected geometry shape for {selector}"))?;
    Ok(Some(geometry))
}

/// Blank out an input's current value.
pub async fn clear_field(page: &Page, selector: &str) -> Result<()> {
    let quoted = serde_json::to_string(selector).context("Failed to encode selector")?;
    let js = format!(
        r#"(() => {{
            const el = document.querySelector({quoted});
            if (el) el.value = "";
            return "";
        }})()"#
    );

    page.evaluate(js.as_str())
        .await
        .with_context(|| format!("Failed to clear {selector}"))?;
    Ok(())
}

/// Type text one character at a time with randomized inter-key delays,
/// mimicking an operator at a keyboard.
pub async fn type_like_human(element: &Element, text: &str) -> Result<()> {
    for ch in text.chars() {
        element
            .type_str(ch.to_string())
            .await
            .context("Failed to send keystroke")?;
        pause(100, 600).await;
    }
    Ok(())
}

/// Sleep for a uniformly random duration between `lo_ms` and `hi_ms`.
pub async fn pause(lo_ms: u64, hi_ms: u64) {
    tokio::time::sleep(jitter(lo_ms, hi_ms)).await;
}

fn jitter(lo_ms: u64, hi_ms: u64) -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(lo_ms..hi_ms))
}

/// Find a Chrome/Chromium executable.
fn find_chrome() -> Option<String> {
    for name in ["google-chrome", "chromium"] {
        if let Ok(output) = std::process::Command::new("which").arg(name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/run/current-system/sw/bin/google-chrome",
        "/run/current-system/sw/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    candidates
        .into_iter()
        .find(|candidate| std::path::Path::new(candidate).exists())
        .map(str::to_string)
}
