//! Client identification utilities
//!
//! Describes the device behind a session from its User-Agent string.

use serde::Serialize;

/// Placeholder for every field the classifier cannot recognise
pub const UNKNOWN: &str = "Unknown";

/// Coarse description of a client derived from its User-Agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub browser: &'static str,
    pub os: &'static str,
    pub device: &'static str,
    pub is_mobile: bool,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            browser: UNKNOWN,
            os: UNKNOWN,
            device: UNKNOWN,
            is_mobile: false,
        }
    }
}

/// Classify a raw User-Agent string.
///
/// Pure substring matching over the lower-cased input. Order matters:
/// Chromium derivatives also advertise "chrome" and "safari", and iOS
/// advertises "like Mac OS X", so the more specific tokens are tested first.
///
/// ## Examples
/// ```rust
/// use platform::client::classify_device;
///
/// let info = classify_device(
///     "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
///      (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
/// );
/// assert_eq!(info.device, "iPhone");
/// assert!(info.is_mobile);
/// ```
pub fn classify_device(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.trim().to_lowercase();
    if ua.is_empty() {
        return DeviceInfo::default();
    }

    let device = detect_device(&ua);

    DeviceInfo {
        browser: detect_browser(&ua),
        os: detect_os(&ua),
        device,
        is_mobile: matches!(device, "iPhone" | "Android Phone" | "Mobile") || ua.contains("mobile"),
    }
}

fn detect_browser(ua: &str) -> &'static str {
    if ua.contains("edg") {
        "Edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("firefox") || ua.contains("fxios") {
        "Firefox"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        UNKNOWN
    }
}

fn detect_os(ua: &str) -> &'static str {
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        UNKNOWN
    }
}

fn detect_device(ua: &str) -> &'static str {
    if ua.contains("iphone") {
        "iPhone"
    } else if ua.contains("ipad") {
        "iPad"
    } else if ua.contains("android") {
        if ua.contains("mobile") {
            "Android Phone"
        } else {
            "Android Tablet"
        }
    } else if ua.contains("mobile") {
        "Mobile"
    } else if ua.contains("windows") || ua.contains("macintosh") || ua.contains("linux") {
        "Desktop"
    } else {
        UNKNOWN
    }
}
