/// System page classification: URLs the extension must never try to save
use url::Url;

use crate::config::POCKET_DOMAIN;
use crate::tab_data::TabInfo;

/// True when the toolbar click happened on a page that cannot be saved
pub fn is_system_page(tab: &TabInfo) -> bool {
    is_system_link(&tab.url)
}

/// True for anything that is not a plain web page, or that belongs to the
/// service itself.
///
/// Examples:
/// - chrome://extensions → system
/// - about:blank → system
/// - https://getpocket.com/saves → system
/// - https://example.com/article → not system
pub fn is_system_link(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return true;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return true;
    }

    match parsed.host_str() {
        Some(host) => is_service_host(&host.to_lowercase()),
        None => true,
    }
}

fn is_service_host(host: &str) -> bool {
    host == POCKET_DOMAIN
        || host
            .strip_suffix(POCKET_DOMAIN)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
