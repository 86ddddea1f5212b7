//! One-shot flash messages carried in a short-lived cookie.
//!
//! Form handlers set a message before redirecting; the next rendered page
//! takes it and clears the cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashKind {
    fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Info => "info",
            FlashKind::Warning => "warning",
            FlashKind::Danger => "danger",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(FlashKind::Success),
            "info" => Some(FlashKind::Info),
            "warning" => Some(FlashKind::Warning),
            "danger" => Some(FlashKind::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    /// Bootstrap alert class suffix.
    pub fn css_class(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// Queue a message for the next page.
pub fn set(jar: CookieJar, kind: FlashKind, message: impl Into<String>) -> CookieJar {
    let value = form_urlencoded::Serializer::new(String::new())
        .append_pair("kind", kind.as_str())
        .append_pair("msg", &message.into())
        .finish();

    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(5))
        .build();
    jar.add(cookie)
}

/// Take the pending message, if any, and clear it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let mut kind = None;
    let mut message = None;
    for (key, value) in form_urlencoded::parse(cookie.value().as_bytes()) {
        match key.as_ref() {
            "kind" => kind = FlashKind::parse(&value),
            "msg" => message = Some(value.into_owned()),
            _ => {}
        }
    }

    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    let flash = kind.zip(message).map(|(kind, message)| Flash { kind, message });
    (jar, flash)
}
