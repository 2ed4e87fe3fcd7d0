use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::hosts::HostTarget;
use crate::models::Session;

pub const DEFAULT_WORKSPACE_PATH: &str = "/my-work";
pub const LOGIN_PATH: &str = "/login";

/// Everything the decision depends on. Built per request; no globals.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub session: Option<&'a Session>,
    pub host: &'a HostTarget,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin { callback_url: String },
    RedirectToOnboarding(OnboardingStep),
    RedirectToWorkspace { slug: String, path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Create,
}

impl OnboardingStep {
    pub fn path(self) -> &'static str {
        match self {
            OnboardingStep::Create => "/onboarding/create",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Settings,
    Analytics,
}

impl AdminSection {
    /// Where non-admins land instead.
    pub fn fallback(self) -> &'static str {
        match self {
            AdminSection::Settings => "/settings/account",
            AdminSection::Analytics => "/summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable by anyone, signed in or not.
    Open,
    /// Login and signup pages.
    AuthEntry,
    Onboarding,
    Protected(Option<AdminSection>),
}

const OPEN_PREFIXES: &[&str] = &[
    "/auth",
    "/verify",
    "/health",
    "/terms",
    "/privacy",
    "/_next",
    "/favicon.ico",
    "/images",
];

const AUTH_ENTRY_PREFIXES: &[&str] = &["/login", "/signup"];

const PERSONAL_SETTINGS: &[&str] = &[
    "/settings/account",
    "/settings/preferences",
    "/settings/notifications",
];

/// Bytes kept percent-encoded inside a canonical path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Canonical form of a request path.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment (never
/// above the root), and each segment is decoded then re-encoded with one
/// escaping scheme, so `%2e%2e` counts as `..` and `%7E` becomes `~`. Segments
/// that are not valid UTF-8 once decoded are kept as they arrived.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    for raw in path.split('/') {
        let Ok(decoded) = percent_decode_str(raw).decode_utf8() else {
            segments.push(raw.to_string());
            continue;
        };
        match &*decoded {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(utf8_percent_encode(segment, SEGMENT).to_string()),
        }
    }
    format!("/{}", segments.join("/"))
}

/// True when `path` is `prefix` or lies below it.
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn classify(path: &str) -> RouteClass {
    if OPEN_PREFIXES.iter().any(|p| under(path, p)) {
        return RouteClass::Open;
    }
    if AUTH_ENTRY_PREFIXES.iter().any(|p| under(path, p)) {
        return RouteClass::AuthEntry;
    }
    if under(path, "/onboarding") {
        return RouteClass::Onboarding;
    }
    if under(path, "/analytics") {
        return RouteClass::Protected(Some(AdminSection::Analytics));
    }
    if under(path, "/settings") && !PERSONAL_SETTINGS.iter().any(|p| under(path, p)) {
        return RouteClass::Protected(Some(AdminSection::Settings));
    }
    RouteClass::Protected(None)
}

fn callback_url(path: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    }
}

fn to_workspace(slug: &str, path: &str) -> Decision {
    Decision::RedirectToWorkspace {
        slug: slug.to_string(),
        path: path.to_string(),
    }
}

/// Decide what to do with a page request.
///
/// The path is classified in its canonical form. Zero-workspace sessions are
/// routed to onboarding before any active workspace is consulted.
pub fn decide(ctx: &DecisionContext<'_>) -> Decision {
    let path = normalize_path(ctx.path);
    let class = classify(&path);

    if class == RouteClass::Open {
        return Decision::Allow;
    }

    let Some(session) = ctx.session else {
        return match class {
            RouteClass::AuthEntry => Decision::Allow,
            _ => Decision::RedirectToLogin {
                callback_url: callback_url(&path, ctx.query),
            },
        };
    };

    let Some(active) = session.active_workspace() else {
        return match class {
            RouteClass::Onboarding => Decision::Allow,
            _ => Decision::RedirectToOnboarding(OnboardingStep::Create),
        };
    };

    match class {
        RouteClass::AuthEntry => return to_workspace(&active.slug, DEFAULT_WORKSPACE_PATH),
        RouteClass::Onboarding => return Decision::Allow,
        _ => {}
    }

    let Some(slug) = ctx.host.slug() else {
        return to_workspace(&active.slug, DEFAULT_WORKSPACE_PATH);
    };

    let Some(current) = session.workspace_by_slug(slug) else {
        return to_workspace(&active.slug, DEFAULT_WORKSPACE_PATH);
    };

    if path == "/" {
        return to_workspace(&current.slug, DEFAULT_WORKSPACE_PATH);
    }

    if let RouteClass::Protected(Some(section)) = class {
        if !current.user_role.is_admin() {
            return to_workspace(&current.slug, section.fallback());
        }
    }

    Decision::Allow
}
