//! Client-side routes and the authentication guard

use agency_client::{LOGIN_PATH, Resource};
use serde::Serialize;
use std::fmt;

use crate::detail::InboxKind;

/// Prefix of every dashboard route
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Analytics sub-pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsView {
    /// Visitors and page views
    Traffic,
    /// Conversion funnels
    Funnels,
    /// Visitors by region
    Geography,
    /// Marketing campaigns
    Campaigns,
}

impl AnalyticsView {
    /// Every view, in navigation order
    pub const ALL: [Self; 4] = [Self::Traffic, Self::Funnels, Self::Geography, Self::Campaigns];

    /// Route segment
    pub const fn path(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Funnels => "funnels",
            Self::Geography => "geography",
            Self::Campaigns => "campaigns",
        }
    }

    fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.path() == segment)
    }
}

/// Pages inside the authenticated layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "page", content = "target", rename_all = "lowercase")]
pub enum DashboardRoute {
    /// Landing page
    Overview,
    /// Analytics page
    Analytics(AnalyticsView),
    /// Content management for one resource
    Content(Resource),
    /// Triage list for one inbox
    Inbox(InboxKind),
    /// Account settings
    Settings,
}

/// Every route the dashboard knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    /// Sign-in screen, also the catch-all
    Login,
    /// Authenticated layout
    Dashboard(DashboardRoute),
}

impl Route {
    /// The dashboard landing page
    pub const HOME: Self = Self::Dashboard(DashboardRoute::Overview);

    /// Map a path to a route; anything unknown is [`Route::Login`]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let page = match segments.as_slice() {
            [] | ["dashboard"] => DashboardRoute::Overview,
            ["login"] => return Self::Login,
            ["dashboard", "analytics"] => DashboardRoute::Analytics(AnalyticsView::Traffic),
            ["dashboard", "analytics", view] => match AnalyticsView::from_path(view) {
                Some(view) => DashboardRoute::Analytics(view),
                None => return Self::Login,
            },
            ["dashboard", "content", segment] => {
                match Resource::ALL.into_iter().find(|r| r.path() == *segment) {
                    Some(resource) => DashboardRoute::Content(resource),
                    None => return Self::Login,
                }
            }
            ["dashboard", "inbox", kind] => match InboxKind::from_path(kind) {
                Some(kind) => DashboardRoute::Inbox(kind),
                None => return Self::Login,
            },
            ["dashboard", "settings"] => DashboardRoute::Settings,
            _ => return Self::Login,
        };
        Self::Dashboard(page)
    }

    /// Canonical path; `Route::parse(route.path())` gives back `route`
    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_string(),
            Self::Dashboard(DashboardRoute::Overview) => DASHBOARD_PATH.to_string(),
            Self::Dashboard(DashboardRoute::Analytics(view)) => {
                format!("{DASHBOARD_PATH}/analytics/{}", view.path())
            }
            Self::Dashboard(DashboardRoute::Content(resource)) => {
                format!("{DASHBOARD_PATH}/content/{}", resource.path())
            }
            Self::Dashboard(DashboardRoute::Inbox(kind)) => {
                format!("{DASHBOARD_PATH}/inbox/{}", kind.path())
            }
            Self::Dashboard(DashboardRoute::Settings) => format!("{DASHBOARD_PATH}/settings"),
        }
    }

    /// Whether the route sits behind the login
    pub const fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Apply the auth guard to `path`
///
/// Signed-out visitors always land on the login screen; signed-in users are
/// sent from the login screen to the dashboard.
pub fn resolve(path: &str, authenticated: bool) -> Route {
    match Route::parse(path) {
        route if route.requires_auth() && !authenticated => Route::Login,
        Route::Login if authenticated => Route::HOME,
        route => route,
    }
}
