pub mod guards;
pub mod location;
pub mod routes;
pub mod scroll;
pub mod session;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RouterError;
use crate::performance::Performance;
pub use guards::{
    AuthGuard, Document, GuardContext, GuardOutcome, NavigationGuard, OnboardingGuard, Redirect,
    TitleGuard, default_guards,
};
pub use location::RouteLocation;
pub use routes::{ComponentLoader, LoadStrategy, RouteMeta, RouteRecord, RouteSummary, classic_routes};
pub use scroll::{ScrollInstruction, ScrollPosition, ScrollTarget, scroll_behavior};
pub use session::{JsonFileStore, SessionState, SessionStore};

/// Chained redirects allowed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// A loaded view module, as handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModule {
    pub name: String,
}

/// Fetches view modules by name.
pub trait ViewLoader {
    fn load(&self, view: &str) -> impl Future<Output = anyhow::Result<ViewModule>>;
}

/// Loader over a fixed set of bundled views. Counts how often each view
/// was requested.
#[derive(Debug, Default)]
pub struct StaticViewLoader {
    views: BTreeSet<String>,
    requests: Mutex<HashMap<String, usize>>,
}

impl StaticViewLoader {
    pub fn new<I, S>(views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            views: views.into_iter().map(Into::into).collect(),
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Every view referenced by `routes`.
    pub fn for_routes(routes: &[RouteRecord]) -> Self {
        Self::new(routes.iter().map(|r| r.component.view.clone()))
    }

    pub fn request_count(&self, view: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(view)
            .copied()
            .unwrap_or(0)
    }
}

impl ViewLoader for StaticViewLoader {
    async fn load(&self, view: &str) -> anyhow::Result<ViewModule> {
        *self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(view.to_string())
            .or_default() += 1;

        if !self.views.contains(view) {
            anyhow::bail!("Unknown view module: {}", view);
        }
        Ok(ViewModule {
            name: view.to_string(),
        })
    }
}

/// A location matched against the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub name: String,
    pub pattern: String,
    pub location: RouteLocation,
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    pub meta: RouteMeta,
}

/// Outcome of a completed navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub route: ResolvedRoute,
    pub view: ViewModule,
    pub title: Option<String>,
    pub scroll: ScrollInstruction,
    /// Full path originally requested when guards redirected elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
}

pub struct Router<L> {
    routes: Vec<RouteRecord>,
    guards: Vec<Box<dyn NavigationGuard>>,
    session: SessionState,
    loader: L,
    resolved_views: HashMap<String, ViewModule>,
    current: Option<ResolvedRoute>,
    document: Document,
    performance: Arc<Performance>,
}

impl<L: ViewLoader> Router<L> {
    /// Router without guards over an arbitrary route table.
    pub fn new(routes: Vec<RouteRecord>, session: SessionState, loader: L) -> Self {
        Self {
            routes,
            guards: Vec::new(),
            session,
            loader,
            resolved_views: HashMap::new(),
            current: None,
            document: Document::default(),
            performance: Arc::new(Performance::disabled()),
        }
    }

    /// The site's route table with the auth, onboarding and title guards.
    pub fn classic(session: SessionState, loader: L) -> Self {
        default_guards()
            .into_iter()
            .fold(Self::new(classic_routes(), session, loader), Self::add_guard)
    }

    pub fn add_guard(mut self, guard: Box<dyn NavigationGuard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Times each navigation with `route-change-*` marks.
    pub fn with_performance(mut self, performance: Arc<Performance>) -> Self {
        self.performance = performance;
        self
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Replaces the session flags, e.g. after the login flow completed.
    pub fn set_session(&mut self, session: SessionState) {
        self.session = session;
    }

    pub fn current(&self) -> Option<&ResolvedRoute> {
        self.current.as_ref()
    }

    pub fn document_title(&self) -> Option<&str> {
        self.document.title.as_deref()
    }

    /// Most specific matching route; declaration order breaks ties.
    pub fn resolve(&self, location: &RouteLocation) -> Option<ResolvedRoute> {
        let mut best: Option<(Vec<u8>, &RouteRecord, BTreeMap<String, String>)> = None;

        for record in &self.routes {
            let Some(params) = record.path.matches(&location.path) else {
                continue;
            };
            let score = record.path.score();
            if best.as_ref().is_none_or(|(best_score, _, _)| score > *best_score) {
                best = Some((score, record, params));
            }
        }

        best.map(|(_, record, params)| ResolvedRoute {
            name: record.name.clone(),
            pattern: record.path.as_str().to_string(),
            location: location.clone(),
            params,
            props: record.props.clone(),
            meta: record.meta.clone(),
        })
    }

    fn location_for(&self, redirect: &Redirect) -> Result<RouteLocation, RouterError> {
        let record = self
            .routes
            .iter()
            .find(|r| r.name == redirect.name)
            .ok_or_else(|| RouterError::UnknownRoute(redirect.name.clone()))?;

        Ok(redirect
            .query
            .iter()
            .fold(RouteLocation::parse(record.path.as_str()), |location, (key, value)| {
                location.with_query(key, value)
            }))
    }

    fn run_guards(&mut self, to: &ResolvedRoute) -> GuardOutcome {
        let ctx = GuardContext {
            to,
            session: &self.session,
        };
        for guard in &self.guards {
            let outcome = guard.check(&ctx, &mut self.document);
            if let GuardOutcome::Redirect(redirect) = &outcome {
                tracing::debug!(
                    guard = guard.name(),
                    from = %to.location,
                    to = %redirect.name,
                    "navigation redirected"
                );
                return outcome;
            }
        }
        GuardOutcome::Proceed
    }

    /// Resolves the route's view, invoking the loader only on first use.
    async fn load_view(&mut self, route: &ResolvedRoute) -> Result<ViewModule, RouterError> {
        if let Some(view) = self.resolved_views.get(&route.name) {
            return Ok(view.clone());
        }

        let component = self
            .routes
            .iter()
            .find(|r| r.name == route.name)
            .map(|r| r.component.clone())
            .ok_or_else(|| RouterError::UnknownRoute(route.name.clone()))?;

        let load_error = |source| RouterError::ViewLoad {
            view: component.view.clone(),
            source,
        };
        if component.strategy == LoadStrategy::Preload {
            // Warm-up request; its result is superseded by the next one.
            if let Err(err) = self.loader.load(&component.view).await {
                tracing::debug!(view = %component.view, "view preload failed: {err:#}");
            }
        }
        let view = self.loader.load(&component.view).await.map_err(load_error)?;

        self.resolved_views.insert(route.name.clone(), view.clone());
        Ok(view)
    }

    /// Runs the guards for `target` (following redirects), loads the view
    /// and decides the scroll position.
    ///
    /// `saved_position` is the position recorded for the target entry on a
    /// back/forward navigation.
    pub async fn navigate(
        &mut self,
        target: &str,
        saved_position: Option<ScrollPosition>,
    ) -> Result<Navigation, RouterError> {
        let requested = RouteLocation::parse(target);
        let mut location = requested.clone();
        let mut redirected_from = None;

        for _ in 0..=MAX_REDIRECTS {
            let start_mark = format!("route-change-start-{}", location.path);
            self.performance.mark(&start_mark);

            let to = self
                .resolve(&location)
                .ok_or_else(|| RouterError::NoMatch(location.full_path()))?;

            match self.run_guards(&to) {
                GuardOutcome::Redirect(redirect) => {
                    redirected_from.get_or_insert_with(|| requested.full_path());
                    location = self.location_for(&redirect)?;
                }
                GuardOutcome::Proceed => {
                    let view = self.load_view(&to).await?;
                    let saved = if redirected_from.is_none() { saved_position } else { None };
                    let scroll = scroll_behavior(&to.location, saved);

                    let end_mark = format!("route-change-end-{}", location.path);
                    self.performance.mark(&end_mark);
                    self.performance
                        .measure(&format!("route-change-{}", location.path), &start_mark, &end_mark);

                    tracing::info!(route = %to.name, path = %to.location, view = %view.name, "navigated");
                    self.current = Some(to.clone());
                    return Ok(Navigation {
                        route: to,
                        view,
                        title: self.document.title.clone(),
                        scroll,
                        redirected_from,
                    });
                }
            }
        }

        Err(RouterError::RedirectLoop(requested.full_path()))
    }
}
