use crate::router::ResolvedRoute;
use crate::router::routes::{LOGIN, ONBOARDING, REGISTER};
use crate::router::session::SessionState;

/// Where a guard sends a navigation instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub name: String,
    pub query: Vec<(String, String)>,
}

impl Redirect {
    pub fn to(name: &str) -> Self {
        Self {
            name: name.to_string(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirect(Redirect),
}

/// Mutable document state a guard may touch on the way through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub title: Option<String>,
}

pub struct GuardContext<'a> {
    pub to: &'a ResolvedRoute,
    pub session: &'a SessionState,
}

/// A navigation interceptor, run in registration order before every
/// navigation. The first redirect wins.
pub trait NavigationGuard: Send + Sync {
    fn check(&self, ctx: &GuardContext<'_>, document: &mut Document) -> GuardOutcome;

    fn name(&self) -> &str;
}

/// Sends anonymous visitors of protected routes to the login page,
/// remembering where they were headed.
pub struct AuthGuard;

impl NavigationGuard for AuthGuard {
    fn check(&self, ctx: &GuardContext<'_>, _document: &mut Document) -> GuardOutcome {
        if ctx.to.meta.requires_auth && !ctx.session.logged_in {
            return GuardOutcome::Redirect(
                Redirect::to(LOGIN).with_query("redirect", ctx.to.location.full_path()),
            );
        }
        GuardOutcome::Proceed
    }

    fn name(&self) -> &str {
        "auth"
    }
}

/// Keeps logged-in users on the onboarding flow until they finish it.
pub struct OnboardingGuard;

impl OnboardingGuard {
    const EXEMPT: [&'static str; 3] = [ONBOARDING, LOGIN, REGISTER];
}

impl NavigationGuard for OnboardingGuard {
    fn check(&self, ctx: &GuardContext<'_>, _document: &mut Document) -> GuardOutcome {
        let session = ctx.session;
        if session.logged_in
            && !session.onboarding_completed
            && !Self::EXEMPT.contains(&ctx.to.name.as_str())
        {
            return GuardOutcome::Redirect(Redirect::to(ONBOARDING));
        }
        GuardOutcome::Proceed
    }

    fn name(&self) -> &str {
        "onboarding"
    }
}

/// Copies the route title into the document.
pub struct TitleGuard;

impl NavigationGuard for TitleGuard {
    fn check(&self, ctx: &GuardContext<'_>, document: &mut Document) -> GuardOutcome {
        if let Some(title) = &ctx.to.meta.title {
            document.title = Some(title.clone());
        }
        GuardOutcome::Proceed
    }

    fn name(&self) -> &str {
        "title"
    }
}

pub fn default_guards() -> Vec<Box<dyn NavigationGuard>> {
    vec![Box::new(AuthGuard), Box::new(OnboardingGuard), Box::new(TitleGuard)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouteLocation;
    use crate::router::routes::RouteMeta;
    use std::collections::BTreeMap;

    fn route(name: &str, path: &str, requires_auth: bool) -> ResolvedRoute {
        ResolvedRoute {
            name: name.to_string(),
            pattern: path.to_string(),
            location: RouteLocation::parse(path),
            params: BTreeMap::new(),
            props: None,
            meta: RouteMeta {
                title: Some(format!("{name} page")),
                requires_auth,
            },
        }
    }

    fn check(guard: &dyn NavigationGuard, to: &ResolvedRoute, session: SessionState) -> GuardOutcome {
        let ctx = GuardContext {
            to,
            session: &session,
        };
        guard.check(&ctx, &mut Document::default())
    }

    #[test]
    fn auth_guard_redirects_with_full_path() {
        let mut to = route("quiz-history", "/quiz/history", true);
        to.location = RouteLocation::parse("/quiz/history?page=2");

        let outcome = check(&AuthGuard, &to, SessionState::anonymous());
        assert_eq!(
            outcome,
            GuardOutcome::Redirect(Redirect::to(LOGIN).with_query("redirect", "/quiz/history?page=2"))
        );
    }

    #[test]
    fn auth_guard_ignores_public_routes() {
        let to = route("books", "/books", false);
        assert_eq!(check(&AuthGuard, &to, SessionState::anonymous()), GuardOutcome::Proceed);
    }

    #[test]
    fn onboarding_guard_exempts_auth_pages() {
        for name in [ONBOARDING, LOGIN, REGISTER] {
            let to = route(name, &format!("/{name}"), false);
            assert_eq!(
                check(&OnboardingGuard, &to, SessionState::logged_in(false)),
                GuardOutcome::Proceed,
                "{name}"
            );
        }
    }

    #[test]
    fn onboarding_guard_ignores_anonymous_users() {
        let to = route("books", "/books", false);
        assert_eq!(check(&OnboardingGuard, &to, SessionState::anonymous()), GuardOutcome::Proceed);
    }

    #[test]
    fn title_guard_sets_document_title() {
        let to = route("about", "/about", false);
        let session = SessionState::anonymous();
        let ctx = GuardContext {
            to: &to,
            session: &session,
        };
        let mut document = Document::default();
        assert_eq!(TitleGuard.check(&ctx, &mut document), GuardOutcome::Proceed);
        assert_eq!(document.title.as_deref(), Some("about page"));
    }
}
