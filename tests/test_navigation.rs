mod common;

use common::*;

#[tokio::test]
async fn protected_route_redirects_anonymous_user_to_login() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("/learning-center", None).await?;

    assert_eq!(navigation.route.name, "login");
    assert_eq!(navigation.route.location.query_value("redirect"), Some("/learning-center"));
    assert_eq!(navigation.redirected_from.as_deref(), Some("/learning-center"));
    assert_eq!(navigation.title.as_deref(), Some("登录 - 国学经典"));
    Ok(())
}

#[tokio::test]
async fn redirect_query_keeps_the_full_requested_path() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("#/quiz/review/7?question=3", None).await?;

    assert_eq!(navigation.route.name, "login");
    assert_eq!(
        navigation.route.location.query_value("redirect"),
        Some("/quiz/review/7?question=3")
    );
    Ok(())
}

#[tokio::test]
async fn redirect_query_preserves_the_requested_encoding() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("/profile?tab=a%20b&x=c/d", None).await?;

    assert_eq!(navigation.route.name, "login");
    assert_eq!(
        navigation.route.location.query_value("redirect"),
        Some("/profile?tab=a%20b&x=c/d")
    );
    assert_eq!(navigation.redirected_from.as_deref(), Some("/profile?tab=a%20b&x=c/d"));
    Ok(())
}

#[tokio::test]
async fn logged_in_user_without_onboarding_is_sent_to_onboarding() -> anyhow::Result<()> {
    let mut router = classic_router(&fresh_user_storage());

    for path in ["/", "/books", "/quiz/history", "/profile", "/nowhere"] {
        let navigation = router.navigate(path, None).await?;
        assert_eq!(navigation.route.name, "onboarding", "{path}");
        assert_eq!(navigation.view.name, "UserOnboardingView");
    }
    Ok(())
}

#[tokio::test]
async fn onboarding_exempts_login_register_and_itself() -> anyhow::Result<()> {
    let mut router = classic_router(&fresh_user_storage());

    for (path, name) in [("/login", "login"), ("/register", "register"), ("/onboarding", "onboarding")] {
        let navigation = router.navigate(path, None).await?;
        assert_eq!(navigation.route.name, name);
        assert!(navigation.redirected_from.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn auth_check_takes_precedence_over_onboarding() -> anyhow::Result<()> {
    // Not logged in and never onboarded: the login redirect applies, and the
    // onboarding guard leaves anonymous users alone.
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("/onboarding", None).await?;

    assert_eq!(navigation.route.name, "login");
    assert_eq!(navigation.route.location.query_value("redirect"), Some("/onboarding"));
    Ok(())
}

#[tokio::test]
async fn onboarded_user_reaches_protected_routes() -> anyhow::Result<()> {
    let mut router = classic_router(&onboarded_user_storage());

    let navigation = router.navigate("/quiz/history", None).await?;

    assert_eq!(navigation.route.name, "quiz-history");
    assert_eq!(navigation.view.name, "QuizView");
    assert_eq!(navigation.route.props.as_ref().unwrap()["activeTab"], "history");
    assert_eq!(router.document_title(), Some("测验历史 - 国学经典"));
    Ok(())
}

#[tokio::test]
async fn unmatched_path_renders_home_view() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("/some/removed/page", None).await?;

    assert_eq!(navigation.route.name, "not-found");
    assert_eq!(navigation.view.name, "HomeView");
    assert_eq!(navigation.title.as_deref(), Some("页面未找到 - 国学经典"));
    Ok(())
}

#[tokio::test]
async fn preloaded_views_are_requested_twice_lazy_views_once() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    router.navigate("/books", None).await?;
    router.navigate("/about", None).await?;
    assert_eq!(router.loader().request_count("BooksView"), 2);
    assert_eq!(router.loader().request_count("AboutView"), 1);

    // resolved components are reused on later visits
    router.navigate("/books", None).await?;
    router.navigate("/about", None).await?;
    assert_eq!(router.loader().request_count("BooksView"), 2);
    assert_eq!(router.loader().request_count("AboutView"), 1);
    Ok(())
}

#[tokio::test]
async fn session_updates_apply_to_later_navigations() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());
    assert_eq!(router.navigate("/profile", None).await?.route.name, "login");

    router.set_session(SessionState::from_store(&onboarded_user_storage()));
    let navigation = router.navigate("/profile", None).await?;
    assert_eq!(navigation.route.name, "profile");
    assert_eq!(router.current().map(|r| r.name.as_str()), Some("profile"));
    Ok(())
}

#[tokio::test]
async fn scroll_follows_saved_position_then_hash_then_top() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());
    let saved = ScrollPosition { left: 0.0, top: 1200.0 };

    let back = router.navigate("/book/read/3#chapter-2", Some(saved)).await?;
    assert_eq!(back.scroll.target, ScrollTarget::Restore { position: saved });

    let anchored = router.navigate("/book/read/3#chapter-2", None).await?;
    assert_eq!(
        anchored.scroll.target,
        ScrollTarget::Anchor { selector: "#chapter-2".to_string() }
    );

    let plain = router.navigate("/books", None).await?;
    assert_eq!(plain.scroll.target, ScrollTarget::Top);
    assert!(plain.scroll.smooth);
    Ok(())
}

#[tokio::test]
async fn route_params_are_exposed() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("/book/read/42", None).await?;

    assert_eq!(navigation.route.name, "book-read");
    assert_eq!(navigation.route.params["id"], "42");
    assert_eq!(navigation.route.location, RouteLocation::parse("/book/read/42"));
    Ok(())
}

#[tokio::test]
async fn route_params_are_percent_decoded() -> anyhow::Result<()> {
    let mut router = classic_router(&anonymous_storage());

    let navigation = router.navigate("#/book/%E8%AE%BA", None).await?;

    assert_eq!(navigation.route.name, "book-detail");
    assert_eq!(navigation.route.params["id"], "论");
    Ok(())
}
