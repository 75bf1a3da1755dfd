use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::{Map, Value, json};

const TITLE_SUFFIX: &str = " - 国学经典";

/// When a route's view module is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    /// Loader runs twice on first navigation: once to warm the module
    /// cache, once to hand the module to the router.
    Preload,
    Lazy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentLoader {
    pub view: String,
    pub strategy: LoadStrategy,
}

impl ComponentLoader {
    pub fn preload(view: &str) -> Self {
        Self {
            view: view.to_string(),
            strategy: LoadStrategy::Preload,
        }
    }

    pub fn lazy(view: &str) -> Self {
        Self {
            view: view.to_string(),
            strategy: LoadStrategy::Lazy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub title: Option<String>,
    pub requires_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// Parsed route path: `/book/:id`, `/quiz/leaderboard` or a catch-all
/// such as `/:pathMatch(.*)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    catch_all: Option<String>,
}

impl PathPattern {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut catch_all = None;

        for raw in source.split('/').filter(|s| !s.is_empty()) {
            match raw.strip_prefix(':') {
                Some(param) if param.contains("(.*)") => {
                    let name = param.split('(').next().unwrap_or(param);
                    catch_all = Some(name.to_string());
                    break;
                }
                Some(param) => segments.push(Segment::Param(param.to_string())),
                None => segments.push(Segment::Static(raw.to_string())),
            }
        }

        Self {
            source: source.to_string(),
            segments,
            catch_all,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Higher is more specific: static segments outrank params, and
    /// catch-alls rank below everything else.
    pub fn score(&self) -> Vec<u8> {
        if self.catch_all.is_some() {
            return Vec::new();
        }
        let mut score: Vec<u8> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(_) => 3,
                Segment::Param(_) => 2,
            })
            .collect();
        // Root outranks the catch-all but nothing else.
        if score.is_empty() {
            score.push(1);
        }
        score
    }

    /// Matches a normalized path, returning its percent-decoded params.
    /// Static segments compare case-insensitively.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let fixed = self.segments.len();

        if self.catch_all.is_none() && parts.len() != fixed {
            return None;
        }
        if parts.len() < fixed {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Static(expected) if expected.eq_ignore_ascii_case(part) => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), decode_param(part));
                }
            }
        }
        if let Some(name) = &self.catch_all {
            params.insert(name.clone(), decode_param(&parts[fixed..].join("/")));
        }
        Some(params)
    }
}

/// Escapes that do not decode to UTF-8 are kept as written.
fn decode_param(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: PathPattern,
    pub name: String,
    pub component: ComponentLoader,
    pub props: Option<Map<String, Value>>,
    pub meta: RouteMeta,
}

impl RouteRecord {
    pub fn new(path: &str, name: &str, component: ComponentLoader, title: &str, requires_auth: bool) -> Self {
        Self {
            path: PathPattern::parse(path),
            name: name.to_string(),
            component,
            props: None,
            meta: RouteMeta {
                title: Some(format!("{title}{TITLE_SUFFIX}")),
                requires_auth,
            },
        }
    }

    pub fn with_props(mut self, props: Value) -> Self {
        if let Value::Object(map) = props {
            self.props = Some(map);
        }
        self
    }
}

/// Serializable summary of a route, for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub path: String,
    pub name: String,
    pub view: String,
    pub strategy: LoadStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    pub meta: RouteMeta,
}

impl From<&RouteRecord> for RouteSummary {
    fn from(record: &RouteRecord) -> Self {
        Self {
            path: record.path.as_str().to_string(),
            name: record.name.clone(),
            view: record.component.view.clone(),
            strategy: record.component.strategy,
            props: record.props.clone(),
            meta: record.meta.clone(),
        }
    }
}

pub const LOGIN: &str = "login";
pub const REGISTER: &str = "register";
pub const ONBOARDING: &str = "onboarding";
pub const NOT_FOUND: &str = "not-found";

/// The site's route table.
pub fn classic_routes() -> Vec<RouteRecord> {
    use ComponentLoader as C;

    vec![
        RouteRecord::new("/", "home", C::preload("HomeView"), "首页", false),
        RouteRecord::new("/books", "books", C::preload("BooksView"), "经典书籍", false),
        RouteRecord::new("/book/:id", "book-detail", C::lazy("BookDetailView"), "书籍详情", false),
        RouteRecord::new("/book/read/:id", "book-read", C::lazy("BookReadView"), "阅读经典", false),
        RouteRecord::new("/quotes", "quotes", C::lazy("QuotesView"), "国学名句赏析", false),
        RouteRecord::new("/login", LOGIN, C::preload("LoginView"), "登录", false),
        RouteRecord::new("/register", REGISTER, C::preload("RegisterView"), "注册", false),
        RouteRecord::new("/about", "about", C::lazy("AboutView"), "关于我们", false),
        RouteRecord::new("/community", "community", C::lazy("CommunityView"), "学习社区", false),
        RouteRecord::new(
            "/learning-center",
            "learning-center",
            C::lazy("LearningCenterView"),
            "个人学习中心",
            true,
        ),
        RouteRecord::new("/courses", "courses", C::lazy("CoursesView"), "国学讲堂", false),
        RouteRecord::new("/quiz", "quiz", C::lazy("QuizView"), "国学知识测验", false),
        RouteRecord::new("/quiz/:type", "quiz-play", C::lazy("QuizPlayView"), "答题中", false),
        RouteRecord::new("/quiz/result/:id", "quiz-result", C::lazy("QuizResultView"), "测验结果", false),
        RouteRecord::new("/quiz/leaderboard", "quiz-leaderboard", C::lazy("QuizView"), "排行榜", false)
            .with_props(json!({ "activeTab": "leaderboard" })),
        RouteRecord::new("/quiz/history", "quiz-history", C::lazy("QuizView"), "测验历史", true)
            .with_props(json!({ "activeTab": "history" })),
        RouteRecord::new("/quiz/review/:id", "quiz-review", C::lazy("QuizPlayView"), "测验回顾", true)
            .with_props(json!({ "isReviewMode": true })),
        RouteRecord::new("/festivals", "festivals", C::lazy("FestivalView"), "传统节日", false),
        RouteRecord::new(
            "/forgot-password",
            "forgot-password",
            C::preload("ForgotPasswordView"),
            "找回密码",
            false,
        ),
        RouteRecord::new("/onboarding", ONBOARDING, C::preload("UserOnboardingView"), "新用户引导", true),
        RouteRecord::new("/profile", "profile", C::preload("UserProfileView"), "个人资料", true),
        RouteRecord::new("/images-test", "images-test", C::lazy("ImagesTestView"), "图片测试", false),
        RouteRecord::new("/:pathMatch(.*)*", NOT_FOUND, C::lazy("HomeView"), "页面未找到", false),
    ]
}
