//! Development-time timing and memory logging.
//!
//! Everything here is a no-op unless the [`Performance`] handle was created
//! enabled, which happens in dev mode or when monitoring is switched on in
//! the settings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::task::JoinHandle;

pub const MEMORY_SAMPLE_PERIOD: Duration = Duration::from_secs(30);

const MIB: f64 = 1_048_576.0;

#[derive(Debug, Clone, Copy)]
struct Mark {
    at: Instant,
    wall: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct Performance {
    enabled: bool,
    marks: Mutex<HashMap<String, Mark>>,
}

impl Performance {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            marks: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn mark(&self, name: &str) {
        if !self.enabled {
            return;
        }
        let mark = Mark {
            at: Instant::now(),
            wall: OffsetDateTime::now_utc(),
        };
        if tracing::enabled!(tracing::Level::TRACE) {
            let wall = mark.wall.format(&Rfc3339).unwrap_or_default();
            tracing::trace!(mark = name, at = %wall, "performance mark");
        }
        self.marks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), mark);
    }

    /// Logs and returns the time between two marks. A missing mark is
    /// logged as an error and yields `None`.
    pub fn measure(&self, name: &str, start_mark: &str, end_mark: &str) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        let marks = self.marks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (Some(start), Some(end)) = (marks.get(start_mark), marks.get(end_mark)) else {
            tracing::error!(
                measure = name,
                start_mark,
                end_mark,
                "performance measurement error: mark not found"
            );
            return None;
        };

        let duration = end.at.saturating_duration_since(start.at);
        tracing::info!("{}: {:.2}ms", name, duration.as_secs_f64() * 1000.0);
        Some(duration)
    }

    /// Start/end pair for timing a component render.
    pub fn measure_component_render(self: &Arc<Self>, component: &str) -> RenderProbe {
        RenderProbe {
            performance: Arc::clone(self),
            start_mark: format!("{component}-render-start"),
            end_mark: format!("{component}-render-end"),
            measure_name: format!("{component}-render-time"),
        }
    }

    /// Logs the load metrics derived from the page's navigation timings.
    pub fn report_page_timings(&self, timings: &PageTimings) -> Option<PageMetrics> {
        if !self.enabled {
            return None;
        }
        let metrics = timings.metrics();
        tracing::info!("=== page performance ===");
        for (name, value) in metrics.entries() {
            tracing::info!("{name}: {value}ms");
        }
        Some(metrics)
    }

    /// Periodically logs memory statistics. Returns `None` when disabled or
    /// when the probe exposes nothing on this platform.
    pub fn monitor_memory_usage<P>(&self, probe: P, period: Duration) -> Option<JoinHandle<()>>
    where
        P: MemoryProbe + Send + 'static,
    {
        if !self.enabled {
            return None;
        }
        if probe.sample().is_none() {
            tracing::debug!("memory statistics unavailable on this platform");
            return None;
        }

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if let Some(stats) = probe.sample() {
                    stats.log();
                }
            }
        }))
    }
}

pub struct RenderProbe {
    performance: Arc<Performance>,
    start_mark: String,
    end_mark: String,
    measure_name: String,
}

impl RenderProbe {
    pub fn start(&self) {
        self.performance.mark(&self.start_mark);
    }

    pub fn end(&self) -> Option<Duration> {
        self.performance.mark(&self.end_mark);
        self.performance
            .measure(&self.measure_name, &self.start_mark, &self.end_mark)
    }
}

/// Navigation timing timestamps in epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTimings {
    pub navigation_start: i64,
    pub domain_lookup_start: i64,
    pub domain_lookup_end: i64,
    pub connect_start: i64,
    pub connect_end: i64,
    pub request_start: i64,
    pub response_start: i64,
    pub response_end: i64,
    pub dom_loading: i64,
    pub dom_interactive: i64,
    pub dom_content_loaded_event_end: i64,
    pub dom_complete: i64,
    pub load_event_start: i64,
    pub load_event_end: i64,
}

/// Durations in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    pub dns_lookup: i64,
    pub tcp_connection: i64,
    pub server_response: i64,
    pub content_download: i64,
    pub dom_parsing: i64,
    pub resource_load: i64,
    pub first_paint: i64,
    pub first_contentful_paint: i64,
    pub dom_complete: i64,
    pub page_load: i64,
}

impl PageTimings {
    pub fn metrics(&self) -> PageMetrics {
        PageMetrics {
            dns_lookup: self.domain_lookup_end.saturating_sub(self.domain_lookup_start),
            tcp_connection: self.connect_end.saturating_sub(self.connect_start),
            server_response: self.response_start.saturating_sub(self.request_start),
            content_download: self.response_end.saturating_sub(self.response_start),
            dom_parsing: self.dom_interactive.saturating_sub(self.response_end),
            resource_load: self.load_event_start.saturating_sub(self.dom_content_loaded_event_end),
            first_paint: self.dom_loading.saturating_sub(self.navigation_start),
            first_contentful_paint: self.dom_interactive.saturating_sub(self.navigation_start),
            dom_complete: self.dom_complete.saturating_sub(self.navigation_start),
            page_load: self.load_event_end.saturating_sub(self.navigation_start),
        }
    }
}

impl PageMetrics {
    pub fn entries(&self) -> [(&'static str, i64); 10] {
        [
            ("dnsLookup", self.dns_lookup),
            ("tcpConnection", self.tcp_connection),
            ("serverResponse", self.server_response),
            ("contentDownload", self.content_download),
            ("domParsing", self.dom_parsing),
            ("resourceLoad", self.resource_load),
            ("firstPaint", self.first_paint),
            ("firstContentfulPaint", self.first_contentful_paint),
            ("domComplete", self.dom_complete),
            ("pageLoad", self.page_load),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub limit_bytes: Option<u64>,
}

impl MemoryStats {
    fn log(&self) {
        tracing::info!("=== memory usage ===");
        tracing::info!("used: {:.2} MB", self.used_bytes as f64 / MIB);
        match self.limit_bytes {
            Some(limit) => tracing::info!("limit: {:.2} MB", limit as f64 / MIB),
            None => tracing::info!("limit: unlimited"),
        }
        tracing::info!("total: {:.2} MB", self.total_bytes as f64 / MIB);
    }
}

pub trait MemoryProbe {
    fn sample(&self) -> Option<MemoryStats>;
}

/// Reads the current process's resident and virtual size from procfs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcMemoryProbe;

impl MemoryProbe for ProcMemoryProbe {
    fn sample(&self) -> Option<MemoryStats> {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        let (used_bytes, total_bytes) = parse_proc_status(&status)?;
        let limit_bytes = std::fs::read_to_string("/proc/self/limits")
            .ok()
            .and_then(|limits| parse_address_space_limit(&limits));
        Some(MemoryStats {
            used_bytes,
            total_bytes,
            limit_bytes,
        })
    }
}

/// `VmRSS` and `VmSize` in bytes.
fn parse_proc_status(status: &str) -> Option<(u64, u64)> {
    let field = |name: &str| {
        status.lines().find_map(|line| {
            let value = line.strip_prefix(name)?.strip_prefix(':')?;
            let kib: u64 = value.split_whitespace().next()?.parse().ok()?;
            Some(kib * 1024)
        })
    };
    Some((field("VmRSS")?, field("VmSize")?))
}

fn parse_address_space_limit(limits: &str) -> Option<u64> {
    limits.lines().find_map(|line| {
        line.strip_prefix("Max address space")?
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    })
}
