// Widget service - Instance-scoped graph state, refresh and reconfiguration
use crate::application::chart_synthesizer::json_to_svg;
use crate::application::graph_repository::GraphRepository;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::svg_normalizer::normalize_svg;
use crate::application::theme_recolorer::scope_class;
use crate::domain::error::GraphError;
use crate::domain::graph_source::GraphSource;
use crate::domain::payload::Payload;
use crate::domain::theme::ThemeConfig;
use crate::infrastructure::config::WidgetConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug)]
struct WidgetState {
    config: WidgetConfig,
    /// Normalized markup currently displayed
    svg_html: Option<String>,
    /// Last SVG text that normalized successfully; the fallback snapshot
    raw_svg: Option<String>,
    error: Option<String>,
    is_loading: bool,
    /// Bumped on every fetch-relevant reconfiguration and on dispose
    generation: u64,
    disposed: bool,
}

impl WidgetState {
    fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            svg_html: None,
            raw_svg: None,
            error: None,
            is_loading: false,
            generation: 0,
            disposed: false,
        }
    }

    fn show(&mut self, svg: &str) -> Result<(), GraphError> {
        let normalized = normalize_svg(svg, &self.config.theme.overall_background)?;
        self.svg_html = Some(normalized);
        self.raw_svg = Some(svg.to_string());
        self.error = None;
        self.is_loading = false;
        Ok(())
    }

    /// Record a failure and fall back to the snapshot, then to inline code
    fn fail(&mut self, error: GraphError) {
        self.error = Some(error.to_string());
        self.is_loading = false;

        let inline = Some(self.config.svg_code.clone())
            .filter(|code| code.trim_start().starts_with("<svg"));
        let Some(fallback) = self.raw_svg.clone().or(inline) else {
            return;
        };

        match normalize_svg(&fallback, &self.config.theme.overall_background) {
            Ok(normalized) => {
                tracing::debug!("Widget {} showing fallback graph", self.config.id);
                self.svg_html = Some(normalized);
                self.raw_svg = Some(fallback);
            }
            Err(e) => tracing::debug!("Fallback graph for {} unusable: {}", self.config.id, e),
        }
    }

    fn show_inline(&mut self, svg_code: &str) {
        if let Err(e) = self.show(svg_code) {
            self.svg_html = None;
            self.raw_svg = None;
            self.error = Some(e.to_string());
            self.is_loading = false;
        }
    }

    fn clear(&mut self) {
        self.svg_html = None;
        self.raw_svg = None;
        self.error = None;
        self.is_loading = false;
    }
}

/// What the presentation layer needs to draw one widget.
#[derive(Debug, Clone)]
pub struct WidgetView {
    pub id: String,
    pub scope: String,
    pub theme: ThemeConfig,
    pub has_source_url: bool,
    pub svg_html: Option<String>,
    pub error: Option<String>,
    pub is_loading: bool,
}

/// Shared by the instance and its timer task.
#[derive(Clone)]
struct WidgetRuntime {
    repository: Arc<dyn GraphRepository>,
    state: Arc<Mutex<WidgetState>>,
}

impl WidgetRuntime {
    /// Fetch, synthesize and normalize the configured remote graph.
    ///
    /// A response is dropped if the widget was reconfigured or disposed while
    /// it was in flight. Two fetches of the same generation (manual refresh
    /// racing a timer tick) are not serialized: the last one to resolve wins.
    async fn refresh(&self) {
        let (request, generation) = {
            let mut state = self.state.lock().await;
            if state.disposed {
                return;
            }
            let GraphSource::Remote(request) = state.config.source() else {
                return;
            };
            state.is_loading = true;
            state.error = None;
            (request, state.generation)
        };

        tracing::debug!("Fetching graph from {}", request.url);
        let outcome = self
            .repository
            .fetch_graph(&request)
            .await
            .and_then(|payload| match payload {
                Payload::Svg(svg) => Ok(svg),
                Payload::Json(value) => json_to_svg(&value),
            });

        let mut state = self.state.lock().await;
        if state.disposed || state.generation != generation {
            tracing::debug!(
                "Discarding stale response for widget {} (generation {} != {})",
                state.config.id,
                generation,
                state.generation
            );
            return;
        }

        match outcome.and_then(|svg| state.show(&svg).map(|_| svg)) {
            Ok(svg) => {
                // Outbound config write: keep the last good graph as offline fallback
                state.config.svg_code = svg;
            }
            Err(e) => {
                tracing::warn!("Failed to load graph for widget {}: {}", state.config.id, e);
                state.fail(e);
            }
        }
    }

    /// Inline and placeholder sources are shown right away. A remote source
    /// is marked loading and fetched on its own task so callers never wait
    /// on the upstream.
    async fn start_load(&self) {
        let mut state = self.state.lock().await;
        match state.config.source() {
            GraphSource::Remote(_) => {
                state.is_loading = true;
                let runtime = self.clone();
                tokio::spawn(async move { runtime.refresh().await });
            }
            GraphSource::Inline(svg_code) => state.show_inline(&svg_code),
            GraphSource::Unconfigured => state.clear(),
        }
    }

    /// Re-run normalization for a presentation-only change
    async fn reprocess(&self) {
        let mut state = self.state.lock().await;
        match state.config.source() {
            GraphSource::Remote(_) => {
                if let Some(raw) = state.raw_svg.clone() {
                    if let Err(e) = state.show(&raw) {
                        state.fail(e);
                    }
                }
            }
            GraphSource::Inline(svg_code) => state.show_inline(&svg_code),
            GraphSource::Unconfigured => state.clear(),
        }
    }
}

/// One mounted widget: owned state plus its refresh timer.
pub struct WidgetInstance {
    id: String,
    runtime: WidgetRuntime,
    scheduler: Mutex<RefreshScheduler>,
}

impl WidgetInstance {
    pub async fn mount(config: WidgetConfig, repository: Arc<dyn GraphRepository>) -> Self {
        let instance = Self {
            id: config.id.clone(),
            runtime: WidgetRuntime {
                repository,
                state: Arc::new(Mutex::new(WidgetState::new(config))),
            },
            scheduler: Mutex::new(RefreshScheduler::new()),
        };

        instance.runtime.start_load().await;
        instance.rearm_scheduler().await;
        instance
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Apply a configuration update. Source, credential or timing changes
    /// refetch and re-arm the timer; anything else only re-normalizes.
    pub async fn apply_config(&self, config: WidgetConfig) {
        let (fetch_changed, changed) = {
            let mut state = self.runtime.state.lock().await;
            if state.disposed {
                return;
            }
            let previous = std::mem::replace(&mut state.config, config);
            let fetch_changed = previous.fetch_settings_differ(&state.config);
            if fetch_changed {
                state.generation += 1;
            }
            (fetch_changed, previous != state.config)
        };

        if fetch_changed {
            self.runtime.start_load().await;
            self.rearm_scheduler().await;
        } else if changed {
            self.runtime.reprocess().await;
        }
    }

    /// Manual refresh; same path as a timer tick
    pub async fn refresh(&self) {
        self.runtime.refresh().await;
    }

    pub async fn dispose(&self) {
        {
            let mut state = self.runtime.state.lock().await;
            state.disposed = true;
            state.is_loading = false;
            state.generation += 1;
        }
        self.scheduler.lock().await.cancel();
        tracing::debug!("Widget {} disposed", self.id);
    }

    pub async fn view(&self) -> WidgetView {
        let state = self.runtime.state.lock().await;
        WidgetView {
            id: self.id.clone(),
            scope: scope_class(&self.id),
            theme: state.config.theme.clone(),
            has_source_url: !state.config.source_url.trim().is_empty(),
            svg_html: state.svg_html.clone(),
            error: state.error.clone(),
            is_loading: state.is_loading,
        }
    }

    /// Current configuration, including any written-back `svg_code`
    pub async fn config(&self) -> WidgetConfig {
        self.runtime.state.lock().await.config.clone()
    }

    pub async fn auto_refresh_period(&self) -> Option<std::time::Duration> {
        self.scheduler.lock().await.period()
    }

    /// Wait for the background load started by `mount` or `apply_config`
    #[cfg(test)]
    pub async fn settle(&self) {
        while self.runtime.state.lock().await.is_loading {
            tokio::task::yield_now().await;
        }
    }

    async fn rearm_scheduler(&self) {
        let period = self.runtime.state.lock().await.config.refresh_period();
        let runtime = self.runtime.clone();
        self.scheduler.lock().await.rearm(period, move || {
            let runtime = runtime.clone();
            async move { runtime.refresh().await }
        });
    }
}
