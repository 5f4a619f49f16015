// Application state for HTTP handlers
use crate::application::widget_service::WidgetInstance;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct AppState {
    pub widgets: BTreeMap<String, Arc<WidgetInstance>>,
}

impl AppState {
    pub fn new(widgets: impl IntoIterator<Item = WidgetInstance>) -> Self {
        let widgets = widgets
            .into_iter()
            .map(|w| (w.id().to_string(), Arc::new(w)))
            .collect();
        Self { widgets }
    }

    pub fn widget(&self, id: &str) -> Option<Arc<WidgetInstance>> {
        self.widgets.get(id).cloned()
    }

    /// Tear down every widget; called once the servers have stopped
    pub async fn dispose_all(&self) {
        for widget in self.widgets.values() {
            widget.dispose().await;
        }
    }
}
