use markup5ever_rcdom::Handle;
use serde::Serialize;

/// Measures the current layout. Implementations must answer from the live
/// layout at call time; a stale measurement scrolls to the wrong place once
/// images finish loading.
pub trait LayoutProbe {
    /// Top edge of `node` relative to the viewport, `None` when the node is
    /// not laid out.
    fn element_top(&self, node: &Handle) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerMetrics {
    /// Top edge of the reading pane relative to the viewport.
    pub top: f64,
    pub scroll_top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollCommand {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Scroll position that brings `target` to `offset` pixels below the top of
/// the reading pane.
pub fn scroll_command(
    target: &Handle,
    container: ContainerMetrics,
    probe: &dyn LayoutProbe,
    offset: f64,
) -> Option<ScrollCommand> {
    let element_top = probe.element_top(target)?;
    let top = element_top - container.top + container.scroll_top - offset;
    Some(ScrollCommand {
        top: top.max(0.0),
        behavior: ScrollBehavior::Smooth,
    })
}
