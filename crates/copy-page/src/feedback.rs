//! Transient success/error tooltips announced through a live region.
//!
//! Each tooltip is a small state machine:
//!
//! ```text
//! Mounted --frame--> Shown --hide timer--> Hiding --transition end (opacity 0)--> Removed
//!    \                 \                      \
//!     +----- remove timer or eviction ---------+------------------------------> Removed
//! ```
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::{Dom, Listener};
use crate::scheduler::Scheduler;

pub const FEEDBACK_CLASS: &str = "sl-copy-button-feedback";
pub const FEEDBACK_ERROR_CLASS: &str = "sl-copy-button-feedback--error";
pub const SHOWN_CLASS: &str = "show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    /// Attached, not yet visible.
    Mounted,
    Shown,
    /// `show` removed, exit transition running.
    Hiding,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipTrigger {
    AnimationFrame,
    HideTimer,
    RemoveTimer,
    TransitionEnd,
    TransitionCancel,
    /// A newer tooltip replaced this one.
    Evicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackTimings {
    pub hide_after: u32,
    pub remove_after: u32,
}

impl FeedbackTimings {
    pub const MIN_VISIBLE_MS: u32 = 500;
    pub const MIN_REMOVE_MS: u32 = 1300;
    /// Extra time allowed for the exit transition before the hard removal.
    pub const EXIT_GRACE_MS: u32 = 800;

    pub fn new(visible_ms: u32) -> Self {
        Self {
            hide_after: visible_ms.max(Self::MIN_VISIBLE_MS),
            remove_after: visible_ms
                .saturating_add(Self::EXIT_GRACE_MS)
                .max(Self::MIN_REMOVE_MS),
        }
    }
}

#[derive(Debug)]
pub struct Tooltip<N> {
    node: N,
    phase: Cell<TooltipPhase>,
    is_error: bool,
}

impl<N: Clone + PartialEq + std::fmt::Debug + 'static> Tooltip<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase.get()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Applies `trigger` and its DOM effect, returning the new phase.
    pub fn handle<D: Dom<Node = N>>(&self, dom: &D, trigger: TooltipTrigger) -> TooltipPhase {
        use TooltipPhase::*;
        use TooltipTrigger::*;

        let current = self.phase.get();
        let next = match (current, trigger) {
            (Removed, _) => Removed,
            (_, Evicted | RemoveTimer) => {
                dom.remove(&self.node);
                Removed
            }
            (Mounted, AnimationFrame) => {
                dom.add_class(&self.node, SHOWN_CLASS);
                Shown
            }
            (Mounted | Shown, HideTimer) => {
                dom.remove_class(&self.node, SHOWN_CLASS);
                Hiding
            }
            (_, TransitionEnd | TransitionCancel) if dom.computed_opacity(&self.node) <= 0.0 => {
                dom.remove(&self.node);
                Removed
            }
            (phase, _) => phase,
        };

        if next != current {
            tracing::trace!("Tooltip {:?} -> {:?} on {:?}", current, next, trigger);
        }
        self.phase.set(next);
        next
    }
}

/// Shows at most one tooltip at a time inside a live region.
pub struct FeedbackPresenter<D: Dom, S: Scheduler> {
    dom: Rc<D>,
    scheduler: Rc<S>,
    region: D::Node,
    current: RefCell<Option<Rc<Tooltip<D::Node>>>>,
}

impl<D: Dom + 'static, S: Scheduler> FeedbackPresenter<D, S> {
    pub fn new(dom: Rc<D>, scheduler: Rc<S>, region: D::Node) -> Self {
        Self {
            dom,
            scheduler,
            region,
            current: RefCell::new(None),
        }
    }

    pub fn region(&self) -> &D::Node {
        &self.region
    }

    pub fn current(&self) -> Option<Rc<Tooltip<D::Node>>> {
        self.current.borrow().clone()
    }

    /// Replaces any visible tooltip with `text`, hidden after `visible_ms`.
    pub fn show(&self, text: &str, visible_ms: u32, is_error: bool) -> Option<Rc<Tooltip<D::Node>>> {
        let dom = &*self.dom;

        if let Some(previous) = self.current.borrow_mut().take() {
            previous.handle(dom, TooltipTrigger::Evicted);
        }
        let stray_selector = format!(".{FEEDBACK_CLASS}");
        while let Some(stray) = dom.query_selector_in(&self.region, &stray_selector) {
            dom.remove(&stray);
        }

        let Some(node) = dom.create_element("div") else {
            tracing::warn!("Could not create the feedback tooltip");
            return None;
        };
        dom.add_class(&node, FEEDBACK_CLASS);
        if is_error {
            dom.add_class(&node, FEEDBACK_ERROR_CLASS);
        }
        dom.set_text_content(&node, text);
        dom.append_child(&self.region, &node);
        dom.force_layout(&node);

        let tooltip = Rc::new(Tooltip {
            node,
            phase: Cell::new(TooltipPhase::Mounted),
            is_error,
        });
        let timings = FeedbackTimings::new(visible_ms);

        let frame = self.on(&tooltip, TooltipTrigger::AnimationFrame);
        let hide = self.on(&tooltip, TooltipTrigger::HideTimer);
        let remove = self.on(&tooltip, TooltipTrigger::RemoveTimer);
        self.scheduler
            .request_animation_frame(Box::new(move || frame()));
        self.scheduler
            .set_timeout(timings.hide_after, Box::new(move || hide()));
        self.scheduler
            .set_timeout(timings.remove_after, Box::new(move || remove()));
        dom.add_listener(
            tooltip.node(),
            "transitionend",
            self.on(&tooltip, TooltipTrigger::TransitionEnd),
        );
        dom.add_listener(
            tooltip.node(),
            "transitioncancel",
            self.on(&tooltip, TooltipTrigger::TransitionCancel),
        );

        tracing::debug!(
            "Showing {} feedback '{}' for {}ms",
            if is_error { "error" } else { "success" },
            text,
            timings.hide_after
        );
        *self.current.borrow_mut() = Some(Rc::clone(&tooltip));
        Some(tooltip)
    }

    fn on(&self, tooltip: &Rc<Tooltip<D::Node>>, trigger: TooltipTrigger) -> Listener {
        let dom = Rc::downgrade(&self.dom);
        let tooltip = Rc::clone(tooltip);
        Rc::new(move || {
            if let Some(dom) = dom.upgrade() {
                tooltip.handle(&*dom, trigger);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeId};
    use rstest::rstest;

    #[rstest]
    #[case(2200, 2200, 3000)]
    #[case(2000, 2000, 2800)]
    #[case(400, 500, 1300)]
    #[case(0, 500, 1300)]
    #[case(u32::MAX, u32::MAX, u32::MAX)]
    fn test_timings(#[case] visible: u32, #[case] hide: u32, #[case] remove: u32) {
        assert_eq!(
            FeedbackTimings::new(visible),
            FeedbackTimings {
                hide_after: hide,
                remove_after: remove
            }
        );
    }

    fn tooltip(document: &MemoryDocument) -> Tooltip<NodeId> {
        let body = document.body().unwrap();
        let node = document.create_element("div").unwrap();
        document.add_class(&node, FEEDBACK_CLASS);
        document.append_child(&body, &node);
        Tooltip {
            node,
            phase: Cell::new(TooltipPhase::Mounted),
            is_error: false,
        }
    }

    #[rstest]
    #[case::shown(&[TooltipTrigger::AnimationFrame], TooltipPhase::Shown)]
    #[case::hidden(&[TooltipTrigger::AnimationFrame, TooltipTrigger::HideTimer], TooltipPhase::Hiding)]
    #[case::transition_while_shown(
        &[TooltipTrigger::AnimationFrame, TooltipTrigger::TransitionEnd],
        TooltipPhase::Shown
    )]
    #[case::transition_after_hide(
        &[TooltipTrigger::AnimationFrame, TooltipTrigger::HideTimer, TooltipTrigger::TransitionEnd],
        TooltipPhase::Removed
    )]
    #[case::cancelled_after_hide(
        &[TooltipTrigger::AnimationFrame, TooltipTrigger::HideTimer, TooltipTrigger::TransitionCancel],
        TooltipPhase::Removed
    )]
    #[case::late_frame(&[TooltipTrigger::HideTimer, TooltipTrigger::AnimationFrame], TooltipPhase::Hiding)]
    #[case::hard_removal(&[TooltipTrigger::AnimationFrame, TooltipTrigger::RemoveTimer], TooltipPhase::Removed)]
    #[case::evicted(&[TooltipTrigger::Evicted], TooltipPhase::Removed)]
    #[case::removed_is_final(
        &[TooltipTrigger::Evicted, TooltipTrigger::AnimationFrame, TooltipTrigger::HideTimer],
        TooltipPhase::Removed
    )]
    fn test_tooltip_transitions(#[case] triggers: &[TooltipTrigger], #[case] expected: TooltipPhase) {
        let document = MemoryDocument::parse("<html><body></body></html>");
        let tooltip = tooltip(&document);

        for trigger in triggers {
            tooltip.handle(&document, *trigger);
        }

        assert_eq!(tooltip.phase(), expected);
        assert_eq!(
            document.is_connected(*tooltip.node()),
            expected != TooltipPhase::Removed
        );
        assert_eq!(
            document.has_class(*tooltip.node(), SHOWN_CLASS),
            expected == TooltipPhase::Shown
        );
    }
}
