//! Hydration reconciler
//!
//! Binds a load state machine to markup that already exists, either from
//! a static render or from a client-side [`render`](crate::render()).
//! Nodes are never recreated: the reconciler only flips attributes on the
//! targets it is handed.

use pixfade_dom::{DomTree, IntersectionObserver, IntersectionObserverEntry, NodeId};

use crate::config::HydrationConfig;
use crate::error::HydrationError;
use crate::markers;
use crate::state::{LoadHandle, LoadMachine, LoadOutcome, LoadPolicy, LoadState, Transition};
use crate::style::Style;

/// The three nodes the reconciler drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HydrationTargets {
    pub wrapper: NodeId,
    pub placeholder: NodeId,
    pub main_image: NodeId,
}

/// Find the targets below a wrapper by their markers
pub fn locate_targets(tree: &DomTree, wrapper: NodeId) -> Result<HydrationTargets, HydrationError> {
    if !tree.has_attr(wrapper, markers::WRAPPER) {
        return Err(HydrationError::NotAWrapper(wrapper));
    }
    let placeholder = tree
        .find_by_attr(wrapper, markers::PLACEHOLDER)
        .ok_or(HydrationError::MissingPlaceholder(wrapper))?;
    let main_image = tree
        .find_by_attr(wrapper, markers::MAIN_IMAGE)
        .ok_or(HydrationError::MissingMainImage(wrapper))?;

    Ok(HydrationTargets {
        wrapper,
        placeholder,
        main_image,
    })
}

/// Host check for a resource that finished before hydration
///
/// Browsers expose this as `HTMLImageElement.complete`. Returning `Some`
/// settles the machine at attach without issuing a request.
pub trait ResourceProbe {
    fn probe(&self, tree: &DomTree, image: NodeId) -> Option<LoadOutcome>;
}

impl<F> ResourceProbe for F
where
    F: Fn(&DomTree, NodeId) -> Option<LoadOutcome>,
{
    fn probe(&self, tree: &DomTree, image: NodeId) -> Option<LoadOutcome> {
        self(tree, image)
    }
}

/// Probe for hosts without a resource cache
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverComplete;

impl ResourceProbe for NeverComplete {
    fn probe(&self, _tree: &DomTree, _image: NodeId) -> Option<LoadOutcome> {
        None
    }
}

/// One image with behavior attached
#[derive(Debug)]
pub struct HydratedImage {
    targets: HydrationTargets,
    machine: LoadMachine,
    observing: bool,
    requests_issued: u32,
}

impl HydratedImage {
    /// Attach to existing markup
    ///
    /// The server-render marker is removed so a later scan skips this
    /// image. Lazy images still idle are registered with `observer`.
    pub fn attach(
        tree: &mut DomTree,
        targets: HydrationTargets,
        config: &HydrationConfig,
        observer: &mut IntersectionObserver,
        probe: &dyn ResourceProbe,
    ) -> Result<Self, HydrationError> {
        let main = targets.main_image;
        let policy = LoadPolicy::from_attr(tree.get_attr(main, "loading"));
        tree.remove_attr(main, markers::SERVER_RENDERED)?;

        let mut image = Self {
            targets,
            machine: LoadMachine::new(policy),
            observing: false,
            requests_issued: 0,
        };

        if let Some(outcome) = probe.probe(tree, main) {
            tracing::debug!(wrapper = %targets.wrapper, ?outcome, "Resource finished before hydration");
            image.machine.request();
            // Served from cache, not a new request
            promote(tree, main)?;
            image.machine.handle().complete(outcome);
            image.pump(tree)?;
            return Ok(image);
        }

        match image.machine.state() {
            LoadState::Requested => image.issue_request(tree)?,
            LoadState::Idle if config.native_lazy_loading => {
                // `loading="lazy"` gates the fetch
                image.machine.request();
                image.issue_request(tree)?;
            }
            LoadState::Idle => {
                observer.observe(targets.wrapper);
                image.observing = true;
            }
            LoadState::Loaded | LoadState::Errored => {}
        }

        tracing::debug!(
            wrapper = %targets.wrapper,
            policy = policy.as_str(),
            state = ?image.machine.state(),
            "Image hydrated"
        );
        Ok(image)
    }

    pub fn targets(&self) -> HydrationTargets {
        self.targets
    }

    pub fn state(&self) -> LoadState {
        self.machine.state()
    }

    pub fn is_visible(&self) -> bool {
        self.machine.is_visible()
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn is_mounted(&self) -> bool {
        self.machine.is_mounted()
    }

    /// Fetches this reconciler started
    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    pub fn handle(&self) -> LoadHandle {
        self.machine.handle()
    }

    /// Feed an intersection entry for the wrapper
    pub fn on_intersection(
        &mut self,
        tree: &mut DomTree,
        entry: &IntersectionObserverEntry,
        observer: &mut IntersectionObserver,
    ) -> Result<Option<Transition>, HydrationError> {
        if entry.target != self.targets.wrapper {
            return Ok(None);
        }
        let transition = self.machine.set_visible(entry.is_intersecting);
        if transition.is_some() {
            self.release(observer);
            self.issue_request(tree)?;
        }
        Ok(transition)
    }

    /// Apply a reported outcome, if any
    pub fn pump(&mut self, tree: &mut DomTree) -> Result<Option<Transition>, HydrationError> {
        let transition = self.machine.pump();
        if let Some(t) = transition {
            self.apply(tree, t.to)?;
        }
        Ok(transition)
    }

    /// Wait for the outcome of the in-flight request
    pub async fn settle(&mut self, tree: &mut DomTree) -> Result<Option<Transition>, HydrationError> {
        let transition = self.machine.settle().await;
        if let Some(t) = transition {
            self.apply(tree, t.to)?;
        }
        Ok(transition)
    }

    /// Detach. Pending observation is released and later outcomes dropped.
    pub fn unmount(&mut self, observer: &mut IntersectionObserver) {
        self.release(observer);
        self.machine.unmount();
    }

    fn release(&mut self, observer: &mut IntersectionObserver) {
        if self.observing {
            observer.unobserve(self.targets.wrapper);
            self.observing = false;
        }
    }

    fn issue_request(&mut self, tree: &mut DomTree) -> Result<(), HydrationError> {
        if promote(tree, self.targets.main_image)? {
            self.requests_issued += 1;
            tracing::debug!(wrapper = %self.targets.wrapper, "Requested main image");
        }
        Ok(())
    }

    fn apply(&self, tree: &mut DomTree, state: LoadState) -> Result<(), HydrationError> {
        match state {
            LoadState::Loaded => {
                set_opacity(tree, self.targets.main_image, "1")?;
                set_opacity(tree, self.targets.placeholder, "0")?;
            }
            LoadState::Errored => {
                tracing::warn!(wrapper = %self.targets.wrapper, "Main image failed to load");
            }
            LoadState::Idle | LoadState::Requested => {}
        }
        Ok(())
    }
}

/// Move `data-src`/`data-srcset` to `src`/`srcset`. Returns whether
/// anything moved.
fn promote(tree: &mut DomTree, img: NodeId) -> Result<bool, HydrationError> {
    let mut moved = false;
    for (deferred, live) in [
        (markers::DEFERRED_SRCSET, "srcset"),
        (markers::DEFERRED_SRC, "src"),
    ] {
        if let Some(value) = tree.remove_attr(img, deferred)? {
            tree.set_attr(img, live, value)?;
            moved = true;
        }
    }
    Ok(moved)
}

fn set_opacity(tree: &mut DomTree, node: NodeId, opacity: &str) -> Result<(), HydrationError> {
    let mut style = Style::parse(tree.get_attr(node, "style").unwrap_or_default());
    style.set("opacity", opacity);
    tree.set_attr(node, "style", style.to_css())?;
    Ok(())
}
