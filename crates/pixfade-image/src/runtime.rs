//! Image runtime
//!
//! Host-side mount routine. Scans a document for image wrappers, attaches
//! a [`HydratedImage`] to each and owns the intersection observer they
//! share.

use std::collections::{BTreeMap, HashMap};

use pixfade_dom::{
    DOMRect, Document, DomTree, IntersectionObserver, IntersectionObserverOptions, NodeId,
};

use crate::config::HydrationConfig;
use crate::error::HydrationError;
use crate::hydrate::{HydratedImage, HydrationTargets, ResourceProbe, locate_targets};
use crate::markers;
use crate::state::{LoadHandle, LoadState, Transition};
use crate::{Diagnostic, ImageError};

/// Hydrated images of one document
#[derive(Debug)]
pub struct ImageRuntime {
    config: HydrationConfig,
    observer: IntersectionObserver,
    /// Keyed by wrapper
    images: BTreeMap<NodeId, HydratedImage>,
}

impl Default for ImageRuntime {
    fn default() -> Self {
        Self::new(HydrationConfig::default())
    }
}

impl ImageRuntime {
    pub fn new(config: HydrationConfig) -> Self {
        let observer = IntersectionObserver::new(IntersectionObserverOptions {
            root_margin: config.root_margin,
            thresholds: vec![0.0],
        });
        Self {
            config,
            observer,
            images: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &HydrationConfig {
        &self.config
    }

    /// Hydrate every server-rendered image in the tree
    ///
    /// Wrappers that are already attached, or whose main image carries no
    /// server-render marker, are skipped. Malformed wrappers are reported
    /// and skipped.
    pub fn hydrate(&mut self, tree: &mut DomTree, probe: &dyn ResourceProbe) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let wrappers = tree.find_all_by_attr(tree.root(), markers::WRAPPER);

        for wrapper in wrappers {
            if self.images.contains_key(&wrapper) {
                continue;
            }
            let targets = match locate_targets(tree, wrapper) {
                Ok(targets) => targets,
                Err(err) => {
                    let diagnostic = Diagnostic::MalformedMarkup(err);
                    tracing::warn!("{diagnostic}");
                    diagnostics.push(diagnostic);
                    continue;
                }
            };
            if !tree.has_attr(targets.main_image, markers::SERVER_RENDERED) {
                continue;
            }
            if let Err(err) = self.attach(tree, targets, probe) {
                let diagnostic = Diagnostic::MalformedMarkup(err);
                tracing::warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
        }

        tracing::debug!(
            images = self.images.len(),
            observed = self.observer.len(),
            "Hydration pass finished"
        );
        diagnostics
    }

    /// Hydrate a whole document
    pub fn hydrate_document(
        &mut self,
        document: &mut Document,
        probe: &dyn ResourceProbe,
    ) -> Vec<Diagnostic> {
        self.hydrate(document.tree_mut(), probe)
    }

    /// Parse static markup and hydrate it
    pub fn hydrate_html(
        &mut self,
        html: &str,
        probe: &dyn ResourceProbe,
    ) -> Result<(Document, Vec<Diagnostic>), ImageError> {
        let mut document = pixfade_html::parse(html)?;
        let diagnostics = self.hydrate_document(&mut document, probe);
        Ok((document, diagnostics))
    }

    /// Attach one image, e.g. right after a client-side render
    pub fn attach(
        &mut self,
        tree: &mut DomTree,
        targets: HydrationTargets,
        probe: &dyn ResourceProbe,
    ) -> Result<LoadState, HydrationError> {
        if let Some(existing) = self.images.get(&targets.wrapper) {
            return Ok(existing.state());
        }
        let image = HydratedImage::attach(tree, targets, &self.config, &mut self.observer, probe)?;
        let state = image.state();
        self.images.insert(targets.wrapper, image);
        Ok(state)
    }

    /// Feed new geometry; routes intersection entries to their images
    pub fn update_viewport(
        &mut self,
        tree: &mut DomTree,
        viewport: DOMRect,
        rects: &HashMap<NodeId, DOMRect>,
        time: f64,
    ) -> Result<Vec<(NodeId, Transition)>, HydrationError> {
        self.observer.check_intersections(viewport, rects, time);

        let mut transitions = Vec::new();
        for entry in self.observer.take_entries() {
            let Some(image) = self.images.get_mut(&entry.target) else {
                continue;
            };
            tracing::trace!(
                wrapper = %entry.target,
                ratio = entry.intersection_ratio,
                "Routing intersection entry"
            );
            if let Some(t) = image.on_intersection(tree, &entry, &mut self.observer)? {
                transitions.push((entry.target, t));
            }
        }
        Ok(transitions)
    }

    /// Apply every reported outcome
    pub fn pump(&mut self, tree: &mut DomTree) -> Result<Vec<(NodeId, Transition)>, HydrationError> {
        let mut transitions = Vec::new();
        for (&wrapper, image) in &mut self.images {
            if let Some(t) = image.pump(tree)? {
                transitions.push((wrapper, t));
            }
        }
        Ok(transitions)
    }

    pub fn handle(&self, wrapper: NodeId) -> Option<LoadHandle> {
        self.images.get(&wrapper).map(HydratedImage::handle)
    }

    pub fn state(&self, wrapper: NodeId) -> Option<LoadState> {
        self.images.get(&wrapper).map(HydratedImage::state)
    }

    pub fn image(&self, wrapper: NodeId) -> Option<&HydratedImage> {
        self.images.get(&wrapper)
    }

    pub fn image_mut(&mut self, wrapper: NodeId) -> Option<&mut HydratedImage> {
        self.images.get_mut(&wrapper)
    }

    /// Detach one image. Returns `false` if it was not attached.
    pub fn unmount(&mut self, wrapper: NodeId) -> bool {
        match self.images.remove(&wrapper) {
            Some(mut image) => {
                image.unmount(&mut self.observer);
                true
            }
            None => false,
        }
    }

    /// Wrappers of attached images, in document-arena order
    pub fn wrappers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.images.keys().copied()
    }

    /// Images with a request in flight
    pub fn in_flight(&self) -> usize {
        self.images
            .values()
            .filter(|image| image.state().is_loading())
            .count()
    }

    /// Images still waiting to become visible
    pub fn observed(&self) -> usize {
        self.observer.len()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::hydrate::NeverComplete;
    use crate::render::{ImageProps, render};
    use crate::state::{LoadOutcome, LoadPolicy};
    use crate::{ImageDescriptor, ImageSet, Layout, Sizing, SourceCandidate};

    fn render_lazy(tree: &mut DomTree, config: &RenderConfig) -> HydrationTargets {
        let image = ImageDescriptor::new(
            Sizing::new(Layout::Fixed, 100, 100).unwrap(),
            ImageSet::new().with_fallback(SourceCandidate::src("a.jpg")),
        );
        let root = tree.root();
        render(tree, root, &ImageProps::new(image), config)
            .unwrap()
            .targets
            .unwrap()
    }

    #[test]
    fn test_hydrate_is_idempotent() {
        let mut tree = DomTree::new();
        let targets = render_lazy(&mut tree, &RenderConfig::default());
        let mut runtime = ImageRuntime::default();

        assert!(runtime.hydrate(&mut tree, &NeverComplete).is_empty());
        assert_eq!(runtime.len(), 1);
        assert_eq!(runtime.state(targets.wrapper), Some(LoadState::Idle));

        runtime.hydrate(&mut tree, &NeverComplete);
        assert_eq!(runtime.len(), 1);
        assert_eq!(runtime.observed(), 1);
    }

    #[test]
    fn test_client_render_is_not_scanned() {
        let mut tree = DomTree::new();
        let targets = render_lazy(&mut tree, &RenderConfig::client());
        let mut runtime = ImageRuntime::default();

        runtime.hydrate(&mut tree, &NeverComplete);
        assert!(runtime.is_empty());

        assert_eq!(
            runtime.attach(&mut tree, targets, &NeverComplete),
            Ok(LoadState::Idle)
        );
        assert_eq!(runtime.len(), 1);
    }

    #[test]
    fn test_malformed_wrapper_reported() {
        let mut tree = DomTree::new();
        let targets = render_lazy(&mut tree, &RenderConfig::default());
        tree.detach(targets.placeholder).unwrap();

        let mut runtime = ImageRuntime::default();
        let diagnostics = runtime.hydrate(&mut tree, &NeverComplete);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MalformedMarkup(HydrationError::MissingPlaceholder(
                targets.wrapper
            ))]
        );
        assert!(runtime.is_empty());
    }

    #[test]
    fn test_viewport_within_root_margin_requests() {
        let mut tree = DomTree::new();
        let targets = render_lazy(&mut tree, &RenderConfig::default());
        let mut runtime = ImageRuntime::default();
        runtime.hydrate(&mut tree, &NeverComplete);

        let viewport = DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0);
        let mut rects = HashMap::new();

        // 150px below the fold, inside the 200px margin
        rects.insert(targets.wrapper, DOMRect::from_xywh(0.0, 750.0, 100.0, 100.0));
        let transitions = runtime
            .update_viewport(&mut tree, viewport, &rects, 16.0)
            .unwrap();

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].1.to, LoadState::Requested);
        assert_eq!(runtime.in_flight(), 1);
        assert_eq!(runtime.observed(), 0);
    }

    #[test]
    fn test_far_away_image_stays_idle() {
        let mut tree = DomTree::new();
        let targets = render_lazy(&mut tree, &RenderConfig::default());
        let mut runtime = ImageRuntime::default();
        runtime.hydrate(&mut tree, &NeverComplete);

        let mut rects = HashMap::new();
        rects.insert(targets.wrapper, DOMRect::from_xywh(0.0, 5000.0, 100.0, 100.0));
        let transitions = runtime
            .update_viewport(&mut tree, DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0), &rects, 0.0)
            .unwrap();

        assert!(transitions.is_empty());
        assert_eq!(runtime.state(targets.wrapper), Some(LoadState::Idle));
    }

    #[test]
    fn test_pump_and_unmount() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let image = ImageDescriptor::new(
            Sizing::new(Layout::Fluid, 4, 3).unwrap(),
            ImageSet::new().with_fallback(SourceCandidate::src("b.jpg")),
        );
        let first = render(
            &mut tree,
            root,
            &ImageProps::new(image.clone()).with_loading(LoadPolicy::Eager),
            &RenderConfig::default(),
        )
        .unwrap()
        .root()
        .unwrap();
        let second = render(
            &mut tree,
            root,
            &ImageProps::new(image).with_loading(LoadPolicy::Eager),
            &RenderConfig::default(),
        )
        .unwrap()
        .root()
        .unwrap();

        let mut runtime = ImageRuntime::default();
        runtime.hydrate(&mut tree, &NeverComplete);
        assert_eq!(runtime.in_flight(), 2);

        let late = runtime.handle(second).unwrap();
        assert!(runtime.unmount(second));
        assert!(!runtime.unmount(second));

        runtime.handle(first).unwrap().complete(LoadOutcome::Loaded);
        assert!(!late.complete(LoadOutcome::Loaded));

        let transitions = runtime.pump(&mut tree).unwrap();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].0, first);
        assert_eq!(runtime.state(first), Some(LoadState::Loaded));
        assert_eq!(runtime.state(second), None);
    }
}
