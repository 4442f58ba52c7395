//! Intersection Observer
//!
//! Observe element visibility relative to a viewport. One observer is
//! meant to be shared by many targets: the host feeds it viewport and
//! element rects, it reports which targets crossed a threshold.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{DOMRect, NodeId};

/// Intersection observer options
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverOptions {
    /// Margin in px added around the viewport before testing
    pub root_margin: f64,
    /// Thresholds to trigger callback
    pub thresholds: Vec<f64>,
}

impl Default for IntersectionObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: 0.0,
            thresholds: vec![0.0],
        }
    }
}

/// Intersection observer entry
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverEntry {
    pub target: NodeId,
    pub bounding_client_rect: DOMRect,
    pub intersection_rect: DOMRect,
    pub root_bounds: DOMRect,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
    pub time: f64,
}

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Intersection observer
#[derive(Debug)]
pub struct IntersectionObserver {
    id: u64,
    options: IntersectionObserverOptions,
    /// Target -> last reported ratio
    observed: HashMap<NodeId, Option<f64>>,
    pending_entries: Vec<IntersectionObserverEntry>,
}

impl IntersectionObserver {
    pub fn new(mut options: IntersectionObserverOptions) -> Self {
        if options.thresholds.is_empty() {
            options.thresholds.push(0.0);
        }
        Self {
            id: NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed),
            options,
            observed: HashMap::new(),
            pending_entries: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn options(&self) -> &IntersectionObserverOptions {
        &self.options
    }

    /// Observe an element. Re-observing keeps the last reported ratio.
    pub fn observe(&mut self, target: NodeId) {
        self.observed.entry(target).or_insert(None);
    }

    /// Stop observing, dropping any entry not yet taken for it
    pub fn unobserve(&mut self, target: NodeId) {
        if self.observed.remove(&target).is_some() {
            tracing::trace!(observer = self.id, %target, "unobserved");
        }
        self.pending_entries.retain(|e| e.target != target);
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    /// Number of observed targets
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Check intersections against the viewport
    ///
    /// The first check of a target always reports; later checks report
    /// only when the ratio crosses a threshold.
    pub fn check_intersections(
        &mut self,
        viewport: DOMRect,
        element_rects: &HashMap<NodeId, DOMRect>,
        time: f64,
    ) {
        let root = viewport.expand(self.options.root_margin);

        for (node, last_ratio) in &mut self.observed {
            let Some(rect) = element_rects.get(node) else {
                continue;
            };
            let intersection = rect.intersection(&root);
            let ratio = match intersection {
                Some(i) if rect.area() > 0.0 => (i.area() / rect.area()).min(1.0),
                Some(_) => 1.0,
                // Zero-sized targets count as intersecting when they touch the root
                None if rect.area() == 0.0 && rect.touches(&root) => 1.0,
                None => 0.0,
            };

            let should_notify = match *last_ratio {
                Some(lr) => self
                    .options
                    .thresholds
                    .iter()
                    .any(|&t| crossed(lr, ratio, t)),
                None => true,
            };

            if should_notify {
                *last_ratio = Some(ratio);
                self.pending_entries.push(IntersectionObserverEntry {
                    target: *node,
                    bounding_client_rect: *rect,
                    intersection_rect: intersection.unwrap_or_default(),
                    root_bounds: root,
                    intersection_ratio: ratio,
                    is_intersecting: ratio > 0.0,
                    time,
                });
            }
        }

        tracing::trace!(
            observer = self.id,
            pending = self.pending_entries.len(),
            "checked intersections"
        );
    }

    /// Take pending entries
    pub fn take_entries(&mut self) -> Vec<IntersectionObserverEntry> {
        std::mem::take(&mut self.pending_entries)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_entries.is_empty()
    }
}

/// Threshold 0 fires on any change between "not intersecting" and "intersecting"
fn crossed(last: f64, now: f64, threshold: f64) -> bool {
    if threshold == 0.0 {
        return (last > 0.0) != (now > 0.0);
    }
    (last < threshold && now >= threshold) || (last >= threshold && now < threshold)
}
