//! External linguistic analysis adapter.
//!
//! Morphological tagging and dependency parsing are never performed
//! in-process; an implementation of [`LinguisticAnalyzer`] supplies
//! them as opaque input. Loading such an analyzer (model files,
//! subprocess, network) is the one expensive, fallible resource in
//! the pipeline, so [`LazyAnalyzer`] defers it until a phase first
//! needs it, initializes at most once per process, and turns every
//! failure into "that phase contributes nothing".

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use titulus_core::{DependencyEdge, LinguisticTag, Result};

/// Two-operation capability contract for an external analyzer.
///
/// The engine runs correctly with zero, one, or both operations
/// enabled, selected purely by configuration.
pub trait LinguisticAnalyzer: Send + Sync {
    /// Morphologically tag the normalized text.
    fn tag(&self, text: &str) -> Result<Vec<LinguisticTag>>;

    /// Dependency-parse the normalized text.
    fn parse(&self, text: &str) -> Result<Vec<DependencyEdge>>;
}

type AnalyzerFactory = Box<dyn Fn() -> Result<Box<dyn LinguisticAnalyzer>> + Send + Sync>;

/// Lazily-initialized, shared analyzer handle.
///
/// The factory runs at most once, on first use; workers in a batch
/// share the loaded analyzer by reference. An initialization failure
/// is logged once and pins the handle unavailable; a call-time
/// failure disables only the failing operation for the remainder of
/// the run. Neither is ever fatal.
pub struct LazyAnalyzer {
    factory: AnalyzerFactory,
    cell: OnceCell<Box<dyn LinguisticAnalyzer>>,
    init_failed: AtomicBool,
    tag_disabled: AtomicBool,
    parse_disabled: AtomicBool,
}

impl LazyAnalyzer {
    /// Wrap a factory that loads the analyzer on first use.
    #[must_use]
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn LinguisticAnalyzer>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceCell::new(),
            init_failed: AtomicBool::new(false),
            tag_disabled: AtomicBool::new(false),
            parse_disabled: AtomicBool::new(false),
        }
    }

    /// Wrap an already-constructed analyzer.
    #[must_use]
    pub fn preloaded<A>(analyzer: A) -> Self
    where
        A: LinguisticAnalyzer + 'static,
    {
        let cell = OnceCell::new();
        let _ = cell.set(Box::new(analyzer) as Box<dyn LinguisticAnalyzer>);
        Self {
            factory: Box::new(|| unreachable!("preloaded analyzer cell is already set")),
            cell,
            init_failed: AtomicBool::new(false),
            tag_disabled: AtomicBool::new(false),
            parse_disabled: AtomicBool::new(false),
        }
    }

    fn analyzer(&self) -> Option<&dyn LinguisticAnalyzer> {
        if self.init_failed.load(Ordering::Acquire) {
            return None;
        }
        match self.cell.get_or_try_init(|| (self.factory)()) {
            Ok(boxed) => Some(boxed.as_ref()),
            Err(e) => {
                if !self.init_failed.swap(true, Ordering::AcqRel) {
                    log::warn!("linguistic analyzer unavailable, skipping analysis phases: {e}");
                }
                None
            }
        }
    }

    /// Morphological tags, or `None` when tagging is unavailable.
    pub fn tags(&self, text: &str) -> Option<Vec<LinguisticTag>> {
        if self.tag_disabled.load(Ordering::Acquire) {
            return None;
        }
        match self.analyzer()?.tag(text) {
            Ok(tags) => Some(tags),
            Err(e) => {
                if !self.tag_disabled.swap(true, Ordering::AcqRel) {
                    log::warn!("morphological tagging failed, disabling for this run: {e}");
                }
                None
            }
        }
    }

    /// Dependency edges, or `None` when parsing is unavailable.
    pub fn edges(&self, text: &str) -> Option<Vec<DependencyEdge>> {
        if self.parse_disabled.load(Ordering::Acquire) {
            return None;
        }
        match self.analyzer()?.parse(text) {
            Ok(edges) => Some(edges),
            Err(e) => {
                if !self.parse_disabled.swap(true, Ordering::AcqRel) {
                    log::warn!("dependency parsing failed, disabling for this run: {e}");
                }
                None
            }
        }
    }
}

impl std::fmt::Debug for LazyAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyAnalyzer")
            .field("loaded", &self.cell.get().is_some())
            .field("init_failed", &self.init_failed.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use titulus_core::{Error, Pos};

    struct FixedAnalyzer;

    impl LinguisticAnalyzer for FixedAnalyzer {
        fn tag(&self, _text: &str) -> Result<Vec<LinguisticTag>> {
            Ok(vec![LinguisticTag {
                start: 0,
                end: 1,
                pos: Pos::Noun,
                case: None,
                gender: None,
                number: None,
            }])
        }

        fn parse(&self, _text: &str) -> Result<Vec<DependencyEdge>> {
            Err(Error::adapter("no parser model"))
        }
    }

    #[test]
    fn preloaded_analyzer_tags() {
        let lazy = LazyAnalyzer::preloaded(FixedAnalyzer);
        assert_eq!(lazy.tags("X").map(|t| t.len()), Some(1));
    }

    #[test]
    fn call_failure_disables_only_that_operation() {
        let lazy = LazyAnalyzer::preloaded(FixedAnalyzer);
        assert!(lazy.edges("X").is_none());
        assert!(lazy.edges("X").is_none());
        // tagging still works after parse failure
        assert!(lazy.tags("X").is_some());
    }

    #[test]
    fn factory_runs_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = LazyAnalyzer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FixedAnalyzer) as Box<dyn LinguisticAnalyzer>)
        });
        lazy.tags("X");
        lazy.tags("X");
        lazy.edges("X");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn init_failure_pins_unavailable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = LazyAnalyzer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::adapter("model file missing"))
        });
        assert!(lazy.tags("X").is_none());
        assert!(lazy.tags("X").is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
