use std::collections::BTreeMap;

use foundation::{FeatureId, FeatureKind};

use crate::handle::EngineHandle;

/// The engine-native half of the view/analysis split.
///
/// Holds live engine handles keyed by `(kind, id)`, entirely outside any
/// serializable container. Handles never leave the registry by value; the
/// cross-layer queries hand out borrows only.
///
/// Ordering contract:
/// - `ids` and `unregister_all` visit records in ascending `(kind, id)`
///   order (`BTreeMap` traversal), so teardown is deterministic.
#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<(FeatureKind, FeatureId), Box<dyn EngineHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stores a handle for a feature.
    ///
    /// If the id is already registered, the previous handle is disposed
    /// before being replaced; a layer reload must not leak engine
    /// resources.
    pub fn register(
        &mut self,
        kind: FeatureKind,
        id: impl Into<FeatureId>,
        handle: Box<dyn EngineHandle>,
    ) {
        let key = (kind, id.into());
        if let Some(previous) = self.records.get_mut(&key) {
            previous.dispose();
        }
        self.records.insert(key, handle);
    }

    pub fn resolve(&self, kind: FeatureKind, id: &FeatureId) -> Option<&dyn EngineHandle> {
        self.records
            .get(&(kind, id.clone()))
            .map(|h| h.as_ref())
    }

    /// Mutable access for the scene-owning component, e.g. to push
    /// analysis-driven styling onto a rendered feature.
    pub fn resolve_mut(
        &mut self,
        kind: FeatureKind,
        id: &FeatureId,
    ) -> Option<&mut (dyn EngineHandle + 'static)> {
        self.records
            .get_mut(&(kind, id.clone()))
            .map(|h| h.as_mut())
    }

    pub fn contains(&self, kind: FeatureKind, id: &FeatureId) -> bool {
        self.records.contains_key(&(kind, id.clone()))
    }

    /// Registered ids of a kind, ascending.
    pub fn ids(&self, kind: FeatureKind) -> Vec<FeatureId> {
        self.records
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| id.clone())
            .collect()
    }

    /// Disposes and removes one record. Unknown ids are a no-op (`false`),
    /// so teardown paths can be retried safely.
    pub fn unregister(&mut self, kind: FeatureKind, id: &FeatureId) -> bool {
        let key = (kind, id.clone());
        let Some(handle) = self.records.get_mut(&key) else {
            return false;
        };
        handle.dispose();
        self.records.remove(&key);
        true
    }

    /// Disposes and removes every record of a kind, synchronously, in
    /// ascending id order. Returns the number of records removed.
    pub fn unregister_all(&mut self, kind: FeatureKind) -> usize {
        let ids = self.ids(kind);
        let mut removed = 0;
        for id in ids {
            if self.unregister(kind, &id) {
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::handle::EngineHandle;
    use foundation::FeatureKind;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct FakeHandle {
        name: &'static str,
        disposed: bool,
        dispose_log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl FakeHandle {
        fn boxed(
            name: &'static str,
            dispose_log: &Rc<RefCell<Vec<&'static str>>>,
        ) -> Box<dyn EngineHandle> {
            Box::new(FakeHandle {
                name,
                disposed: false,
                dispose_log: Rc::clone(dispose_log),
            })
        }
    }

    impl EngineHandle for FakeHandle {
        fn dispose(&mut self) {
            if !self.disposed {
                self.disposed = true;
                self.dispose_log.borrow_mut().push(self.name);
            }
        }

        fn is_disposed(&self) -> bool {
            self.disposed
        }

        fn plain_field(&self, name: &str) -> Option<Value> {
            (name == "name").then(|| json!(self.name))
        }
    }

    #[test]
    fn unregister_disposes_before_removal() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = Registry::new();
        registry.register(FeatureKind::Tree, "t1", FakeHandle::boxed("t1", &log));

        assert!(registry.unregister(FeatureKind::Tree, &"t1".into()));
        assert_eq!(*log.borrow(), vec!["t1"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_unknown_id_is_a_noop() {
        let mut registry = Registry::new();
        assert!(!registry.unregister(FeatureKind::Tree, &"ghost".into()));
    }

    #[test]
    fn unregister_all_disposes_each_handle_once_in_id_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = Registry::new();
        registry.register(FeatureKind::Tree, "t2", FakeHandle::boxed("t2", &log));
        registry.register(FeatureKind::Tree, "t1", FakeHandle::boxed("t1", &log));
        registry.register(FeatureKind::Building, "b1", FakeHandle::boxed("b1", &log));

        assert_eq!(registry.unregister_all(FeatureKind::Tree), 2);
        assert_eq!(*log.borrow(), vec!["t1", "t2"]);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(FeatureKind::Building, &"b1".into()));
    }

    #[test]
    fn resolve_mut_lets_the_scene_owner_mutate_a_live_handle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = Registry::new();
        registry.register(FeatureKind::Tree, "t1", FakeHandle::boxed("t1", &log));

        let handle = registry
            .resolve_mut(FeatureKind::Tree, &"t1".into())
            .unwrap();
        handle.dispose();

        let handle = registry.resolve(FeatureKind::Tree, &"t1".into()).unwrap();
        assert!(handle.is_disposed());
        assert!(registry.resolve_mut(FeatureKind::Building, &"t1".into()).is_none());
    }

    #[test]
    fn reregistering_an_id_disposes_the_previous_handle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = Registry::new();
        registry.register(FeatureKind::Tree, "t1", FakeHandle::boxed("old", &log));
        registry.register(FeatureKind::Tree, "t1", FakeHandle::boxed("new", &log));

        assert_eq!(*log.borrow(), vec!["old"]);
        let handle = registry.resolve(FeatureKind::Tree, &"t1".into()).unwrap();
        assert_eq!(handle.plain_field("name"), Some(json!("new")));
    }
}
