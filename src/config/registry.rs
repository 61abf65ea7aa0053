// Ordered, name-indexed registries with a longest-name-first lookup cache,
// rebuilt on mutation so the parser's "try names longest first" rule (spec
// §4.3) never sees a stale ordering.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub trait Named {
    fn name(&self) -> &str;
}

type ChangeCallback = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

pub struct ModifierRegistry<T> {
    entries: IndexMap<String, Rc<T>>,
    sorted_names: RefCell<Vec<String>>,
    dirty: Cell<bool>,
    on_change: ChangeCallback,
}

impl<T> Clone for ModifierRegistry<T> {
    /// A shallow copy: same `Rc<T>` entries, independent map and
    /// independent change notification, matching `Configuration::from`'s
    /// "idempotent cloning" contract (spec §8).
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            sorted_names: RefCell::new(self.sorted_names.borrow().clone()),
            dirty: Cell::new(self.dirty.get()),
            on_change: Rc::new(RefCell::new(None)),
        }
    }
}

impl<T: Named> ModifierRegistry<T> {
    pub fn new(on_change: ChangeCallback) -> Self {
        Self {
            entries: IndexMap::new(),
            sorted_names: RefCell::new(Vec::new()),
            dirty: Cell::new(true),
            on_change,
        }
    }

    fn notify(&self) {
        self.dirty.set(true);
        if let Some(cb) = self.on_change.borrow_mut().as_mut() {
            cb();
        }
    }

    /// Registers `entry` under its own name, overwriting any prior entry
    /// with that name. Returns the entry it replaced, if any — callers that
    /// must reject redefinition (the `.define-*` family) check `has` first
    /// and emit `NameAlreadyDefined` themselves rather than relying on this
    /// return value, matching spec §4.4's explicit collision check.
    pub fn add(&mut self, entry: Rc<T>) -> Option<Rc<T>> {
        let previous = self.entries.insert(entry.name().to_string(), entry);
        self.notify();
        previous
    }

    pub fn remove(&mut self, name: &str) -> Option<Rc<T>> {
        let removed = self.entries.shift_remove(name);
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Rc<T>> {
        self.entries.get(name).cloned()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Rc<T>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, longest first, so the parser's opener matching
    /// resolves `ab` before `a` whenever both are registered (spec §4.3,
    /// §8 "longest match").
    pub fn names_longest_first(&self) -> Vec<String> {
        if self.dirty.get() {
            let mut names: Vec<String> = self.entries.keys().cloned().collect();
            names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
            *self.sorted_names.borrow_mut() = names;
            self.dirty.set(false);
        }
        self.sorted_names.borrow().clone()
    }

    /// Finds the longest registered name that is a prefix of `text`.
    pub fn longest_match(&self, text: &str) -> Option<Rc<T>> {
        for name in self.names_longest_first() {
            if text.starts_with(&name) {
                return self.get(&name);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(String);
    impl Named for Fake {
        fn name(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn longest_name_wins_on_overlap() {
        let mut reg = ModifierRegistry::new(Rc::new(RefCell::new(None)));
        reg.add(Rc::new(Fake("em".into())));
        reg.add(Rc::new(Fake("emph".into())));
        let found = reg.longest_match("emphasis here").unwrap();
        assert_eq!(found.name(), "emph");
    }

    #[test]
    fn notify_fires_on_mutation() {
        let flag = Rc::new(Cell::new(false));
        let flag2 = Rc::clone(&flag);
        let cb: ChangeCallback = Rc::new(RefCell::new(Some(Box::new(move || flag2.set(true)))));
        let mut reg: ModifierRegistry<Fake> = ModifierRegistry::new(cb);
        reg.add(Rc::new(Fake("x".into())));
        assert!(flag.get());
    }
}
