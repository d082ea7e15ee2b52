//! Named-field suite context.
//!
//! Every suite run creates one context value and hands it by `&mut` to each of
//! its hooks and tests, in order.
//! Any [`Default`] type works as context.
//! [`Fixtures`] is the untyped choice, a bag of named values of any type.

use std::{
    any::Any,
    borrow::Cow,
    collections::HashMap,
    fmt::{self, Debug},
};

#[derive(Default)]
pub struct Fixtures(HashMap<Cow<'static, str>, Box<dyn Any>>);

impl Fixtures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing whatever was stored before.
    pub fn set<T: Any>(&mut self, name: impl Into<Cow<'static, str>>, value: T) {
        self.0.insert(name.into(), Box::new(value));
    }

    /// Get the value stored under `name` if it has type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.0.get(name)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, name: &str) -> Option<&mut T> {
        self.0.get_mut(name)?.downcast_mut()
    }

    /// Get the value under `name`, inserting `T::default()` first if there is
    /// no value of type `T`.
    pub fn entry<T: Any + Default>(&mut self, name: impl Into<Cow<'static, str>>) -> &mut T {
        let slot = self
            .0
            .entry(name.into())
            .or_insert_with(|| Box::new(T::default()));
        if !slot.is::<T>() {
            *slot = Box::new(T::default());
        }

        slot.downcast_mut()
            .expect("slot holds a T after the type check")
    }

    /// Increment the counter under `name` and return the new count.
    pub fn incr(&mut self, name: impl Into<Cow<'static, str>>) -> usize {
        let count = self.entry::<usize>(name);
        *count += 1;
        *count
    }

    /// The counter under `name`, `0` if it was never incremented.
    pub fn count(&self, name: &str) -> usize {
        self.get::<usize>(name).copied().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove<T: Any>(&mut self, name: &str) -> Option<T> {
        let value = self.0.remove(name)?;
        value.downcast().ok().map(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Fixtures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_tuple("Fixtures").field(&names).finish()
    }
}
