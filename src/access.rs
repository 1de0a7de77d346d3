//! Dotted-path reads and writes over a live object graph.
//!
//! A path such as `"party.leader.hp"` is resolved one attribute at a time
//! starting from a root object. Resolution stops at the first segment that
//! does not name an attribute, or at the first absent value, and reports
//! *not found* as `None`. Only a typed access whose value does not fit the
//! requested type fails hard.
//!
//! ## Usage
//! ```rust
//! use modkit::prelude::*;
//!
//! let mut world = Value::from_json_str(r#"{"a": {"b": 5}}"#).unwrap();
//! assert_eq!(get_as::<i64>(&world, "a.b").unwrap(), 5);
//! assert_eq!(set(&mut world, "a.b", Value::Int(7)).unwrap(), Some(Value::Int(7)));
//! assert_eq!(get_as::<i64>(&world, "a.b").unwrap(), 7);
//! assert!(get(&world, "a.c").is_none());
//! ```

use tracing::{debug, trace};

use crate::config::AccessorConfig;
use crate::path::{Path, Segment};
use crate::reflect::Reflect;
use crate::value::{FromValue, Value};
use crate::{err_ctx, ModkitError};

/// Resolves paths with a fixed configuration. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct PathAccessor {
    config: AccessorConfig,
}

impl PathAccessor {
    pub fn new(config: AccessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    pub fn parse(&self, path: &str) -> Path {
        Path::parse_with(path, self.config.separator)
    }

    /// Walks `path` from `root` and returns the final attribute.
    ///
    /// `None` means not found: a segment named no attribute, or an
    /// intermediate value was absent. A found attribute may itself be absent
    /// (`Value::Nil`, `None`).
    pub fn get<'a>(&self, root: &'a dyn Reflect, path: &str) -> Option<&'a dyn Reflect> {
        let path = self.parse(path);
        let mut current = root;
        for segment in path.segments() {
            if current.is_absent() {
                self.miss(&path, segment, "absent value");
                return None;
            }
            let Some(next) = lookup(current, segment) else {
                self.miss(&path, segment, current.shape());
                return None;
            };
            current = next;
        }
        Some(current)
    }

    /// Typed [`get`](Self::get). Not found and absent both yield
    /// `T::default()`; a value that does not convert to `T` is a
    /// `TypeMismatch` anchored at the final segment.
    pub fn get_as<T: FromValue + Default>(
        &self,
        root: &dyn Reflect,
        path: &str,
    ) -> Result<T, ModkitError> {
        let Some(found) = self.get(root, path) else {
            return Ok(T::default());
        };
        if found.is_absent() {
            return Ok(T::default());
        }
        let parsed = self.parse(path);
        T::from_value(found.to_value()).map_err(|e| {
            debug!(path = %parsed, error = %e, "typed read rejected");
            e.at(parsed.source(), parsed.final_segment().span)
        })
    }

    /// Borrows the resolved object as its concrete type.
    ///
    /// Not found and absent yield `Ok(None)`; an object of another type is a
    /// `TypeMismatch`.
    pub fn get_ref<'a, T: Reflect>(
        &self,
        root: &'a dyn Reflect,
        path: &str,
    ) -> Result<Option<&'a T>, ModkitError> {
        let Some(found) = self.get(root, path) else {
            return Ok(None);
        };
        if found.is_absent() {
            return Ok(None);
        }
        match found.downcast_ref::<T>() {
            Some(typed) => Ok(Some(typed)),
            None => {
                let parsed = self.parse(path);
                Err(err_ctx!(
                    parsed,
                    parsed.final_segment(),
                    std::any::type_name::<T>(),
                    found.shape(),
                    "use get_as::<Value> to read it as a snapshot"
                ))
            }
        }
    }

    /// Assigns `value` to the final attribute of `path` and returns what
    /// the attribute holds afterwards, which is what a following
    /// [`get`](Self::get) sees.
    ///
    /// `Ok(None)` means not found, and nothing was written. An empty final
    /// segment (`"a.b."`) is rejected before any traversal. An attribute that
    /// cannot hold `value` fails with `TypeMismatch` and keeps its old value.
    pub fn set(
        &self,
        root: &mut dyn Reflect,
        path: &str,
        value: Value,
    ) -> Result<Option<Value>, ModkitError> {
        let path = self.parse(path);
        if path.final_segment().is_empty() {
            self.miss(&path, path.final_segment(), "empty final segment");
            return Ok(None);
        }

        let last = path.len() - 1;
        let mut current = root;
        for (i, segment) in path.segments().iter().enumerate() {
            if current.is_absent() {
                self.miss(&path, segment, "absent value");
                return Ok(None);
            }
            let shape = current.shape();
            let Some(slot) = lookup_mut(current, segment) else {
                self.miss(&path, segment, shape);
                return Ok(None);
            };
            if i == last {
                let expected = slot.shape();
                let actual = value.type_name();
                slot.assign(value).map_err(|e| {
                    debug!(path = %path, expected, actual, "write rejected");
                    e.at(path.source(), segment.span)
                        .with_help(format!("'{}' is a {}", segment.name, expected))
                })?;
                let written = slot.to_value();
                debug!(path = %path, value = %written, "attribute written");
                return Ok(Some(written));
            }
            current = slot;
        }
        Ok(None)
    }

    /// Typed [`set`](Self::set). Not found yields `T::default()`; otherwise
    /// the written value converted back to `T`.
    pub fn set_as<T>(&self, root: &mut dyn Reflect, path: &str, value: T) -> Result<T, ModkitError>
    where
        T: Into<Value> + FromValue + Default,
    {
        match self.set(root, path, value.into())? {
            Some(written) => T::from_value(written).map_err(|e| {
                let parsed = self.parse(path);
                e.at(parsed.source(), parsed.final_segment().span)
            }),
            None => Ok(T::default()),
        }
    }

    fn miss(&self, path: &Path, segment: &Segment, on: &str) {
        if self.config.log_misses {
            trace!(path = %path, segment = %segment.name, on, "path not found");
        }
    }
}

/// Empty names never resolve, whatever the object holds.
fn lookup<'a>(current: &'a dyn Reflect, segment: &Segment) -> Option<&'a dyn Reflect> {
    if segment.is_empty() {
        return None;
    }
    current.attribute(&segment.name)
}

fn lookup_mut<'a>(current: &'a mut dyn Reflect, segment: &Segment) -> Option<&'a mut dyn Reflect> {
    if segment.is_empty() {
        return None;
    }
    current.attribute_mut(&segment.name)
}

// ============================================================================
// FREE FUNCTIONS - default configuration
// ============================================================================

pub fn get<'a>(root: &'a dyn Reflect, path: &str) -> Option<&'a dyn Reflect> {
    PathAccessor::default().get(root, path)
}

pub fn get_as<T: FromValue + Default>(root: &dyn Reflect, path: &str) -> Result<T, ModkitError> {
    PathAccessor::default().get_as(root, path)
}

pub fn get_ref<'a, T: Reflect>(
    root: &'a dyn Reflect,
    path: &str,
) -> Result<Option<&'a T>, ModkitError> {
    PathAccessor::default().get_ref(root, path)
}

pub fn set(root: &mut dyn Reflect, path: &str, value: Value) -> Result<Option<Value>, ModkitError> {
    PathAccessor::default().set(root, path, value)
}

pub fn set_as<T>(root: &mut dyn Reflect, path: &str, value: T) -> Result<T, ModkitError>
where
    T: Into<Value> + FromValue + Default,
{
    PathAccessor::default().set_as(root, path, value)
}

// ============================================================================
// EXTENSION TRAIT - method syntax on any reflected object
// ============================================================================

/// Method-call form of the free functions.
pub trait PathExt: Reflect + Sized {
    fn get_path(&self, path: &str) -> Option<&dyn Reflect> {
        get(self, path)
    }

    fn get_path_as<T: FromValue + Default>(&self, path: &str) -> Result<T, ModkitError> {
        get_as(self, path)
    }

    fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Result<Option<Value>, ModkitError> {
        set(self, path, value.into())
    }

    fn set_path_as<T>(&mut self, path: &str, value: T) -> Result<T, ModkitError>
    where
        T: Into<Value> + FromValue + Default,
    {
        set_as(self, path, value)
    }
}

impl<R: Reflect> PathExt for R {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::from_json_str(r#"{"a": {"b": 5, "s": "text", "n": null}, "": 1}"#).unwrap()
    }

    #[test]
    fn test_get_resolves_nested_attribute() {
        let root = sample();
        assert_eq!(get(&root, "a.b").map(|v| v.to_value()), Some(Value::Int(5)));
    }

    #[test]
    fn test_empty_path_is_not_found_even_with_empty_key() {
        let root = sample();
        assert!(get(&root, "").is_none());
    }

    #[test]
    fn test_absent_root_short_circuits() {
        assert!(get(&Value::Nil, "a.b").is_none());
        assert!(get(&Value::Nil, "a").is_none());
    }

    #[test]
    fn test_found_absent_value_is_distinct_from_not_found() {
        let root = sample();
        let found = get(&root, "a.n").expect("attribute exists");
        assert!(found.is_absent());
        assert!(get(&root, "a.n.deeper").is_none());
    }

    #[test]
    fn test_get_as_defaults_on_miss_and_absent() {
        let root = sample();
        assert_eq!(get_as::<i64>(&root, "a.zzz").unwrap(), 0);
        assert_eq!(get_as::<i64>(&root, "a.n").unwrap(), 0);
        assert_eq!(get_as::<String>(&root, "a.s").unwrap(), "text");
    }

    #[test]
    fn test_get_as_type_mismatch_points_at_final_segment() {
        let root = sample();
        let err = get_as::<i64>(&root, "a.s").unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::TypeMismatch);
        let label = miette::Diagnostic::labels(&err)
            .expect("labels")
            .next()
            .expect("one label");
        assert_eq!(label.offset(), 2);
    }

    #[test]
    fn test_set_then_get() {
        let mut root = sample();
        assert_eq!(set(&mut root, "a.b", Value::Int(7)).unwrap(), Some(Value::Int(7)));
        assert_eq!(get_as::<i64>(&root, "a.b").unwrap(), 7);
    }

    #[test]
    fn test_set_missing_attribute_does_not_mutate() {
        let mut root = sample();
        let before = root.clone();
        assert_eq!(set(&mut root, "a.c", Value::Int(1)).unwrap(), None);
        assert_eq!(root, before);
    }

    #[test]
    fn test_set_empty_final_segment_is_not_found() {
        let mut root = sample();
        let before = root.clone();
        assert_eq!(set(&mut root, "a.b.", Value::Int(1)).unwrap(), None);
        assert_eq!(set(&mut root, "", Value::Int(1)).unwrap(), None);
        assert_eq!(root, before);
    }

    #[test]
    fn test_repeated_segment_name_writes_at_final_position() {
        let mut root = Value::from_json_str(r#"{"a": {"a": 1}}"#).unwrap();
        set(&mut root, "a.a", Value::Int(2)).unwrap();
        assert_eq!(get_as::<i64>(&root, "a.a").unwrap(), 2);
        assert_eq!(get(&root, "a").map(|v| v.shape()), Some("Map"));
    }

    #[test]
    fn test_custom_separator() {
        let accessor = PathAccessor::new(AccessorConfig {
            separator: '/',
            ..AccessorConfig::default()
        });
        let root = sample();
        assert_eq!(accessor.get_as::<i64>(&root, "a/b").unwrap(), 5);
        assert!(accessor.get(&root, "a.b").is_none());
    }

    #[test]
    fn test_set_as_defaults_on_miss() {
        let mut root = sample();
        assert_eq!(set_as(&mut root, "x.y", 9_i64).unwrap(), 0);
        assert_eq!(set_as(&mut root, "a.b", 9_i64).unwrap(), 9);
    }
}
