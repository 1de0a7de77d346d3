//! Attribute introspection for live objects.
//!
//! Rust has no runtime reflection, so every type that can sit on a path opts
//! in by implementing [`Reflect`]. Leaf types (numbers, text, lists) expose no
//! attributes; structs expose their fields through [`reflect_struct!`], which
//! builds the name-to-field table at compile time; `Value::Map` exposes its
//! keys.
//!
//! ## Design Notes
//!
//! - Lookup is by exact, case-sensitive name.
//! - `Value::Nil` and `Option::None` are *absent*: traversal stops on them.
//! - `assign` never partially writes: every entry of the incoming map is
//!   checked against its attribute before any field is touched.
//! - Structs built with [`reflect_struct!`] are replaced, not merged: keys the
//!   map omits reset to the field's default.

use std::any::Any;

use crate::value::{FromValue, Value};
use crate::ModkitError;

/// The attribute-access capability a path resolves against.
pub trait Reflect: Any {
    /// Type name used in diagnostics.
    fn shape(&self) -> &'static str;

    /// Public attribute names, in declaration order.
    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn attribute(&self, _name: &str) -> Option<&dyn Reflect> {
        None
    }

    fn attribute_mut(&mut self, _name: &str) -> Option<&mut dyn Reflect> {
        None
    }

    /// True when this slot holds no value.
    fn is_absent(&self) -> bool {
        false
    }

    /// Snapshot as a `Value`. Objects become maps of their attributes.
    fn to_value(&self) -> Value {
        Value::map(self.attribute_names().into_iter().filter_map(|name| {
            let value = self.attribute(&name)?.to_value();
            Some((name, value))
        }))
    }

    /// Verifies that `assign(value)` would succeed, without writing.
    ///
    /// The default accepts a `Map` whose keys are all attribute names and
    /// whose entries each pass their attribute's check.
    fn check(&self, value: &Value) -> Result<(), ModkitError> {
        let Value::Map(entries) = value else {
            return Err(ModkitError::type_mismatch(self.shape(), value.type_name()));
        };
        for (name, entry) in entries.iter() {
            let Some(slot) = self.attribute(name) else {
                return Err(ModkitError::type_mismatch(
                    self.shape(),
                    format!("Map with unknown attribute '{}'", name),
                ));
            };
            slot.check(entry)?;
        }
        Ok(())
    }

    /// Replaces this slot in place from `value`.
    ///
    /// The default writes each entry of a `Map` into the attribute of the
    /// same name and leaves the others alone.
    fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
        merge_attributes(self, value)
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Reflect {
    /// Borrows the concrete object if it is a `T`.
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Writes every entry of a `Map` into the attribute of the same name.
/// Nothing is written unless the whole map passes [`Reflect::check`].
pub fn merge_attributes<R: Reflect + ?Sized>(target: &mut R, value: Value) -> Result<(), ModkitError> {
    target.check(&value)?;
    let entries = match value {
        Value::Map(entries) => entries,
        other => return Err(ModkitError::type_mismatch(target.shape(), other.type_name())),
    };
    for (name, entry) in entries {
        if let Some(slot) = target.attribute_mut(&name) {
            slot.assign(entry)?;
        }
    }
    Ok(())
}

/// Like [`merge_attributes`], but attributes the map omits take their value
/// from `fresh`, so every attribute ends up replaced.
pub fn replace_attributes<R: Reflect + ?Sized>(
    target: &mut R,
    value: Value,
    fresh: &dyn Reflect,
) -> Result<(), ModkitError> {
    let mut entries = match value {
        Value::Map(entries) => entries,
        other => return Err(ModkitError::type_mismatch(target.shape(), other.type_name())),
    };
    for name in fresh.attribute_names() {
        if entries.contains_key(&name) {
            continue;
        }
        if let Some(default) = fresh.attribute(&name) {
            entries.insert(name, default.to_value());
        }
    }
    merge_attributes(target, Value::Map(entries))
}

// ============================================================================
// LEAF IMPLEMENTATIONS
// ============================================================================

macro_rules! reflect_leaf {
    ($($ty:ty => $shape:expr),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape(&self) -> &'static str {
                    $shape
                }

                fn to_value(&self) -> Value {
                    Value::from(self.clone())
                }

                fn check(&self, value: &Value) -> Result<(), ModkitError> {
                    <$ty as FromValue>::from_value(value.clone()).map(drop)
                }

                fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
                    *self = <$ty as FromValue>::from_value(value)?;
                    Ok(())
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

reflect_leaf! {
    bool => "bool",
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    f32 => "f32",
    f64 => "f64",
    String => "String",
}

// Above `i64::MAX` a u64 becomes a `Number`, which `u64::from_value` takes back.
impl Reflect for u64 {
    fn shape(&self) -> &'static str {
        "u64"
    }

    fn to_value(&self) -> Value {
        i64::try_from(*self).map_or(Value::Number(*self as f64), Value::Int)
    }

    fn check(&self, value: &Value) -> Result<(), ModkitError> {
        u64::from_value(value.clone()).map(drop)
    }

    fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
        *self = u64::from_value(value)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// CONTAINER IMPLEMENTATIONS
// ============================================================================

/// Map keys are attributes; the map itself is replaced wholesale on assign.
impl Reflect for Value {
    fn shape(&self) -> &'static str {
        self.type_name()
    }

    fn attribute_names(&self) -> Vec<String> {
        match self {
            Value::Map(map) => {
                let mut names: Vec<String> = map.keys().cloned().collect();
                names.sort();
                names
            }
            _ => Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&dyn Reflect> {
        match self {
            Value::Map(map) => map.get(name).map(|v| v as &dyn Reflect),
            _ => None,
        }
    }

    fn attribute_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        match self {
            Value::Map(map) => map.get_mut(name).map(|v| v as &mut dyn Reflect),
            _ => None,
        }
    }

    fn is_absent(&self) -> bool {
        self.is_nil()
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn check(&self, _value: &Value) -> Result<(), ModkitError> {
        Ok(())
    }

    fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
        *self = value;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Present options are transparent; `None` is absent.
impl<T: Reflect + FromValue> Reflect for Option<T> {
    fn shape(&self) -> &'static str {
        match self {
            Some(inner) => inner.shape(),
            None => "None",
        }
    }

    fn attribute_names(&self) -> Vec<String> {
        self.as_ref().map(T::attribute_names).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<&dyn Reflect> {
        self.as_ref()?.attribute(name)
    }

    fn attribute_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        self.as_mut()?.attribute_mut(name)
    }

    fn is_absent(&self) -> bool {
        self.as_ref().map_or(true, T::is_absent)
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Nil, T::to_value)
    }

    fn check(&self, value: &Value) -> Result<(), ModkitError> {
        match self {
            _ if value.is_nil() => Ok(()),
            Some(inner) => inner.check(value),
            None => T::from_value(value.clone()).map(drop),
        }
    }

    fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
        if value.is_nil() {
            *self = None;
            return Ok(());
        }
        if let Some(inner) = self.as_mut() {
            return inner.assign(value);
        }
        *self = Some(T::from_value(value)?);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        match self {
            Some(inner) => inner.as_any(),
            None => self,
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape(&self) -> &'static str {
        (**self).shape()
    }

    fn attribute_names(&self) -> Vec<String> {
        (**self).attribute_names()
    }

    fn attribute(&self, name: &str) -> Option<&dyn Reflect> {
        (**self).attribute(name)
    }

    fn attribute_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        (**self).attribute_mut(name)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn check(&self, value: &Value) -> Result<(), ModkitError> {
        (**self).check(value)
    }

    fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
        (**self).assign(value)
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }
}

/// Lists are leaves: elements are not addressable by name.
impl<T: Reflect + FromValue> Reflect for Vec<T> {
    fn shape(&self) -> &'static str {
        "Vec"
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn check(&self, value: &Value) -> Result<(), ModkitError> {
        Vec::<T>::from_value(value.clone()).map(drop)
    }

    fn assign(&mut self, value: Value) -> Result<(), ModkitError> {
        *self = Vec::<T>::from_value(value)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Implements [`Reflect`] for a struct by listing the fields to expose.
///
/// The listed fields become the type's public attributes; unlisted fields
/// stay invisible to paths and are never touched by assignment. Every listed
/// field must itself be `Reflect`, and the struct must implement `Default`:
/// assigning a map replaces every listed attribute, and keys the map omits
/// reset to the field's default.
///
/// ```rust
/// use modkit::reflect_struct;
/// use modkit::prelude::*;
///
/// #[derive(Default)]
/// struct Stats { hp: i64, secret: u8 }
/// reflect_struct!(Stats { hp });
///
/// let stats = Stats { hp: 12, secret: 0 };
/// assert_eq!(get_as::<i64>(&stats, "hp").unwrap(), 12);
/// assert!(get(&stats, "secret").is_none());
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn shape(&self) -> &'static str {
                stringify!($ty)
            }

            fn attribute_names(&self) -> Vec<String> {
                vec![$(stringify!($field).to_string()),*]
            }

            fn attribute(&self, name: &str) -> Option<&dyn $crate::reflect::Reflect> {
                match name {
                    $(stringify!($field) => Some(&self.$field as &dyn $crate::reflect::Reflect),)*
                    _ => None,
                }
            }

            fn attribute_mut(&mut self, name: &str) -> Option<&mut dyn $crate::reflect::Reflect> {
                match name {
                    $(stringify!($field) => Some(&mut self.$field as &mut dyn $crate::reflect::Reflect),)*
                    _ => None,
                }
            }

            fn assign(&mut self, value: $crate::value::Value) -> Result<(), $crate::ModkitError> {
                let fresh = <$ty as ::std::default::Default>::default();
                $crate::reflect::replace_attributes(self, value, &fresh)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl $crate::value::FromValue for $ty {
            fn expected() -> &'static str {
                stringify!($ty)
            }

            fn from_value(value: $crate::value::Value) -> Result<Self, $crate::ModkitError> {
                let mut object = <$ty as ::std::default::Default>::default();
                $crate::reflect::Reflect::assign(&mut object, value)?;
                Ok(object)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Weapon {
        name: String,
        damage: i64,
    }
    crate::reflect_struct!(Weapon { name, damage });

    #[test]
    fn test_struct_attributes_are_declared_fields() {
        let w = Weapon { name: "Longsword".into(), damage: 8 };
        assert_eq!(w.attribute_names(), vec!["name", "damage"]);
        assert!(w.attribute("Damage").is_none());
        assert_eq!(w.attribute("damage").unwrap().to_value(), Value::Int(8));
    }

    #[test]
    fn test_struct_to_value_is_attribute_map() {
        let w = Weapon { name: "Dagger".into(), damage: 4 };
        assert_eq!(
            w.to_value(),
            Value::map([("name", Value::from("Dagger")), ("damage", Value::Int(4))])
        );
    }

    #[test]
    fn test_struct_assign_rejects_unknown_keys_without_writing() {
        let mut w = Weapon { name: "Dagger".into(), damage: 4 };
        let err = w
            .assign(Value::map([("damage", Value::Int(9)), ("weight", Value::Int(1))]))
            .unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::TypeMismatch);
        assert_eq!(w.damage, 4);
    }

    #[test]
    fn test_struct_assign_replaces_omitted_attributes() {
        let mut w = Weapon { name: "Dagger".into(), damage: 4 };
        w.assign(Value::map([("damage", Value::Int(6))])).unwrap();
        assert_eq!(w, Weapon { name: String::new(), damage: 6 });
    }

    #[test]
    fn test_struct_assign_checks_every_field_first() {
        let mut w = Weapon { name: "Dagger".into(), damage: 4 };
        let bad = Value::map([("name", Value::from("Glaive")), ("damage", Value::from("high"))]);
        assert!(w.check(&bad).is_err());
        assert!(w.assign(bad).is_err());
        assert_eq!(w, Weapon { name: "Dagger".into(), damage: 4 });
    }

    #[test]
    fn test_leaf_assign_checks_type() {
        let mut hp: i64 = 3;
        assert!(hp.assign(Value::from("three")).is_err());
        assert_eq!(hp, 3);
        hp.assign(Value::Int(4)).unwrap();
        assert_eq!(hp, 4);
    }

    #[test]
    fn test_option_none_is_absent_and_assignable() {
        let mut slot: Option<i64> = None;
        assert!(slot.is_absent());
        slot.assign(Value::Int(2)).unwrap();
        assert_eq!(slot, Some(2));
        slot.assign(Value::Nil).unwrap();
        assert_eq!(slot, None);
    }

    #[test]
    fn test_downcast_ref_through_dyn() {
        let w = Weapon::default();
        let r: &dyn Reflect = &w;
        assert!(r.downcast_ref::<Weapon>().is_some());
        assert!(r.downcast_ref::<Value>().is_none());
    }
}
