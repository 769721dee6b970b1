//! [`Shaped`] implementations for standard library and `serde_json` types,
//! plus shapes inferred from JSON samples.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use super::{Shape, Shaped};

macro_rules! primitive {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Shaped for $ty {
                fn shape() -> Shape {
                    Shape::Primitive($name)
                }
            }
        )*
    };
}

primitive! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "String",
    str => "str",
}

impl Shaped for () {
    fn shape() -> Shape {
        Shape::Unit
    }
}

impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }
}

// Pointers are transparent: templates see through them.
impl<T: Shaped + ?Sized> Shaped for &T {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Shaped + ?Sized> Shaped for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Shaped + ?Sized> Shaped for Rc<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Shaped + ?Sized> Shaped for Arc<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Shaped + ToOwned + ?Sized> Shaped for Cow<'_, T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: Shaped> Shaped for [T] {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Shaped, const N: usize> Shaped for [T; N] {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Shaped> Shaped for VecDeque<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Shaped> Shaped for HashSet<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: Shaped> Shaped for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<K, V: Shaped> Shaped for HashMap<K, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }
}

impl<K, V: Shaped> Shaped for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }
}

impl Shaped for serde_json::Value {
    fn shape() -> Shape {
        Shape::Dynamic
    }
}

impl Shaped for serde_json::Map<String, serde_json::Value> {
    fn shape() -> Shape {
        Shape::Dynamic
    }
}

impl Shape {
    /// Describe a JSON sample as a record named `name`.
    ///
    /// Objects become records, arrays take the shape of their first element,
    /// and `null` becomes an optional whose content is unknown. A non-object
    /// root is returned as its own shape.
    pub fn from_json_sample(name: &str, value: &serde_json::Value) -> Shape {
        use serde_json::Value;

        match value {
            Value::Null => Shape::optional(Shape::Dynamic),
            Value::Bool(_) => Shape::Primitive("bool"),
            Value::Number(_) => Shape::Primitive("number"),
            Value::String(_) => Shape::Primitive("String"),
            Value::Array(items) => Shape::sequence(
                items.first().map_or(Shape::Dynamic, |first| Shape::from_json_sample(name, first)),
            ),
            Value::Object(fields) => fields
                .iter()
                .fold(Shape::record(name), |record, (key, value)| {
                    record.field(key.clone(), Shape::from_json_sample(key, value))
                })
                .build(),
        }
    }
}
