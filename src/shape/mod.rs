//! Structural descriptions of the data types templates are rendered with.
//!
//! A [`Shape`] describes what a template can reach through a value: the named
//! fields of a record, whether a value may be absent, and where the structure
//! stops (primitives, sequences, maps). The validator walks shapes instead of
//! live values, so a registry can reject a template that references a missing
//! field before the template is ever executed.
//!
//! Shapes are produced by the [`Shaped`] trait. It is implemented for the
//! standard scalar, collection and pointer types; record types describe
//! themselves with [`impl_shaped!`](crate::impl_shaped):
//!
//! ```rust
//! use templator::impl_shaped;
//! use templator::shape::{Shape, Shaped};
//!
//! struct Author {
//!     name: String,
//! }
//!
//! struct Page {
//!     title: String,
//!     author: Option<Author>,
//! }
//!
//! impl_shaped!(Author { name as "Name": String });
//! impl_shaped!(Page { title as "Title": String, author as "Author": Option<Author> });
//!
//! let shape = Page::shape();
//! assert!(shape.field("Title").is_some());
//! assert!(matches!(shape.field("Author"), Some(Shape::Optional(_))));
//! ```

mod impls;

use std::fmt;

/// Types that can describe their own structure.
pub trait Shaped {
    /// The structural description of `Self`.
    fn shape() -> Shape;
}

/// Structural description of a data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// No underlying type.
    Unit,
    /// A leaf value such as a string or number.
    Primitive(&'static str),
    /// A type with named fields.
    Record(RecordShape),
    /// A value that may be absent.
    Optional(Box<Shape>),
    /// A list-like collection.
    Sequence(Box<Shape>),
    /// A keyed collection.
    Map(Box<Shape>),
    /// A value whose structure is only known at runtime.
    Dynamic,
}

/// A record: a type name plus its named fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    name: String,
    fields: Vec<FieldShape>,
}

impl RecordShape {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    /// Look up a field by its exact name.
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One named field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    name: String,
    shape: Shape,
}

impl FieldShape {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        matches!(self.shape, Shape::Optional(_))
    }
}

impl Shape {
    /// Start describing a record named `name`.
    pub fn record(name: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            record: RecordShape {
                name: name.into(),
                fields: Vec::new(),
            },
        }
    }

    /// Wrap `inner` as a value that may be absent.
    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    pub fn map(value: Shape) -> Self {
        Shape::Map(Box::new(value))
    }

    /// Remove one level of optionality.
    pub fn unwrap_optional(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner,
            other => other,
        }
    }

    /// The record behind this shape, after removing one level of optionality.
    pub fn as_record(&self) -> Option<&RecordShape> {
        match self.unwrap_optional() {
            Shape::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Shape of the field `name`, if this shape is a record that has one.
    pub fn field(&self, name: &str) -> Option<&Shape> {
        self.as_record()?.field(name).map(FieldShape::shape)
    }

    /// Short name of the shape's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Unit => "unit",
            Shape::Primitive(_) => "primitive",
            Shape::Record(_) => "record",
            Shape::Optional(_) => "optional",
            Shape::Sequence(_) => "sequence",
            Shape::Map(_) => "map",
            Shape::Dynamic => "dynamic",
        }
    }

    /// Human-readable type name.
    pub fn type_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Unit => f.write_str("()"),
            Shape::Primitive(name) => f.write_str(name),
            Shape::Record(record) => f.write_str(&record.name),
            Shape::Optional(inner) => write!(f, "Option<{inner}>"),
            Shape::Sequence(inner) => write!(f, "[{inner}]"),
            Shape::Map(inner) => write!(f, "{{_: {inner}}}"),
            Shape::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Builder returned by [`Shape::record`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RecordBuilder {
    record: RecordShape,
}

impl RecordBuilder {
    /// Add a field. A later field with the same name replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        let name = name.into();
        self.record.fields.retain(|f| f.name != name);
        self.record.fields.push(FieldShape { name, shape });
        self
    }

    /// Add a field whose shape comes from `F`.
    pub fn field_of<F: Shaped + ?Sized>(self, name: impl Into<String>) -> Self {
        self.field(name, F::shape())
    }

    /// Merge the fields of another record, as `#[serde(flatten)]` does.
    ///
    /// Non-record shapes contribute nothing.
    pub fn flatten(mut self, other: &Shape) -> Self {
        if let Some(record) = other.as_record() {
            for field in &record.fields {
                self = self.field(field.name.clone(), field.shape.clone());
            }
        }
        self
    }

    pub fn build(self) -> Shape {
        Shape::Record(self.record)
    }
}

/// Implement [`Shaped`](crate::shape::Shaped) for a record type by listing its fields.
///
/// Each entry is `field: Type` or `field as "Name": Type` when the field is
/// serialized under another name. The listed fields are checked against the
/// struct at compile time.
///
/// ```rust
/// use templator::impl_shaped;
/// use templator::shape::Shaped;
///
/// struct Post {
///     title: String,
///     tags: Vec<String>,
/// }
///
/// impl_shaped!(Post { title as "Title": String, tags: Vec<String> });
///
/// let shape = Post::shape();
/// assert_eq!(shape.type_name(), "Post");
/// assert!(shape.field("Title").is_some());
/// assert!(shape.field("tags").is_some());
/// ```
#[macro_export]
macro_rules! impl_shaped {
    (@name $field:ident $rename:literal) => {
        $rename
    };
    (@name $field:ident) => {
        stringify!($field)
    };
    ($ty:ident { $( $field:ident $( as $rename:literal )? : $fty:ty ),* $(,)? }) => {
        impl $crate::shape::Shaped for $ty {
            fn shape() -> $crate::shape::Shape {
                #[allow(unused_variables)]
                let _check = |value: &$ty| {
                    $( let _ = &value.$field; )*
                };
                $crate::shape::Shape::record(stringify!($ty))
                    $( .field(
                        $crate::impl_shaped!(@name $field $( $rename )?),
                        <$fty as $crate::shape::Shaped>::shape(),
                    ) )*
                    .build()
            }
        }
    };
}
