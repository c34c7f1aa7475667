//! The struct walk: turns a [`Schema`] into live option bindings.
//!
//! Every field is visited once, in declaration order. Its [`Bindable`] impl
//! picks the binding kind statically; the walker then consults the registry
//! and installs storage that writes straight into the field.

use std::any::type_name;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use heck::ToKebabCase;
use serde::Serialize;

use crate::convert::TextCodec;
use crate::error::BindError;
use crate::flagset::FlagValue;
use crate::list::{ListElement, ListTarget, ListValue};
use crate::node::ParserNode;
use crate::registry::{Codec, Hints, TypeRegistry};
use crate::value::ScalarValue;

/// Computes an option name from `(parent, field_name, in_action)`.
///
/// `parent` is the logical name of the enclosing struct field (empty at the
/// root) and `in_action` is true when that enclosing field opened an action.
pub type RenameFn = fn(&str, &str, bool) -> String;

/// Kebab-cases the field name and prefixes it with the parent name, unless
/// the field sits at the root or directly inside an action.
pub fn default_renamer(parent: &str, name: &str, in_action: bool) -> String {
    let name = name.to_kebab_case();
    if parent.is_empty() || in_action {
        name
    } else {
        format!("{}-{}", parent.to_lowercase(), name)
    }
}

/// How a field ended up bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingKind {
    /// Registry converter.
    Scalar,
    /// `FromStr` + `Display` fallback.
    Text,
    List,
    Flattened,
    Action,
}

/// Per-field metadata, the equivalent of struct tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    /// Field name as declared; used for renaming and for the action chain.
    pub name: &'static str,
    /// Verbatim option name, bypassing the renamer.
    pub alias: Option<String>,
    pub usage: String,
    pub skip: bool,
    pub action: bool,
    pub hints: Hints,
}

impl Field {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn as_action(mut self) -> Self {
        self.action = true;
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key, value);
        self
    }

    /// Numeric base for integer fields: 2, 8, 10 or 16.
    pub fn with_base(self, base: u32) -> Self {
        self.with_hint("base", base.to_string())
    }

    /// strftime layout for timestamp fields.
    pub fn with_layout(self, layout: impl Into<String>) -> Self {
        self.with_hint("layout", layout)
    }
}

/// A field together with its resolved option name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub name: String,
    pub field: Field,
}

/// A struct whose fields become options.
///
/// ```
/// use flagtree::{BindError, Field, Schema, Walker};
///
/// #[derive(Default)]
/// struct Serve {
///     port: u16,
///     verbose: bool,
/// }
///
/// impl Schema for Serve {
///     fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
///         walker.field(Field::new("port").with_usage("listen port"), &mut self.port)?;
///         walker.field(Field::new("verbose").with_alias("v"), &mut self.verbose)
///     }
/// }
/// ```
pub trait Schema {
    /// Visit every field, in declaration order.
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError>;
}

/// Empty struct, handy for actions that carry no options.
impl Schema for () {
    fn walk<'a>(&'a mut self, _walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        Ok(())
    }
}

/// A field type the walker knows how to bind.
///
/// Implemented for every [`Schema`], for `Option<T>`, `Vec<E>` and `[E; N]`,
/// and for scalar types through [`impl_registered!`](crate::impl_registered)
/// and [`impl_text_codec!`](crate::impl_text_codec).
///
/// `Option<T>` needs `T: Default`, since `None` is filled in before the
/// field is bound. Types without a default, such as the `std::net`
/// addresses, are bound directly or wrapped in a newtype that has one:
///
/// ```compile_fail
/// use flagtree::{BindError, Field, Schema, Walker};
/// use std::net::Ipv4Addr;
///
/// struct Peer {
///     addr: Option<Ipv4Addr>,
/// }
///
/// impl Schema for Peer {
///     fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
///         walker.field(Field::new("addr"), &mut self.addr)
///     }
/// }
/// ```
pub trait Bindable {
    fn bind<'a>(
        &'a mut self,
        binding: FieldBinding,
        walker: &mut Walker<'_, 'a>,
    ) -> Result<(), BindError>;
}

impl<S: Schema> Bindable for S {
    fn bind<'a>(
        &'a mut self,
        binding: FieldBinding,
        walker: &mut Walker<'_, 'a>,
    ) -> Result<(), BindError> {
        walker.bind_struct(binding, self)
    }
}

/// `None` is replaced by `T::default()` before binding. List elements are
/// not bound this way, so `Vec<Option<Ipv4Addr>>` needs no default.
impl<T: Bindable + Default> Bindable for Option<T> {
    fn bind<'a>(
        &'a mut self,
        binding: FieldBinding,
        walker: &mut Walker<'_, 'a>,
    ) -> Result<(), BindError> {
        self.get_or_insert_with(T::default).bind(binding, walker)
    }
}

impl<E: ListElement> Bindable for Vec<E> {
    fn bind<'a>(
        &'a mut self,
        binding: FieldBinding,
        walker: &mut Walker<'_, 'a>,
    ) -> Result<(), BindError> {
        walker.bind_list(binding, self)
    }
}

impl<E: ListElement, const N: usize> Bindable for [E; N] {
    fn bind<'a>(
        &'a mut self,
        binding: FieldBinding,
        walker: &mut Walker<'_, 'a>,
    ) -> Result<(), BindError> {
        walker.bind_list(binding, self)
    }
}

/// Binds a type through its converter in the [`TypeRegistry`].
///
/// Implements [`Bindable`] and [`ListElement`]. Binding fails with
/// [`BindError::Unregistered`] when the registry in use has no converter for
/// the type.
#[macro_export]
macro_rules! impl_registered {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Bindable for $ty {
            fn bind<'a>(
                &'a mut self,
                binding: $crate::FieldBinding,
                walker: &mut $crate::Walker<'_, 'a>,
            ) -> ::std::result::Result<(), $crate::BindError> {
                walker.bind_registered(binding, self)
            }
        }

        impl $crate::ListElement for $ty {
            type Item = $ty;

            fn codec(registry: &$crate::TypeRegistry) -> ::std::option::Option<$crate::Codec<$ty>> {
                registry.lookup::<$ty>()
            }

            fn from_item(item: $ty) -> Self {
                item
            }

            fn item(&self) -> ::std::option::Option<&$ty> {
                ::std::option::Option::Some(self)
            }
        }
    )+};
}

/// Binds a `FromStr + Display` type, preferring a registered converter.
///
/// Implements [`Bindable`] and [`ListElement`].
#[macro_export]
macro_rules! impl_text_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Bindable for $ty {
            fn bind<'a>(
                &'a mut self,
                binding: $crate::FieldBinding,
                walker: &mut $crate::Walker<'_, 'a>,
            ) -> ::std::result::Result<(), $crate::BindError> {
                walker.bind_text(binding, self)
            }
        }

        impl $crate::ListElement for $ty {
            type Item = $ty;

            fn codec(registry: &$crate::TypeRegistry) -> ::std::option::Option<$crate::Codec<$ty>> {
                registry.lookup::<$ty>().or_else(|| {
                    let codec: $crate::Codec<$ty> =
                        ::std::sync::Arc::new($crate::TextCodec::<$ty>::new());
                    ::std::option::Option::Some(codec)
                })
            }

            fn from_item(item: $ty) -> Self {
                item
            }

            fn item(&self) -> ::std::option::Option<&$ty> {
                ::std::option::Option::Some(self)
            }
        }
    )+};
}

crate::impl_registered!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    String,
    std::time::Duration,
    chrono::TimeDelta,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDateTime,
);

crate::impl_text_codec!(
    std::net::IpAddr,
    std::net::Ipv4Addr,
    std::net::Ipv6Addr,
    std::net::SocketAddr,
);

/// Cursor over one scope of the walk.
///
/// Holds the node options are defined on, the name prefix of the enclosing
/// field and whether that field opened an action.
pub struct Walker<'w, 'a> {
    node: &'w mut ParserNode<'a>,
    registry: &'w TypeRegistry,
    renamer: RenameFn,
    prefix: String,
    in_action: bool,
}

impl<'w, 'a> Walker<'w, 'a> {
    pub(crate) fn root(
        node: &'w mut ParserNode<'a>,
        registry: &'w TypeRegistry,
        renamer: RenameFn,
    ) -> Self {
        Self {
            node,
            registry,
            renamer,
            prefix: String::new(),
            in_action: false,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    /// Logical name `field` would get in this scope.
    pub fn option_name(&self, field: &Field) -> String {
        match &field.alias {
            Some(alias) => alias.clone(),
            None => (self.renamer)(&self.prefix, field.name, self.in_action),
        }
    }

    /// Bind one field. Skipped fields are ignored.
    pub fn field<T: Bindable + ?Sized>(
        &mut self,
        field: Field,
        slot: &'a mut T,
    ) -> Result<(), BindError> {
        if field.skip {
            return Ok(());
        }
        let name = self.option_name(&field);
        slot.bind(FieldBinding { name, field }, self)
    }

    pub fn bind_registered<T: 'static>(
        &mut self,
        binding: FieldBinding,
        slot: &'a mut T,
    ) -> Result<(), BindError> {
        let codec = self
            .registry
            .lookup::<T>()
            .ok_or(BindError::Unregistered {
                type_name: type_name::<T>(),
            })?;
        self.install_scalar(binding, BindingKind::Scalar, slot, codec)
    }

    pub fn bind_text<T>(&mut self, binding: FieldBinding, slot: &'a mut T) -> Result<(), BindError>
    where
        T: FromStr + Display + 'static,
        T::Err: Display,
    {
        match self.registry.lookup::<T>() {
            Some(codec) => self.install_scalar(binding, BindingKind::Scalar, slot, codec),
            None => {
                let codec: Codec<T> = Arc::new(TextCodec::<T>::new());
                self.install_scalar(binding, BindingKind::Text, slot, codec)
            }
        }
    }

    pub fn bind_list<L: ListTarget>(
        &mut self,
        binding: FieldBinding,
        target: &'a mut L,
    ) -> Result<(), BindError> {
        let Some(codec) = <L::Elem as ListElement>::codec(self.registry) else {
            return Err(BindError::UnsupportedElement {
                field: binding.name,
                element: type_name::<L::Elem>(),
            });
        };
        let FieldBinding { name, field } = binding;
        codec
            .check_hints(&field.hints)
            .map_err(|source| BindError::InvalidHint {
                field: name.clone(),
                source,
            })?;
        let value = ListValue::new(target, codec, field.hints);
        self.define(name, field.usage, BindingKind::List, Box::new(value))
    }

    /// Action fields open a child node; other structs flatten into this one
    /// under the field's name.
    pub fn bind_struct<S: Schema + ?Sized>(
        &mut self,
        binding: FieldBinding,
        schema: &'a mut S,
    ) -> Result<(), BindError> {
        let FieldBinding { name, field } = binding;
        if field.action {
            let child = self.node.add_action(name.clone(), field.name, field.usage)?;
            tracing::debug!(action = %name, field = field.name, "created action");
            let mut walker = Walker {
                node: child,
                registry: self.registry,
                renamer: self.renamer,
                prefix: name,
                in_action: true,
            };
            schema.walk(&mut walker)
        } else {
            tracing::trace!(prefix = %name, kind = ?BindingKind::Flattened, "flattening struct");
            let mut walker = Walker {
                node: &mut *self.node,
                registry: self.registry,
                renamer: self.renamer,
                prefix: name,
                in_action: false,
            };
            schema.walk(&mut walker)
        }
    }

    fn install_scalar<T: 'static>(
        &mut self,
        binding: FieldBinding,
        kind: BindingKind,
        slot: &'a mut T,
        codec: Codec<T>,
    ) -> Result<(), BindError> {
        let FieldBinding { name, field } = binding;
        codec
            .check_hints(&field.hints)
            .map_err(|source| BindError::InvalidHint {
                field: name.clone(),
                source,
            })?;
        let value = ScalarValue::new(slot, codec, field.hints);
        self.define(name, field.usage, kind, Box::new(value))
    }

    fn define(
        &mut self,
        name: String,
        usage: String,
        kind: BindingKind,
        value: Box<dyn FlagValue + 'a>,
    ) -> Result<(), BindError> {
        tracing::debug!(option = %name, ?kind, node = self.node.name(), "bound option");
        self.node.flags_mut().define(name, usage, kind, value)
    }
}
