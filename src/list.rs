//! Multi-valued options, encoded as one comma-separated token.

use crate::error::ConversionError;
use crate::flagset::FlagValue;
use crate::registry::{Codec, Converter, Hints, TypeRegistry};

pub const SEPARATOR: char = ',';

/// An element type that can live inside a list option.
///
/// `Option<E>` elements are the nilable variant: `None` encodes as an empty
/// segment, and decoding always produces `Some`.
pub trait ListElement: Sized + 'static {
    /// The value the converter works on.
    type Item: 'static;

    fn codec(registry: &TypeRegistry) -> Option<Codec<Self::Item>>;

    fn from_item(item: Self::Item) -> Self;

    fn item(&self) -> Option<&Self::Item>;
}

impl<E: ListElement> ListElement for Option<E> {
    type Item = E::Item;

    fn codec(registry: &TypeRegistry) -> Option<Codec<Self::Item>> {
        E::codec(registry)
    }

    fn from_item(item: Self::Item) -> Self {
        Some(E::from_item(item))
    }

    fn item(&self) -> Option<&Self::Item> {
        self.as_ref().and_then(E::item)
    }
}

/// A container a list option writes into.
pub trait ListTarget {
    type Elem: ListElement;

    fn elements(&self) -> &[Self::Elem];

    /// Replace the contents with freshly decoded `items`.
    fn assign(&mut self, input: &str, items: Vec<Self::Elem>) -> Result<(), ConversionError>;
}

impl<E: ListElement> ListTarget for Vec<E> {
    type Elem = E;

    fn elements(&self) -> &[E] {
        self
    }

    fn assign(&mut self, _input: &str, items: Vec<E>) -> Result<(), ConversionError> {
        *self = items;
        Ok(())
    }
}

impl<E: ListElement, const N: usize> ListTarget for [E; N] {
    type Elem = E;

    fn elements(&self) -> &[E] {
        self
    }

    fn assign(&mut self, input: &str, items: Vec<E>) -> Result<(), ConversionError> {
        if items.len() != N {
            return Err(ConversionError::of::<[E; N]>(
                input,
                format!(
                    "expected {N} comma-separated values, got {}",
                    items.len()
                ),
            ));
        }
        for (slot, item) in self.iter_mut().zip(items) {
            *slot = item;
        }
        Ok(())
    }
}

pub fn encode<E: ListElement>(
    elements: &[E],
    codec: &dyn Converter<E::Item>,
    hints: &Hints,
) -> String {
    elements
        .iter()
        .map(|element| {
            element
                .item()
                .map(|item| codec.to_str(item, hints))
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR.to_string().as_str())
}

/// Decode every segment of `input`; fails on the first bad segment.
///
/// An empty `input` is the empty list, matching what [`encode`] renders for
/// no elements.
pub fn decode<E: ListElement>(
    input: &str,
    codec: &dyn Converter<E::Item>,
    hints: &Hints,
) -> Result<Vec<E>, ConversionError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(SEPARATOR)
        .map(|segment| codec.from_str(segment, hints).map(E::from_item))
        .collect()
}

/// A `Vec` or array field exposed as a single option.
pub struct ListValue<'a, L: ListTarget> {
    target: &'a mut L,
    codec: Codec<<L::Elem as ListElement>::Item>,
    hints: Hints,
}

impl<'a, L: ListTarget> ListValue<'a, L> {
    pub fn new(
        target: &'a mut L,
        codec: Codec<<L::Elem as ListElement>::Item>,
        hints: Hints,
    ) -> Self {
        Self {
            target,
            codec,
            hints,
        }
    }
}

impl<L: ListTarget> FlagValue for ListValue<'_, L> {
    fn render(&self) -> String {
        encode(self.target.elements(), self.codec.as_ref(), &self.hints)
    }

    fn set(&mut self, input: &str) -> Result<(), ConversionError> {
        let items = decode(input, self.codec.as_ref(), &self.hints)?;
        self.target.assign(input, items)
    }
}
