//! Eager snapshots of the service's network and connection collections.

use std::ops::ControlFlow;

use crate::com::abi::Guid;
use crate::com::dispatch::Value;
use crate::com::enum_variant;
use crate::com::handle::ComPtr;
use crate::com::interface::{resolve_value, Interface};
use crate::error::{Error, Result};

use super::connection::Connection;
use super::network::Network;

/// A proxy type that the service hands out in collections.
pub trait Element: Interface {
    /// Name of the collection interface, for errors and logs.
    const COLLECTION: &'static str;
    const COLLECTION_IID: Guid;
}

/// An ordered, fully resolved snapshot of a collection.
///
/// Every element is resolved when the enumeration is built. A failure part
/// way through releases what was already built, so callers never see a
/// partial list.
pub struct Enumeration<T: Element> {
    items: Vec<T>,
}

pub type ConnectionEnumeration = Enumeration<Connection>;
pub type NetworkEnumeration = Enumeration<Network>;

impl<T: Element> Enumeration<T> {
    /// Build from the object carried by an automation result.
    pub fn from_value(value: Value) -> Result<Self> {
        let collection = match value {
            Value::Object(collection) => collection,
            Value::Null => return Err(Error::NullHandle { interface: T::COLLECTION, iid: T::COLLECTION_IID }),
            other => {
                return Err(Error::UnexpectedType {
                    member: T::COLLECTION,
                    expected: "VT_DISPATCH",
                    actual: other.type_name(),
                })
            }
        };
        Self::from_collection(&collection)
    }

    /// Build from a collection object; the caller keeps its reference.
    pub fn from_collection(unknown: &ComPtr) -> Result<Self> {
        let collection = unknown.query_interface(&T::COLLECTION_IID).map_err(|code| Error::Resolve {
            interface: T::COLLECTION,
            iid: T::COLLECTION_IID,
            code,
        })?;

        let mut items: Vec<T> = Vec::new();
        let walked = enum_variant::for_each(&collection, T::COLLECTION, |index, value| {
            let item = resolve_value::<T>(value).map_err(|source| Error::Enumeration {
                collection: T::COLLECTION,
                index,
                source: Box::new(source),
            })?;
            items.push(item);
            Ok(())
        });

        if let Err(err) = walked {
            tracing::warn!(collection = T::COLLECTION, built = items.len(), error = %err, "enumeration unwound");
            for item in &mut items {
                item.release();
            }
            return Err(err);
        }

        tracing::debug!(collection = T::COLLECTION, size = items.len(), "enumeration built");
        Ok(Self { items })
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Visit elements in order until the visitor breaks. Stopping early is
    /// not an error.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &T) -> ControlFlow<()>,
    {
        for (index, item) in self.items.iter().enumerate() {
            if visit(index, item).is_break() {
                break;
            }
        }
    }

    /// Visit elements in order, stopping at the first error.
    pub fn try_for_each<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &T) -> Result<()>,
    {
        self.items.iter().enumerate().try_for_each(|(index, item)| visit(index, item))
    }

    /// Release every element exactly once. Later calls do nothing.
    pub fn release(&mut self) {
        for mut item in self.items.drain(..) {
            item.release();
        }
    }
}

impl<'a, T: Element> IntoIterator for &'a Enumeration<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Element> IntoIterator for Enumeration<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl ConnectionEnumeration {
    /// The connection whose adapter matches `adapter_id`.
    ///
    /// Not found is `Ok(None)`; a connection whose adapter cannot be read
    /// fails the whole lookup.
    pub fn find_by_adapter_id(&self, adapter_id: &Guid) -> Result<Option<&Connection>> {
        for connection in &self.items {
            if connection.adapter_id()? == *adapter_id {
                return Ok(Some(connection));
            }
        }
        Ok(None)
    }
}

impl NetworkEnumeration {
    /// The network with identifier `network_id`.
    pub fn find_by_network_id(&self, network_id: &Guid) -> Result<Option<&Network>> {
        for network in &self.items {
            if network.network_id()? == *network_id {
                return Ok(Some(network));
            }
        }
        Ok(None)
    }
}
