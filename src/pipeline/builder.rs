//! Element creation and linking helpers.
//!
//! Thin wrappers over the engine's factory and linking API that turn the
//! boolean/`BoolError` style results into [`Error`] values naming the
//! elements involved.

use crate::error::{Error, Result};
use gst::prelude::*;

/// Create an element from `factory` and add it to `bin`.
pub fn add_new_element(bin: &impl IsA<gst::Bin>, factory: &str) -> Result<gst::Element> {
    let element = gst::ElementFactory::make(factory)
        .build()
        .map_err(|_| Error::ElementCreate {
            factory: factory.to_string(),
        })?;
    bin.upcast_ref::<gst::Bin>().add(&element).map_err(|e| Error::Bin {
        element: element.name().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!("added {} ({})", element.name(), factory);
    Ok(element)
}

/// Create an element from `factory`, add it to `bin` and cast it to `T`.
///
/// Used for elements with a typed binding, such as `appsrc` and `appsink`.
pub fn add_new_typed<T: IsA<gst::Element>>(bin: &impl IsA<gst::Bin>, factory: &str) -> Result<T> {
    let element = add_new_element(bin, factory)?;
    element.downcast::<T>().map_err(|element| Error::ElementCreate {
        factory: format!("{factory} (unexpected type {})", element.type_().name()),
    })
}

/// Link the default pads of `src` and `sink`.
pub fn link(src: &gst::Element, sink: &gst::Element) -> Result<()> {
    src.link(sink).map_err(|_| link_error(src, sink))?;
    tracing::debug!("linked {} -> {}", src.name(), sink.name());
    Ok(())
}

/// Link `src` to `sink`, restricting the connection to `caps`.
pub fn link_filtered(src: &gst::Element, sink: &gst::Element, caps: &gst::Caps) -> Result<()> {
    src.link_filtered(sink, caps)
        .map_err(|_| link_error(src, sink))?;
    tracing::debug!("linked {} -> {} with {}", src.name(), sink.name(), caps);
    Ok(())
}

/// Link a chain of elements in order.
pub fn link_many(elements: &[&gst::Element]) -> Result<()> {
    for pair in elements.windows(2) {
        link(pair[0], pair[1])?;
    }
    Ok(())
}

/// Shut an element down and remove it from `bin`.
///
/// The element is moved to NULL first so it releases its resources before
/// leaving the bin.
pub fn remove_element(bin: &impl IsA<gst::Bin>, element: &gst::Element) -> Result<()> {
    set_state(element, gst::State::Null)?;
    bin.upcast_ref::<gst::Bin>().remove(element).map_err(|e| Error::Bin {
        element: element.name().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!("removed {}", element.name());
    Ok(())
}

/// Elements added to a bin as one unit.
///
/// Unless [`Staged::commit`] is called, dropping the value removes every
/// element it added again, newest first. A partially built branch therefore
/// never stays behind in the bin when a later step fails.
pub struct Staged<'a> {
    bin: &'a gst::Bin,
    elements: Vec<gst::Element>,
}

impl<'a> Staged<'a> {
    /// Start staging elements into `bin`.
    pub fn new(bin: &'a impl IsA<gst::Bin>) -> Self {
        Self {
            bin: bin.upcast_ref::<gst::Bin>(),
            elements: Vec::new(),
        }
    }

    /// Like [`add_new_element`], but tracked by this stage.
    pub fn add(&mut self, factory: &str) -> Result<gst::Element> {
        let element = add_new_element(self.bin, factory)?;
        self.elements.push(element.clone());
        Ok(element)
    }

    /// Keep the staged elements in the bin.
    pub fn commit(mut self) {
        self.elements.clear();
    }
}

impl Drop for Staged<'_> {
    fn drop(&mut self) {
        while let Some(element) = self.elements.pop() {
            if let Err(e) = remove_element(self.bin, &element) {
                tracing::warn!("failed to discard {}: {}", element.name(), e);
            }
        }
    }
}

/// Bring each element to the state of its parent bin.
pub fn sync_with_parent(elements: &[&gst::Element]) -> Result<()> {
    for element in elements {
        element.sync_state_with_parent().map_err(|_| Error::StateChange {
            element: element.name().to_string(),
            state: element
                .parent()
                .and_then(|p| p.downcast::<gst::Element>().ok())
                .map(|p| p.current_state())
                .unwrap_or(gst::State::VoidPending),
        })?;
    }
    Ok(())
}

/// Request a state change, naming the element on failure.
pub fn set_state(
    element: &impl IsA<gst::Element>,
    state: gst::State,
) -> Result<gst::StateChangeSuccess> {
    element
        .upcast_ref::<gst::Element>()
        .set_state(state)
        .map_err(|_| Error::StateChange {
            element: element.upcast_ref::<gst::Element>().name().to_string(),
            state,
        })
}

/// Mark a source as live (`is-live=true`).
pub fn set_live(element: &gst::Element) {
    set_bool_property(element, "is-live", true);
}

/// Set the `async` property of a sink.
///
/// Sinks with `async=false` do not wait for preroll, so state changes of a
/// live pipeline complete immediately.
pub fn set_async(element: &gst::Element, value: bool) {
    set_bool_property(element, "async", value);
}

/// Set the `sync` property of a sink.
pub fn set_sync(element: &gst::Element, value: bool) {
    set_bool_property(element, "sync", value);
}

/// Set a boolean property if the element has it.
///
/// Auto-plugging bins such as `autovideosink` do not expose every base sink
/// property, so a missing property is skipped rather than treated as fatal.
pub fn set_bool_property(element: &gst::Element, name: &str, value: bool) {
    if element.find_property(name).is_some() {
        element.set_property(name, value);
    } else {
        tracing::debug!("{} has no property '{}'", element.name(), name);
    }
}

fn link_error(src: &gst::Element, sink: &gst::Element) -> Error {
    Error::Link {
        src: src.name().to_string(),
        sink: sink.name().to_string(),
    }
}
