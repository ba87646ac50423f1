//! Toggle a source between a discarding sink and a display branch.

use super::{block_and_run, src_pad};
use crate::error::{Error, Result};
use crate::pipeline::builder::{Staged, link, link_many, remove_element, set_async, sync_with_parent};
use gst::prelude::*;
use std::sync::{Arc, Mutex};

/// Which branch is currently fed by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// `source ! fakesink`
    Fake,
    /// `source ! videoconvert ! <video sink>`
    Display,
}

enum Branch {
    Fake {
        sink: gst::Element,
    },
    Display {
        convert: gst::Element,
        sink: gst::Element,
    },
}

impl Branch {
    fn kind(&self) -> BranchKind {
        match self {
            Branch::Fake { .. } => BranchKind::Fake,
            Branch::Display { .. } => BranchKind::Display,
        }
    }

    /// Sink first, so the converter never pushes into a removed sink.
    fn elements(&self) -> Vec<&gst::Element> {
        match self {
            Branch::Fake { sink } => vec![sink],
            Branch::Display { convert, sink } => vec![sink, convert],
        }
    }

    /// Remove every element of the branch that is still in `pipeline`.
    fn remove(&self, pipeline: &gst::Pipeline) -> Result<()> {
        for element in self.elements() {
            if element.parent().is_some() {
                remove_element(pipeline, element)?;
            }
        }
        Ok(())
    }
}

struct Inner {
    pipeline: gst::Pipeline,
    source: gst::Element,
    video_sink: String,
    branch: Mutex<Branch>,
}

/// Switches a running source between `fakesink` and a display branch.
///
/// Cloning is cheap; clones share the same branch state so one can be
/// moved into a probe callback while another stays with the caller.
#[derive(Clone)]
pub struct SinkSwitcher {
    inner: Arc<Inner>,
}

impl SinkSwitcher {
    /// Attach a `fakesink` branch to `source` inside `pipeline`.
    ///
    /// `video_sink` is the factory used for the display branch.
    pub fn new(
        pipeline: &gst::Pipeline,
        source: &gst::Element,
        video_sink: impl Into<String>,
    ) -> Result<Self> {
        let branch = build_fake(pipeline, source)?;
        Ok(Self {
            inner: Arc::new(Inner {
                pipeline: pipeline.clone(),
                source: source.clone(),
                video_sink: video_sink.into(),
                branch: Mutex::new(branch),
            }),
        })
    }

    /// Branch currently linked to the source.
    pub fn current(&self) -> BranchKind {
        match self.inner.branch.lock() {
            Ok(branch) => branch.kind(),
            Err(poisoned) => poisoned.into_inner().kind(),
        }
    }

    /// Swap branches immediately.
    ///
    /// Only safe while no data flows into the branch, i.e. before the
    /// pipeline runs or from a blocking probe. Use [`Self::request_toggle`]
    /// on a running pipeline.
    ///
    /// If the new branch cannot be built, for instance because the video
    /// sink is not installed, the source is re-linked to a fresh `fakesink`
    /// and the error is returned.
    pub fn toggle(&self) -> Result<BranchKind> {
        let inner = &self.inner;
        let mut branch = inner
            .branch
            .lock()
            .map_err(|_| Error::command("switch state poisoned"))?;
        let built = branch.remove(&inner.pipeline).and_then(|()| match branch.kind() {
            BranchKind::Fake => build_display(&inner.pipeline, &inner.source, &inner.video_sink),
            BranchKind::Display => build_fake(&inner.pipeline, &inner.source),
        });
        match built {
            Ok(next) => {
                *branch = next;
                tracing::info!("switched to {:?}", branch.kind());
                Ok(branch.kind())
            }
            Err(e) => {
                tracing::warn!("switch failed, falling back to fakesink: {}", e);
                branch.remove(&inner.pipeline)?;
                *branch = build_fake(&inner.pipeline, &inner.source)?;
                Err(e)
            }
        }
    }

    /// Block the source pad and toggle branches once it is blocked.
    pub fn request_toggle(&self) -> Result<()> {
        let pad = src_pad(&self.inner.source)?;
        let this = self.clone();
        block_and_run(&pad, move || this.toggle().map(|_| ()));
        Ok(())
    }
}

fn build_fake(pipeline: &gst::Pipeline, source: &gst::Element) -> Result<Branch> {
    let mut staged = Staged::new(pipeline);
    let sink = staged.add("fakesink")?;
    set_async(&sink, false);
    link(source, &sink)?;
    sync_with_parent(&[&sink])?;
    staged.commit();
    Ok(Branch::Fake { sink })
}

fn build_display(pipeline: &gst::Pipeline, source: &gst::Element, video_sink: &str) -> Result<Branch> {
    let mut staged = Staged::new(pipeline);
    let convert = staged.add("videoconvert")?;
    let sink = staged.add(video_sink)?;
    set_async(&sink, false);
    link_many(&[source, &convert, &sink])?;
    sync_with_parent(&[&sink, &convert])?;
    staged.commit();
    Ok(Branch::Display { convert, sink })
}
