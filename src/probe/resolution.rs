//! Change output size and frame rate of a running video source.

use super::{block_and_run, src_pad};
use crate::caps::{framerate_caps, raw_video_caps, set_caps};
use crate::error::{Error, Result};
use crate::pipeline::builder::{Staged, link, link_filtered, remove_element, sync_with_parent};
use gst::prelude::*;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Caps forced on the source before rate and size conversion.
pub const SOURCE_CAPS: &str = "video/x-raw,format=RGBA,width=1280,height=720,framerate=30/1";

/// Target frame size and rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frames per second.
    pub framerate: u32,
}

impl Resolution {
    /// Create a resolution.
    pub const fn new(width: u32, height: u32, framerate: u32) -> Self {
        Self {
            width,
            height,
            framerate,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720, 30)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.framerate)
    }
}

/// Parses `"W H FPS"`.
///
/// Each field must be positive and fit a caps integer.
impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [w, h, fps] = fields.as_slice() else {
            return Err(Error::command(format!(
                "expected 'WIDTH HEIGHT FRAMERATE', got {} fields",
                fields.len()
            )));
        };
        let parse = |name: &str, v: &str| -> Result<u32> {
            match v.parse::<u32>() {
                Ok(n) if n > 0 && i32::try_from(n).is_ok() => Ok(n),
                _ => Err(Error::command(format!("invalid {name} '{v}'"))),
            }
        };
        Ok(Self::new(
            parse("width", w)?,
            parse("height", h)?,
            parse("framerate", fps)?,
        ))
    }
}

/// The elements between source and sink, in link order.
struct Chain {
    capsfilter_in: gst::Element,
    videorate: gst::Element,
    videoscale: gst::Element,
    capsfilter_out: gst::Element,
}

impl Chain {
    /// Remove whatever part of the chain is still in `pipeline`, sink side
    /// first.
    fn remove(&self, pipeline: &gst::Pipeline) -> Result<()> {
        for element in [
            &self.capsfilter_out,
            &self.videoscale,
            &self.videorate,
            &self.capsfilter_in,
        ] {
            if element.parent().is_some() {
                remove_element(pipeline, element)?;
            }
        }
        Ok(())
    }
}

struct State {
    resolution: Resolution,
    chain: Option<Chain>,
}

struct Inner {
    pipeline: gst::Pipeline,
    source: gst::Element,
    sink: gst::Element,
    state: Mutex<State>,
}

impl Inner {
    fn build_chain(&self, resolution: Resolution) -> Result<Chain> {
        let mut staged = Staged::new(&self.pipeline);
        let chain = Chain {
            capsfilter_in: staged.add("capsfilter")?,
            videorate: staged.add("videorate")?,
            videoscale: staged.add("videoscale")?,
            capsfilter_out: staged.add("capsfilter")?,
        };

        set_caps(&chain.capsfilter_in, SOURCE_CAPS)?;
        chain
            .capsfilter_out
            .set_property("caps", raw_video_caps(resolution.width, resolution.height)?);
        let framerate = framerate_caps(resolution.framerate)?;

        tracing::debug!("linking chain for {}", resolution);
        link(&self.source, &chain.capsfilter_in)?;
        link(&chain.capsfilter_in, &chain.videorate)?;
        link_filtered(&chain.videorate, &chain.videoscale, &framerate)?;
        link(&chain.videoscale, &chain.capsfilter_out)?;
        link(&chain.capsfilter_out, &self.sink)?;
        sync_with_parent(&[
            &chain.capsfilter_in,
            &chain.videoscale,
            &chain.videorate,
            &chain.capsfilter_out,
        ])?;

        staged.commit();
        Ok(chain)
    }
}

/// Rebuilds `capsfilter ! videorate ! videoscale ! capsfilter` between a
/// source and a sink whenever a new [`Resolution`] is requested.
#[derive(Clone)]
pub struct ResolutionChanger {
    inner: Arc<Inner>,
}

impl ResolutionChanger {
    /// Build the initial chain between `source` and `sink`.
    pub fn new(
        pipeline: &gst::Pipeline,
        source: &gst::Element,
        sink: &gst::Element,
        initial: Resolution,
    ) -> Result<Self> {
        let mut inner = Inner {
            pipeline: pipeline.clone(),
            source: source.clone(),
            sink: sink.clone(),
            state: Mutex::new(State {
                resolution: initial,
                chain: None,
            }),
        };
        let chain = inner.build_chain(initial)?;
        tracing::info!("configured {}", initial);
        inner.state = Mutex::new(State {
            resolution: initial,
            chain: Some(chain),
        });
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Resolution of the current chain.
    pub fn resolution(&self) -> Resolution {
        match self.inner.state.lock() {
            Ok(state) => state.resolution,
            Err(poisoned) => poisoned.into_inner().resolution,
        }
    }

    /// Replace the chain immediately.
    ///
    /// Only safe while no data flows, see [`Self::request`] for running
    /// pipelines. If the new chain cannot be built the previous resolution
    /// is rebuilt and the error returned.
    pub fn reconfigure(&self, resolution: Resolution) -> Result<()> {
        let inner = &self.inner;
        let mut state = inner
            .state
            .lock()
            .map_err(|_| Error::command("resolution state poisoned"))?;

        if let Some(old) = state.chain.take() {
            old.remove(&inner.pipeline)?;
        }

        match inner.build_chain(resolution) {
            Ok(chain) => {
                state.chain = Some(chain);
                state.resolution = resolution;
                tracing::info!("configured {}", resolution);
                Ok(())
            }
            Err(e) => {
                let previous = state.resolution;
                tracing::warn!("{} failed, restoring {}: {}", resolution, previous, e);
                state.chain = Some(inner.build_chain(previous)?);
                Err(e)
            }
        }
    }

    /// Block the source pad and rebuild the chain for `resolution` once it
    /// is blocked.
    pub fn request(&self, resolution: Resolution) -> Result<()> {
        tracing::info!("changing to {}", resolution);
        let pad = src_pad(&self.inner.source)?;
        let this = self.clone();
        block_and_run(&pad, move || this.reconfigure(resolution));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        let r: Resolution = "640 480 15".parse().unwrap();
        assert_eq!(r, Resolution::new(640, 480, 15));
        assert_eq!(r.to_string(), "640x480@15");
    }

    #[test]
    fn test_parse_extra_whitespace() {
        let r: Resolution = "  320   240 5 ".parse().unwrap();
        assert_eq!(r, Resolution::new(320, 240, 5));
    }

    #[test]
    fn test_parse_wrong_arity() {
        assert!("640 480".parse::<Resolution>().is_err());
        assert!("640 480 30 1".parse::<Resolution>().is_err());
        assert!("".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!("0 480 30".parse::<Resolution>().is_err());
        assert!("640 -1 30".parse::<Resolution>().is_err());
        assert!("640 480 abc".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_parse_rejects_beyond_int_range() {
        assert!("2147483648 480 30".parse::<Resolution>().is_err());
        assert!("640 480 4294967295".parse::<Resolution>().is_err());
        assert!("2147483647 1 1".parse::<Resolution>().is_ok());
    }

    #[test]
    fn test_default_matches_source() {
        assert_eq!(Resolution::default(), Resolution::new(1280, 720, 30));
    }
}
