//! Caps helpers.

use crate::error::{Error, Result};
use gst::prelude::*;
use std::str::FromStr;

/// RTP caps of the H.264 stream produced by `x264enc ! rtph264pay` with
/// default settings on a 320x240 test source.
///
/// The depayloader on the appsrc side needs these up front because appsrc
/// has no upstream to negotiate with.
pub const RTP_H264_CAPS: &str = concat!(
    "application/x-rtp, media=(string)video, clock-rate=(int)90000, ",
    "encoding-name=(string)H264, packetization-mode=(string)1, ",
    "sprop-parameter-sets=(string)\"Z/QADZGbKCg/YC1BgYGQAAADABAAAAMDyPFCmWA\\=\\,aOvsRIRA\", ",
    "profile-level-id=(string)f4000d, profile=(string)high-4:4:4, payload=(int)96, ",
    "ssrc=(uint)3758284032, timestamp-offset=(uint)417728509, seqnum-offset=(uint)23687, ",
    "a-framerate=(string)30"
);

/// Parse a caps string.
pub fn parse_caps(caps: &str) -> Result<gst::Caps> {
    gst::Caps::from_str(caps).map_err(|_| Error::Caps(caps.to_string()))
}

/// Parse `caps` and assign it to the `caps` property of a capsfilter.
pub fn set_caps(capsfilter: &gst::Element, caps: &str) -> Result<()> {
    let caps = parse_caps(caps)?;
    capsfilter.set_property("caps", &caps);
    Ok(())
}

/// Caps integer fields are signed; reject values that do not fit.
fn int_field(name: &str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::Caps(format!("{name}={value}")))
}

/// `video/x-raw` restricted to a frame size.
pub fn raw_video_caps(width: u32, height: u32) -> Result<gst::Caps> {
    Ok(gst::Caps::builder("video/x-raw")
        .field("width", int_field("width", width)?)
        .field("height", int_field("height", height)?)
        .build())
}

/// `video/x-raw` restricted to a frame rate.
pub fn framerate_caps(fps: u32) -> Result<gst::Caps> {
    Ok(gst::Caps::builder("video/x-raw")
        .field("framerate", gst::Fraction::new(int_field("framerate", fps)?, 1))
        .build())
}

/// Fully fixed `video/x-raw` caps.
pub fn raw_video_full_caps(
    format: gst_video::VideoFormat,
    width: u32,
    height: u32,
    fps: u32,
) -> Result<gst::Caps> {
    Ok(gst_video::VideoCapsBuilder::new()
        .format(format)
        .width(int_field("width", width)?)
        .height(int_field("height", height)?)
        .framerate(gst::Fraction::new(int_field("framerate", fps)?, 1))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        gst::init().unwrap();
    }

    #[test]
    fn test_parse_valid() {
        init();
        let caps = parse_caps("video/x-raw,width=640,height=480").unwrap();
        let s = caps.structure(0).unwrap();
        assert_eq!(s.name(), "video/x-raw");
        assert_eq!(s.get::<i32>("width").unwrap(), 640);
    }

    #[test]
    fn test_parse_invalid() {
        init();
        assert!(matches!(parse_caps("video/x-raw,width="), Err(Error::Caps(_))));
    }

    #[test]
    fn test_rtp_caps_parse() {
        init();
        let caps = parse_caps(RTP_H264_CAPS).unwrap();
        let s = caps.structure(0).unwrap();
        assert_eq!(s.name(), "application/x-rtp");
        assert_eq!(s.get::<&str>("encoding-name").unwrap(), "H264");
        assert_eq!(s.get::<i32>("clock-rate").unwrap(), 90000);
        assert_eq!(s.get::<i32>("payload").unwrap(), 96);
    }

    #[test]
    fn test_builders() {
        init();
        let size = raw_video_caps(1920, 1080).unwrap();
        assert_eq!(size.to_string(), "video/x-raw, width=(int)1920, height=(int)1080");
        let s = size.structure(0).unwrap();
        assert_eq!(s.get::<i32>("width").unwrap(), 1920);
        assert_eq!(s.get::<i32>("height").unwrap(), 1080);

        let rate = framerate_caps(15).unwrap();
        let s = rate.structure(0).unwrap();
        assert_eq!(s.get::<gst::Fraction>("framerate").unwrap(), gst::Fraction::new(15, 1));

        let full = raw_video_full_caps(gst_video::VideoFormat::Rgba, 1280, 720, 30).unwrap();
        assert!(full.is_fixed());
        assert_eq!(
            full.structure(0).unwrap().get::<&str>("format").unwrap(),
            "RGBA"
        );
    }

    #[test]
    fn test_builders_reject_values_beyond_int_range() {
        init();
        let too_big = i32::MAX as u32 + 1;
        assert!(matches!(raw_video_caps(too_big, 240), Err(Error::Caps(ref f)) if f.starts_with("width=")));
        assert!(matches!(raw_video_caps(320, u32::MAX), Err(Error::Caps(_))));
        assert!(matches!(framerate_caps(too_big), Err(Error::Caps(_))));
        assert!(raw_video_full_caps(gst_video::VideoFormat::Rgba, 320, 240, too_big).is_err());
        assert!(raw_video_caps(i32::MAX as u32, 1).is_ok());
    }

    #[test]
    fn test_set_caps_on_capsfilter() {
        init();
        let filter = gst::ElementFactory::make("capsfilter").build().unwrap();
        set_caps(&filter, "video/x-raw,width=320,height=240").unwrap();
        let caps = filter.property::<gst::Caps>("caps");
        assert_eq!(caps.structure(0).unwrap().get::<i32>("height").unwrap(), 240);
    }
}
