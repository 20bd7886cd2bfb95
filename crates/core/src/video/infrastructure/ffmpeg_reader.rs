use crate::shared::frame::Frame;
use crate::video::domain::video_reader::{VideoMetadata, VideoReader};
use crate::video::domain::video_source::VideoSource;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video as VideoFrame;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Local files and network URLs are opened the same way. Each decoded
/// frame is converted to RGB24 and wrapped in a [`Frame`].
pub struct FfmpegReader {
    opened: Option<Opened>,
}

struct Opened {
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: FfmpegReader is created and used on the media decode thread only.
// The raw pointers inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self { opened: None }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, source: &VideoSource) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let input = ffmpeg_next::format::input(&source.location())?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.avg_frame_rate();
        let rate = if rate.denominator() != 0 && rate.numerator() != 0 {
            rate
        } else {
            stream.rate()
        };
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
        };
        log::debug!("Opened {source}: {width}x{height} @ {fps:.2} fps");

        self.opened = Some(Opened {
            input,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(opened) = self.opened.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };
        Box::new(FfmpegFrameIter {
            opened,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.opened = None;
    }
}

/// Lazy iterator decoding one frame at a time.
struct FfmpegFrameIter<'a> {
    opened: &'a mut Opened,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = VideoFrame::empty();
        self.opened.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb_frame = VideoFrame::empty();
        if let Err(e) = self.opened.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(Box::new(e)));
        }

        let (width, height) = (self.opened.width, self.opened.height);
        let pixels = extract_rgb_pixels(&rgb_frame, width, height);
        let frame = Frame::new(pixels, width, height, 3, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(result) = self.try_receive() {
            return Some(result);
        }
        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.opened.input.packets().next() else {
                let _ = self.opened.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.opened.stream_index {
                continue;
            }
            if let Err(e) = self.opened.decoder.send_packet(&packet) {
                log::trace!("Skipping undecodable packet: {e}");
                continue;
            }
            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a tightly-packed RGB buffer,
/// dropping per-row stride padding.
fn extract_rgb_pixels(rgb_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Encodes a tiny MPEG-4 clip whose frames are solid gray levels.
    fn write_test_clip(path: &Path, num_frames: usize, width: u32, height: u32) {
        const FPS: i32 = 25;
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, FPS));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(FPS, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);
        octx.write_header().unwrap();
        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut to_yuv = scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .unwrap();

        let drain = |encoder: &mut ffmpeg_next::encoder::Video,
                         octx: &mut ffmpeg_next::format::context::Output| {
            let mut packet = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(0);
                packet.rescale_ts(ffmpeg_next::Rational(1, FPS), ost_time_base);
                packet.write_interleaved(octx).unwrap();
            }
        };

        for i in 0..num_frames {
            let mut rgb = VideoFrame::new(ffmpeg_next::format::Pixel::RGB24, width, height);
            let level = ((i * 40) % 256) as u8;
            rgb.data_mut(0).fill(level);

            let mut yuv = VideoFrame::empty();
            to_yuv.run(&rgb, &mut yuv).unwrap();
            yuv.set_pts(Some(i as i64));
            encoder.send_frame(&yuv).unwrap();
            drain(&mut encoder, &mut octx);
        }
        encoder.send_eof().unwrap();
        drain(&mut encoder, &mut octx);
        octx.write_trailer().unwrap();
    }

    fn clip_source(dir: &Path, frames: usize) -> VideoSource {
        let path = dir.join("clip.mp4");
        write_test_clip(&path, frames, 160, 120);
        VideoSource::File(path)
    }

    #[test]
    fn test_open_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let source = clip_source(dir.path(), 5);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&source).unwrap();
        assert_eq!((meta.width, meta.height), (160, 120));
        assert!(meta.fps > 0.0);
    }

    #[test]
    fn test_open_nonexistent_is_error() {
        let mut reader = FfmpegReader::new();
        let source = VideoSource::File("/nonexistent/clip.mp4".into());
        assert!(reader.open(&source).is_err());
    }

    #[test]
    fn test_frames_are_sequential_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let source = clip_source(dir.path(), 5);

        let mut reader = FfmpegReader::new();
        reader.open(&source).unwrap();
        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();

        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.channels(), 3);
            assert_eq!(frame.data().len(), 160 * 120 * 3);
        }
    }

    #[test]
    fn test_frames_without_open_is_error() {
        let mut reader = FfmpegReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = clip_source(dir.path(), 1);

        let mut reader = FfmpegReader::new();
        reader.open(&source).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
