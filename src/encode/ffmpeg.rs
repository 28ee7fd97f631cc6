use crate::encode::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StackError, StackResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use crate::scene::config::StageConfig;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Straight RGBA8 color that translucent pixels are flattened onto.
    pub bg_rgba: [u8; 4],
}

/// A running `ffmpeg` process.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<String>>,
    cfg: SinkConfig,
    next: Option<FrameIndex>,
    rgb: Vec<u8>,
}

/// Streams frames as packed RGB24 into the system `ffmpeg` (libx264, yuv420p).
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    expected: Option<SinkConfig>,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            expected: None,
            encoder: None,
        }
    }

    /// Sink for a stage: flattens onto the stage background and only accepts the stage's
    /// canvas size and frame rate.
    pub fn for_stage(
        cfg: &StageConfig,
        out_path: impl Into<PathBuf>,
        overwrite: bool,
    ) -> StackResult<Self> {
        cfg.validate_for_video()?;
        let mut sink = Self::new(FfmpegSinkOpts {
            out_path: out_path.into(),
            overwrite,
            bg_rgba: cfg.background.to_rgba8(),
        });
        sink.expected = Some(SinkConfig {
            width: cfg.canvas.width,
            height: cfg.canvas.height,
            fps: cfg.fps,
        });
        Ok(sink)
    }

    /// Command line passed to `ffmpeg` for `cfg`.
    fn args(&self, cfg: SinkConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            if self.opts.overwrite { "-y" } else { "-n" },
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.extend(
            [
                "-s".to_owned(),
                format!("{}x{}", cfg.width, cfg.height),
                "-r".to_owned(),
                format!("{}/{}", cfg.fps.num, cfg.fps.den),
            ]
            .map(OsString::from),
        );
        args.extend(
            [
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]
            .map(OsString::from),
        );
        args.push(self.opts.out_path.clone().into_os_string());
        args
    }

    fn check_config(&self, cfg: SinkConfig) -> StackResult<()> {
        if let Some(expected) = self.expected
            && expected != cfg
        {
            return Err(StackError::validation(format!(
                "ffmpeg sink was set up for {}x{} at {}/{} fps, got {}x{} at {}/{}",
                expected.width,
                expected.height,
                expected.fps.num,
                expected.fps.den,
                cfg.width,
                cfg.height,
                cfg.fps.num,
                cfg.fps.den
            )));
        }
        if cfg.width == 0 || cfg.height == 0 || cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(StackError::validation(
                "ffmpeg sink needs a non-empty canvas and a non-zero rate",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(StackError::validation(format!(
                "canvas {}x{} must have even sides for MP4 output",
                cfg.width, cfg.height
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> StackResult<()> {
        self.check_config(cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(StackError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(StackError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        tracing::debug!(out = %self.opts.out_path.display(), "spawning ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(self.args(cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StackError::encode(format!("failed to spawn ffmpeg: {e}")))?;

        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(StackError::encode("failed to open ffmpeg pipes"));
        };
        // ffmpeg blocks once its stderr pipe fills up.
        let stderr = std::thread::spawn(move || -> std::io::Result<String> {
            let mut out = String::new();
            stderr.read_to_string(&mut out)?;
            Ok(out)
        });

        self.encoder = Some(Encoder {
            child,
            stdin,
            stderr,
            cfg,
            next: None,
            rgb: Vec::new(),
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StackResult<()> {
        let bg = self.opts.bg_rgba;
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| StackError::encode("ffmpeg sink not started"))?;
        if enc.next.is_some_and(|next| next != idx) {
            return Err(StackError::encode(format!(
                "ffmpeg sink expected frame {}, got {}",
                enc.next.map_or(0, |n| n.0),
                idx.0
            )));
        }
        if frame.width != enc.cfg.width || frame.height != enc.cfg.height {
            return Err(StackError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, enc.cfg.width, enc.cfg.height
            )));
        }

        flatten_to_rgb(&mut enc.rgb, frame, bg)?;
        enc.stdin
            .write_all(&enc.rgb)
            .map_err(|e| StackError::encode(format!("failed to write frame to ffmpeg: {e}")))?;
        enc.next = Some(FrameIndex(idx.0 + 1));
        Ok(())
    }

    fn end(&mut self) -> StackResult<()> {
        let Encoder {
            mut child,
            stdin,
            stderr,
            ..
        } = self
            .encoder
            .take()
            .ok_or_else(|| StackError::encode("ffmpeg sink not started"))?;
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| StackError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let log = stderr
            .join()
            .map_err(|_| StackError::encode("ffmpeg stderr reader panicked"))?
            .map_err(|e| StackError::encode(format!("ffmpeg stderr read failed: {e}")))?;
        if !status.success() {
            return Err(StackError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                log.trim()
            )));
        }
        tracing::info!(out = %self.opts.out_path.display(), "mp4 written");
        Ok(())
    }
}

/// Flatten a premultiplied frame onto `bg` as packed RGB24.
pub(crate) fn flatten_to_rgb(
    dst: &mut Vec<u8>,
    frame: &FrameRGBA,
    bg: [u8; 4],
) -> StackResult<()> {
    let pixels = (frame.width as usize).saturating_mul(frame.height as usize);
    if frame.data.len() != pixels.saturating_mul(4) {
        return Err(StackError::validation(
            "frame data length does not match width*height*4",
        ));
    }
    if !frame.premultiplied {
        return Err(StackError::encode("ffmpeg sink expects premultiplied frames"));
    }

    dst.clear();
    dst.reserve(pixels * 3);
    for px in frame.data.chunks_exact(4) {
        let inv = 255 - u16::from(px[3]);
        for c in 0..3 {
            let under = mul_div255_u16(u16::from(bg[c]), inv);
            dst.push((u16::from(px[c]) + under).min(255) as u8);
        }
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
