//! Audio and video transcoding through the ffmpeg CLI.

use crate::{Error, Result, ToolCommand};
use std::ffi::OsString;
use std::path::Path;

/// Arguments for a plain container/codec conversion.
///
/// ffmpeg picks muxer and default codecs from the output extension.
pub fn ffmpeg_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        input.as_os_str().to_os_string(),
        output.as_os_str().to_os_string(),
    ]
}

/// Transcode `input` into `output`, overwriting any existing file.
///
/// A non-zero exit becomes [`Error::ToolFailed`] carrying ffmpeg's stderr.
pub fn transcode(ffmpeg: &Path, input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Transcoding {:?} -> {:?}", input, output);

    ToolCommand::new(ffmpeg)
        .args(ffmpeg_args(input, output))
        .execute()?;

    Ok(())
}
