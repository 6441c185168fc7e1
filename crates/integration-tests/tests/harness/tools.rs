//! Shell stand-ins for `ffmpeg` and `ffprobe`

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Stub tool locations inside a temp directory
pub struct StubTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl StubTools {
    /// `ffmpeg` concatenates every file named in the concat list into the
    /// output path; `ffprobe` reports `duration`
    pub fn install(dir: &Path, duration: &str) -> anyhow::Result<Self> {
        let ffmpeg = dir.join("ffmpeg");
        write_script(
            &ffmpeg,
            r#"if [ "$1" = "-version" ]; then echo "ffmpeg version stub"; exit 0; fi
list=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then list="$arg"; fi
  prev="$arg"
  out="$arg"
done
sed -n "s/^file '\(.*\)'$/\1/p" "$list" | while read -r segment; do cat "$segment"; echo; done > "$out""#,
        )?;

        let ffprobe = dir.join("ffprobe");
        write_script(
            &ffprobe,
            &format!(
                r#"if [ "$1" = "-version" ]; then echo "ffprobe version stub"; exit 0; fi
echo "{duration}""#
            ),
        )?;

        Ok(Self { ffmpeg, ffprobe })
    }
}

fn write_script(path: &Path, body: &str) -> anyhow::Result<()> {
    std::fs::write(path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}
