//! Helpers for naming and reserving destination files

use crate::config::FileCollisionAction;
use crate::error::FetchError;
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Derive the stored filename for a fetched image
///
/// Priority order:
/// 1. `Content-Disposition` header (`filename=` and RFC 5987 `filename*=` forms)
/// 2. The last path segment of the request URL
/// 3. The literal `"image"`
///
/// The extension is kept: a request for `https://x/img.png` stores `img.png`.
/// Directory components in a server-supplied name are stripped, so a header
/// naming `../../evil.png` stores `evil.png` inside the requested directory.
pub fn filename_from_response(response: &reqwest::Response, url: &str) -> String {
    if let Some(header) = response.headers().get(reqwest::header::CONTENT_DISPOSITION)
        && let Ok(value) = header.to_str()
    {
        for part in value.split(';') {
            let part = part.trim();
            if let Some(name) = part.strip_prefix("filename=") {
                if let Some(name) = sanitize_filename(name.trim_matches('"')) {
                    return name;
                }
            } else if let Some(encoded) = part.strip_prefix("filename*=") {
                // RFC 5987: charset'lang'percent-encoded-name
                if let Some(idx) = encoded.rfind('\'')
                    && let Ok(decoded) = urlencoding::decode(&encoded[idx + 1..])
                    && let Some(name) = sanitize_filename(&decoded)
                {
                    return name;
                }
            }
        }
    }

    if let Ok(parsed) = url::Url::parse(url)
        && let Some(mut segments) = parsed.path_segments()
        && let Some(last) = segments.next_back()
        && let Some(name) = sanitize_filename(last)
    {
        return name;
    }

    "image".to_string()
}

/// Reduce a possibly hostile name to its bare file name component
///
/// `file_name()` already rejects empty, `.`, and `..` inputs.
fn sanitize_filename(raw: &str) -> Option<String> {
    let name = Path::new(raw).file_name()?.to_str()?;
    Some(name.to_string())
}

/// Resolve the final destination path, handling collisions per `action`
///
/// - `Overwrite`: always the original path.
/// - `Skip`: error if the path is occupied.
/// - `Rename`: append " (1)", " (2)", ... before the extension until a free
///   name is found.
pub fn unique_destination(
    path: &Path,
    action: FileCollisionAction,
) -> Result<PathBuf, FetchError> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(FetchError::Collision {
                    path: path.to_path_buf(),
                });
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");
            let extension = path.extension().and_then(|e| e.to_str());
            let parent = path.parent().unwrap_or_else(|| Path::new(""));

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let candidate = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let candidate = parent.join(candidate);
                if !candidate.exists() {
                    return Ok(candidate);
                }
            }

            Err(FetchError::Collision {
                path: path.to_path_buf(),
            })
        }
    }
}
